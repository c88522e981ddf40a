// Copyright 2022 Singularity Data
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Algebraic rewrite rules (spec §4.4), wired into one `Optimizations`
//! fixed-point batch. Declaration order matters: constant folding precedes
//! predicate simplification, and CNF conversion precedes filter push-down,
//! per spec §4.4.

mod cnf;
mod eliminate_common_predicates;
mod fold_constant_filters;
mod fold_constants;
mod fold_logical_predicates;
mod null_propagation;
mod push_filters_through_joins;
mod push_filters_through_projects;
mod push_projects_through_limits;
mod reduce_aliases;
mod reduce_casts;
mod reduce_filters;
mod reduce_limits;
mod reduce_negations;
mod reduce_projects;

pub use cnf::CNFConversion;
pub use eliminate_common_predicates::EliminateCommonPredicates;
pub use fold_constant_filters::FoldConstantFilters;
pub use fold_constants::FoldConstants;
pub use fold_logical_predicates::FoldLogicalPredicates;
pub use null_propagation::NullPropagation;
pub use push_filters_through_joins::PushFiltersThroughJoins;
pub use push_filters_through_projects::PushFiltersThroughProjects;
pub use push_projects_through_limits::PushProjectsThroughLimits;
pub use reduce_aliases::ReduceAliases;
pub use reduce_casts::ReduceCasts;
pub use reduce_filters::ReduceFilters;
pub use reduce_limits::ReduceLimits;
pub use reduce_negations::ReduceNegations;
pub use reduce_projects::ReduceProjects;

use std::collections::HashMap;

use crate::common::ExprId;
use crate::expr::{self, Expr, ExprRef};
use crate::plan::{self, LogicalPlanRef};
use crate::rule::{RuleBatch, Strategy};

pub fn optimizations_batch() -> RuleBatch {
    RuleBatch::new(
        "Optimizations",
        Strategy::FixedPoint(None),
        vec![
            FoldConstants::create(),
            FoldLogicalPredicates::create(),
            NullPropagation::create(),
            CNFConversion::create(),
            EliminateCommonPredicates::create(),
            ReduceNegations::create(),
            ReduceCasts::create(),
            ReduceAliases::create(),
            ReduceProjects::create(),
            ReduceFilters::create(),
            FoldConstantFilters::create(),
            PushFiltersThroughProjects::create(),
            PushFiltersThroughJoins::create(),
            PushProjectsThroughLimits::create(),
            ReduceLimits::create(),
        ],
    )
}

/// Applies an expression pre-order rewrite (`transform_down`) to every
/// plan node's own expressions, visiting every node in the plan.
pub(super) fn rewrite_exprs_down(
    plan: &LogicalPlanRef,
    f: &mut impl FnMut(ExprRef) -> ExprRef,
) -> LogicalPlanRef {
    plan::transform_down(plan, &mut |node| plan::transform_expressions_down(&node, f))
}

/// Applies an expression post-order rewrite (`transform_up`) to every plan
/// node's own expressions, visiting every node in the plan.
pub(super) fn rewrite_exprs_up(
    plan: &LogicalPlanRef,
    f: &mut impl FnMut(ExprRef) -> ExprRef,
) -> LogicalPlanRef {
    plan::transform_down(plan, &mut |node| plan::transform_expressions_up(&node, f))
}

/// Builds an id -> replacement-expression map from a projection list: an
/// `Alias` maps its id to its child expression, an `AttributeRef` maps to
/// itself. Used by `ReduceProjects` and `PushFiltersThroughProjects` to
/// substitute references to a projection's outputs with their definitions.
pub(super) fn projection_substitution_map(projections: &[ExprRef]) -> HashMap<ExprId, ExprRef> {
    let mut map = HashMap::new();
    for p in projections {
        match &**p {
            Expr::Alias { child, id, .. } => {
                map.insert(*id, child.clone());
            }
            Expr::AttributeRef { id, .. } => {
                map.insert(*id, p.clone());
            }
            _ => {}
        }
    }
    map
}

/// Rewrites every `AttributeRef` in `e` found in `map` to its mapped
/// expression, leaving everything else untouched.
pub(super) fn substitute(e: &ExprRef, map: &HashMap<ExprId, ExprRef>) -> ExprRef {
    expr::transform_down(e, &mut |node| match &*node {
        Expr::AttributeRef { id, .. } => map.get(id).cloned().unwrap_or(node),
        _ => node,
    })
}

/// The attribute ids a plan's `output()` produces, used to decide which side
/// of a `Join` a predicate's references fall within.
pub(super) fn output_ids(plan: &LogicalPlanRef) -> std::collections::HashSet<ExprId> {
    plan.output()
        .iter()
        .map(|a| match &**a {
            Expr::AttributeRef { id, .. } => *id,
            other => panic!("plan output must consist of AttributeRefs, got {other:?}"),
        })
        .collect()
}
