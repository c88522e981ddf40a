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

//! Binds every `UnresolvedAttribute` in a node's own expressions against the
//! concatenated output of its (already strictly typed) children (spec §4.3
//! ResolveReferences), post-order.

use itertools::Itertools;

use crate::error::{PlanError, PlanResult};
use crate::expr::{Expr, ExprRef};
use crate::plan::{try_transform_expressions_up, try_transform_up, LogicalPlanRef};
use crate::rule::{Rule, RuleContext};

pub struct ResolveReferences;

impl ResolveReferences {
    pub fn create() -> Box<dyn Rule> {
        Box::new(Self)
    }
}

impl Rule for ResolveReferences {
    fn name(&self) -> &'static str {
        "ResolveReferences"
    }

    fn apply(&self, plan: &LogicalPlanRef, _ctx: &RuleContext) -> PlanResult<LogicalPlanRef> {
        try_transform_up(plan, &mut |node| {
            if !has_unresolved_attribute(&node) {
                return Ok(node);
            }
            if !node.children().iter().all(|c| c.strictly_typed()) {
                return Ok(node);
            }
            let candidates: Vec<ExprRef> = node
                .children()
                .iter()
                .flat_map(|c| c.output())
                .collect();
            let node_for_errors = node.clone();
            try_transform_expressions_up(&node, &mut |e| match &*e {
                Expr::UnresolvedAttribute { name } => {
                    resolve_attribute(name, &candidates, &node_for_errors)
                }
                _ => Ok(e),
            })
        })
    }
}

fn has_unresolved_attribute(node: &LogicalPlanRef) -> bool {
    node.own_exprs()
        .iter()
        .any(|e| contains_unresolved_attribute(e))
}

fn contains_unresolved_attribute(e: &ExprRef) -> bool {
    match &**e {
        Expr::UnresolvedAttribute { .. } => true,
        _ => e.children().iter().any(contains_unresolved_attribute),
    }
}

fn resolve_attribute(
    name: &str,
    candidates: &[ExprRef],
    node: &LogicalPlanRef,
) -> PlanResult<ExprRef> {
    let matches: Vec<&ExprRef> = candidates
        .iter()
        .filter(|c| matches!(&***c, Expr::AttributeRef { name: n, .. } if n == name))
        .collect();
    match matches.as_slice() {
        [] => Err(PlanError::resolution_failure(
            name,
            "No candidate input attribute(s) found",
            node.pretty_tree(),
        )),
        [single] => Ok((*single).clone()),
        many => Err(PlanError::resolution_failure(
            name,
            format!(
                "Ambiguous reference, candidates: {}",
                many.iter().map(|c| format!("{c:?}")).join(", ")
            ),
            node.pretty_tree(),
        )),
    }
}
