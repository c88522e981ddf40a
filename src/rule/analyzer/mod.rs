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

//! Name-resolution rules (spec §4.3), wired into the two batches `Analyzer`
//! drives: a `Resolution` fixed point, then a one-shot subquery cleanup.
//! Splitting `EliminateSubqueries` out of the fixed point follows the spec's
//! own phrasing ("run at the end of Analysis") rather than interleaving it
//! with repeated resolution passes.

mod apply_implicit_casts;
mod eliminate_subqueries;
mod expand_stars;
mod resolve_references;
mod resolve_relations;
mod resolve_self_joins;

pub use apply_implicit_casts::ApplyImplicitCasts;
pub use eliminate_subqueries::EliminateSubqueries;
pub use expand_stars::ExpandStars;
pub use resolve_references::ResolveReferences;
pub use resolve_relations::ResolveRelations;
pub use resolve_self_joins::ResolveSelfJoins;

use crate::rule::{RuleBatch, Strategy};

pub fn resolution_batch() -> RuleBatch {
    RuleBatch::new(
        "Resolution",
        Strategy::FixedPoint(None),
        vec![
            ExpandStars::create(),
            ResolveRelations::create(),
            ResolveReferences::create(),
            ResolveSelfJoins::create(),
            ApplyImplicitCasts::create(),
        ],
    )
}

pub fn subquery_elimination_batch() -> RuleBatch {
    RuleBatch::new(
        "SubqueryElimination",
        Strategy::Once,
        vec![EliminateSubqueries::create()],
    )
}
