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

//! Elides redundant `Cast` nodes (spec §4.4 ReduceCasts): a cast to the
//! operand's own type disappears, and a `Cast` directly wrapping another
//! `Cast` collapses to the outer target type, keeping only the innermost
//! operand.
//!
//! The nested-cast collapse is sound only because `ApplyImplicitCasts` ever
//! inserts widening casts (spec §4.3) — collapsing `Cast(Cast(e, T1), T2)` to
//! `Cast(e, T2)` would silently change the result if some inserted cast could
//! narrow, since an intermediate truncation could be skipped.

use std::rc::Rc;

use crate::error::PlanResult;
use crate::expr::Expr;
use crate::plan::LogicalPlanRef;
use crate::rule::optimizer::rewrite_exprs_up;
use crate::rule::{Rule, RuleContext};

pub struct ReduceCasts;

impl ReduceCasts {
    pub fn create() -> Box<dyn Rule> {
        Box::new(Self)
    }
}

impl Rule for ReduceCasts {
    fn name(&self) -> &'static str {
        "ReduceCasts"
    }

    fn apply(&self, plan: &LogicalPlanRef, _ctx: &RuleContext) -> PlanResult<LogicalPlanRef> {
        Ok(rewrite_exprs_up(plan, &mut |e| match &*e {
            Expr::Cast { child, target_type } if child.data_type() == *target_type => child.clone(),
            Expr::Cast { child, target_type } => match &**child {
                Expr::Cast { child: inner, .. } => Rc::new(Expr::Cast {
                    child: inner.clone(),
                    target_type: *target_type,
                }),
                _ => e.clone(),
            },
            _ => e,
        }))
    }
}
