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

//! Replaces every `foldable` expression with its evaluated literal (spec
//! §4.4 FoldConstants). Runs first in the Optimizations batch so later
//! rules see folded booleans.

use crate::error::PlanResult;
use crate::expr::{eval, Expr};
use crate::plan::LogicalPlanRef;
use crate::rule::optimizer::rewrite_exprs_up;
use crate::rule::{Rule, RuleContext};

pub struct FoldConstants;

impl FoldConstants {
    pub fn create() -> Box<dyn Rule> {
        Box::new(Self)
    }
}

impl Rule for FoldConstants {
    fn name(&self) -> &'static str {
        "FoldConstants"
    }

    fn apply(&self, plan: &LogicalPlanRef, _ctx: &RuleContext) -> PlanResult<LogicalPlanRef> {
        Ok(rewrite_exprs_up(plan, &mut |e| {
            if matches!(&*e, Expr::Literal { .. }) || !e.foldable() {
                e
            } else {
                let data_type = e.data_type();
                Expr::literal(eval::evaluate(&e), data_type)
            }
        }))
    }
}
