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

//! Removes a `Filter` whose condition has folded to a boolean literal (spec
//! §4.4 FoldConstantFilters): `Filter(p, True) -> p`; `Filter(p, False)`
//! becomes an empty `LocalRelation` carrying `p`'s output schema, since a
//! row can never satisfy `False`.

use crate::error::PlanResult;
use crate::plan::{transform_down, LogicalPlan, LogicalPlanRef};
use crate::rule::{Rule, RuleContext};

pub struct FoldConstantFilters;

impl FoldConstantFilters {
    pub fn create() -> Box<dyn Rule> {
        Box::new(Self)
    }
}

impl Rule for FoldConstantFilters {
    fn name(&self) -> &'static str {
        "FoldConstantFilters"
    }

    fn apply(&self, plan: &LogicalPlanRef, _ctx: &RuleContext) -> PlanResult<LogicalPlanRef> {
        Ok(transform_down(plan, &mut |node| match &*node {
            LogicalPlan::Filter { child, condition } if condition.is_literal_bool(true) => {
                child.clone()
            }
            LogicalPlan::Filter { child, condition } if condition.is_literal_bool(false) => {
                std::rc::Rc::new(LogicalPlan::LocalRelation {
                    output: child.output(),
                    rows: vec![],
                })
            }
            _ => node,
        }))
    }
}
