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

//! Pushes a `Filter` below a `Project` (spec §4.4
//! PushFiltersThroughProjects): `Filter(Project(p, projs), cond)` becomes
//! `Project(Filter(p, cond'), projs)`, with `cond'` rewritten to reference
//! `p`'s attributes through the projection's definitions.

use std::rc::Rc;

use crate::error::PlanResult;
use crate::plan::{transform_down, LogicalPlan, LogicalPlanRef};
use crate::rule::optimizer::{projection_substitution_map, substitute};
use crate::rule::{Rule, RuleContext};

pub struct PushFiltersThroughProjects;

impl PushFiltersThroughProjects {
    pub fn create() -> Box<dyn Rule> {
        Box::new(Self)
    }
}

impl Rule for PushFiltersThroughProjects {
    fn name(&self) -> &'static str {
        "PushFiltersThroughProjects"
    }

    fn apply(&self, plan: &LogicalPlanRef, _ctx: &RuleContext) -> PlanResult<LogicalPlanRef> {
        Ok(transform_down(plan, &mut |node| match &*node {
            LogicalPlan::Filter { child, condition } => match &**child {
                LogicalPlan::Project {
                    child: grandchild,
                    projections,
                } => {
                    let map = projection_substitution_map(projections);
                    let pushed_condition = substitute(condition, &map);
                    Rc::new(LogicalPlan::Project {
                        child: Rc::new(LogicalPlan::Filter {
                            child: grandchild.clone(),
                            condition: pushed_condition,
                        }),
                        projections: projections.clone(),
                    })
                }
                _ => node.clone(),
            },
            _ => node,
        }))
    }
}
