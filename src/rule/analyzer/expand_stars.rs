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

//! `Star` in a `Project` over a resolved child expands to the child's output
//! (spec §4.3 ExpandStars), post-order so a `Project` over another `Project`
//! expands innermost first.

use std::rc::Rc;

use crate::error::PlanResult;
use crate::expr::Expr;
use crate::plan::{transform_up, LogicalPlan, LogicalPlanRef};
use crate::rule::{Rule, RuleContext};

pub struct ExpandStars;

impl ExpandStars {
    pub fn create() -> Box<dyn Rule> {
        Box::new(Self)
    }
}

impl Rule for ExpandStars {
    fn name(&self) -> &'static str {
        "ExpandStars"
    }

    fn apply(&self, plan: &LogicalPlanRef, _ctx: &RuleContext) -> PlanResult<LogicalPlanRef> {
        Ok(transform_up(plan, &mut |node| match &*node {
            LogicalPlan::Project { child, projections }
                if child.resolved() && projections.iter().any(|p| matches!(&**p, Expr::Star)) =>
            {
                let mut expanded = Vec::with_capacity(projections.len());
                for p in projections {
                    if matches!(&**p, Expr::Star) {
                        expanded.extend(child.output());
                    } else {
                        expanded.push(p.clone());
                    }
                }
                Rc::new(LogicalPlan::Project {
                    child: child.clone(),
                    projections: expanded,
                })
            }
            _ => node,
        }))
    }
}
