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

//! Strips `Subquery` wrapper nodes, run once at the end of Analysis (spec
//! §4.3 EliminateSubqueries). Anything beyond alias bookkeeping (subquery
//! decorrelation, correlated predicates) is out of scope.

use crate::error::PlanResult;
use crate::plan::{transform_down, LogicalPlan, LogicalPlanRef};
use crate::rule::{Rule, RuleContext};

pub struct EliminateSubqueries;

impl EliminateSubqueries {
    pub fn create() -> Box<dyn Rule> {
        Box::new(Self)
    }
}

impl Rule for EliminateSubqueries {
    fn name(&self) -> &'static str {
        "EliminateSubqueries"
    }

    fn apply(&self, plan: &LogicalPlanRef, _ctx: &RuleContext) -> PlanResult<LogicalPlanRef> {
        Ok(transform_down(plan, &mut |node| match &*node {
            LogicalPlan::Subquery { child, .. } => child.clone(),
            _ => node,
        }))
    }
}
