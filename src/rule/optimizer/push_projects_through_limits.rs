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

//! Swaps a `Project` directly over a `Limit` (spec §4.4
//! PushProjectsThroughLimits): `Project(Limit(p, n), projs)` becomes
//! `Limit(Project(p, projs), n)`, letting a later pass collapse `Limit`
//! chains or fuse `Project`s without a `Limit` node in between.

use std::rc::Rc;

use crate::error::PlanResult;
use crate::plan::{transform_down, LogicalPlan, LogicalPlanRef};
use crate::rule::{Rule, RuleContext};

pub struct PushProjectsThroughLimits;

impl PushProjectsThroughLimits {
    pub fn create() -> Box<dyn Rule> {
        Box::new(Self)
    }
}

impl Rule for PushProjectsThroughLimits {
    fn name(&self) -> &'static str {
        "PushProjectsThroughLimits"
    }

    fn apply(&self, plan: &LogicalPlanRef, _ctx: &RuleContext) -> PlanResult<LogicalPlanRef> {
        Ok(transform_down(plan, &mut |node| match &*node {
            LogicalPlan::Project { child, projections } => match &**child {
                LogicalPlan::Limit { child: grandchild, count } => {
                    Rc::new(LogicalPlan::Limit {
                        child: Rc::new(LogicalPlan::Project {
                            child: grandchild.clone(),
                            projections: projections.clone(),
                        }),
                        count: count.clone(),
                    })
                }
                _ => node.clone(),
            },
            _ => node,
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::common::{CompileContext, DataType, ExprId, PlanNodeId, ScalarValue};
    use crate::expr::Expr;

    fn attr(id: u64) -> crate::expr::ExprRef {
        Rc::new(Expr::AttributeRef {
            name: format!("a{id}"),
            data_type: DataType::Int32,
            nullable: false,
            id: ExprId(id),
        })
    }

    #[test]
    fn project_over_limit_swaps_order() {
        let r = Rc::new(LogicalPlan::Relation { id: PlanNodeId(0), output: vec![attr(0)] });
        let count = Expr::literal(ScalarValue::Int64(10), DataType::Int64);
        let limit = Rc::new(LogicalPlan::Limit { child: r.clone(), count });
        let project = Rc::new(LogicalPlan::Project { child: limit, projections: vec![attr(0)] });
        let compile = CompileContext::new();
        let ctx = RuleContext { compile: &compile, catalog: None };
        let result = PushProjectsThroughLimits.apply(&project, &ctx).unwrap();
        match &*result {
            LogicalPlan::Limit { child, .. } => {
                assert!(matches!(&**child, LogicalPlan::Project { .. }));
            }
            _ => panic!("expected Limit"),
        }
    }
}
