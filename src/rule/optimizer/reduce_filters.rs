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

//! Collapses a `Filter` directly over another `Filter` into one, conjoining
//! the two conditions (spec §4.4 ReduceFilters).

use std::rc::Rc;

use crate::error::PlanResult;
use crate::expr::Expr;
use crate::plan::{transform_down, LogicalPlan, LogicalPlanRef};
use crate::rule::{Rule, RuleContext};

pub struct ReduceFilters;

impl ReduceFilters {
    pub fn create() -> Box<dyn Rule> {
        Box::new(Self)
    }
}

impl Rule for ReduceFilters {
    fn name(&self) -> &'static str {
        "ReduceFilters"
    }

    fn apply(&self, plan: &LogicalPlanRef, _ctx: &RuleContext) -> PlanResult<LogicalPlanRef> {
        Ok(transform_down(plan, &mut |node| match &*node {
            LogicalPlan::Filter { child, condition } => match &**child {
                LogicalPlan::Filter {
                    child: grandchild,
                    condition: inner_condition,
                } => Rc::new(LogicalPlan::Filter {
                    child: grandchild.clone(),
                    condition: Rc::new(Expr::And(inner_condition.clone(), condition.clone())),
                }),
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
    use crate::common::{CompileContext, DataType, ExprId, PlanNodeId};

    fn attr(id: u64) -> crate::expr::ExprRef {
        Rc::new(Expr::AttributeRef {
            name: format!("a{id}"),
            data_type: DataType::Boolean,
            nullable: false,
            id: ExprId(id),
        })
    }

    #[test]
    fn nested_filters_collapse_into_a_conjunction() {
        let r = Rc::new(LogicalPlan::Relation { id: PlanNodeId(0), output: vec![] });
        let inner = Rc::new(LogicalPlan::Filter { child: r.clone(), condition: attr(0) });
        let outer = Rc::new(LogicalPlan::Filter { child: inner, condition: attr(1) });
        let compile = CompileContext::new();
        let ctx = RuleContext { compile: &compile, catalog: None };
        let result = ReduceFilters.apply(&outer, &ctx).unwrap();
        match &*result {
            LogicalPlan::Filter { child, condition } => {
                assert!(Rc::ptr_eq(child, &r));
                assert!(matches!(&**condition, Expr::And(_, _)));
            }
            _ => panic!("expected Filter"),
        }
    }
}
