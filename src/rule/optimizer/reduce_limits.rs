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

//! Collapses a `Limit` directly over another `Limit` (spec §4.4
//! ReduceLimits): `Limit(Limit(p, m), n)` becomes `Limit(p, min(n, m))`,
//! expressed as `If(n < m, n, m)` so `FoldConstants` can still fold it when
//! both counts are literal.

use std::rc::Rc;

use crate::error::PlanResult;
use crate::expr::Expr;
use crate::plan::{transform_down, LogicalPlan, LogicalPlanRef};
use crate::rule::{Rule, RuleContext};

pub struct ReduceLimits;

impl ReduceLimits {
    pub fn create() -> Box<dyn Rule> {
        Box::new(Self)
    }
}

impl Rule for ReduceLimits {
    fn name(&self) -> &'static str {
        "ReduceLimits"
    }

    fn apply(&self, plan: &LogicalPlanRef, _ctx: &RuleContext) -> PlanResult<LogicalPlanRef> {
        Ok(transform_down(plan, &mut |node| match &*node {
            LogicalPlan::Limit { child, count: n } => match &**child {
                LogicalPlan::Limit {
                    child: grandchild,
                    count: m,
                } => Rc::new(LogicalPlan::Limit {
                    child: grandchild.clone(),
                    count: Rc::new(Expr::If {
                        cond: Rc::new(Expr::Lt(n.clone(), m.clone())),
                        yes: n.clone(),
                        no: m.clone(),
                    }),
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
    use crate::common::{CompileContext, DataType, PlanNodeId, ScalarValue};

    #[test]
    fn nested_limit_collapses_to_a_min_expression() {
        let r = Rc::new(LogicalPlan::Relation { id: PlanNodeId(0), output: vec![] });
        let inner = Rc::new(LogicalPlan::Limit {
            child: r.clone(),
            count: Expr::literal(ScalarValue::Int64(5), DataType::Int64),
        });
        let outer = Rc::new(LogicalPlan::Limit {
            child: inner,
            count: Expr::literal(ScalarValue::Int64(10), DataType::Int64),
        });
        let compile = CompileContext::new();
        let ctx = RuleContext { compile: &compile, catalog: None };
        let result = ReduceLimits.apply(&outer, &ctx).unwrap();
        match &*result {
            LogicalPlan::Limit { child, count } => {
                assert!(Rc::ptr_eq(child, &r));
                assert!(matches!(&**count, Expr::If { .. }));
            }
            _ => panic!("expected Limit"),
        }
    }
}
