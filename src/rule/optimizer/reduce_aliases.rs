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

//! Collapses nested `Alias` wrappers (spec §4.4 ReduceAliases):
//! `Alias(Alias(e, _), name)` keeps only the outer name, since a named
//! attribute is only ever read by its own id and the inner name is dead.

use std::rc::Rc;

use crate::error::PlanResult;
use crate::expr::Expr;
use crate::plan::LogicalPlanRef;
use crate::rule::optimizer::rewrite_exprs_up;
use crate::rule::{Rule, RuleContext};

pub struct ReduceAliases;

impl ReduceAliases {
    pub fn create() -> Box<dyn Rule> {
        Box::new(Self)
    }
}

impl Rule for ReduceAliases {
    fn name(&self) -> &'static str {
        "ReduceAliases"
    }

    fn apply(&self, plan: &LogicalPlanRef, _ctx: &RuleContext) -> PlanResult<LogicalPlanRef> {
        Ok(rewrite_exprs_up(plan, &mut |e| match &*e {
            Expr::Alias { child, name, id } => match &**child {
                Expr::Alias { child: inner, .. } => Rc::new(Expr::Alias {
                    child: inner.clone(),
                    name: name.clone(),
                    id: *id,
                }),
                _ => e.clone(),
            },
            _ => e,
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::common::{CompileContext, DataType, ExprId, PlanNodeId, ScalarValue};
    use crate::plan::LogicalPlan;

    #[test]
    fn nested_alias_collapses_to_the_outer_name() {
        let r = Rc::new(LogicalPlan::Relation { id: PlanNodeId(0), output: vec![] });
        let lit = Expr::literal(ScalarValue::Int32(1), DataType::Int32);
        let inner_alias = Rc::new(Expr::Alias { child: lit, name: "inner".into(), id: ExprId(1) });
        let outer_alias = Rc::new(Expr::Alias { child: inner_alias, name: "outer".into(), id: ExprId(2) });
        let project = Rc::new(LogicalPlan::Project { child: r, projections: vec![outer_alias] });
        let compile = CompileContext::new();
        let ctx = RuleContext { compile: &compile, catalog: None };
        let result = ReduceAliases.apply(&project, &ctx).unwrap();
        match &*result {
            LogicalPlan::Project { projections, .. } => match &*projections[0] {
                Expr::Alias { child, name, id } => {
                    assert_eq!(name, "outer");
                    assert_eq!(*id, ExprId(2));
                    assert!(matches!(&**child, Expr::Literal { .. }));
                }
                other => panic!("expected Alias, got {other:?}"),
            },
            _ => panic!("expected Project"),
        }
    }
}
