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

//! Collapses syntactically duplicated operands (spec §4.4
//! EliminateCommonPredicates): `a AND a`, `a OR a` -> `a`.
//!
//! Spec's third bullet, `If(c, x, x) -> Coalesce(c, x)`, assumes an `If`
//! whose null condition propagates null. This core resolves the `If`-null
//! open question the other way (a null condition takes the else branch, see
//! `crate::expr::eval`), under which `If(c, x, x)` evaluates to `x`
//! regardless of `c` — so the type-safe, semantics-preserving simplification
//! here is the plain `x`, not a `Coalesce` wrapper mixing `c`'s and `x`'s
//! (possibly different) types.

use crate::error::PlanResult;
use crate::expr::Expr;
use crate::plan::LogicalPlanRef;
use crate::rule::optimizer::rewrite_exprs_down;
use crate::rule::{Rule, RuleContext};

pub struct EliminateCommonPredicates;

impl EliminateCommonPredicates {
    pub fn create() -> Box<dyn Rule> {
        Box::new(Self)
    }
}

impl Rule for EliminateCommonPredicates {
    fn name(&self) -> &'static str {
        "EliminateCommonPredicates"
    }

    fn apply(&self, plan: &LogicalPlanRef, _ctx: &RuleContext) -> PlanResult<LogicalPlanRef> {
        Ok(rewrite_exprs_down(plan, &mut |e| match &*e {
            Expr::And(a, b) if Expr::same_or_equal(a, b) => a.clone(),
            Expr::Or(a, b) if Expr::same_or_equal(a, b) => a.clone(),
            Expr::If { cond, yes, no } if Expr::same_or_equal(yes, no) => {
                let _ = cond;
                yes.clone()
            }
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
    fn if_with_equal_branches_reduces_to_that_branch() {
        let attr = Rc::new(Expr::AttributeRef {
            name: "c".into(),
            data_type: DataType::Boolean,
            nullable: true,
            id: ExprId(0),
        });
        let x = Expr::literal(ScalarValue::Int32(5), DataType::Int32);
        let r = Rc::new(LogicalPlan::Relation { id: PlanNodeId(0), output: vec![] });
        let projections = vec![Rc::new(Expr::If { cond: attr, yes: x.clone(), no: x })];
        let project = Rc::new(LogicalPlan::Project { child: r, projections });
        let compile = CompileContext::new();
        let ctx = RuleContext { compile: &compile, catalog: None };
        let result = EliminateCommonPredicates.apply(&project, &ctx).unwrap();
        match &*result {
            LogicalPlan::Project { projections, .. } => {
                assert!(matches!(&*projections[0], Expr::Literal { value: ScalarValue::Int32(5), .. }));
            }
            _ => panic!("expected Project"),
        }
    }
}
