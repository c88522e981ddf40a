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

//! Simplifies `Not` nodes (spec §4.4 ReduceNegations): double-negation
//! elimination, comparison-operator inversion, `If` branch swap, tautology
//! and contradiction collapse for `a AND NOT a` / `a OR NOT a`, and
//! `IsNull`/`IsNotNull` inversion.
//!
//! The tautology/contradiction collapse only fires when `a` is declared
//! non-nullable. Under this crate's Kleene evaluator (`expr::eval`), a NULL
//! `a` makes both `a AND NOT a` and `a OR NOT a` evaluate to NULL, not to
//! `False`/`True`; collapsing unconditionally would be unsound wherever this
//! rule fires outside a `Filter` condition (a `Project` output expression,
//! for instance, must preserve that NULL rather than observe `False`/`True`).

use std::rc::Rc;

use crate::common::{DataType, ScalarValue};
use crate::error::PlanResult;
use crate::expr::{Expr, ExprRef};
use crate::plan::LogicalPlanRef;
use crate::rule::optimizer::rewrite_exprs_down;
use crate::rule::{Rule, RuleContext};

pub struct ReduceNegations;

impl ReduceNegations {
    pub fn create() -> Box<dyn Rule> {
        Box::new(Self)
    }
}

impl Rule for ReduceNegations {
    fn name(&self) -> &'static str {
        "ReduceNegations"
    }

    fn apply(&self, plan: &LogicalPlanRef, _ctx: &RuleContext) -> PlanResult<LogicalPlanRef> {
        Ok(rewrite_exprs_down(plan, &mut |e| {
            if let Expr::And(a, b) = &*e {
                if (is_negation_of(a, b) && !b.nullable()) || (is_negation_of(b, a) && !a.nullable()) {
                    return Expr::literal(ScalarValue::Boolean(false), DataType::Boolean);
                }
            }
            if let Expr::Or(a, b) = &*e {
                if (is_negation_of(a, b) && !b.nullable()) || (is_negation_of(b, a) && !a.nullable()) {
                    return Expr::literal(ScalarValue::Boolean(true), DataType::Boolean);
                }
            }
            match &*e {
                Expr::Not(inner) => match &**inner {
                    Expr::Not(x) => x.clone(),
                    Expr::Eq(l, r) => Rc::new(Expr::NotEq(l.clone(), r.clone())),
                    Expr::NotEq(l, r) => Rc::new(Expr::Eq(l.clone(), r.clone())),
                    Expr::Lt(l, r) => Rc::new(Expr::GtEq(l.clone(), r.clone())),
                    Expr::GtEq(l, r) => Rc::new(Expr::Lt(l.clone(), r.clone())),
                    Expr::Gt(l, r) => Rc::new(Expr::LtEq(l.clone(), r.clone())),
                    Expr::LtEq(l, r) => Rc::new(Expr::Gt(l.clone(), r.clone())),
                    Expr::IsNull(c) => Rc::new(Expr::IsNotNull(c.clone())),
                    Expr::IsNotNull(c) => Rc::new(Expr::IsNull(c.clone())),
                    Expr::If { cond, yes, no } => Rc::new(Expr::If {
                        cond: cond.clone(),
                        yes: no.clone(),
                        no: yes.clone(),
                    }),
                    _ => e.clone(),
                },
                _ => e,
            }
        }))
    }
}

/// True when `negated` is syntactically `Not(plain)` (up to structural
/// equality of the inner expression).
fn is_negation_of(negated: &ExprRef, plain: &ExprRef) -> bool {
    match &**negated {
        Expr::Not(inner) => Expr::same_or_equal(inner, plain),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::common::{CompileContext, DataType, ExprId, PlanNodeId};
    use crate::plan::LogicalPlan;

    fn attr(id: u64) -> ExprRef {
        Rc::new(Expr::AttributeRef {
            name: format!("a{id}"),
            data_type: DataType::Boolean,
            nullable: false,
            id: ExprId(id),
        })
    }

    fn nullable_attr(id: u64) -> ExprRef {
        Rc::new(Expr::AttributeRef {
            name: format!("a{id}"),
            data_type: DataType::Boolean,
            nullable: true,
            id: ExprId(id),
        })
    }

    fn ctx(compile: &CompileContext) -> RuleContext {
        RuleContext { compile, catalog: None }
    }

    #[test]
    fn double_negation_cancels() {
        let r = Rc::new(LogicalPlan::Relation { id: PlanNodeId(0), output: vec![] });
        let cond = Rc::new(Expr::Not(Rc::new(Expr::Not(attr(0)))));
        let filter = Rc::new(LogicalPlan::Filter { child: r, condition: cond });
        let compile = CompileContext::new();
        let result = ReduceNegations.apply(&filter, &ctx(&compile)).unwrap();
        match &*result {
            LogicalPlan::Filter { condition, .. } => assert_eq!(**condition, *attr(0)),
            _ => panic!("expected Filter"),
        }
    }

    #[test]
    fn not_eq_becomes_not_eq_operator() {
        let r = Rc::new(LogicalPlan::Relation { id: PlanNodeId(0), output: vec![] });
        let cond = Rc::new(Expr::Not(Rc::new(Expr::Eq(attr(0), attr(1)))));
        let filter = Rc::new(LogicalPlan::Filter { child: r, condition: cond });
        let compile = CompileContext::new();
        let result = ReduceNegations.apply(&filter, &ctx(&compile)).unwrap();
        match &*result {
            LogicalPlan::Filter { condition, .. } => {
                assert!(matches!(&**condition, Expr::NotEq(_, _)))
            }
            _ => panic!("expected Filter"),
        }
    }

    #[test]
    fn a_and_not_a_collapses_to_false() {
        let r = Rc::new(LogicalPlan::Relation { id: PlanNodeId(0), output: vec![] });
        let cond = Rc::new(Expr::And(attr(0), Rc::new(Expr::Not(attr(0)))));
        let filter = Rc::new(LogicalPlan::Filter { child: r, condition: cond });
        let compile = CompileContext::new();
        let result = ReduceNegations.apply(&filter, &ctx(&compile)).unwrap();
        match &*result {
            LogicalPlan::Filter { condition, .. } => assert!(condition.is_literal_bool(false)),
            _ => panic!("expected Filter"),
        }
    }

    /// A nullable `a` makes `a AND NOT a` evaluate to NULL, not `False`, when
    /// `a` is NULL at runtime (Kleene logic) — the rewrite must not fire.
    #[test]
    fn nullable_a_and_not_a_is_left_alone() {
        let r = Rc::new(LogicalPlan::Relation { id: PlanNodeId(0), output: vec![] });
        let cond = Rc::new(Expr::And(nullable_attr(0), Rc::new(Expr::Not(nullable_attr(0)))));
        let filter = Rc::new(LogicalPlan::Filter { child: r, condition: cond.clone() });
        let compile = CompileContext::new();
        let result = ReduceNegations.apply(&filter, &ctx(&compile)).unwrap();
        match &*result {
            LogicalPlan::Filter { condition, .. } => {
                assert!(Expr::same_or_equal(condition, &cond));
            }
            _ => panic!("expected Filter"),
        }
    }

    /// Likewise for `a OR NOT a`.
    #[test]
    fn nullable_a_or_not_a_is_left_alone() {
        let r = Rc::new(LogicalPlan::Relation { id: PlanNodeId(0), output: vec![] });
        let cond = Rc::new(Expr::Or(nullable_attr(0), Rc::new(Expr::Not(nullable_attr(0)))));
        let filter = Rc::new(LogicalPlan::Filter { child: r, condition: cond.clone() });
        let compile = CompileContext::new();
        let result = ReduceNegations.apply(&filter, &ctx(&compile)).unwrap();
        match &*result {
            LogicalPlan::Filter { condition, .. } => {
                assert!(Expr::same_or_equal(condition, &cond));
            }
            _ => panic!("expected Filter"),
        }
    }
}
