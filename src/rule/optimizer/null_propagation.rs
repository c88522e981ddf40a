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

//! Propagates null literals and non-nullable guarantees through expressions
//! (spec §4.4 NullPropagation). The null-strict binary case is restricted to
//! the operators `Expr::null_strict_binary_operands` names — arithmetic and
//! comparisons, not `And`/`Or` — per the Kleene open question in spec §9.
//!
//! The spec's abstract rewrite for a null-strict binary op is
//! `Cast(Null, operator.dataType)`; here a null literal already carries its
//! declared `dataType` as a struct field rather than deriving it from the
//! `Cast` wrapper, so the equivalent concrete rewrite is simply a `Null`
//! literal typed at the operator's `dataType` — no `Cast` node is needed.

use crate::common::ScalarValue;
use crate::error::PlanResult;
use crate::expr::Expr;
use crate::plan::LogicalPlanRef;
use crate::rule::optimizer::rewrite_exprs_down;
use crate::rule::{Rule, RuleContext};

pub struct NullPropagation;

impl NullPropagation {
    pub fn create() -> Box<dyn Rule> {
        Box::new(Self)
    }
}

impl Rule for NullPropagation {
    fn name(&self) -> &'static str {
        "NullPropagation"
    }

    fn apply(&self, plan: &LogicalPlanRef, _ctx: &RuleContext) -> PlanResult<LogicalPlanRef> {
        Ok(rewrite_exprs_down(plan, &mut |e| {
            if let Some((l, r)) = e.null_strict_binary_operands() {
                if l.is_literal_null() || r.is_literal_null() {
                    return Expr::literal(ScalarValue::Null, e.data_type());
                }
            }
            match &*e {
                Expr::IsNull(c) if !c.nullable() => {
                    Expr::literal(ScalarValue::Boolean(false), crate::common::DataType::Boolean)
                }
                Expr::IsNotNull(c) if !c.nullable() => {
                    Expr::literal(ScalarValue::Boolean(true), crate::common::DataType::Boolean)
                }
                Expr::Coalesce(args) if args.len() == 1 && args[0].is_literal_null() => {
                    Expr::literal(ScalarValue::Null, e.data_type())
                }
                Expr::Coalesce(args) if args.len() == 1 && !args[0].nullable() => args[0].clone(),
                _ => e,
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::common::{CompileContext, DataType, ExprId, PlanNodeId};
    use crate::plan::LogicalPlan;

    fn non_nullable_attr() -> crate::expr::ExprRef {
        Rc::new(Expr::AttributeRef {
            name: "a".into(),
            data_type: DataType::Int32,
            nullable: false,
            id: ExprId(0),
        })
    }

    fn ctx(compile: &CompileContext) -> RuleContext {
        RuleContext { compile, catalog: None }
    }

    #[test]
    fn is_null_on_non_nullable_attribute_folds_to_false() {
        let r = Rc::new(LogicalPlan::Relation { id: PlanNodeId(0), output: vec![non_nullable_attr()] });
        let cond = Rc::new(Expr::IsNull(non_nullable_attr()));
        let filter = Rc::new(LogicalPlan::Filter { child: r, condition: cond });
        let compile = CompileContext::new();
        let result = NullPropagation.apply(&filter, &ctx(&compile)).unwrap();
        match &*result {
            LogicalPlan::Filter { condition, .. } => assert!(condition.is_literal_bool(false)),
            _ => panic!("expected Filter"),
        }
    }

    #[test]
    fn null_strict_binary_op_with_null_literal_becomes_typed_null() {
        let r = Rc::new(LogicalPlan::Relation { id: PlanNodeId(0), output: vec![non_nullable_attr()] });
        let null_lit = Rc::new(Expr::Literal {
            value: crate::common::ScalarValue::Null,
            data_type: DataType::Int32,
        });
        let cond = Rc::new(Expr::Eq(non_nullable_attr(), null_lit));
        let filter = Rc::new(LogicalPlan::Filter { child: r, condition: cond });
        let compile = CompileContext::new();
        let result = NullPropagation.apply(&filter, &ctx(&compile)).unwrap();
        match &*result {
            LogicalPlan::Filter { condition, .. } => assert!(condition.is_literal_null()),
            _ => panic!("expected Filter"),
        }
    }
}
