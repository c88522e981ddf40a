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

//! Boolean-algebra identities on folded literals (spec §4.4
//! FoldLogicalPredicates): `True`/`False` absorption over `And`/`Or`,
//! duplicate-operand collapse, and `If` with a literal condition.

use crate::common::{DataType, ScalarValue};
use crate::error::PlanResult;
use crate::expr::Expr;
use crate::plan::LogicalPlanRef;
use crate::rule::optimizer::rewrite_exprs_down;
use crate::rule::{Rule, RuleContext};

pub struct FoldLogicalPredicates;

impl FoldLogicalPredicates {
    pub fn create() -> Box<dyn Rule> {
        Box::new(Self)
    }
}

impl Rule for FoldLogicalPredicates {
    fn name(&self) -> &'static str {
        "FoldLogicalPredicates"
    }

    fn apply(&self, plan: &LogicalPlanRef, _ctx: &RuleContext) -> PlanResult<LogicalPlanRef> {
        Ok(rewrite_exprs_down(plan, &mut |e| match &*e {
            Expr::Or(l, r) if l.is_literal_bool(true) || r.is_literal_bool(true) => {
                Expr::literal(ScalarValue::Boolean(true), DataType::Boolean)
            }
            Expr::And(l, r) if l.is_literal_bool(false) || r.is_literal_bool(false) => {
                Expr::literal(ScalarValue::Boolean(false), DataType::Boolean)
            }
            Expr::And(a, b) if Expr::same_or_equal(a, b) => a.clone(),
            Expr::Or(a, b) if Expr::same_or_equal(a, b) => a.clone(),
            Expr::If { cond, yes, .. } if cond.is_literal_bool(true) => yes.clone(),
            Expr::If { cond, no, .. } if cond.is_literal_bool(false) => no.clone(),
            _ => e,
        }))
    }
}
