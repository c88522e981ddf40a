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

//! Evaluation of `foldable` expressions (spec §3 `evaluated`), used by the
//! `FoldConstants` optimizer rule. Implements three-valued (Kleene) logic
//! for comparisons and `And`/`Or`, matching spec §3's invariant.

use std::cmp::Ordering;

use super::Expr;
use crate::common::{DataType, ScalarValue};

/// Evaluates `expr`, which must be `foldable` (all leaves literal).
pub fn evaluate(expr: &Expr) -> ScalarValue {
    match expr {
        Expr::Literal { value, .. } => value.clone(),
        Expr::Alias { child, .. } => evaluate(child),
        Expr::Cast { child, target_type } => evaluate(child).cast_to(*target_type),
        Expr::Not(c) => match to_bool3(&evaluate(c)) {
            Some(b) => ScalarValue::Boolean(!b),
            None => ScalarValue::Null,
        },
        Expr::And(l, r) => kleene_and(evaluate(l), evaluate(r)),
        Expr::Or(l, r) => kleene_or(evaluate(l), evaluate(r)),
        Expr::Eq(l, r) => eval_eq(evaluate(l), evaluate(r), false),
        Expr::NotEq(l, r) => eval_eq(evaluate(l), evaluate(r), true),
        Expr::Lt(l, r) => eval_cmp(evaluate(l), evaluate(r), |o| o == Ordering::Less),
        Expr::LtEq(l, r) => eval_cmp(evaluate(l), evaluate(r), |o| o != Ordering::Greater),
        Expr::Gt(l, r) => eval_cmp(evaluate(l), evaluate(r), |o| o == Ordering::Greater),
        Expr::GtEq(l, r) => eval_cmp(evaluate(l), evaluate(r), |o| o != Ordering::Less),
        Expr::Add(l, r) => eval_arith(evaluate(l), evaluate(r), expr.data_type(), |a, b| a + b),
        Expr::Subtract(l, r) => eval_arith(evaluate(l), evaluate(r), expr.data_type(), |a, b| a - b),
        Expr::Multiply(l, r) => eval_arith(evaluate(l), evaluate(r), expr.data_type(), |a, b| a * b),
        Expr::Divide(l, r) => eval_arith(evaluate(l), evaluate(r), expr.data_type(), |a, b| a / b),
        // `CASE WHEN cond THEN yes ELSE no END` semantics: an unknown (null)
        // condition takes the else branch, it does not propagate as null.
        Expr::If { cond, yes, no } => match to_bool3(&evaluate(cond)) {
            Some(true) => evaluate(yes),
            _ => evaluate(no),
        },
        Expr::Coalesce(args) => args
            .iter()
            .map(|a| evaluate(a))
            .find(|v| !v.is_null())
            .unwrap_or(ScalarValue::Null),
        Expr::IsNull(c) => ScalarValue::Boolean(evaluate(c).is_null()),
        Expr::IsNotNull(c) => ScalarValue::Boolean(!evaluate(c).is_null()),
        Expr::AttributeRef { .. } | Expr::UnresolvedAttribute { .. } | Expr::Star => {
            unreachable!("evaluate() called on a non-foldable expression")
        }
    }
}

fn to_bool3(v: &ScalarValue) -> Option<bool> {
    if v.is_null() {
        None
    } else {
        v.as_bool()
    }
}

fn from_bool3(v: Option<bool>) -> ScalarValue {
    match v {
        Some(b) => ScalarValue::Boolean(b),
        None => ScalarValue::Null,
    }
}

fn kleene_and(a: ScalarValue, b: ScalarValue) -> ScalarValue {
    let (a, b) = (to_bool3(&a), to_bool3(&b));
    from_bool3(match (a, b) {
        (Some(false), _) | (_, Some(false)) => Some(false),
        (Some(true), Some(true)) => Some(true),
        _ => None,
    })
}

fn kleene_or(a: ScalarValue, b: ScalarValue) -> ScalarValue {
    let (a, b) = (to_bool3(&a), to_bool3(&b));
    from_bool3(match (a, b) {
        (Some(true), _) | (_, Some(true)) => Some(true),
        (Some(false), Some(false)) => Some(false),
        _ => None,
    })
}

fn eval_eq(l: ScalarValue, r: ScalarValue, negate: bool) -> ScalarValue {
    if l.is_null() || r.is_null() {
        return ScalarValue::Null;
    }
    let eq = l == r;
    ScalarValue::Boolean(if negate { !eq } else { eq })
}

fn eval_cmp(l: ScalarValue, r: ScalarValue, f: impl Fn(Ordering) -> bool) -> ScalarValue {
    if l.is_null() || r.is_null() {
        return ScalarValue::Null;
    }
    match compare_values(&l, &r) {
        Some(ord) => ScalarValue::Boolean(f(ord)),
        None => ScalarValue::Null,
    }
}

fn compare_values(l: &ScalarValue, r: &ScalarValue) -> Option<Ordering> {
    match (l, r) {
        (ScalarValue::Int32(a), ScalarValue::Int32(b)) => a.partial_cmp(b),
        (ScalarValue::Int64(a), ScalarValue::Int64(b)) => a.partial_cmp(b),
        (ScalarValue::Float64(a), ScalarValue::Float64(b)) => a.partial_cmp(b),
        (ScalarValue::Boolean(a), ScalarValue::Boolean(b)) => a.partial_cmp(b),
        (ScalarValue::Varchar(a), ScalarValue::Varchar(b)) => a.partial_cmp(b),
        _ => None,
    }
}

fn eval_arith(l: ScalarValue, r: ScalarValue, data_type: DataType, f: impl Fn(f64, f64) -> f64) -> ScalarValue {
    if l.is_null() || r.is_null() {
        return ScalarValue::Null;
    }
    let result = f(
        l.as_f64().expect("arithmetic operand must be numeric"),
        r.as_f64().expect("arithmetic operand must be numeric"),
    );
    match data_type {
        DataType::Int32 => ScalarValue::Int32(result as i32),
        DataType::Int64 => ScalarValue::Int64(result as i64),
        DataType::Float64 => ScalarValue::Float64(result),
        _ => unreachable!("arithmetic result type must be numeric"),
    }
}
