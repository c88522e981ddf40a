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

//! `transformDown`/`transformUp` over plan trees, and
//! `transformExpressionsDown/Up` which rewrite every expression field of a
//! node while leaving its plan children untouched (spec §4.1).

use std::rc::Rc;

use super::{LogicalPlan, LogicalPlanRef};
use crate::error::PlanResult;
use crate::expr::{self, ExprRef};

pub fn transform_down(
    plan: &LogicalPlanRef,
    f: &mut impl FnMut(LogicalPlanRef) -> LogicalPlanRef,
) -> LogicalPlanRef {
    let rewritten = f(plan.clone());
    let children = rewritten.children();
    let new_children: Vec<LogicalPlanRef> =
        children.iter().map(|c| transform_down(c, f)).collect();
    rebuild(&rewritten, children, new_children)
}

pub fn transform_up(
    plan: &LogicalPlanRef,
    f: &mut impl FnMut(LogicalPlanRef) -> LogicalPlanRef,
) -> LogicalPlanRef {
    let children = plan.children();
    let new_children: Vec<LogicalPlanRef> = children.iter().map(|c| transform_up(c, f)).collect();
    let rebuilt = rebuild(plan, children, new_children);
    f(rebuilt)
}

fn rebuild(
    node: &LogicalPlanRef,
    old_children: Vec<LogicalPlanRef>,
    new_children: Vec<LogicalPlanRef>,
) -> LogicalPlanRef {
    let unchanged = old_children
        .iter()
        .zip(new_children.iter())
        .all(|(o, n)| Rc::ptr_eq(o, n));
    if unchanged {
        node.clone()
    } else {
        Rc::new(node.with_new_children(new_children))
    }
}

/// Applies an expression-level `transform_down` to every expression field of
/// `plan`'s own node, leaving `plan`'s plan children untouched.
pub fn transform_expressions_down(
    plan: &LogicalPlanRef,
    f: &mut impl FnMut(ExprRef) -> ExprRef,
) -> LogicalPlanRef {
    rewrite_own_exprs(plan, |e| expr::transform_down(&e, f))
}

/// As above, but expression-level `transform_up`.
pub fn transform_expressions_up(
    plan: &LogicalPlanRef,
    f: &mut impl FnMut(ExprRef) -> ExprRef,
) -> LogicalPlanRef {
    rewrite_own_exprs(plan, |e| expr::transform_up(&e, f))
}

/// Fallible `transform_down`, for Analyzer rules that can fail partway
/// through a tree (catalog lookups, name resolution).
pub fn try_transform_down(
    plan: &LogicalPlanRef,
    f: &mut impl FnMut(LogicalPlanRef) -> PlanResult<LogicalPlanRef>,
) -> PlanResult<LogicalPlanRef> {
    let rewritten = f(plan.clone())?;
    let children = rewritten.children();
    let mut new_children = Vec::with_capacity(children.len());
    for c in &children {
        new_children.push(try_transform_down(c, f)?);
    }
    Ok(rebuild(&rewritten, children, new_children))
}

/// Fallible `transform_up` counterpart to [`try_transform_down`].
pub fn try_transform_up(
    plan: &LogicalPlanRef,
    f: &mut impl FnMut(LogicalPlanRef) -> PlanResult<LogicalPlanRef>,
) -> PlanResult<LogicalPlanRef> {
    let children = plan.children();
    let mut new_children = Vec::with_capacity(children.len());
    for c in &children {
        new_children.push(try_transform_up(c, f)?);
    }
    let rebuilt = rebuild(plan, children, new_children);
    f(rebuilt)
}

/// Fallible counterpart to [`transform_expressions_up`], used where
/// expression-level rewriting can fail (e.g. `ResolveReferences`,
/// `ApplyImplicitCasts`).
pub fn try_transform_expressions_up(
    plan: &LogicalPlanRef,
    f: &mut impl FnMut(ExprRef) -> PlanResult<ExprRef>,
) -> PlanResult<LogicalPlanRef> {
    let old_exprs = plan.own_exprs();
    let mut new_exprs = Vec::with_capacity(old_exprs.len());
    for e in &old_exprs {
        new_exprs.push(expr::try_transform_up(e, f)?);
    }
    let unchanged = old_exprs
        .iter()
        .zip(new_exprs.iter())
        .all(|(o, n)| Rc::ptr_eq(o, n));
    if unchanged {
        Ok(plan.clone())
    } else {
        Ok(Rc::new(plan.with_new_exprs(new_exprs)))
    }
}

fn rewrite_own_exprs(
    plan: &LogicalPlanRef,
    mut f: impl FnMut(ExprRef) -> ExprRef,
) -> LogicalPlanRef {
    let old_exprs = plan.own_exprs();
    let new_exprs: Vec<ExprRef> = old_exprs.iter().map(|e| f(e.clone())).collect();
    let unchanged = old_exprs
        .iter()
        .zip(new_exprs.iter())
        .all(|(o, n)| Rc::ptr_eq(o, n));
    if unchanged {
        plan.clone()
    } else {
        Rc::new(plan.with_new_exprs(new_exprs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{DataType, ExprId, PlanNodeId, ScalarValue};
    use crate::expr::Expr;
    use crate::plan::LogicalPlan;

    #[test]
    fn transform_down_is_a_no_op_fast_path() {
        let rel = Rc::new(LogicalPlan::Relation {
            id: PlanNodeId(0),
            output: vec![Rc::new(Expr::AttributeRef {
                name: "a".into(),
                data_type: DataType::Int32,
                nullable: false,
                id: ExprId(0),
            })],
        });
        let out = transform_down(&rel, &mut |p| p);
        assert!(Rc::ptr_eq(&rel, &out));
    }

    #[test]
    fn transform_expressions_down_leaves_children_untouched() {
        let rel = Rc::new(LogicalPlan::Relation {
            id: PlanNodeId(0),
            output: vec![Rc::new(Expr::AttributeRef {
                name: "a".into(),
                data_type: DataType::Int32,
                nullable: true,
                id: ExprId(0),
            })],
        });
        let cond = Rc::new(Expr::Literal {
            value: ScalarValue::Boolean(true),
            data_type: DataType::Boolean,
        });
        let filter = Rc::new(LogicalPlan::Filter {
            child: rel.clone(),
            condition: cond,
        });
        let rewritten = transform_expressions_down(&filter, &mut |e| match &*e {
            Expr::Literal {
                value: ScalarValue::Boolean(true),
                ..
            } => Rc::new(Expr::Literal {
                value: ScalarValue::Boolean(false),
                data_type: DataType::Boolean,
            }),
            _ => e,
        });
        match &*rewritten {
            LogicalPlan::Filter { child, condition } => {
                assert!(Rc::ptr_eq(child, &rel));
                assert!(condition.is_literal_bool(false));
            }
            _ => panic!("expected Filter"),
        }
    }
}
