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

//! Inserts `Cast` nodes so every operator's signature is satisfied by its
//! children's concrete datatypes (spec §4.3 ApplyImplicitCasts), via the
//! numeric widening lattice in [`crate::common::types`]. Runs bottom-up so a
//! parent sees its children's already-inserted casts.

use std::rc::Rc;

use crate::common::DataType;
use crate::error::{PlanError, PlanResult};
use crate::expr::{try_transform_up, Expr, ExprRef};
use crate::plan::{try_transform_expressions_up, try_transform_up as try_transform_plan_up, LogicalPlanRef};
use crate::rule::{Rule, RuleContext};

pub struct ApplyImplicitCasts;

impl ApplyImplicitCasts {
    pub fn create() -> Box<dyn Rule> {
        Box::new(Self)
    }
}

impl Rule for ApplyImplicitCasts {
    fn name(&self) -> &'static str {
        "ApplyImplicitCasts"
    }

    fn apply(&self, plan: &LogicalPlanRef, _ctx: &RuleContext) -> PlanResult<LogicalPlanRef> {
        try_transform_plan_up(plan, &mut |node| {
            if !node.resolved() {
                return Ok(node);
            }
            let node_for_errors = node.clone();
            try_transform_expressions_up(&node, &mut |e| {
                try_transform_up(&e, &mut |inner| cast_node(inner, &node_for_errors))
            })
        })
    }
}

fn cast_node(e: ExprRef, node: &LogicalPlanRef) -> PlanResult<ExprRef> {
    match &*e {
        Expr::Not(c) => {
            let c2 = cast_to(c, DataType::Boolean, node)?;
            Ok(if Rc::ptr_eq(&c2, c) {
                e
            } else {
                Rc::new(Expr::Not(c2))
            })
        }
        Expr::And(l, r) => rebuild_bool_binary(&e, l, r, node, |l, r| Expr::And(l, r)),
        Expr::Or(l, r) => rebuild_bool_binary(&e, l, r, node, |l, r| Expr::Or(l, r)),
        Expr::Eq(l, r) => rebuild_widened_binary(&e, l, r, node, |l, r| Expr::Eq(l, r)),
        Expr::NotEq(l, r) => rebuild_widened_binary(&e, l, r, node, |l, r| Expr::NotEq(l, r)),
        Expr::Lt(l, r) => rebuild_widened_binary(&e, l, r, node, |l, r| Expr::Lt(l, r)),
        Expr::LtEq(l, r) => rebuild_widened_binary(&e, l, r, node, |l, r| Expr::LtEq(l, r)),
        Expr::Gt(l, r) => rebuild_widened_binary(&e, l, r, node, |l, r| Expr::Gt(l, r)),
        Expr::GtEq(l, r) => rebuild_widened_binary(&e, l, r, node, |l, r| Expr::GtEq(l, r)),
        Expr::Add(l, r) => rebuild_numeric_binary(&e, l, r, node, |l, r| Expr::Add(l, r)),
        Expr::Subtract(l, r) => rebuild_numeric_binary(&e, l, r, node, |l, r| Expr::Subtract(l, r)),
        Expr::Multiply(l, r) => rebuild_numeric_binary(&e, l, r, node, |l, r| Expr::Multiply(l, r)),
        Expr::Divide(l, r) => rebuild_numeric_binary(&e, l, r, node, |l, r| Expr::Divide(l, r)),
        Expr::If { cond, yes, no } => {
            let cond2 = cast_to(cond, DataType::Boolean, node)?;
            let target = DataType::widen(yes.data_type(), no.data_type()).ok_or_else(|| {
                type_error(&e, "If branches have incompatible types", node)
            })?;
            let yes2 = cast_to(yes, target, node)?;
            let no2 = cast_to(no, target, node)?;
            if Rc::ptr_eq(&cond2, cond) && Rc::ptr_eq(&yes2, yes) && Rc::ptr_eq(&no2, no) {
                Ok(e)
            } else {
                Ok(Rc::new(Expr::If {
                    cond: cond2,
                    yes: yes2,
                    no: no2,
                }))
            }
        }
        Expr::Coalesce(args) if args.len() > 1 => {
            let target = args
                .iter()
                .skip(1)
                .try_fold(args[0].data_type(), |acc, a| DataType::widen(acc, a.data_type()))
                .ok_or_else(|| type_error(&e, "Coalesce arguments have incompatible types", node))?;
            let mut changed = false;
            let mut new_args = Vec::with_capacity(args.len());
            for a in args {
                let a2 = cast_to(a, target, node)?;
                changed |= !Rc::ptr_eq(&a2, a);
                new_args.push(a2);
            }
            Ok(if changed { Rc::new(Expr::Coalesce(new_args)) } else { e })
        }
        _ => Ok(e),
    }
}

fn rebuild_bool_binary(
    e: &ExprRef,
    l: &ExprRef,
    r: &ExprRef,
    node: &LogicalPlanRef,
    ctor: impl Fn(ExprRef, ExprRef) -> Expr,
) -> PlanResult<ExprRef> {
    let l2 = cast_to(l, DataType::Boolean, node)?;
    let r2 = cast_to(r, DataType::Boolean, node)?;
    Ok(if Rc::ptr_eq(&l2, l) && Rc::ptr_eq(&r2, r) {
        e.clone()
    } else {
        Rc::new(ctor(l2, r2))
    })
}

fn rebuild_widened_binary(
    e: &ExprRef,
    l: &ExprRef,
    r: &ExprRef,
    node: &LogicalPlanRef,
    ctor: impl Fn(ExprRef, ExprRef) -> Expr,
) -> PlanResult<ExprRef> {
    let target = DataType::widen(l.data_type(), r.data_type())
        .ok_or_else(|| type_error(e, "operands have incompatible types", node))?;
    let l2 = cast_to(l, target, node)?;
    let r2 = cast_to(r, target, node)?;
    Ok(if Rc::ptr_eq(&l2, l) && Rc::ptr_eq(&r2, r) {
        e.clone()
    } else {
        Rc::new(ctor(l2, r2))
    })
}

fn rebuild_numeric_binary(
    e: &ExprRef,
    l: &ExprRef,
    r: &ExprRef,
    node: &LogicalPlanRef,
    ctor: impl Fn(ExprRef, ExprRef) -> Expr,
) -> PlanResult<ExprRef> {
    if !l.data_type().is_numeric() || !r.data_type().is_numeric() {
        return Err(type_error(e, "arithmetic operands must be numeric", node));
    }
    rebuild_widened_binary(e, l, r, node, ctor)
}

fn cast_to(e: &ExprRef, target: DataType, node: &LogicalPlanRef) -> PlanResult<ExprRef> {
    if e.data_type() == target {
        return Ok(e.clone());
    }
    if !e.data_type().can_implicit_cast_to(target) {
        return Err(type_error(
            e,
            &format!("cannot implicitly cast {} to {target}", e.data_type()),
            node,
        ));
    }
    Ok(Rc::new(Expr::Cast {
        child: e.clone(),
        target_type: target,
    }))
}

fn type_error(e: &ExprRef, reason: &str, node: &LogicalPlanRef) -> PlanError {
    PlanError::type_check_failure(format!("{e:?}"), reason, node.pretty_tree())
}
