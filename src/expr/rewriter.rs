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

//! `transformDown`/`transformUp` over expression trees (spec §4.1).
//!
//! Both preserve structural sharing: when `f` and the recursive rewrite of
//! the children leave a node unchanged, the original `Rc` is returned rather
//! than an equal clone, so a no-op pass is a reference-equality fast path
//! for the rules executor's fixed-point check.

use std::rc::Rc;

use super::{Expr, ExprRef};
use crate::error::PlanResult;

/// `f` is applied to the current node first; the result's children are then
/// recursed into. A rewriter that doesn't match a node should return it
/// unchanged (spec §4.1 "Partial rewriters").
pub fn transform_down(expr: &ExprRef, f: &mut impl FnMut(ExprRef) -> ExprRef) -> ExprRef {
    let rewritten = f(expr.clone());
    let children = rewritten.children();
    let new_children: Vec<ExprRef> = children.iter().map(|c| transform_down(c, f)).collect();
    rebuild(&rewritten, children, new_children)
}

/// Children are recursed into first; `f` is then applied to the
/// reconstructed node.
pub fn transform_up(expr: &ExprRef, f: &mut impl FnMut(ExprRef) -> ExprRef) -> ExprRef {
    let children = expr.children();
    let new_children: Vec<ExprRef> = children.iter().map(|c| transform_up(c, f)).collect();
    let rebuilt = rebuild(expr, children, new_children);
    f(rebuilt)
}

fn rebuild(node: &ExprRef, old_children: Vec<ExprRef>, new_children: Vec<ExprRef>) -> ExprRef {
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

/// Rewrites every `Expr` reachable from `exprs`, used by plan rules that
/// operate on a node's whole projection/condition list at once.
pub fn transform_exprs_down(
    exprs: &[ExprRef],
    f: &mut impl FnMut(ExprRef) -> ExprRef,
) -> Vec<ExprRef> {
    exprs.iter().map(|e| transform_down(e, f)).collect()
}

/// Fallible `transform_up`, for rewrites that can fail partway through a tree
/// (name resolution, cast insertion). Children are visited bottom-up; the
/// first error aborts the walk.
pub fn try_transform_up(
    expr: &ExprRef,
    f: &mut impl FnMut(ExprRef) -> PlanResult<ExprRef>,
) -> PlanResult<ExprRef> {
    let children = expr.children();
    let mut new_children = Vec::with_capacity(children.len());
    for c in &children {
        new_children.push(try_transform_up(c, f)?);
    }
    let rebuilt = rebuild(expr, children, new_children);
    f(rebuilt)
}
