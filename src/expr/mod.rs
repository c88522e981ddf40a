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

//! The typed expression algebra (spec §3) and the tree substrate (spec §4.1)
//! that both expressions and plan nodes are built on.
//!
//! `Expr` is a tagged enum rather than an open trait-object hierarchy, per
//! the design note in spec §9. Trees are built from `Rc<Expr>` so that
//! `transform_down`/`transform_up` can reuse unchanged subtrees instead of
//! deep-cloning them (spec §9 "structural sharing").

pub mod eval;
pub mod rewriter;

use std::collections::HashSet;
use std::rc::Rc;

pub use rewriter::{transform_down, transform_up, try_transform_up};

use crate::common::{DataType, ExprId, ScalarValue};

pub type ExprRef = Rc<Expr>;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal {
        value: ScalarValue,
        data_type: DataType,
    },
    AttributeRef {
        name: String,
        data_type: DataType,
        nullable: bool,
        id: ExprId,
    },
    UnresolvedAttribute {
        name: String,
    },
    Star,
    Alias {
        child: ExprRef,
        name: String,
        id: ExprId,
    },
    Cast {
        child: ExprRef,
        target_type: DataType,
    },
    Not(ExprRef),
    And(ExprRef, ExprRef),
    Or(ExprRef, ExprRef),
    Eq(ExprRef, ExprRef),
    NotEq(ExprRef, ExprRef),
    Lt(ExprRef, ExprRef),
    LtEq(ExprRef, ExprRef),
    Gt(ExprRef, ExprRef),
    GtEq(ExprRef, ExprRef),
    Add(ExprRef, ExprRef),
    Subtract(ExprRef, ExprRef),
    Multiply(ExprRef, ExprRef),
    Divide(ExprRef, ExprRef),
    If {
        cond: ExprRef,
        yes: ExprRef,
        no: ExprRef,
    },
    Coalesce(Vec<ExprRef>),
    IsNull(ExprRef),
    IsNotNull(ExprRef),
}

impl Expr {
    pub fn literal(value: ScalarValue, data_type: DataType) -> ExprRef {
        Rc::new(Expr::Literal { value, data_type })
    }

    pub fn is_literal_null(&self) -> bool {
        matches!(self, Expr::Literal { value, .. } if value.is_null())
    }

    pub fn is_literal_bool(&self, b: bool) -> bool {
        matches!(self, Expr::Literal { value: ScalarValue::Boolean(v), .. } if *v == b)
    }

    pub fn children(&self) -> Vec<ExprRef> {
        match self {
            Expr::Literal { .. }
            | Expr::AttributeRef { .. }
            | Expr::UnresolvedAttribute { .. }
            | Expr::Star => vec![],
            Expr::Alias { child, .. } => vec![child.clone()],
            Expr::Cast { child, .. } => vec![child.clone()],
            Expr::Not(c) | Expr::IsNull(c) | Expr::IsNotNull(c) => vec![c.clone()],
            Expr::And(l, r)
            | Expr::Or(l, r)
            | Expr::Eq(l, r)
            | Expr::NotEq(l, r)
            | Expr::Lt(l, r)
            | Expr::LtEq(l, r)
            | Expr::Gt(l, r)
            | Expr::GtEq(l, r)
            | Expr::Add(l, r)
            | Expr::Subtract(l, r)
            | Expr::Multiply(l, r)
            | Expr::Divide(l, r) => vec![l.clone(), r.clone()],
            Expr::If { cond, yes, no } => vec![cond.clone(), yes.clone(), no.clone()],
            Expr::Coalesce(args) => args.clone(),
        }
    }

    /// Reconstructs this node with `children` standing in for the result of
    /// `self.children()`, preserving arity. Panics if the arity doesn't
    /// match; callers always derive `children` from `self.children()`.
    pub fn with_new_children(&self, children: Vec<ExprRef>) -> Expr {
        match self {
            Expr::Literal { .. }
            | Expr::AttributeRef { .. }
            | Expr::UnresolvedAttribute { .. }
            | Expr::Star => self.clone(),
            Expr::Alias { name, id, .. } => Expr::Alias {
                child: children[0].clone(),
                name: name.clone(),
                id: *id,
            },
            Expr::Cast { target_type, .. } => Expr::Cast {
                child: children[0].clone(),
                target_type: *target_type,
            },
            Expr::Not(_) => Expr::Not(children[0].clone()),
            Expr::IsNull(_) => Expr::IsNull(children[0].clone()),
            Expr::IsNotNull(_) => Expr::IsNotNull(children[0].clone()),
            Expr::And(_, _) => Expr::And(children[0].clone(), children[1].clone()),
            Expr::Or(_, _) => Expr::Or(children[0].clone(), children[1].clone()),
            Expr::Eq(_, _) => Expr::Eq(children[0].clone(), children[1].clone()),
            Expr::NotEq(_, _) => Expr::NotEq(children[0].clone(), children[1].clone()),
            Expr::Lt(_, _) => Expr::Lt(children[0].clone(), children[1].clone()),
            Expr::LtEq(_, _) => Expr::LtEq(children[0].clone(), children[1].clone()),
            Expr::Gt(_, _) => Expr::Gt(children[0].clone(), children[1].clone()),
            Expr::GtEq(_, _) => Expr::GtEq(children[0].clone(), children[1].clone()),
            Expr::Add(_, _) => Expr::Add(children[0].clone(), children[1].clone()),
            Expr::Subtract(_, _) => Expr::Subtract(children[0].clone(), children[1].clone()),
            Expr::Multiply(_, _) => Expr::Multiply(children[0].clone(), children[1].clone()),
            Expr::Divide(_, _) => Expr::Divide(children[0].clone(), children[1].clone()),
            Expr::If { .. } => Expr::If {
                cond: children[0].clone(),
                yes: children[1].clone(),
                no: children[2].clone(),
            },
            Expr::Coalesce(_) => Expr::Coalesce(children),
        }
    }

    /// The pair of operands for the eleven binary operators that are
    /// null-strict under three-valued logic (arithmetic and comparisons).
    /// `And`/`Or` are intentionally excluded: Kleene's rules let them
    /// short-circuit a null operand (`False AND NULL = False`), so treating
    /// them as generically null-strict would be unsound (spec §9 open
    /// question).
    pub fn null_strict_binary_operands(&self) -> Option<(ExprRef, ExprRef)> {
        match self {
            Expr::Eq(l, r)
            | Expr::NotEq(l, r)
            | Expr::Lt(l, r)
            | Expr::LtEq(l, r)
            | Expr::Gt(l, r)
            | Expr::GtEq(l, r)
            | Expr::Add(l, r)
            | Expr::Subtract(l, r)
            | Expr::Multiply(l, r)
            | Expr::Divide(l, r) => Some((l.clone(), r.clone())),
            _ => None,
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Expr::Literal { data_type, .. } => *data_type,
            Expr::AttributeRef { data_type, .. } => *data_type,
            Expr::Alias { child, .. } => child.data_type(),
            Expr::Cast { target_type, .. } => *target_type,
            Expr::Not(_)
            | Expr::And(_, _)
            | Expr::Or(_, _)
            | Expr::Eq(_, _)
            | Expr::NotEq(_, _)
            | Expr::Lt(_, _)
            | Expr::LtEq(_, _)
            | Expr::Gt(_, _)
            | Expr::GtEq(_, _)
            | Expr::IsNull(_)
            | Expr::IsNotNull(_) => DataType::Boolean,
            Expr::Add(l, r) | Expr::Subtract(l, r) | Expr::Multiply(l, r) | Expr::Divide(l, r) => {
                DataType::widen(l.data_type(), r.data_type())
                    .expect("arithmetic operands must share a numeric type once strictly typed")
            }
            Expr::If { yes, .. } => yes.data_type(),
            Expr::Coalesce(args) => args
                .first()
                .map(|a| a.data_type())
                .expect("Coalesce must have at least one argument"),
            Expr::UnresolvedAttribute { .. } | Expr::Star => {
                panic!("data_type() called on an unresolved expression")
            }
        }
    }

    /// A conservative (sound, not necessarily tight) estimate of whether
    /// this expression may produce null.
    pub fn nullable(&self) -> bool {
        match self {
            Expr::Literal { value, .. } => value.is_null(),
            Expr::AttributeRef { nullable, .. } => *nullable,
            Expr::Alias { child, .. } | Expr::Cast { child, .. } => child.nullable(),
            Expr::Not(c) => c.nullable(),
            Expr::And(l, r)
            | Expr::Or(l, r)
            | Expr::Eq(l, r)
            | Expr::NotEq(l, r)
            | Expr::Lt(l, r)
            | Expr::LtEq(l, r)
            | Expr::Gt(l, r)
            | Expr::GtEq(l, r)
            | Expr::Add(l, r)
            | Expr::Subtract(l, r)
            | Expr::Multiply(l, r)
            | Expr::Divide(l, r) => l.nullable() || r.nullable(),
            Expr::If { yes, no, .. } => yes.nullable() || no.nullable(),
            Expr::Coalesce(args) => args.iter().all(|a| a.nullable()),
            Expr::IsNull(_) | Expr::IsNotNull(_) => false,
            Expr::UnresolvedAttribute { .. } | Expr::Star => true,
        }
    }

    /// True iff every leaf is a literal (spec §3 "foldable").
    pub fn foldable(&self) -> bool {
        match self {
            Expr::Literal { .. } => true,
            Expr::AttributeRef { .. } | Expr::UnresolvedAttribute { .. } | Expr::Star => false,
            _ => self.children().iter().all(|c| c.foldable()),
        }
    }

    /// Set of `AttributeRef` ids this expression (and its subtree) reads.
    pub fn references(&self) -> HashSet<ExprId> {
        let mut set = HashSet::new();
        self.collect_references(&mut set);
        set
    }

    fn collect_references(&self, set: &mut HashSet<ExprId>) {
        if let Expr::AttributeRef { id, .. } = self {
            set.insert(*id);
        }
        for c in self.children() {
            c.collect_references(set);
        }
    }

    /// Whether this node's own operator signature is satisfied by its
    /// immediate children's datatypes (no recursion into grandchildren).
    fn signature_satisfied(&self) -> bool {
        match self {
            Expr::Literal { .. } | Expr::AttributeRef { .. } | Expr::Alias { .. } => true,
            Expr::UnresolvedAttribute { .. } | Expr::Star => false,
            Expr::Cast { .. } => true,
            Expr::Not(c) => c.data_type() == DataType::Boolean,
            Expr::And(l, r) | Expr::Or(l, r) => {
                l.data_type() == DataType::Boolean && r.data_type() == DataType::Boolean
            }
            Expr::Eq(l, r)
            | Expr::NotEq(l, r)
            | Expr::Lt(l, r)
            | Expr::LtEq(l, r)
            | Expr::Gt(l, r)
            | Expr::GtEq(l, r) => l.data_type() == r.data_type(),
            Expr::Add(l, r) | Expr::Subtract(l, r) | Expr::Multiply(l, r) | Expr::Divide(l, r) => {
                l.data_type().is_numeric()
                    && r.data_type().is_numeric()
                    && l.data_type() == r.data_type()
            }
            Expr::If { cond, yes, no } => {
                cond.data_type() == DataType::Boolean && yes.data_type() == no.data_type()
            }
            Expr::Coalesce(args) => args.windows(2).all(|w| w[0].data_type() == w[1].data_type()),
            Expr::IsNull(_) | Expr::IsNotNull(_) => true,
        }
    }

    /// Resolved plus every operator signature satisfied with explicit casts
    /// (spec §3 "strictly typed").
    pub fn strictly_typed(&self) -> bool {
        self.signature_satisfied() && self.children().iter().all(|c| c.strictly_typed())
    }

    /// `Alias`/`AttributeRef` -> the `AttributeRef` an output schema would
    /// carry for this projection (spec §3: `Project.output =
    /// projections.map(_.toAttribute)`). Every other variant is expected to
    /// already have been named by the producer of the unresolved plan
    /// (outside this core's scope, see DESIGN.md).
    pub fn to_attribute(&self) -> Expr {
        match self {
            Expr::AttributeRef { .. } => self.clone(),
            Expr::Alias { child, name, id } => Expr::AttributeRef {
                name: name.clone(),
                data_type: child.data_type(),
                nullable: child.nullable(),
                id: *id,
            },
            other => panic!(
                "to_attribute() requires an Alias or AttributeRef, got {other:?}"
            ),
        }
    }

    /// Structural equality modulo alias naming (spec §3 `sameOrEqual`):
    /// `Alias` wrappers are stripped throughout the tree before comparing.
    pub fn same_or_equal(a: &ExprRef, b: &ExprRef) -> bool {
        strip_aliases(a) == strip_aliases(b)
    }
}

fn strip_aliases(expr: &ExprRef) -> ExprRef {
    transform_up(expr, &mut |e| match &*e {
        Expr::Alias { child, .. } => child.clone(),
        _ => e,
    })
}
