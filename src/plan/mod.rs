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

//! The relational operator algebra (spec §3) built on the same tagged-enum,
//! `Rc`-sharing tree substrate as [`crate::expr`].

pub mod pretty;
pub mod transform;

use std::collections::HashSet;
use std::rc::Rc;

pub use transform::{
    transform_down, transform_expressions_down, transform_expressions_up, transform_up,
    try_transform_down, try_transform_expressions_up, try_transform_up,
};

use crate::common::{ExprId, PlanNodeId, ScalarValue};
use crate::expr::{Expr, ExprRef};

pub type LogicalPlanRef = Rc<LogicalPlan>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    LeftOuter,
    RightOuter,
    FullOuter,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogicalPlan {
    UnresolvedRelation {
        name: String,
    },
    Relation {
        id: PlanNodeId,
        output: Vec<ExprRef>,
    },
    LocalRelation {
        output: Vec<ExprRef>,
        rows: Vec<Vec<ScalarValue>>,
    },
    Project {
        child: LogicalPlanRef,
        projections: Vec<ExprRef>,
    },
    Filter {
        child: LogicalPlanRef,
        condition: ExprRef,
    },
    Join {
        left: LogicalPlanRef,
        right: LogicalPlanRef,
        join_type: JoinType,
        condition: Option<ExprRef>,
    },
    Limit {
        child: LogicalPlanRef,
        count: ExprRef,
    },
    Subquery {
        child: LogicalPlanRef,
        alias: String,
    },
}

impl LogicalPlan {
    pub fn children(&self) -> Vec<LogicalPlanRef> {
        match self {
            LogicalPlan::UnresolvedRelation { .. }
            | LogicalPlan::Relation { .. }
            | LogicalPlan::LocalRelation { .. } => vec![],
            LogicalPlan::Project { child, .. }
            | LogicalPlan::Filter { child, .. }
            | LogicalPlan::Limit { child, .. }
            | LogicalPlan::Subquery { child, .. } => vec![child.clone()],
            LogicalPlan::Join { left, right, .. } => vec![left.clone(), right.clone()],
        }
    }

    /// Reconstructs this node with `children` standing in for
    /// `self.children()`, preserving arity.
    pub fn with_new_children(&self, children: Vec<LogicalPlanRef>) -> LogicalPlan {
        match self {
            LogicalPlan::UnresolvedRelation { .. }
            | LogicalPlan::Relation { .. }
            | LogicalPlan::LocalRelation { .. } => self.clone(),
            LogicalPlan::Project { projections, .. } => LogicalPlan::Project {
                child: children[0].clone(),
                projections: projections.clone(),
            },
            LogicalPlan::Filter { condition, .. } => LogicalPlan::Filter {
                child: children[0].clone(),
                condition: condition.clone(),
            },
            LogicalPlan::Limit { count, .. } => LogicalPlan::Limit {
                child: children[0].clone(),
                count: count.clone(),
            },
            LogicalPlan::Subquery { alias, .. } => LogicalPlan::Subquery {
                child: children[0].clone(),
                alias: alias.clone(),
            },
            LogicalPlan::Join {
                join_type,
                condition,
                ..
            } => LogicalPlan::Join {
                left: children[0].clone(),
                right: children[1].clone(),
                join_type: *join_type,
                condition: condition.clone(),
            },
        }
    }

    /// This node's own expression fields (not the children's), used by
    /// `resolved`/`strictly_typed`/`references` and by
    /// `transform_expressions_down/up`.
    pub fn own_exprs(&self) -> Vec<ExprRef> {
        match self {
            LogicalPlan::UnresolvedRelation { .. }
            | LogicalPlan::Relation { .. }
            | LogicalPlan::LocalRelation { .. }
            | LogicalPlan::Subquery { .. } => vec![],
            LogicalPlan::Project { projections, .. } => projections.clone(),
            LogicalPlan::Filter { condition, .. } => vec![condition.clone()],
            LogicalPlan::Limit { count, .. } => vec![count.clone()],
            LogicalPlan::Join { condition, .. } => condition.iter().cloned().collect(),
        }
    }

    /// Rebuilds this node from a new list of own-expression fields, in the
    /// same order `own_exprs()` returned them.
    pub fn with_new_exprs(&self, exprs: Vec<ExprRef>) -> LogicalPlan {
        match self {
            LogicalPlan::UnresolvedRelation { .. }
            | LogicalPlan::Relation { .. }
            | LogicalPlan::LocalRelation { .. }
            | LogicalPlan::Subquery { .. } => self.clone(),
            LogicalPlan::Project { child, .. } => LogicalPlan::Project {
                child: child.clone(),
                projections: exprs,
            },
            LogicalPlan::Filter { child, .. } => LogicalPlan::Filter {
                child: child.clone(),
                condition: exprs.into_iter().next().expect("Filter has one condition"),
            },
            LogicalPlan::Limit { child, .. } => LogicalPlan::Limit {
                child: child.clone(),
                count: exprs.into_iter().next().expect("Limit has one count expr"),
            },
            LogicalPlan::Join {
                left,
                right,
                join_type,
                ..
            } => LogicalPlan::Join {
                left: left.clone(),
                right: right.clone(),
                join_type: *join_type,
                condition: exprs.into_iter().next(),
            },
        }
    }

    /// Ordered attribute list this node produces (spec §3 `output`).
    pub fn output(&self) -> Vec<ExprRef> {
        match self {
            LogicalPlan::UnresolvedRelation { name } => {
                panic!("output() called on unresolved relation `{name}`")
            }
            LogicalPlan::Relation { output, .. } | LogicalPlan::LocalRelation { output, .. } => {
                output.clone()
            }
            LogicalPlan::Project { projections, .. } => projections
                .iter()
                .map(|p| Rc::new(p.to_attribute()))
                .collect(),
            LogicalPlan::Filter { child, .. } => child.output(),
            LogicalPlan::Limit { child, .. } => child.output(),
            LogicalPlan::Subquery { child, .. } => child.output(),
            LogicalPlan::Join {
                left,
                right,
                join_type,
                ..
            } => {
                let left_nullable = matches!(join_type, JoinType::RightOuter | JoinType::FullOuter);
                let right_nullable = matches!(join_type, JoinType::LeftOuter | JoinType::FullOuter);
                left.output()
                    .into_iter()
                    .map(|a| force_nullable(&a, left_nullable))
                    .chain(
                        right
                            .output()
                            .into_iter()
                            .map(|a| force_nullable(&a, right_nullable)),
                    )
                    .collect()
            }
        }
    }

    /// Attribute ids this node's own expressions read (not the transitive
    /// references of its children), used to partition a predicate against a
    /// `Join`'s two sides (spec §4.4 `PushFiltersThroughJoins`).
    pub fn references(&self) -> HashSet<ExprId> {
        let mut set = HashSet::new();
        for e in self.own_exprs() {
            set.extend(e.references());
        }
        set
    }

    fn is_self_resolved(&self) -> bool {
        match self {
            LogicalPlan::UnresolvedRelation { .. } => false,
            LogicalPlan::Relation { .. } | LogicalPlan::LocalRelation { .. } => true,
            LogicalPlan::Subquery { .. } => true,
            _ => self.own_exprs().iter().all(|e| expr_resolved(e)),
        }
    }

    /// No `Unresolved*`/`Star` remains in this node or any descendant
    /// (spec §3 `resolved`).
    pub fn resolved(&self) -> bool {
        self.is_self_resolved() && self.children().iter().all(|c| c.resolved())
    }

    /// Resolved plus every contained expression strictly typed (spec §3
    /// `strictlyTyped`).
    pub fn strictly_typed(&self) -> bool {
        self.resolved()
            && self.own_exprs().iter().all(|e| e.strictly_typed())
            && self.children().iter().all(|c| c.strictly_typed())
    }
}

fn expr_resolved(e: &ExprRef) -> bool {
    match &**e {
        Expr::UnresolvedAttribute { .. } | Expr::Star => false,
        _ => e.children().iter().all(|c| expr_resolved(c)),
    }
}

fn force_nullable(attr: &ExprRef, nullable: bool) -> ExprRef {
    if !nullable {
        return attr.clone();
    }
    match &**attr {
        Expr::AttributeRef {
            name,
            data_type,
            id,
            ..
        } => Rc::new(Expr::AttributeRef {
            name: name.clone(),
            data_type: *data_type,
            nullable: true,
            id: *id,
        }),
        other => panic!("join output attribute must be an AttributeRef, got {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{DataType, PlanNodeId};

    fn rel(names: &[&str]) -> LogicalPlanRef {
        let output = names
            .iter()
            .enumerate()
            .map(|(i, n)| {
                Rc::new(Expr::AttributeRef {
                    name: n.to_string(),
                    data_type: DataType::Int32,
                    nullable: false,
                    id: ExprId(i as u64),
                })
            })
            .collect();
        Rc::new(LogicalPlan::Relation {
            id: PlanNodeId(0),
            output,
        })
    }

    #[test]
    fn filter_output_equals_child_output() {
        let r = rel(&["a", "b"]);
        let cond = Rc::new(Expr::Literal {
            value: ScalarValue::Boolean(true),
            data_type: DataType::Boolean,
        });
        let filter = LogicalPlan::Filter {
            child: r.clone(),
            condition: cond,
        };
        assert_eq!(filter.output(), r.output());
    }

    #[test]
    fn inner_join_output_concatenates_without_forcing_nullability() {
        let l = rel(&["a"]);
        let r = rel(&["b"]);
        let join = LogicalPlan::Join {
            left: l.clone(),
            right: r.clone(),
            join_type: JoinType::Inner,
            condition: None,
        };
        let out = join.output();
        assert_eq!(out.len(), 2);
        assert!(!out[0].nullable());
        assert!(!out[1].nullable());
    }

    #[test]
    fn left_outer_join_forces_right_side_nullable() {
        let l = rel(&["a"]);
        let r = rel(&["b"]);
        let join = LogicalPlan::Join {
            left: l,
            right: r,
            join_type: JoinType::LeftOuter,
            condition: None,
        };
        let out = join.output();
        assert!(!out[0].nullable());
        assert!(out[1].nullable());
    }

    #[test]
    fn resolved_is_false_while_unresolved_relation_remains() {
        let plan = LogicalPlan::UnresolvedRelation { name: "t".into() };
        assert!(!plan.resolved());
    }
}
