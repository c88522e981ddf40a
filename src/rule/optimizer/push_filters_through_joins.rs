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

//! Pushes a `Filter` sitting directly over an `Inner` `Join` down into
//! whichever side alone satisfies each conjunct (spec §4.4
//! PushFiltersThroughJoins): `Filter(Join(l, r, Inner, c0), cond)` combines
//! `cond` with the join's own `c0`, splits the result via `toCNF` into
//! conjuncts referencing only `l`, only `r`, or both, and rebuilds the join
//! with per-side `Filter`s and the remaining conjuncts as its own condition.
//!
//! Only `Inner` joins are rewritten: pushing a conjunct below an outer join
//! side can change which rows that side contributes before the null-padding
//! rule applies, which is out of scope here (spec §4.4 Non-goals,
//! "correlated predicates").

use std::rc::Rc;

use crate::error::PlanResult;
use crate::expr::ExprRef;
use crate::plan::{transform_down, JoinType, LogicalPlan, LogicalPlanRef};
use crate::rule::optimizer::{cnf, output_ids};
use crate::rule::{Rule, RuleContext};

pub struct PushFiltersThroughJoins;

impl PushFiltersThroughJoins {
    pub fn create() -> Box<dyn Rule> {
        Box::new(Self)
    }
}

impl Rule for PushFiltersThroughJoins {
    fn name(&self) -> &'static str {
        "PushFiltersThroughJoins"
    }

    fn apply(&self, plan: &LogicalPlanRef, _ctx: &RuleContext) -> PlanResult<LogicalPlanRef> {
        Ok(transform_down(plan, &mut |node| match &*node {
            LogicalPlan::Filter { child, condition } => match &**child {
                LogicalPlan::Join {
                    left,
                    right,
                    join_type: JoinType::Inner,
                    condition: join_condition,
                } => {
                    let left_ids = output_ids(left);
                    let right_ids = output_ids(right);

                    let mut conjuncts = cnf::flatten_conjuncts(condition);
                    if let Some(c0) = join_condition {
                        conjuncts.extend(cnf::flatten_conjuncts(c0));
                    }

                    let mut left_conjuncts = Vec::new();
                    let mut right_conjuncts = Vec::new();
                    let mut residual = Vec::new();
                    for c in conjuncts {
                        let refs = c.references();
                        let only_left = !refs.is_empty() && refs.iter().all(|id| left_ids.contains(id));
                        let only_right = !refs.is_empty() && refs.iter().all(|id| right_ids.contains(id));
                        if only_left {
                            left_conjuncts.push(c);
                        } else if only_right {
                            right_conjuncts.push(c);
                        } else {
                            residual.push(c);
                        }
                    }

                    let new_left = wrap_in_filter(left.clone(), left_conjuncts);
                    let new_right = wrap_in_filter(right.clone(), right_conjuncts);
                    let new_condition = if residual.is_empty() {
                        None
                    } else {
                        Some(cnf::conjoin(residual))
                    };

                    Rc::new(LogicalPlan::Join {
                        left: new_left,
                        right: new_right,
                        join_type: JoinType::Inner,
                        condition: new_condition,
                    })
                }
                _ => node.clone(),
            },
            _ => node,
        }))
    }
}

fn wrap_in_filter(child: LogicalPlanRef, conjuncts: Vec<ExprRef>) -> LogicalPlanRef {
    if conjuncts.is_empty() {
        child
    } else {
        Rc::new(LogicalPlan::Filter {
            child,
            condition: cnf::conjoin(conjuncts),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::common::{CompileContext, DataType, ExprId, PlanNodeId};
    use crate::expr::Expr;

    fn attr(id: u64) -> ExprRef {
        Rc::new(Expr::AttributeRef {
            name: format!("a{id}"),
            data_type: DataType::Int32,
            nullable: false,
            id: ExprId(id),
        })
    }

    #[test]
    fn single_side_conjunct_pushes_below_the_join() {
        let l = Rc::new(LogicalPlan::Relation { id: PlanNodeId(0), output: vec![attr(0)] });
        let r = Rc::new(LogicalPlan::Relation { id: PlanNodeId(1), output: vec![attr(1)] });
        let left_only = Rc::new(Expr::Gt(attr(0), Expr::literal(crate::common::ScalarValue::Int32(0), DataType::Int32)));
        let join_eq = Rc::new(Expr::Eq(attr(0), attr(1)));
        let condition = Rc::new(Expr::And(left_only, join_eq));
        let join = Rc::new(LogicalPlan::Join {
            left: l.clone(),
            right: r.clone(),
            join_type: JoinType::Inner,
            condition: None,
        });
        let filter = Rc::new(LogicalPlan::Filter { child: join, condition });
        let compile = CompileContext::new();
        let ctx = RuleContext { compile: &compile, catalog: None };
        let result = PushFiltersThroughJoins.apply(&filter, &ctx).unwrap();
        match &*result {
            LogicalPlan::Join { left, condition, .. } => {
                match &**left {
                    LogicalPlan::Filter { child, .. } => assert!(Rc::ptr_eq(child, &l)),
                    other => panic!("expected Filter pushed into left, got {other:?}"),
                }
                assert!(condition.is_some());
            }
            _ => panic!("expected Join"),
        }
    }

    #[test]
    fn condition_referencing_both_sides_stays_on_the_join() {
        let l = Rc::new(LogicalPlan::Relation { id: PlanNodeId(0), output: vec![attr(0)] });
        let r = Rc::new(LogicalPlan::Relation { id: PlanNodeId(1), output: vec![attr(1)] });
        let condition = Rc::new(Expr::Eq(attr(0), attr(1)));
        let join = Rc::new(LogicalPlan::Join {
            left: l.clone(),
            right: r.clone(),
            join_type: JoinType::Inner,
            condition: None,
        });
        let filter = Rc::new(LogicalPlan::Filter { child: join, condition: condition.clone() });
        let compile = CompileContext::new();
        let ctx = RuleContext { compile: &compile, catalog: None };
        let result = PushFiltersThroughJoins.apply(&filter, &ctx).unwrap();
        match &*result {
            LogicalPlan::Join { left, right, condition: result_condition, .. } => {
                assert!(Rc::ptr_eq(left, &l));
                assert!(Rc::ptr_eq(right, &r));
                assert!(Expr::same_or_equal(result_condition.as_ref().unwrap(), &condition));
            }
            _ => panic!("expected Join"),
        }
    }
}
