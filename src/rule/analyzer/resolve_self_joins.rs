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

//! Rejects a resolved `Join` whose two sides produce identical attribute ids
//! (spec §4.3 ResolveSelfJoins). Conservative by design: a future rewrite
//! could instead rename the right-hand side's attributes, but that
//! disambiguation is explicitly out of scope here.

use crate::error::PlanResult;
use crate::expr::Expr;
use crate::plan::{try_transform_down, LogicalPlan, LogicalPlanRef};
use crate::rule::{Rule, RuleContext};

pub struct ResolveSelfJoins;

impl ResolveSelfJoins {
    pub fn create() -> Box<dyn Rule> {
        Box::new(Self)
    }
}

impl Rule for ResolveSelfJoins {
    fn name(&self) -> &'static str {
        "ResolveSelfJoins"
    }

    fn apply(&self, plan: &LogicalPlanRef, _ctx: &RuleContext) -> PlanResult<LogicalPlanRef> {
        try_transform_down(plan, &mut |node| {
            if let LogicalPlan::Join { left, right, .. } = &*node {
                if left.resolved() && right.resolved() && same_output_ids(left, right) {
                    return Err(crate::error::PlanError::unsupported(
                        "Self-join is not supported yet",
                        node.pretty_tree(),
                    ));
                }
            }
            Ok(node)
        })
    }
}

fn same_output_ids(left: &LogicalPlanRef, right: &LogicalPlanRef) -> bool {
    let (lo, ro) = (left.output(), right.output());
    lo.len() == ro.len()
        && lo.iter().zip(ro.iter()).all(|(l, r)| match (&**l, &**r) {
            (Expr::AttributeRef { id: lid, .. }, Expr::AttributeRef { id: rid, .. }) => lid == rid,
            _ => false,
        })
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::common::{CompileContext, DataType, ExprId, PlanNodeId};
    use crate::error::PlanError;
    use crate::plan::JoinType;

    fn rel(names: &[&str], id_base: u64) -> LogicalPlanRef {
        let output = names
            .iter()
            .enumerate()
            .map(|(i, n)| {
                Rc::new(Expr::AttributeRef {
                    name: n.to_string(),
                    data_type: DataType::Int32,
                    nullable: false,
                    id: ExprId(id_base + i as u64),
                })
            })
            .collect();
        Rc::new(LogicalPlan::Relation {
            id: PlanNodeId(0),
            output,
        })
    }

    fn ctx(compile: &CompileContext) -> RuleContext {
        RuleContext {
            compile,
            catalog: None,
        }
    }

    #[test]
    fn rejects_a_literal_self_join() {
        let r = rel(&["a"], 0);
        let join = Rc::new(LogicalPlan::Join {
            left: r.clone(),
            right: r,
            join_type: JoinType::Inner,
            condition: None,
        });
        let compile = CompileContext::new();
        match ResolveSelfJoins.apply(&join, &ctx(&compile)) {
            Err(PlanError::Unsupported { feature, .. }) => {
                assert_eq!(feature, "Self-join is not supported yet")
            }
            other => panic!("expected Unsupported, got {other:?}"),
        }
    }

    #[test]
    fn allows_joins_with_distinct_attribute_ids() {
        let l = rel(&["a"], 0);
        let r = rel(&["b"], 100);
        let join = Rc::new(LogicalPlan::Join {
            left: l,
            right: r,
            join_type: JoinType::Inner,
            condition: None,
        });
        let compile = CompileContext::new();
        assert!(ResolveSelfJoins.apply(&join, &ctx(&compile)).is_ok());
    }
}
