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

//! Eliminates redundant `Project` nodes (spec §4.4 ReduceProjects): a
//! `Project` that reproduces its child's output verbatim disappears, and a
//! `Project` directly over another `Project` collapses into one, with the
//! outer projections rewritten in terms of the inner's definitions.

use std::rc::Rc;

use crate::error::PlanResult;
use crate::expr::Expr;
use crate::plan::{LogicalPlan, LogicalPlanRef};
use crate::rule::optimizer::{projection_substitution_map, substitute};
use crate::rule::{Rule, RuleContext};

pub struct ReduceProjects;

impl ReduceProjects {
    pub fn create() -> Box<dyn Rule> {
        Box::new(Self)
    }
}

impl Rule for ReduceProjects {
    fn name(&self) -> &'static str {
        "ReduceProjects"
    }

    fn apply(&self, plan: &LogicalPlanRef, _ctx: &RuleContext) -> PlanResult<LogicalPlanRef> {
        Ok(crate::plan::transform_down(plan, &mut |node| match &*node {
            LogicalPlan::Project { child, projections } if projects_child_output(projections, child) => {
                child.clone()
            }
            LogicalPlan::Project { child, projections } => match &**child {
                LogicalPlan::Project {
                    child: grandchild,
                    projections: inner_projections,
                } => {
                    let map = projection_substitution_map(inner_projections);
                    let rewritten = projections
                        .iter()
                        .map(|p| substitute(p, &map))
                        .collect();
                    Rc::new(LogicalPlan::Project {
                        child: grandchild.clone(),
                        projections: rewritten,
                    })
                }
                _ => node.clone(),
            },
            _ => node,
        }))
    }
}

/// True when `projections` is exactly `child.output()` in order: an
/// `AttributeRef` per output attribute, reproducing the existing schema.
fn projects_child_output(projections: &[crate::expr::ExprRef], child: &LogicalPlanRef) -> bool {
    let output = child.output();
    if projections.len() != output.len() {
        return false;
    }
    projections.iter().zip(output.iter()).all(|(p, o)| match (&**p, &**o) {
        (Expr::AttributeRef { id: pid, .. }, Expr::AttributeRef { id: oid, .. }) => pid == oid,
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::common::{CompileContext, DataType, ExprId, PlanNodeId};

    fn attr(id: u64) -> crate::expr::ExprRef {
        Rc::new(Expr::AttributeRef {
            name: format!("a{id}"),
            data_type: DataType::Int32,
            nullable: false,
            id: ExprId(id),
        })
    }

    fn ctx(compile: &CompileContext) -> RuleContext {
        RuleContext { compile, catalog: None }
    }

    #[test]
    fn project_reproducing_child_output_is_elided() {
        let r = Rc::new(LogicalPlan::Relation { id: PlanNodeId(0), output: vec![attr(0), attr(1)] });
        let project = Rc::new(LogicalPlan::Project {
            child: r.clone(),
            projections: vec![attr(0), attr(1)],
        });
        let compile = CompileContext::new();
        let result = ReduceProjects.apply(&project, &ctx(&compile)).unwrap();
        assert!(Rc::ptr_eq(&result, &r));
    }

    #[test]
    fn project_over_project_collapses_with_substitution() {
        let r = Rc::new(LogicalPlan::Relation { id: PlanNodeId(0), output: vec![attr(0)] });
        let aliased = Rc::new(Expr::Alias {
            child: attr(0),
            name: "b".into(),
            id: ExprId(10),
        });
        let inner = Rc::new(LogicalPlan::Project { child: r.clone(), projections: vec![aliased] });
        let outer_ref = Rc::new(Expr::AttributeRef {
            name: "b".into(),
            data_type: DataType::Int32,
            nullable: false,
            id: ExprId(10),
        });
        let outer = Rc::new(LogicalPlan::Project { child: inner, projections: vec![outer_ref] });
        let compile = CompileContext::new();
        let result = ReduceProjects.apply(&outer, &ctx(&compile)).unwrap();
        match &*result {
            LogicalPlan::Project { child, projections } => {
                assert!(Rc::ptr_eq(child, &r));
                assert!(matches!(&*projections[0], Expr::AttributeRef { id, .. } if *id == ExprId(0)));
            }
            _ => panic!("expected Project"),
        }
    }
}
