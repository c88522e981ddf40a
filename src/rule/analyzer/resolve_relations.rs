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

//! `UnresolvedRelation(name)` -> `catalog.lookup_relation(name)` (spec §4.3
//! ResolveRelations), post-order.

use crate::error::PlanResult;
use crate::plan::{try_transform_up, LogicalPlan, LogicalPlanRef};
use crate::rule::{Rule, RuleContext};

pub struct ResolveRelations;

impl ResolveRelations {
    pub fn create() -> Box<dyn Rule> {
        Box::new(Self)
    }
}

impl Rule for ResolveRelations {
    fn name(&self) -> &'static str {
        "ResolveRelations"
    }

    fn apply(&self, plan: &LogicalPlanRef, ctx: &RuleContext) -> PlanResult<LogicalPlanRef> {
        try_transform_up(plan, &mut |node| match &*node {
            LogicalPlan::UnresolvedRelation { name } => ctx.catalog()?.lookup_relation(name),
            _ => Ok(node),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::catalog::MemCatalog;
    use crate::common::{CompileContext, DataType, ExprId, PlanNodeId};
    use crate::error::PlanError;
    use crate::expr::Expr;

    fn rel() -> LogicalPlanRef {
        Rc::new(LogicalPlan::Relation {
            id: PlanNodeId(0),
            output: vec![Rc::new(Expr::AttributeRef {
                name: "a".into(),
                data_type: DataType::Int32,
                nullable: false,
                id: ExprId(0),
            })],
        })
    }

    #[test]
    fn resolves_a_known_relation() {
        let catalog = MemCatalog::new().with_relation("t", rel());
        let compile = CompileContext::new();
        let ctx = RuleContext {
            compile: &compile,
            catalog: Some(&catalog),
        };
        let plan = Rc::new(LogicalPlan::UnresolvedRelation { name: "t".into() });
        let resolved = ResolveRelations.apply(&plan, &ctx).unwrap();
        assert!(resolved.resolved());
    }

    #[test]
    fn unknown_relation_fails_with_table_not_found() {
        let catalog = MemCatalog::new();
        let compile = CompileContext::new();
        let ctx = RuleContext {
            compile: &compile,
            catalog: Some(&catalog),
        };
        let plan = Rc::new(LogicalPlan::UnresolvedRelation {
            name: "missing".into(),
        });
        match ResolveRelations.apply(&plan, &ctx) {
            Err(PlanError::TableNotFound { name }) => assert_eq!(name, "missing"),
            other => panic!("expected TableNotFound, got {other:?}"),
        }
    }
}
