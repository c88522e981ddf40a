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

//! Entry point for the Analysis phase (spec §4.3, §5): drives the
//! `Resolution` fixed point and the one-shot `SubqueryElimination` batch
//! over an unresolved plan against a [`Catalog`].

use crate::catalog::Catalog;
use crate::common::CompileContext;
use crate::error::PlanResult;
use crate::plan::LogicalPlanRef;
use crate::rule::analyzer::{resolution_batch, subquery_elimination_batch};
use crate::rule::{RuleContext, RulesExecutor};

pub struct Analyzer {
    executor: RulesExecutor,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer {
    pub fn new() -> Self {
        Self {
            executor: RulesExecutor::new(vec![resolution_batch(), subquery_elimination_batch()]),
        }
    }

    /// Runs Analysis to a fixed point. `plan` need not be resolved on entry;
    /// the result is `resolved()` and `strictly_typed()` on success.
    pub fn analyze(
        &self,
        plan: LogicalPlanRef,
        compile: &CompileContext,
        catalog: &dyn Catalog,
    ) -> PlanResult<LogicalPlanRef> {
        let ctx = RuleContext {
            compile,
            catalog: Some(catalog),
        };
        self.executor.execute(plan, &ctx)
    }
}
