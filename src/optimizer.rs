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

//! Entry point for the Optimization phase (spec §4.4, §5): drives the
//! `Optimizations` fixed point over an already-analyzed plan. No catalog is
//! needed; every `UnresolvedRelation` should already be gone.

use crate::common::CompileContext;
use crate::error::PlanResult;
use crate::plan::LogicalPlanRef;
use crate::rule::optimizer::optimizations_batch;
use crate::rule::{RuleContext, RulesExecutor};

pub struct Optimizer {
    executor: RulesExecutor,
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Optimizer {
    pub fn new() -> Self {
        Self {
            executor: RulesExecutor::new(vec![optimizations_batch()]),
        }
    }

    pub fn optimize(&self, plan: LogicalPlanRef, compile: &CompileContext) -> PlanResult<LogicalPlanRef> {
        let ctx = RuleContext {
            compile,
            catalog: None,
        };
        self.executor.execute(plan, &ctx)
    }
}
