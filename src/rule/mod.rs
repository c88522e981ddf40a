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

//! The rule batch/executor substrate (spec §4.2), shared by the Analyzer and
//! the Optimizer. A [`Rule`] is a value implementing `apply(plan) -> plan`
//! (spec §9 design note), mirroring the teacher's `Rule`/`BoxedRule` pattern
//! (`src/frontend/src/optimizer/rule/mod.rs`).

pub mod analyzer;
pub mod optimizer;

use std::rc::Rc;

use crate::catalog::Catalog;
use crate::common::CompileContext;
use crate::error::{PlanError, PlanResult};
use crate::plan::LogicalPlanRef;

/// Per-invocation context handed to every rule: the shared id/tracing state
/// and, for Analyzer rules, the catalog `ResolveRelations` binds against.
/// Optimizer batches run with `catalog: None` since no `UnresolvedRelation`
/// should remain once Analysis has completed.
pub struct RuleContext<'a> {
    pub compile: &'a CompileContext,
    pub catalog: Option<&'a dyn Catalog>,
}

impl<'a> RuleContext<'a> {
    pub fn catalog(&self) -> PlanResult<&'a dyn Catalog> {
        self.catalog
            .ok_or_else(|| PlanError::internal("no catalog available in this rule context", ""))
    }
}

pub trait Rule {
    fn name(&self) -> &'static str;

    fn apply(&self, plan: &LogicalPlanRef, ctx: &RuleContext) -> PlanResult<LogicalPlanRef>;
}

pub type BoxedRule = Box<dyn Rule>;

#[derive(Debug, Clone, Copy)]
pub enum Strategy {
    /// Exactly one pass over the batch's rules.
    Once,
    /// Repeat passes until the plan stops changing. `None` means unlimited,
    /// subject to the executor's safety ceiling; `Some(n)` caps at `n`
    /// passes with no non-convergence error.
    FixedPoint(Option<usize>),
}

pub struct RuleBatch {
    pub name: &'static str,
    pub strategy: Strategy,
    pub rules: Vec<BoxedRule>,
}

impl RuleBatch {
    pub fn new(name: &'static str, strategy: Strategy, rules: Vec<BoxedRule>) -> Self {
        Self {
            name,
            strategy,
            rules,
        }
    }
}

/// Drives a fixed sequence of [`RuleBatch`]es to completion (spec §4.2).
pub struct RulesExecutor {
    batches: Vec<RuleBatch>,
    safety_ceiling: usize,
}

const DEFAULT_SAFETY_CEILING: usize = 100;

impl RulesExecutor {
    pub fn new(batches: Vec<RuleBatch>) -> Self {
        Self::with_safety_ceiling(batches, DEFAULT_SAFETY_CEILING)
    }

    pub fn with_safety_ceiling(batches: Vec<RuleBatch>, safety_ceiling: usize) -> Self {
        Self {
            batches,
            safety_ceiling,
        }
    }

    pub fn execute(
        &self,
        plan: LogicalPlanRef,
        ctx: &RuleContext,
    ) -> PlanResult<LogicalPlanRef> {
        let mut current = plan;
        for batch in &self.batches {
            current = self.run_batch(batch, current, ctx)?;
        }
        Ok(current)
    }

    fn run_batch(
        &self,
        batch: &RuleBatch,
        plan: LogicalPlanRef,
        ctx: &RuleContext,
    ) -> PlanResult<LogicalPlanRef> {
        match batch.strategy {
            Strategy::Once => {
                let mut current = plan;
                for rule in &batch.rules {
                    current = apply_and_trace(rule.as_ref(), current, ctx)?;
                }
                Ok(current)
            }
            Strategy::FixedPoint(cap) => {
                let mut current = plan;
                let mut iterations = 0usize;
                loop {
                    let before = current.clone();
                    for rule in &batch.rules {
                        current = apply_and_trace(rule.as_ref(), current, ctx)?;
                    }
                    iterations += 1;
                    if Rc::ptr_eq(&before, &current) || *before == *current {
                        break;
                    }
                    if let Some(cap) = cap {
                        if iterations >= cap {
                            break;
                        }
                    } else if iterations >= self.safety_ceiling {
                        return Err(PlanError::internal(
                            format!(
                                "rule batch `{}` did not converge within {} passes",
                                batch.name, self.safety_ceiling
                            ),
                            current.pretty_tree(),
                        ));
                    }
                }
                Ok(current)
            }
        }
    }
}

fn apply_and_trace(
    rule: &dyn Rule,
    current: LogicalPlanRef,
    ctx: &RuleContext,
) -> PlanResult<LogicalPlanRef> {
    let next = rule.apply(&current, ctx)?;
    if !Rc::ptr_eq(&current, &next) && *current != *next {
        ctx.compile.trace_rule_applied(rule.name(), &current, &next);
    }
    Ok(next)
}
