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

//! Shared, thread-safe compile-time state: attribute/plan-node identity
//! allocation and the optional tracing hook (spec §5, §6).
//!
//! An attribute's semantic identity is a monotone id assigned at first
//! resolution, not its name (spec §9). Id generation is the one piece of
//! state rules share, so it is the one thing that must be atomic across
//! threads even though a single compilation itself runs on one thread.

use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::plan::LogicalPlan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlanNodeId(pub u64);

/// Invoked with `(rule_name, before, after)` whenever a rule changes the plan
/// (spec §6 "Tracing hook").
pub type TraceHook = Box<dyn FnMut(&str, &LogicalPlan, &LogicalPlan)>;

pub struct CompileContext {
    next_expr_id: AtomicU64,
    next_plan_node_id: AtomicU64,
    trace_hook: RefCell<Option<TraceHook>>,
}

impl Default for CompileContext {
    fn default() -> Self {
        Self::new()
    }
}

impl CompileContext {
    pub fn new() -> Self {
        Self {
            next_expr_id: AtomicU64::new(0),
            next_plan_node_id: AtomicU64::new(0),
            trace_hook: RefCell::new(None),
        }
    }

    pub fn next_expr_id(&self) -> ExprId {
        ExprId(self.next_expr_id.fetch_add(1, Ordering::SeqCst))
    }

    pub fn next_plan_node_id(&self) -> PlanNodeId {
        PlanNodeId(self.next_plan_node_id.fetch_add(1, Ordering::SeqCst))
    }

    pub fn set_trace_hook(&self, hook: TraceHook) {
        *self.trace_hook.borrow_mut() = Some(hook);
    }

    /// Called by the rules executor once per rule application that actually
    /// changed the plan. Emits a `tracing` record unconditionally and, if a
    /// hook is installed, forwards to it as well.
    pub fn trace_rule_applied(&self, rule_name: &str, before: &LogicalPlan, after: &LogicalPlan) {
        tracing::debug!(rule = rule_name, "plan changed");
        if let Some(hook) = self.trace_hook.borrow_mut().as_mut() {
            hook(rule_name, before, after);
        }
    }
}
