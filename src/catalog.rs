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

//! The catalog seam `ResolveRelations` binds against (spec §6). Persistence,
//! DDL, and multi-schema namespacing are outside this core; `MemCatalog`
//! below exists only to make the Analyzer exercisable in tests and demos.

use std::collections::HashMap;

use crate::error::PlanError;
use crate::error::PlanResult;
use crate::plan::LogicalPlanRef;

pub trait Catalog {
    /// Resolves `name` to a (already-resolved) `Relation`. Fails with
    /// `PlanError::TableNotFound` when no such relation exists.
    fn lookup_relation(&self, name: &str) -> PlanResult<LogicalPlanRef>;
}

/// An in-memory `Catalog` backed by a name -> relation map. Test/demo
/// scaffolding only; not a persistence layer.
#[derive(Default)]
pub struct MemCatalog {
    relations: HashMap<String, LogicalPlanRef>,
}

impl MemCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_relation(mut self, name: impl Into<String>, relation: LogicalPlanRef) -> Self {
        self.relations.insert(name.into(), relation);
        self
    }
}

impl Catalog for MemCatalog {
    fn lookup_relation(&self, name: &str) -> PlanResult<LogicalPlanRef> {
        self.relations
            .get(name)
            .cloned()
            .ok_or_else(|| PlanError::table_not_found(name))
    }
}
