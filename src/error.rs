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

//! Error kinds produced while compiling a logical plan.
//!
//! Resolution and type errors abort compilation immediately; there is no
//! local recovery (spec §7). Each variant carries the offending subtree's
//! pretty-printed form so the caller can render it alongside the message.

use thiserror::Error;

pub type PlanResult<T> = std::result::Result<T, PlanError>;

#[derive(Error, Debug, Clone)]
pub enum PlanError {
    #[error("Table not found: {name}")]
    TableNotFound { name: String },

    #[error("Resolution failure for `{attr}`: {reason}\n{plan}")]
    ResolutionFailure {
        attr: String,
        reason: String,
        plan: String,
    },

    #[error("Type check failure for `{expr}`: {reason}\n{plan}")]
    TypeCheckFailure {
        expr: String,
        reason: String,
        plan: String,
    },

    #[error("Unsupported: {feature}\n{plan}")]
    Unsupported { feature: String, plan: String },

    #[error("Internal error: {detail}\n{plan}")]
    InternalError { detail: String, plan: String },
}

impl PlanError {
    pub fn table_not_found(name: impl Into<String>) -> Self {
        Self::TableNotFound { name: name.into() }
    }

    pub fn resolution_failure(
        attr: impl Into<String>,
        reason: impl Into<String>,
        plan: impl Into<String>,
    ) -> Self {
        Self::ResolutionFailure {
            attr: attr.into(),
            reason: reason.into(),
            plan: plan.into(),
        }
    }

    pub fn type_check_failure(
        expr: impl Into<String>,
        reason: impl Into<String>,
        plan: impl Into<String>,
    ) -> Self {
        Self::TypeCheckFailure {
            expr: expr.into(),
            reason: reason.into(),
            plan: plan.into(),
        }
    }

    pub fn unsupported(feature: impl Into<String>, plan: impl Into<String>) -> Self {
        Self::Unsupported {
            feature: feature.into(),
            plan: plan.into(),
        }
    }

    pub fn internal(detail: impl Into<String>, plan: impl Into<String>) -> Self {
        Self::InternalError {
            detail: detail.into(),
            plan: plan.into(),
        }
    }
}
