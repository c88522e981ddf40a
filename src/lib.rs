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

//! A relational logical-plan compiler core: a tree-rewriting substrate
//! ([`expr`], [`plan`]) plus the Analyzer and Optimizer rule batches built
//! on top of it ([`rule`], [`analyzer`], [`optimizer`]).
//!
//! Typical usage resolves an unresolved plan with [`analyzer::Analyzer`]
//! against a [`catalog::Catalog`], then simplifies it with
//! [`optimizer::Optimizer`]:
//!
//! ```
//! use std::rc::Rc;
//! use relalg_core::analyzer::Analyzer;
//! use relalg_core::optimizer::Optimizer;
//! use relalg_core::catalog::MemCatalog;
//! use relalg_core::common::{CompileContext, DataType, ExprId, PlanNodeId};
//! use relalg_core::expr::Expr;
//! use relalg_core::plan::LogicalPlan;
//!
//! let a = Rc::new(Expr::AttributeRef {
//!     name: "a".into(),
//!     data_type: DataType::Int32,
//!     nullable: false,
//!     id: ExprId(0),
//! });
//! let relation = Rc::new(LogicalPlan::Relation { id: PlanNodeId(0), output: vec![a] });
//! let catalog = MemCatalog::new().with_relation("t", relation);
//!
//! let unresolved = Rc::new(LogicalPlan::Project {
//!     child: Rc::new(LogicalPlan::UnresolvedRelation { name: "t".into() }),
//!     projections: vec![Rc::new(Expr::UnresolvedAttribute { name: "a".into() })],
//! });
//!
//! let compile = CompileContext::new();
//! let analyzed = Analyzer::new().analyze(unresolved, &compile, &catalog).unwrap();
//! let optimized = Optimizer::new().optimize(analyzed, &compile).unwrap();
//! assert!(optimized.strictly_typed());
//! ```

pub mod analyzer;
pub mod catalog;
pub mod common;
pub mod error;
pub mod expr;
pub mod optimizer;
pub mod plan;
pub mod rule;

pub use analyzer::Analyzer;
pub use catalog::{Catalog, MemCatalog};
pub use error::{PlanError, PlanResult};
pub use optimizer::Optimizer;
