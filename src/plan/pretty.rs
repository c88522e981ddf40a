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

//! Diagnostic rendering of a plan as an indented textual tree (spec §6
//! `prettyTree`), used in error messages and rule-application traces.

use std::fmt::Write;

use itertools::Itertools;

use super::{JoinType, LogicalPlan};
use crate::expr::{Expr, ExprRef};

impl LogicalPlan {
    pub fn pretty_tree(&self) -> String {
        let mut out = String::new();
        write_node(self, 0, &mut out);
        out
    }
}

fn write_node(plan: &LogicalPlan, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    match plan {
        LogicalPlan::UnresolvedRelation { name } => {
            let _ = writeln!(out, "{indent}UnresolvedRelation: {name}");
        }
        LogicalPlan::Relation { id, output } => {
            let _ = writeln!(
                out,
                "{indent}Relation#{}: [{}]",
                id.0,
                format_attrs(output)
            );
        }
        LogicalPlan::LocalRelation { output, rows } => {
            let _ = writeln!(
                out,
                "{indent}LocalRelation: [{}] ({} rows)",
                format_attrs(output),
                rows.len()
            );
        }
        LogicalPlan::Project { child, projections } => {
            let _ = writeln!(
                out,
                "{indent}Project: [{}]",
                projections.iter().map(pretty_expr).join(", ")
            );
            write_node(child, depth + 1, out);
        }
        LogicalPlan::Filter { child, condition } => {
            let _ = writeln!(out, "{indent}Filter: {}", pretty_expr(condition));
            write_node(child, depth + 1, out);
        }
        LogicalPlan::Join {
            left,
            right,
            join_type,
            condition,
        } => {
            let cond = condition
                .as_ref()
                .map(|c| pretty_expr(c))
                .unwrap_or_else(|| "None".to_string());
            let _ = writeln!(out, "{indent}Join({}): {cond}", join_type_name(*join_type));
            write_node(left, depth + 1, out);
            write_node(right, depth + 1, out);
        }
        LogicalPlan::Limit { child, count } => {
            let _ = writeln!(out, "{indent}Limit: {}", pretty_expr(count));
            write_node(child, depth + 1, out);
        }
        LogicalPlan::Subquery { child, alias } => {
            let _ = writeln!(out, "{indent}Subquery: {alias}");
            write_node(child, depth + 1, out);
        }
    }
}

fn join_type_name(jt: JoinType) -> &'static str {
    match jt {
        JoinType::Inner => "Inner",
        JoinType::LeftOuter => "LeftOuter",
        JoinType::RightOuter => "RightOuter",
        JoinType::FullOuter => "FullOuter",
    }
}

fn format_attrs(attrs: &[ExprRef]) -> String {
    attrs.iter().map(pretty_expr).join(", ")
}

fn pretty_expr(expr: &ExprRef) -> String {
    match &**expr {
        Expr::Literal { value, .. } => value.to_string(),
        Expr::AttributeRef { name, id, .. } => format!("{name}#{}", id.0),
        Expr::UnresolvedAttribute { name } => format!("'{name}"),
        Expr::Star => "*".to_string(),
        Expr::Alias { child, name, id } => format!("{} AS {name}#{}", pretty_expr(child), id.0),
        Expr::Cast { child, target_type } => format!("CAST({} AS {target_type})", pretty_expr(child)),
        Expr::Not(c) => format!("NOT {}", pretty_expr(c)),
        Expr::And(l, r) => format!("({} AND {})", pretty_expr(l), pretty_expr(r)),
        Expr::Or(l, r) => format!("({} OR {})", pretty_expr(l), pretty_expr(r)),
        Expr::Eq(l, r) => format!("({} = {})", pretty_expr(l), pretty_expr(r)),
        Expr::NotEq(l, r) => format!("({} != {})", pretty_expr(l), pretty_expr(r)),
        Expr::Lt(l, r) => format!("({} < {})", pretty_expr(l), pretty_expr(r)),
        Expr::LtEq(l, r) => format!("({} <= {})", pretty_expr(l), pretty_expr(r)),
        Expr::Gt(l, r) => format!("({} > {})", pretty_expr(l), pretty_expr(r)),
        Expr::GtEq(l, r) => format!("({} >= {})", pretty_expr(l), pretty_expr(r)),
        Expr::Add(l, r) => format!("({} + {})", pretty_expr(l), pretty_expr(r)),
        Expr::Subtract(l, r) => format!("({} - {})", pretty_expr(l), pretty_expr(r)),
        Expr::Multiply(l, r) => format!("({} * {})", pretty_expr(l), pretty_expr(r)),
        Expr::Divide(l, r) => format!("({} / {})", pretty_expr(l), pretty_expr(r)),
        Expr::If { cond, yes, no } => format!(
            "IF({}, {}, {})",
            pretty_expr(cond),
            pretty_expr(yes),
            pretty_expr(no)
        ),
        Expr::Coalesce(args) => format!("COALESCE({})", args.iter().map(pretty_expr).join(", ")),
        Expr::IsNull(c) => format!("{} IS NULL", pretty_expr(c)),
        Expr::IsNotNull(c) => format!("{} IS NOT NULL", pretty_expr(c)),
    }
}
