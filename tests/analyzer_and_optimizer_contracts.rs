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

//! Cross-cutting contracts from spec §8: resolution monotonicity, schema
//! preservation across optimization, and idempotence of both phases.

use std::rc::Rc;

use relalg_core::common::{CompileContext, DataType, ExprId, PlanNodeId, ScalarValue};
use relalg_core::error::PlanError;
use relalg_core::expr::Expr;
use relalg_core::plan::{LogicalPlan, LogicalPlanRef};
use relalg_core::{Analyzer, MemCatalog, Optimizer};

fn attr(name: &str, id: u64, data_type: DataType, nullable: bool) -> relalg_core::expr::ExprRef {
    Rc::new(Expr::AttributeRef {
        name: name.into(),
        data_type,
        nullable,
        id: ExprId(id),
    })
}

fn sample_relation() -> LogicalPlanRef {
    Rc::new(LogicalPlan::Relation {
        id: PlanNodeId(0),
        output: vec![
            attr("a", 0, DataType::Int32, false),
            attr("b", 1, DataType::Int32, true),
        ],
    })
}

#[test]
fn unresolved_attribute_fails_with_resolution_failure_not_a_partial_result() {
    let relation = sample_relation();
    let catalog = MemCatalog::new().with_relation("t", relation);
    let unresolved = Rc::new(LogicalPlan::Project {
        child: Rc::new(LogicalPlan::UnresolvedRelation { name: "t".into() }),
        projections: vec![Rc::new(Expr::UnresolvedAttribute { name: "missing".into() })],
    });

    let compile = CompileContext::new();
    match Analyzer::new().analyze(unresolved, &compile, &catalog) {
        Err(PlanError::ResolutionFailure { reason, .. }) => {
            assert!(reason.contains("No candidate"));
        }
        other => panic!("expected ResolutionFailure, got {other:?}"),
    }
}

#[test]
fn ambiguous_reference_is_rejected() {
    let a = attr("x", 0, DataType::Int32, false);
    let b = attr("x", 1, DataType::Int32, false);
    let left = Rc::new(LogicalPlan::Relation { id: PlanNodeId(0), output: vec![a] });
    let right = Rc::new(LogicalPlan::Relation { id: PlanNodeId(1), output: vec![b] });
    let catalog = MemCatalog::new()
        .with_relation("l", left)
        .with_relation("r", right);

    let join = Rc::new(LogicalPlan::Join {
        left: Rc::new(LogicalPlan::UnresolvedRelation { name: "l".into() }),
        right: Rc::new(LogicalPlan::UnresolvedRelation { name: "r".into() }),
        join_type: relalg_core::plan::JoinType::Inner,
        condition: None,
    });
    let unresolved = Rc::new(LogicalPlan::Project {
        child: join,
        projections: vec![Rc::new(Expr::UnresolvedAttribute { name: "x".into() })],
    });

    let compile = CompileContext::new();
    match Analyzer::new().analyze(unresolved, &compile, &catalog) {
        Err(PlanError::ResolutionFailure { reason, .. }) => {
            assert!(reason.contains("Ambiguous"));
        }
        other => panic!("expected ResolutionFailure (ambiguous), got {other:?}"),
    }
}

/// A comparison between mismatched numeric types gets an inserted widening
/// cast rather than failing.
#[test]
fn mismatched_comparison_types_are_widened_not_rejected() {
    let a = attr("a", 0, DataType::Int32, false);
    let relation = Rc::new(LogicalPlan::Relation { id: PlanNodeId(0), output: vec![a.clone()] });
    let catalog = MemCatalog::new().with_relation("t", relation);

    let condition = Rc::new(Expr::Gt(a, Expr::literal(ScalarValue::Int64(1), DataType::Int64)));
    let unresolved = Rc::new(LogicalPlan::Filter {
        child: Rc::new(LogicalPlan::UnresolvedRelation { name: "t".into() }),
        condition,
    });

    let compile = CompileContext::new();
    let analyzed = Analyzer::new().analyze(unresolved, &compile, &catalog).unwrap();
    assert!(analyzed.strictly_typed());
}

/// Schema preservation (spec §8 property 2): `Optimizer(p).output` matches
/// `p.output` in name, type, nullability, and order.
#[test]
fn optimizer_preserves_schema() {
    let relation = sample_relation();
    let one = Expr::literal(ScalarValue::Int32(1), DataType::Int32);
    let condition = Rc::new(Expr::Eq(one.clone(), one));
    let filter = Rc::new(LogicalPlan::Filter {
        child: relation.clone(),
        condition,
    });

    let before_output = filter.output();
    let compile = CompileContext::new();
    let after = Optimizer::new().optimize(filter, &compile).unwrap();
    let after_output = after.output();

    assert_eq!(before_output.len(), after_output.len());
    for (b, a) in before_output.iter().zip(after_output.iter()) {
        assert_eq!(b.data_type(), a.data_type());
        assert_eq!(b.nullable(), a.nullable());
        match (&**b, &**a) {
            (Expr::AttributeRef { name: bn, .. }, Expr::AttributeRef { name: an, .. }) => {
                assert_eq!(bn, an);
            }
            _ => panic!("expected output attributes on both sides"),
        }
    }
}

/// Idempotence (spec §8 property 3): re-running the optimizer on its own
/// output is a no-op.
#[test]
fn optimizer_is_idempotent() {
    let relation = sample_relation();
    let a = attr("a", 0, DataType::Int32, false);
    let condition = Rc::new(Expr::Gt(
        a,
        Expr::literal(ScalarValue::Int32(0), DataType::Int32),
    ));
    let filter = Rc::new(LogicalPlan::Filter {
        child: relation,
        condition,
    });

    let compile = CompileContext::new();
    let optimizer = Optimizer::new();
    let once = optimizer.optimize(filter, &compile).unwrap();
    let twice = optimizer.optimize(once.clone(), &compile).unwrap();
    assert_eq!(*once, *twice);
}

/// Idempotence also holds for the Analyzer: re-analyzing an already
/// strictly-typed plan changes nothing.
#[test]
fn analyzer_is_idempotent() {
    let relation = sample_relation();
    let catalog = MemCatalog::new().with_relation("t", relation);
    let unresolved = Rc::new(LogicalPlan::Project {
        child: Rc::new(LogicalPlan::UnresolvedRelation { name: "t".into() }),
        projections: vec![Rc::new(Expr::UnresolvedAttribute { name: "a".into() })],
    });

    let compile = CompileContext::new();
    let analyzer = Analyzer::new();
    let once = analyzer.analyze(unresolved, &compile, &catalog).unwrap();
    let twice = analyzer.analyze(once.clone(), &compile, &catalog).unwrap();
    assert_eq!(*once, *twice);
}

/// The tracing hook fires once per rule application that actually changes
/// the plan (spec §6 "Tracing hook").
#[test]
fn trace_hook_observes_rule_applications() {
    use std::cell::RefCell;

    let relation = sample_relation();
    let one = Expr::literal(ScalarValue::Int32(1), DataType::Int32);
    let condition = Rc::new(Expr::Eq(one.clone(), one));
    let filter = Rc::new(LogicalPlan::Filter {
        child: relation,
        condition,
    });

    let compile = CompileContext::new();
    let applied_rules: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = applied_rules.clone();
    compile.set_trace_hook(Box::new(move |rule_name, _before, _after| {
        sink.borrow_mut().push(rule_name.to_string());
    }));

    Optimizer::new().optimize(filter, &compile).unwrap();
    assert!(!applied_rules.borrow().is_empty());
}
