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

//! Conjunctive normal form conversion shared by `CNFConversion` and
//! `PushFiltersThroughJoins` (spec §4.4). Negation is pushed inward via De
//! Morgan's laws, then `Or` is distributed over `And`; conversion is a
//! no-op above a conjunct-count cap to bound the exponential blow-up.

use std::rc::Rc;

use crate::error::PlanResult;
use crate::expr::{Expr, ExprRef};
use crate::plan::{transform_down, LogicalPlan, LogicalPlanRef};
use crate::rule::{Rule, RuleContext};

/// Default conjunct-count cap above which `to_cnf` gives up and returns the
/// input unchanged (spec §4.4, §9 "CNF blow-up").
pub const DEFAULT_BLOW_UP_CAP: usize = 16;

/// On `Filter(child, cond)`, replaces `cond` with its conjunctive normal
/// form (spec §4.4 CNFConversion), run before the push-down rules so
/// conjuncts can be split and routed independently.
pub struct CNFConversion {
    blow_up_cap: usize,
}

impl CNFConversion {
    pub fn create() -> Box<dyn Rule> {
        Box::new(Self {
            blow_up_cap: DEFAULT_BLOW_UP_CAP,
        })
    }
}

impl Rule for CNFConversion {
    fn name(&self) -> &'static str {
        "CNFConversion"
    }

    fn apply(&self, plan: &LogicalPlanRef, _ctx: &RuleContext) -> PlanResult<LogicalPlanRef> {
        Ok(transform_down(plan, &mut |node| match &*node {
            LogicalPlan::Filter { child, condition } => Rc::new(LogicalPlan::Filter {
                child: child.clone(),
                condition: to_cnf(condition, self.blow_up_cap),
            }),
            _ => node,
        }))
    }
}

pub fn to_cnf(e: &ExprRef, blow_up_cap: usize) -> ExprRef {
    let nnf = to_nnf(e);
    let distributed = distribute(&nnf);
    if count_conjuncts(&distributed) > blow_up_cap {
        e.clone()
    } else {
        distributed
    }
}

/// Pushes `Not` inward to the leaves via De Morgan's laws and double
/// negation elimination.
fn to_nnf(e: &ExprRef) -> ExprRef {
    match &**e {
        Expr::Not(inner) => match &**inner {
            Expr::Not(x) => to_nnf(x),
            Expr::And(a, b) => Rc::new(Expr::Or(
                to_nnf(&Rc::new(Expr::Not(a.clone()))),
                to_nnf(&Rc::new(Expr::Not(b.clone()))),
            )),
            Expr::Or(a, b) => Rc::new(Expr::And(
                to_nnf(&Rc::new(Expr::Not(a.clone()))),
                to_nnf(&Rc::new(Expr::Not(b.clone()))),
            )),
            _ => e.clone(),
        },
        Expr::And(a, b) => Rc::new(Expr::And(to_nnf(a), to_nnf(b))),
        Expr::Or(a, b) => Rc::new(Expr::Or(to_nnf(a), to_nnf(b))),
        _ => e.clone(),
    }
}

/// Distributes `Or` over `And`, assuming `e` is already in negation normal
/// form.
fn distribute(e: &ExprRef) -> ExprRef {
    match &**e {
        Expr::Or(a, b) => {
            let a = distribute(a);
            let b = distribute(b);
            match (&*a, &*b) {
                (Expr::And(a1, a2), _) => Rc::new(Expr::And(
                    distribute(&Rc::new(Expr::Or(a1.clone(), b.clone()))),
                    distribute(&Rc::new(Expr::Or(a2.clone(), b.clone()))),
                )),
                (_, Expr::And(b1, b2)) => Rc::new(Expr::And(
                    distribute(&Rc::new(Expr::Or(a.clone(), b1.clone()))),
                    distribute(&Rc::new(Expr::Or(a.clone(), b2.clone()))),
                )),
                _ => Rc::new(Expr::Or(a, b)),
            }
        }
        Expr::And(a, b) => Rc::new(Expr::And(distribute(a), distribute(b))),
        _ => e.clone(),
    }
}

fn count_conjuncts(e: &ExprRef) -> usize {
    match &**e {
        Expr::And(a, b) => count_conjuncts(a) + count_conjuncts(b),
        _ => 1,
    }
}

/// Splits a (top-level) conjunction into its conjuncts.
pub fn flatten_conjuncts(e: &ExprRef) -> Vec<ExprRef> {
    match &**e {
        Expr::And(a, b) => {
            let mut out = flatten_conjuncts(a);
            out.extend(flatten_conjuncts(b));
            out
        }
        _ => vec![e.clone()],
    }
}

/// Folds a non-empty list of conjuncts back into a single `And` tree.
pub fn conjoin(mut conjuncts: Vec<ExprRef>) -> ExprRef {
    let mut result = conjuncts.remove(0);
    for c in conjuncts {
        result = Rc::new(Expr::And(result, c));
    }
    result
}
