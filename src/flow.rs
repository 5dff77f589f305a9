// Copyright 2025 Cameron Swords
// SPDX-License-Identifier: Apache-2.0

use rustc_hash::FxHashMap;

use crate::ann::{AnnDoc, AnnInner, TabSet};
use crate::tab::{DocVar, Tab};

// -------------------------------------------------------------------------------------------------
// Conditional Contexts
// -------------------------------------------------------------------------------------------------

/// The state a `cond` branch assumes for its tab.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Activation {
    Active,
    Inactive,
}

/// A scoped stack of conditional-state assumptions. Entries are pushed on
/// entering a `cond` branch and popped on the way out; lookup takes the
/// innermost assumption for a tab.
pub(crate) struct CondCtx(Vec<(Tab, Activation)>);

impl CondCtx {
    pub(crate) fn new() -> CondCtx {
        CondCtx(Vec::new())
    }

    pub(crate) fn lookup(&self, tab: &Tab) -> Option<Activation> {
        self.0.iter().rev().find(|(t, _)| t == tab).map(|(_, a)| *a)
    }

    pub(crate) fn assume(&mut self, tab: &Tab, activation: Activation) {
        self.0.push((tab.clone(), activation));
    }

    pub(crate) fn retract(&mut self) {
        self.0.pop();
    }
}

// -------------------------------------------------------------------------------------------------
// Flow Analysis
// -------------------------------------------------------------------------------------------------

/// A flow value: the set of tabs that determine the horizontal position of
/// whatever comes next, or `None` when nothing has claimed it yet.
type FlowVal = Option<TabSet>;

fn union_flow(a: FlowVal, b: FlowVal) -> FlowVal {
    match (a, b) {
        (None, x) | (x, None) => x,
        (Some(a), Some(b)) => Some(a.union(&b)),
    }
}

/// Annotate every token and text node with the set of tabs its position
/// flows from.
///
/// The walk threads a flow value left to right, starting from `{root}`. An
/// `at` unions its tab into the value; a token takes the value as its
/// annotation and consumes it. A `cond` whose tab is not yet assumed either
/// way analyzes both branches under refined assumptions and joins their
/// outgoing values by union. Bound sub-documents accumulate flow across all
/// their occurrences in the body and are re-analyzed under the accumulated
/// value, so shared documents need no fixed-point iteration.
pub fn analyze_flow(doc: &AnnDoc) -> AnnDoc {
    let mut pass = Flow { ctx: CondCtx::new(), flow_of: FxHashMap::default() };
    let root = TabSet::singleton(&Tab::root());
    let (doc, _) = pass.go(doc, Some(root));
    doc
}

struct Flow {
    ctx: CondCtx,
    flow_of: FxHashMap<DocVar, FlowVal>,
}

impl Flow {
    fn go(&mut self, doc: &AnnDoc, flow: FlowVal) -> (AnnDoc, FlowVal) {
        match doc.inner() {
            AnnInner::Empty | AnnInner::Space | AnnInner::NoSpace | AnnInner::Newline => {
                (doc.clone(), flow)
            }
            AnnInner::Token { tok, .. } => (AnnDoc::token(flow, tok.clone()), None),
            AnnInner::Text { text, .. } => (AnnDoc::text(flow, text.clone()), None),
            AnnInner::Concat(a, b) => {
                let (a, flow) = self.go(a, flow);
                let (b, flow) = self.go(b, flow);
                (a.concat(b), flow)
            }
            AnnInner::At { might_be_first, tab, body } => {
                let extended = match flow {
                    None => TabSet::singleton(tab),
                    Some(set) => set.insert(tab),
                };
                let (body, _) = self.go(body, Some(extended));
                (AnnDoc::at(*might_be_first, tab.clone(), body), None)
            }
            AnnInner::NewTab { tab, body } => {
                let (body, out) = self.go(body, flow);
                (AnnDoc::new_tab(tab.clone(), body), out)
            }
            AnnInner::Cond { tab, inactive, active } => match self.ctx.lookup(tab) {
                Some(Activation::Active) => {
                    let (active, out) = self.go(active, flow);
                    (AnnDoc::cond(tab.clone(), inactive.clone(), active), out)
                }
                Some(Activation::Inactive) => {
                    let (inactive, out) = self.go(inactive, flow);
                    (AnnDoc::cond(tab.clone(), inactive, active.clone()), out)
                }
                None => {
                    self.ctx.assume(tab, Activation::Inactive);
                    let (inactive, out_inactive) = self.go(inactive, flow.clone());
                    self.ctx.retract();
                    self.ctx.assume(tab, Activation::Active);
                    let (active, out_active) = self.go(active, flow);
                    self.ctx.retract();
                    let out = union_flow(out_inactive, out_active);
                    (AnnDoc::cond(tab.clone(), inactive, active), out)
                }
            },
            AnnInner::Let { var, bound, body } => {
                self.flow_of.insert(*var, None);
                let (body, out) = self.go(body, flow);
                let accumulated = self.flow_of.get(var).cloned().unwrap_or(None);
                let (bound, _) = self.go(bound, accumulated);
                (AnnDoc::letdoc(*var, bound, body), out)
            }
            AnnInner::Var(var) => {
                let entry = self.flow_of.entry(*var).or_insert(None);
                *entry = union_flow(entry.take(), flow);
                (doc.clone(), None)
            }
        }
    }
}
