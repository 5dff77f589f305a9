// Copyright 2025 Cameron Swords
// SPDX-License-Identifier: Apache-2.0

use rustc_hash::FxHashMap;

use crate::ann::{AnnDoc, TabSet};
use crate::doc::{Doc, DocInner};
use crate::tab::DocVar;

// -------------------------------------------------------------------------------------------------
// First-Occurrence Marking
// -------------------------------------------------------------------------------------------------

/// Lift an input document to the annotated IR, marking every `at` node with
/// whether it might be the first break onto its tab.
///
/// The walk carries the set of tabs already known to be broken onto. An `at`
/// whose tab is in that set cannot be the first break; otherwise it might be,
/// and the tab is considered broken for everything that follows. A `cond`
/// only keeps a tab in the set when both branches broke it. Bound
/// sub-documents are analyzed once with an empty set, and each occurrence
/// replays the tabs the binding breaks.
pub fn annotate(doc: &Doc) -> AnnDoc {
    let mut pass = Annotate { broken_of: FxHashMap::default() };
    let (ann, _) = pass.go(doc, &TabSet::empty());
    ann
}

struct Annotate {
    broken_of: FxHashMap<DocVar, TabSet>,
}

impl Annotate {
    fn go(&mut self, doc: &Doc, broken: &TabSet) -> (AnnDoc, TabSet) {
        match doc.inner() {
            DocInner::Empty => (AnnDoc::empty(), broken.clone()),
            DocInner::Space => (AnnDoc::space(), broken.clone()),
            DocInner::NoSpace => (AnnDoc::nospace(), broken.clone()),
            DocInner::Token(tok) => (AnnDoc::token(None, tok.clone()), broken.clone()),
            DocInner::Text(text) => (AnnDoc::text(None, text.clone()), broken.clone()),
            DocInner::Concat(a, b) => {
                let (a, broken) = self.go(a, broken);
                let (b, broken) = self.go(b, &broken);
                (a.concat(b), broken)
            }
            DocInner::At(tab, body) => {
                if broken.contains(tab) {
                    let (body, out) = self.go(body, broken);
                    (AnnDoc::at(false, tab.clone(), body), out)
                } else {
                    let broken = broken.insert(tab);
                    let (body, out) = self.go(body, &broken);
                    (AnnDoc::at(true, tab.clone(), body), out)
                }
            }
            DocInner::NewTab { tab, body } => {
                let (body, out) = self.go(body, broken);
                (AnnDoc::new_tab(tab.clone(), body), out)
            }
            DocInner::Cond { tab, inactive, active } => {
                let (inactive, broken_inactive) = self.go(inactive, broken);
                let (active, broken_active) = self.go(active, broken);
                let out = broken_inactive.intersection(&broken_active);
                (AnnDoc::cond(tab.clone(), inactive, active), out)
            }
            DocInner::Let { var, bound, body } => {
                let (bound, bound_broken) = self.go(bound, &TabSet::empty());
                self.broken_of.insert(*var, bound_broken);
                let (body, out) = self.go(body, broken);
                (AnnDoc::letdoc(*var, bound, body), out)
            }
            DocInner::Var(var) => {
                let known = self.broken_of.get(var).expect("doc var used before its binding");
                (AnnDoc::var(*var), broken.union(known))
            }
        }
    }
}
