// Copyright 2025 Cameron Swords
// SPDX-License-Identifier: Apache-2.0

use rustc_hash::FxHashMap;

use crate::ann::{AnnDoc, AnnInner};
use crate::flow::{Activation, CondCtx};
use crate::tab::{DocVar, Tab};

// -------------------------------------------------------------------------------------------------
// Edges
// -------------------------------------------------------------------------------------------------

/// What a document emits at its left or right boundary.
///
/// `Spacey` means whitespace under every live branch; `MaybeNotSpacey` means
/// some branch may emit non-whitespace there. A document with no edge at all
/// (empties, inert conditionals) is `None` at the `Option` level.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Edge {
    Spacey,
    MaybeNotSpacey,
}

// Branch meet for edges under an unresolved conditional.
fn combine_edges(a: Option<Edge>, b: Option<Edge>) -> Option<Edge> {
    match (a, b) {
        (Some(Edge::MaybeNotSpacey), _) | (_, Some(Edge::MaybeNotSpacey)) => {
            Some(Edge::MaybeNotSpacey)
        }
        (Some(Edge::Spacey), Some(Edge::Spacey)) => Some(Edge::Spacey),
        _ => None,
    }
}

// -------------------------------------------------------------------------------------------------
// Space Insertion
// -------------------------------------------------------------------------------------------------

/// Insert explicit spaces wherever two adjacent emitted pieces could abut
/// without whitespace.
///
/// A non-first `at` counts as a guaranteed separator unless its tab is
/// assumed inactive, in which case the node is positionally inert and shows
/// its body's edge instead. Conditionals are met conservatively: a space is
/// only omitted when every live branch already supplies one. Occurrences of
/// a bound sub-document OR-accumulate their needs, and the binding is
/// rewritten once under the accumulated flags.
pub fn ensure_spaces(doc: &AnnDoc) -> AnnDoc {
    ensure_spaces_with_table(doc).0
}

/// Like [`ensure_spaces`], also returning the per-variable need flags
/// observed across all occurrences.
pub(crate) fn ensure_spaces_with_table(
    doc: &AnnDoc,
) -> (AnnDoc, FxHashMap<DocVar, (bool, bool)>) {
    let mut pass = Spaces {
        ctx: CondCtx::new(),
        var_edges: FxHashMap::default(),
        var_space: FxHashMap::default(),
    };
    let doc = pass.rewrite(doc, (false, false));
    (doc, pass.var_space)
}

struct Spaces {
    ctx: CondCtx,
    var_edges: FxHashMap<DocVar, (Option<Edge>, Option<Edge>)>,
    var_space: FxHashMap<DocVar, (bool, bool)>,
}

impl Spaces {
    // The edge a non-first at presents: the break itself is the separator
    // except under a known-inactive tab. A first at guarantees nothing.
    fn at_edge(&mut self, might_be_first: bool, tab: &Tab, body: &AnnDoc) -> Option<Edge> {
        match self.ctx.lookup(tab) {
            Some(Activation::Inactive) => self.left_edge(body),
            _ => {
                if might_be_first {
                    None
                } else {
                    Some(Edge::Spacey)
                }
            }
        }
    }

    fn left_edge(&mut self, doc: &AnnDoc) -> Option<Edge> {
        match doc.inner() {
            AnnInner::Empty => None,
            AnnInner::Space | AnnInner::NoSpace | AnnInner::Newline => Some(Edge::Spacey),
            AnnInner::Token { .. } | AnnInner::Text { .. } => Some(Edge::MaybeNotSpacey),
            AnnInner::Concat(a, b) => {
                let left = self.left_edge(a);
                if left.is_some() {
                    left
                } else {
                    self.left_edge(b)
                }
            }
            AnnInner::At { might_be_first, tab, body } => self.at_edge(*might_be_first, tab, body),
            AnnInner::NewTab { body, .. } => self.left_edge(body),
            AnnInner::Cond { tab, inactive, active } => match self.ctx.lookup(tab) {
                Some(Activation::Active) => self.left_edge(active),
                Some(Activation::Inactive) => self.left_edge(inactive),
                None => {
                    let a = self.left_edge(inactive);
                    let b = self.left_edge(active);
                    combine_edges(a, b)
                }
            },
            AnnInner::Let { var, bound, body } => {
                self.ensure_var_edges(*var, bound);
                self.left_edge(body)
            }
            AnnInner::Var(var) => {
                self.var_edges.get(var).expect("doc var used before its binding").0
            }
        }
    }

    fn right_edge(&mut self, doc: &AnnDoc) -> Option<Edge> {
        match doc.inner() {
            AnnInner::Empty => None,
            AnnInner::Space | AnnInner::NoSpace | AnnInner::Newline => Some(Edge::Spacey),
            AnnInner::Token { .. } | AnnInner::Text { .. } => Some(Edge::MaybeNotSpacey),
            AnnInner::Concat(a, b) => {
                let right = self.right_edge(b);
                if right.is_some() {
                    right
                } else {
                    self.right_edge(a)
                }
            }
            AnnInner::At { might_be_first, tab, body } => {
                let right = self.right_edge(body);
                if right.is_some() {
                    right
                } else {
                    self.at_edge(*might_be_first, tab, body)
                }
            }
            AnnInner::NewTab { body, .. } => self.right_edge(body),
            AnnInner::Cond { tab, inactive, active } => match self.ctx.lookup(tab) {
                Some(Activation::Active) => self.right_edge(active),
                Some(Activation::Inactive) => self.right_edge(inactive),
                None => {
                    let a = self.right_edge(inactive);
                    let b = self.right_edge(active);
                    combine_edges(a, b)
                }
            },
            AnnInner::Let { var, bound, body } => {
                self.ensure_var_edges(*var, bound);
                self.right_edge(body)
            }
            AnnInner::Var(var) => {
                self.var_edges.get(var).expect("doc var used before its binding").1
            }
        }
    }

    fn ensure_var_edges(&mut self, var: DocVar, bound: &AnnDoc) {
        if !self.var_edges.contains_key(&var) {
            let left = self.left_edge(bound);
            let right = self.right_edge(bound);
            self.var_edges.insert(var, (left, right));
        }
    }

    fn rewrite(&mut self, doc: &AnnDoc, need: (bool, bool)) -> AnnDoc {
        let (need_before, need_after) = need;
        match doc.inner() {
            AnnInner::Empty => {
                if need_before || need_after {
                    AnnDoc::space()
                } else {
                    doc.clone()
                }
            }
            AnnInner::Space | AnnInner::NoSpace | AnnInner::Newline => doc.clone(),
            AnnInner::Token { .. } | AnnInner::Text { .. } => {
                let mut out = doc.clone();
                if need_before {
                    out = AnnDoc::space().concat(out);
                }
                if need_after {
                    out = out.concat(AnnDoc::space());
                }
                out
            }
            AnnInner::Concat(a, b) => {
                let a_rewritten = self.rewrite(a, (need_before, false));
                let sep = self.right_edge(a) == Some(Edge::MaybeNotSpacey);
                let b_rewritten = self.rewrite(b, (sep, need_after));
                a_rewritten.concat(b_rewritten)
            }
            AnnInner::At { might_be_first, tab, body } => {
                let suppressed =
                    !might_be_first && self.ctx.lookup(tab) != Some(Activation::Inactive);
                let body = self.rewrite(body, (false, need_after));
                let node = AnnDoc::at(*might_be_first, tab.clone(), body);
                if need_before && !suppressed {
                    AnnDoc::space().concat(node)
                } else {
                    node
                }
            }
            AnnInner::NewTab { tab, body } => {
                AnnDoc::new_tab(tab.clone(), self.rewrite(body, need))
            }
            AnnInner::Cond { tab, inactive, active } => match self.ctx.lookup(tab) {
                Some(Activation::Active) => {
                    let active = self.rewrite(active, need);
                    AnnDoc::cond(tab.clone(), inactive.clone(), active)
                }
                Some(Activation::Inactive) => {
                    let inactive = self.rewrite(inactive, need);
                    AnnDoc::cond(tab.clone(), inactive, active.clone())
                }
                None => {
                    self.ctx.assume(tab, Activation::Inactive);
                    let inactive = self.rewrite(inactive, need);
                    self.ctx.retract();
                    self.ctx.assume(tab, Activation::Active);
                    let active = self.rewrite(active, need);
                    self.ctx.retract();
                    AnnDoc::cond(tab.clone(), inactive, active)
                }
            },
            AnnInner::Let { var, bound, body } => {
                self.ensure_var_edges(*var, bound);
                self.var_space.entry(*var).or_default();
                let body = self.rewrite(body, need);
                let accumulated = *self.var_space.get(var).expect("var flags were just seeded");
                let bound = self.rewrite(bound, accumulated);
                AnnDoc::letdoc(*var, bound, body)
            }
            AnnInner::Var(var) => {
                let entry = self.var_space.entry(*var).or_default();
                entry.0 |= need_before;
                entry.1 |= need_after;
                doc.clone()
            }
        }
    }
}
