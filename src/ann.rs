// Copyright 2025 Cameron Swords
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::rc::Rc;

use once_cell::unsync::Lazy;
use rustc_hash::FxHashMap;

use crate::tab::{DocVar, Tab};
use crate::token::Token;

// -------------------------------------------------------------------------------------------------
// Tab Sets
// -------------------------------------------------------------------------------------------------

/// An ordered set of tabs, kept sorted by id.
///
/// Flow values are `Option<TabSet>`: `None` means "not yet attributed" and is
/// the identity for union.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TabSet(Vec<Tab>);

impl TabSet {
    pub fn empty() -> TabSet {
        TabSet(Vec::new())
    }

    pub fn singleton(tab: &Tab) -> TabSet {
        TabSet(vec![tab.clone()])
    }

    pub fn contains(&self, tab: &Tab) -> bool {
        self.0.binary_search_by_key(&tab.id(), Tab::id).is_ok()
    }

    pub fn insert(&self, tab: &Tab) -> TabSet {
        match self.0.binary_search_by_key(&tab.id(), Tab::id) {
            Ok(_) => self.clone(),
            Err(pos) => {
                let mut tabs = self.0.clone();
                tabs.insert(pos, tab.clone());
                TabSet(tabs)
            }
        }
    }

    pub fn union(&self, other: &TabSet) -> TabSet {
        let mut out = Vec::with_capacity(self.0.len() + other.0.len());
        let (mut i, mut j) = (0, 0);
        while i < self.0.len() && j < other.0.len() {
            let (a, b) = (&self.0[i], &other.0[j]);
            if a.id() < b.id() {
                out.push(a.clone());
                i += 1;
            } else if b.id() < a.id() {
                out.push(b.clone());
                j += 1;
            } else {
                out.push(a.clone());
                i += 1;
                j += 1;
            }
        }
        out.extend_from_slice(&self.0[i..]);
        out.extend_from_slice(&other.0[j..]);
        TabSet(out)
    }

    pub fn intersection(&self, other: &TabSet) -> TabSet {
        TabSet(self.0.iter().filter(|t| other.contains(t)).cloned().collect())
    }

    /// The member with the lowest id.
    pub fn first(&self) -> Option<&Tab> {
        self.0.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tab> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// -------------------------------------------------------------------------------------------------
// Annotated Documents
// -------------------------------------------------------------------------------------------------

/// The annotated document IR the pipeline's passes rewrite.
///
/// Same shape as the input [`Doc`](crate::Doc) with three additions: `At`
/// carries a might-be-first flag, tokens and texts carry an optional flow
/// set, and a `Newline` leaf exists for reconstructed blank lines.
pub struct AnnDoc(Rc<AnnInner>);

pub(crate) enum AnnInner {
    Empty,
    Space,
    NoSpace,
    Newline,
    Token { flow: Option<TabSet>, tok: Token },
    Text { flow: Option<TabSet>, text: String },
    Concat(AnnDoc, AnnDoc),
    At { might_be_first: bool, tab: Tab, body: AnnDoc },
    NewTab { tab: Tab, body: AnnDoc },
    Cond { tab: Tab, inactive: AnnDoc, active: AnnDoc },
    Let { var: DocVar, bound: AnnDoc, body: AnnDoc },
    Var(DocVar),
}

impl AnnInner {
    fn to_doc(self) -> AnnDoc {
        AnnDoc(Rc::new(self))
    }
}

impl Clone for AnnDoc {
    fn clone(&self) -> Self {
        AnnDoc(Rc::clone(&self.0))
    }
}

thread_local! {
    static EMPTY_INNER: Lazy<Rc<AnnInner>> = Lazy::new(|| Rc::new(AnnInner::Empty));
    static SPACE_INNER: Lazy<Rc<AnnInner>> = Lazy::new(|| Rc::new(AnnInner::Space));
    static NOSPACE_INNER: Lazy<Rc<AnnInner>> = Lazy::new(|| Rc::new(AnnInner::NoSpace));
    static NEWLINE_INNER: Lazy<Rc<AnnInner>> = Lazy::new(|| Rc::new(AnnInner::Newline));
}

impl AnnDoc {
    pub(crate) fn empty() -> AnnDoc {
        EMPTY_INNER.with(|lazy| AnnDoc(Rc::clone(lazy)))
    }

    pub(crate) fn space() -> AnnDoc {
        SPACE_INNER.with(|lazy| AnnDoc(Rc::clone(lazy)))
    }

    pub(crate) fn nospace() -> AnnDoc {
        NOSPACE_INNER.with(|lazy| AnnDoc(Rc::clone(lazy)))
    }

    pub(crate) fn newline() -> AnnDoc {
        NEWLINE_INNER.with(|lazy| AnnDoc(Rc::clone(lazy)))
    }

    pub(crate) fn token(flow: Option<TabSet>, tok: Token) -> AnnDoc {
        AnnInner::Token { flow, tok }.to_doc()
    }

    pub(crate) fn text(flow: Option<TabSet>, text: String) -> AnnDoc {
        AnnInner::Text { flow, text }.to_doc()
    }

    /// Sequential composition; `Empty` is absorbed on either side.
    pub(crate) fn concat(self, other: AnnDoc) -> AnnDoc {
        if matches!(&*self.0, AnnInner::Empty) {
            return other;
        }
        if matches!(&*other.0, AnnInner::Empty) {
            return self;
        }
        AnnInner::Concat(self, other).to_doc()
    }

    pub(crate) fn at(might_be_first: bool, tab: Tab, body: AnnDoc) -> AnnDoc {
        AnnInner::At { might_be_first, tab, body }.to_doc()
    }

    pub(crate) fn new_tab(tab: Tab, body: AnnDoc) -> AnnDoc {
        AnnInner::NewTab { tab, body }.to_doc()
    }

    pub(crate) fn cond(tab: Tab, inactive: AnnDoc, active: AnnDoc) -> AnnDoc {
        AnnInner::Cond { tab, inactive, active }.to_doc()
    }

    pub(crate) fn letdoc(var: DocVar, bound: AnnDoc, body: AnnDoc) -> AnnDoc {
        AnnInner::Let { var, bound, body }.to_doc()
    }

    pub(crate) fn var(var: DocVar) -> AnnDoc {
        AnnInner::Var(var).to_doc()
    }

    pub(crate) fn inner(&self) -> &AnnInner {
        &self.0
    }
}

// -------------------------------------------------------------------------------------------------
// Display
// -------------------------------------------------------------------------------------------------

// The tree printer names tabs and vars by first encounter (t0, t1, ... and
// v0, v1, ...) so the output does not depend on the global id counters.
#[derive(Default)]
pub(crate) struct IdNames {
    tabs: FxHashMap<u64, usize>,
    vars: FxHashMap<u64, usize>,
}

impl IdNames {
    pub(crate) fn tab(&mut self, tab: &Tab) -> String {
        if tab.is_root() {
            "root".to_string()
        } else {
            let next = self.tabs.len();
            let n = *self.tabs.entry(tab.id()).or_insert(next);
            format!("t{n}")
        }
    }

    pub(crate) fn var(&mut self, var: DocVar) -> String {
        let next = self.vars.len();
        let n = *self.vars.entry(var.id()).or_insert(next);
        format!("v{n}")
    }
}

pub(crate) fn flow_label(names: &mut IdNames, flow: &Option<TabSet>) -> String {
    match flow {
        None => String::new(),
        Some(set) => {
            let tabs: Vec<String> = set.iter().map(|t| names.tab(t)).collect();
            format!(" {{{}}}", tabs.join(", "))
        }
    }
}

fn push_lines(doc: &AnnDoc, indent: usize, names: &mut IdNames, out: &mut Vec<String>) {
    let pad = "  ".repeat(indent);
    match doc.inner() {
        AnnInner::Empty => out.push(format!("{pad}empty")),
        AnnInner::Space => out.push(format!("{pad}space")),
        AnnInner::NoSpace => out.push(format!("{pad}nospace")),
        AnnInner::Newline => out.push(format!("{pad}newline")),
        AnnInner::Token { flow, tok } => {
            let label = flow_label(names, flow);
            out.push(format!("{pad}token {:?}{label}", tok.text()));
        }
        AnnInner::Text { flow, text } => {
            let label = flow_label(names, flow);
            out.push(format!("{pad}text {text:?}{label}"));
        }
        AnnInner::Concat(_, _) => {
            out.push(format!("{pad}concat"));
            fn flat(doc: &AnnDoc, indent: usize, names: &mut IdNames, out: &mut Vec<String>) {
                if let AnnInner::Concat(a, b) = doc.inner() {
                    flat(a, indent, names, out);
                    flat(b, indent, names, out);
                } else {
                    push_lines(doc, indent, names, out);
                }
            }
            flat(doc, indent + 1, names, out);
        }
        AnnInner::At { might_be_first, tab, body } => {
            let tab = names.tab(tab);
            let first = if *might_be_first { " first" } else { "" };
            out.push(format!("{pad}at {tab}{first}"));
            push_lines(body, indent + 1, names, out);
        }
        AnnInner::NewTab { tab, body } => {
            let style = tab.style().expect("new-tab node holds the root");
            let tab = names.tab(tab);
            out.push(format!("{pad}newtab {tab} {style}"));
            push_lines(body, indent + 1, names, out);
        }
        AnnInner::Cond { tab, inactive, active } => {
            let tab = names.tab(tab);
            out.push(format!("{pad}cond {tab}"));
            out.push(format!("{pad}  inactive:"));
            push_lines(inactive, indent + 2, names, out);
            out.push(format!("{pad}  active:"));
            push_lines(active, indent + 2, names, out);
        }
        AnnInner::Let { var, bound, body } => {
            let var = names.var(*var);
            out.push(format!("{pad}let {var}"));
            out.push(format!("{pad}  bound:"));
            push_lines(bound, indent + 2, names, out);
            out.push(format!("{pad}  body:"));
            push_lines(body, indent + 2, names, out);
        }
        AnnInner::Var(var) => {
            let var = names.var(*var);
            out.push(format!("{pad}var {var}"));
        }
    }
}

impl fmt::Display for AnnDoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = IdNames::default();
        let mut out = Vec::new();
        push_lines(self, 0, &mut names, &mut out);
        write!(f, "{}", out.join("\n"))
    }
}
