// Copyright 2025 Cameron Swords
// SPDX-License-Identifier: Apache-2.0

//! The lowered string-document algebra.
//!
//! This is the surface the core hands off to: a document over literal text
//! fragments and tabs, with no tokens, no flow sets and no sharing. Picking
//! the tabs' columns and rendering to text is the downstream layout engine's
//! job; this module only provides the constructors and a structural display.

use std::cmp::Ordering as CmpOrdering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use once_cell::unsync::Lazy;
use rustc_hash::FxHashMap;

use crate::tab::Style;

// -------------------------------------------------------------------------------------------------
// Tabs
// -------------------------------------------------------------------------------------------------

static NEXT_TAB_ID: AtomicU64 = AtomicU64::new(1);

/// A tab of the lowered algebra. Distinct from [`crate::Tab`]: lowering maps
/// one onto the other.
pub struct Tab(Rc<TabInner>);

enum TabInner {
    Root,
    Tab { id: u64, style: Style, parent: Tab },
}

thread_local! {
    static ROOT_INNER: Lazy<Rc<TabInner>> = Lazy::new(|| Rc::new(TabInner::Root));
}

impl Tab {
    pub fn root() -> Tab {
        ROOT_INNER.with(|lazy| Tab(Rc::clone(lazy)))
    }

    fn fresh(parent: &Tab, style: Style) -> Tab {
        let id = NEXT_TAB_ID.fetch_add(1, Ordering::Relaxed);
        Tab(Rc::new(TabInner::Tab { id, style, parent: parent.clone() }))
    }

    pub fn id(&self) -> u64 {
        match &*self.0 {
            TabInner::Root => 0,
            TabInner::Tab { id, .. } => *id,
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(&*self.0, TabInner::Root)
    }

    pub fn style(&self) -> Option<Style> {
        match &*self.0 {
            TabInner::Root => None,
            TabInner::Tab { style, .. } => Some(*style),
        }
    }

    pub fn parent(&self) -> Option<&Tab> {
        match &*self.0 {
            TabInner::Root => None,
            TabInner::Tab { parent, .. } => Some(parent),
        }
    }
}

impl Clone for Tab {
    fn clone(&self) -> Self {
        Tab(Rc::clone(&self.0))
    }
}

impl PartialEq for Tab {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Tab {}

impl PartialOrd for Tab {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tab {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        self.id().cmp(&other.id())
    }
}

impl Hash for Tab {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Debug for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "root")
        } else {
            write!(f, "tab#{}", self.id())
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Documents
// -------------------------------------------------------------------------------------------------

/// A lowered string document.
pub struct StringDoc(Rc<Inner>);

pub(crate) enum Inner {
    Empty,
    Space,
    Newline,
    Text(String),
    Concat(StringDoc, StringDoc),
    At(Tab, StringDoc),
    Cond { tab: Tab, inactive: StringDoc, active: StringDoc },
    NewTab { tab: Tab, body: StringDoc },
}

impl Inner {
    fn to_doc(self) -> StringDoc {
        StringDoc(Rc::new(self))
    }
}

impl Clone for StringDoc {
    fn clone(&self) -> Self {
        StringDoc(Rc::clone(&self.0))
    }
}

thread_local! {
    static EMPTY_INNER: Lazy<Rc<Inner>> = Lazy::new(|| Rc::new(Inner::Empty));
    static SPACE_INNER: Lazy<Rc<Inner>> = Lazy::new(|| Rc::new(Inner::Space));
    static NEWLINE_INNER: Lazy<Rc<Inner>> = Lazy::new(|| Rc::new(Inner::Newline));
}

impl StringDoc {
    pub fn empty() -> StringDoc {
        EMPTY_INNER.with(|lazy| StringDoc(Rc::clone(lazy)))
    }

    pub fn space() -> StringDoc {
        SPACE_INNER.with(|lazy| StringDoc(Rc::clone(lazy)))
    }

    pub fn newline() -> StringDoc {
        NEWLINE_INNER.with(|lazy| StringDoc(Rc::clone(lazy)))
    }

    pub fn text<S: Into<String>>(text: S) -> StringDoc {
        Inner::Text(text.into()).to_doc()
    }

    /// Sequential composition; `Empty` is absorbed on either side.
    pub fn concat(self, other: StringDoc) -> StringDoc {
        if matches!(&*self.0, Inner::Empty) {
            return other;
        }
        if matches!(&*other.0, Inner::Empty) {
            return self;
        }
        Inner::Concat(self, other).to_doc()
    }

    pub fn at(tab: &Tab, doc: StringDoc) -> StringDoc {
        Inner::At(tab.clone(), doc).to_doc()
    }

    pub fn cond(tab: &Tab, inactive: StringDoc, active: StringDoc) -> StringDoc {
        Inner::Cond { tab: tab.clone(), inactive, active }.to_doc()
    }

    /// Allocate a fresh lowered tab under `parent` and scope it over the
    /// document `f` builds with it.
    pub fn new_tab<F>(parent: &Tab, style: Style, f: F) -> StringDoc
    where
        F: FnOnce(&Tab) -> StringDoc,
    {
        let tab = Tab::fresh(parent, style);
        let body = f(&tab);
        Inner::NewTab { tab, body }.to_doc()
    }

    pub(crate) fn inner(&self) -> &Inner {
        &self.0
    }
}

// -------------------------------------------------------------------------------------------------
// Display
// -------------------------------------------------------------------------------------------------

// Tabs are named by first encounter so the display is independent of the
// global id counter.
fn tab_name(names: &mut FxHashMap<u64, usize>, tab: &Tab) -> String {
    if tab.is_root() {
        "root".to_string()
    } else {
        let next = names.len();
        let n = *names.entry(tab.id()).or_insert(next);
        format!("t{n}")
    }
}

fn push_lines(doc: &StringDoc, indent: usize, names: &mut FxHashMap<u64, usize>, out: &mut Vec<String>) {
    let pad = "  ".repeat(indent);
    match &*doc.0 {
        Inner::Empty => out.push(format!("{pad}empty")),
        Inner::Space => out.push(format!("{pad}space")),
        Inner::Newline => out.push(format!("{pad}newline")),
        Inner::Text(text) => out.push(format!("{pad}text {text:?}")),
        Inner::Concat(_, _) => {
            out.push(format!("{pad}concat"));
            fn flat(
                doc: &StringDoc,
                indent: usize,
                names: &mut FxHashMap<u64, usize>,
                out: &mut Vec<String>,
            ) {
                if let Inner::Concat(a, b) = &*doc.0 {
                    flat(a, indent, names, out);
                    flat(b, indent, names, out);
                } else {
                    push_lines(doc, indent, names, out);
                }
            }
            flat(doc, indent + 1, names, out);
        }
        Inner::At(tab, body) => {
            let tab = tab_name(names, tab);
            out.push(format!("{pad}at {tab}"));
            push_lines(body, indent + 1, names, out);
        }
        Inner::Cond { tab, inactive, active } => {
            let tab = tab_name(names, tab);
            out.push(format!("{pad}cond {tab}"));
            out.push(format!("{pad}  inactive:"));
            push_lines(inactive, indent + 2, names, out);
            out.push(format!("{pad}  active:"));
            push_lines(active, indent + 2, names, out);
        }
        Inner::NewTab { tab, body } => {
            let style = tab.style().expect("new-tab node holds the root");
            let tab = tab_name(names, tab);
            out.push(format!("{pad}newtab {tab} {style}"));
            push_lines(body, indent + 1, names, out);
        }
    }
}

impl fmt::Display for StringDoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = FxHashMap::default();
        let mut out = Vec::new();
        push_lines(self, 0, &mut names, &mut out);
        write!(f, "{}", out.join("\n"))
    }
}
