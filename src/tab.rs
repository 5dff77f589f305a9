// Copyright 2025 Cameron Swords
// SPDX-License-Identifier: Apache-2.0

use std::cmp::Ordering as CmpOrdering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use once_cell::unsync::Lazy;

// -------------------------------------------------------------------------------------------------
// Styles
// -------------------------------------------------------------------------------------------------

/// Layout style of a tab.
///
/// The style tells the downstream layout engine what "breaking onto" the tab
/// means: `Inplace` pins the tab's column wherever the tab first lands,
/// `Indented` places it one indentation step under its parent (optionally at
/// least `min_indent` columns in), and the `Rigid*` variants do the same but
/// forbid the engine from reflowing content placed at the tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Inplace,
    Indented { min_indent: Option<usize> },
    RigidInplace,
    RigidIndented { min_indent: Option<usize> },
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Style::Inplace => write!(f, "inplace"),
            Style::Indented { min_indent: None } => write!(f, "indented"),
            Style::Indented { min_indent: Some(n) } => write!(f, "indented({n})"),
            Style::RigidInplace => write!(f, "rigid-inplace"),
            Style::RigidIndented { min_indent: None } => write!(f, "rigid-indented"),
            Style::RigidIndented { min_indent: Some(n) } => write!(f, "rigid-indented({n})"),
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Tabs
// -------------------------------------------------------------------------------------------------

// Ids are handed out by process-wide monotonic counters. Id 0 is reserved for
// the root sentinel, so allocation starts at 1.
static NEXT_TAB_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_VAR_ID: AtomicU64 = AtomicU64::new(0);

/// A dynamic indentation anchor.
///
/// A tab is an identity: two tabs are the same tab exactly when they came
/// from the same allocation. The root sentinel compares equal only to itself
/// and orders below every allocated tab. The column a tab ends up at is
/// chosen by the downstream layout engine; the core only ever asks a tab for
/// its id, style and parent.
pub struct Tab(Rc<TabInner>);

enum TabInner {
    Root,
    Tab { id: u64, style: Style, parent: Tab },
}

thread_local! {
    static ROOT_INNER: Lazy<Rc<TabInner>> = Lazy::new(|| Rc::new(TabInner::Root));
}

impl Tab {
    /// The root sentinel.
    pub fn root() -> Tab {
        ROOT_INNER.with(|lazy| Tab(Rc::clone(lazy)))
    }

    /// Allocate a fresh tab under `parent` with a strictly increasing id.
    pub fn fresh(parent: &Tab, style: Style) -> Tab {
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

    /// The tab's style; the root has none.
    pub fn style(&self) -> Option<Style> {
        match &*self.0 {
            TabInner::Root => None,
            TabInner::Tab { style, .. } => Some(*style),
        }
    }

    /// The tab's parent; the root has none.
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
// Document Variables
// -------------------------------------------------------------------------------------------------

/// The identity of a named sub-document bound by [`Doc::letdoc`](crate::Doc::letdoc).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocVar(u64);

impl DocVar {
    pub(crate) fn fresh() -> DocVar {
        DocVar(NEXT_VAR_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for DocVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "var#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_fresh_and_increasing() {
        let a = Tab::fresh(&Tab::root(), Style::Inplace);
        let b = Tab::fresh(&a, Style::RigidInplace);
        assert!(a.id() < b.id());
        assert_ne!(a, b);
        assert_eq!(b.parent(), Some(&a));
    }

    #[test]
    fn root_is_smallest_and_self_equal() {
        let a = Tab::fresh(&Tab::root(), Style::Indented { min_indent: None });
        assert_eq!(Tab::root(), Tab::root());
        assert!(Tab::root() < a);
        assert!(Tab::root().style().is_none());
        assert!(Tab::root().parent().is_none());
    }
}
