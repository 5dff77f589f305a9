// Copyright 2025 Cameron Swords
// SPDX-License-Identifier: Apache-2.0

use std::rc::Rc;

use once_cell::unsync::Lazy;

use crate::tab::{DocVar, Style, Tab};
use crate::token::Token;

// -------------------------------------------------------------------------------------------------
// Documents
// -------------------------------------------------------------------------------------------------

/// The input document algebra.
///
/// A `Doc` describes how tokens should be laid out relative to tabs; it is
/// what drivers build from a parse and what [`to_string_doc`](crate::to_string_doc)
/// consumes. Documents are immutable and cheaply cloneable.
pub struct Doc(Rc<DocInner>);

pub(crate) enum DocInner {
    Empty,
    Space,
    NoSpace,
    Token(Token),
    Text(String),
    Concat(Doc, Doc),
    At(Tab, Doc),
    NewTab { tab: Tab, body: Doc },
    Cond { tab: Tab, inactive: Doc, active: Doc },
    Let { var: DocVar, bound: Doc, body: Doc },
    Var(DocVar),
}

impl DocInner {
    fn to_doc(self) -> Doc {
        Doc(Rc::new(self))
    }
}

impl Clone for Doc {
    fn clone(&self) -> Self {
        Doc(Rc::clone(&self.0))
    }
}

// -----------------------------------------------
// Thread Locals
// -----------------------------------------------

thread_local! {
    static EMPTY_INNER: Lazy<Rc<DocInner>> = Lazy::new(|| Rc::new(DocInner::Empty));
    static SPACE_INNER: Lazy<Rc<DocInner>> = Lazy::new(|| Rc::new(DocInner::Space));
    static NOSPACE_INNER: Lazy<Rc<DocInner>> = Lazy::new(|| Rc::new(DocInner::NoSpace));
}

impl Doc {
    // -------------------------------------------
    // Core Constructors
    // -------------------------------------------

    /// The empty document; the identity element for [`Doc::concat`].
    pub fn empty() -> Doc {
        EMPTY_INNER.with(|lazy| Doc(Rc::clone(lazy)))
    }

    /// A mandatory space.
    pub fn space() -> Doc {
        SPACE_INNER.with(|lazy| Doc(Rc::clone(lazy)))
    }

    /// An explicit anti-space: suppresses any space the space ensurer would
    /// otherwise insert at this position, and is elided during lowering.
    pub fn nospace() -> Doc {
        NOSPACE_INNER.with(|lazy| Doc(Rc::clone(lazy)))
    }

    /// A source token.
    pub fn token(tok: Token) -> Doc {
        DocInner::Token(tok).to_doc()
    }

    /// A literal string fragment that is not a source token.
    pub fn text<S: Into<String>>(text: S) -> Doc {
        DocInner::Text(text.into()).to_doc()
    }

    /// Sequential composition. `Empty` is absorbed on either side.
    pub fn concat(self, other: Doc) -> Doc {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        DocInner::Concat(self, other).to_doc()
    }

    /// Place `doc` at `tab`'s column, breaking onto a new line if the tab is
    /// already active.
    pub fn at(tab: &Tab, doc: Doc) -> Doc {
        DocInner::At(tab.clone(), doc).to_doc()
    }

    /// Branch on whether `tab` becomes active in the final layout.
    pub fn cond(tab: &Tab, inactive: Doc, active: Doc) -> Doc {
        DocInner::Cond { tab: tab.clone(), inactive, active }.to_doc()
    }

    /// Allocate a fresh tab under `parent` and scope it over the document
    /// `f` builds with it.
    pub fn new_tab<F>(parent: &Tab, style: Style, f: F) -> Doc
    where
        F: FnOnce(&Tab) -> Doc,
    {
        let tab = Tab::fresh(parent, style);
        let body = f(&tab);
        DocInner::NewTab { tab, body }.to_doc()
    }

    /// Bind `bound` to a fresh variable shared by every occurrence `f`
    /// places in the body. All occurrences share one analyzed copy.
    pub fn letdoc<F>(bound: Doc, f: F) -> Doc
    where
        F: FnOnce(Doc) -> Doc,
    {
        let var = DocVar::fresh();
        let body = f(DocInner::Var(var).to_doc());
        DocInner::Let { var, bound, body }.to_doc()
    }

    fn is_empty(&self) -> bool {
        matches!(&*self.0, DocInner::Empty)
    }

    pub(crate) fn inner(&self) -> &DocInner {
        &self.0
    }
}
