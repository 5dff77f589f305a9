// Copyright 2025 Cameron Swords
// SPDX-License-Identifier: Apache-2.0

use rustc_hash::FxHashMap;

use crate::ann::{AnnDoc, AnnInner};
use crate::stringdoc::{self, StringDoc};
use crate::tab::{DocVar, Style, Tab};
use crate::token::Token;

// -------------------------------------------------------------------------------------------------
// Lowering
// -------------------------------------------------------------------------------------------------

/// Translate the fully annotated document to the string-document algebra.
///
/// Every tab of the input is mapped to a fresh lowered tab as its `newtab`
/// scope is entered; a lookup miss means the document referenced a tab
/// outside its scope, which is a bug in the document builder. Bound
/// sub-documents are lowered once and the lowered value is spliced at every
/// occurrence, since the downstream algebra has no sharing construct.
pub fn lower(tab_width: usize, doc: &AnnDoc) -> StringDoc {
    let mut pass = Lower {
        tab_width,
        tab_map: FxHashMap::default(),
        var_map: FxHashMap::default(),
    };
    let root = stringdoc::Tab::root();
    pass.tab_map.insert(Tab::root(), root.clone());
    pass.go(doc, &root)
}

struct Lower {
    tab_width: usize,
    tab_map: FxHashMap<Tab, stringdoc::Tab>,
    var_map: FxHashMap<DocVar, StringDoc>,
}

impl Lower {
    fn mapped(&self, tab: &Tab) -> stringdoc::Tab {
        self.tab_map.get(tab).expect("tab out of scope during lowering").clone()
    }

    fn go(&mut self, doc: &AnnDoc, current: &stringdoc::Tab) -> StringDoc {
        match doc.inner() {
            AnnInner::Empty | AnnInner::NoSpace => StringDoc::empty(),
            AnnInner::Space => StringDoc::space(),
            AnnInner::Newline => StringDoc::newline(),
            AnnInner::Text { text, .. } => StringDoc::text(text.clone()),
            AnnInner::Token { flow, tok } => {
                let current = match flow {
                    Some(set) => self.mapped(set.first().expect("token flow set is empty")),
                    None => current.clone(),
                };
                self.lower_token(&current, tok)
            }
            AnnInner::Concat(a, b) => {
                let a = self.go(a, current);
                let b = self.go(b, current);
                a.concat(b)
            }
            AnnInner::At { tab, body, .. } => {
                let tab = self.mapped(tab);
                let body = self.go(body, &tab);
                StringDoc::at(&tab, body)
            }
            AnnInner::Cond { tab, inactive, active } => {
                let tab = self.mapped(tab);
                let inactive = self.go(inactive, current);
                let active = self.go(active, current);
                StringDoc::cond(&tab, inactive, active)
            }
            AnnInner::NewTab { tab, body } => {
                let parent = self.mapped(tab.parent().expect("new-tab node holds the root"));
                let style = tab.style().expect("new-tab node holds the root");
                StringDoc::new_tab(&parent, style, |fresh| {
                    self.tab_map.insert(tab.clone(), fresh.clone());
                    self.go(body, current)
                })
            }
            AnnInner::Let { var, bound, body } => {
                let bound = self.go(bound, current);
                self.var_map.insert(*var, bound);
                self.go(body, current)
            }
            AnnInner::Var(var) => {
                self.var_map.get(var).expect("doc var used before its binding").clone()
            }
        }
    }

    // A single-line token is plain text. A multi-line token keeps its own
    // internal layout: each continuation line is stripped of the indentation
    // the token already had in the source, then the lines are pinned to a
    // fresh rigid sub-tab so they move as one block.
    fn lower_token(&mut self, current: &stringdoc::Tab, tok: &Token) -> StringDoc {
        let span = tok.span();
        let text = span.text();
        if !text.contains('\n') {
            return StringDoc::text(text);
        }
        let (line, col) = span.start_position();
        let line_text = span.source().line_text(line);
        let offset = effective_offset(self.tab_width, &line_text[..col - 1]);
        let tab_width = self.tab_width;
        StringDoc::new_tab(current, Style::RigidInplace, |tab| {
            let mut out = StringDoc::empty();
            for (i, line) in text.split('\n').enumerate() {
                let line = if i == 0 {
                    line
                } else {
                    strip_effective_whitespace(tab_width, offset, line)
                };
                out = out.concat(StringDoc::at(tab, StringDoc::text(line)));
            }
            out
        })
    }
}

// -------------------------------------------------------------------------------------------------
// Effective Whitespace
// -------------------------------------------------------------------------------------------------

/// The on-screen width of a line prefix, expanding each literal tab to the
/// next multiple of `tab_width`.
pub(crate) fn effective_offset(tab_width: usize, prefix: &str) -> usize {
    let mut col = 0;
    for c in prefix.chars() {
        if c == '\t' {
            col = (col / tab_width + 1) * tab_width;
        } else {
            col += 1;
        }
    }
    col
}

/// Strip leading whitespace from `line` worth at most `remove_at_most`
/// effective columns. A tab that would overshoot the budget is kept.
pub(crate) fn strip_effective_whitespace(
    tab_width: usize,
    remove_at_most: usize,
    line: &str,
) -> &str {
    let mut budget = remove_at_most;
    let mut col = 0;
    let mut idx = 0;
    for (i, c) in line.char_indices() {
        let cost = match c {
            ' ' => 1,
            '\t' => (col / tab_width + 1) * tab_width - col,
            _ => break,
        };
        if cost > budget {
            break;
        }
        budget -= cost;
        col += cost;
        idx = i + c.len_utf8();
    }
    &line[idx..]
}
