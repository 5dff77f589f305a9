// Copyright 2025 Cameron Swords
// SPDX-License-Identifier: Apache-2.0

use crate::ann::{AnnDoc, AnnInner};

// -------------------------------------------------------------------------------------------------
// Blank-Line Reconstruction
// -------------------------------------------------------------------------------------------------

/// Reconstruct the blank lines the original source had between tokens.
///
/// A token whose previous non-whitespace token ends more than one line above
/// it gets up to two conditional newlines prepended, each guarded by the
/// token's representative flow tab: the blank lines reappear exactly when
/// the token actually breaks onto that tab. Tokens without a flow set, or
/// with nothing before them, are left alone.
pub fn insert_blank_lines(doc: &AnnDoc) -> AnnDoc {
    match doc.inner() {
        AnnInner::Empty
        | AnnInner::Space
        | AnnInner::NoSpace
        | AnnInner::Newline
        | AnnInner::Text { .. }
        | AnnInner::Var(_)
        | AnnInner::Token { flow: None, .. } => doc.clone(),
        AnnInner::Token { flow: Some(set), tok } => {
            let Some(prev) = tok.prev_token_not_whitespace() else {
                return doc.clone();
            };
            let blanks = (prev.line_difference(tok) - 1).clamp(0, 2);
            if blanks == 0 {
                return doc.clone();
            }
            let tab = set.first().expect("token flow set is empty");
            let mut out = AnnDoc::empty();
            for _ in 0..blanks {
                out = out.concat(AnnDoc::cond(tab.clone(), AnnDoc::empty(), AnnDoc::newline()));
            }
            out.concat(doc.clone())
        }
        AnnInner::Concat(a, b) => insert_blank_lines(a).concat(insert_blank_lines(b)),
        AnnInner::At { might_be_first, tab, body } => {
            AnnDoc::at(*might_be_first, tab.clone(), insert_blank_lines(body))
        }
        AnnInner::NewTab { tab, body } => AnnDoc::new_tab(tab.clone(), insert_blank_lines(body)),
        AnnInner::Cond { tab, inactive, active } => {
            AnnDoc::cond(tab.clone(), insert_blank_lines(inactive), insert_blank_lines(active))
        }
        AnnInner::Let { var, bound, body } => {
            AnnDoc::letdoc(*var, insert_blank_lines(bound), insert_blank_lines(body))
        }
    }
}
