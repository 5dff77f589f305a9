// Copyright 2025 Cameron Swords
// SPDX-License-Identifier: Apache-2.0

use crate::ann::{AnnDoc, AnnInner, TabSet};
use crate::token::Token;

// -------------------------------------------------------------------------------------------------
// Comment Weaving
// -------------------------------------------------------------------------------------------------

/// Splice each token's attached comments into the document as siblings.
///
/// Leading comments land directly before their token, inside whatever `at`
/// context already positions it. Trailing comments (collected only for the
/// last content token, so every comment is picked up exactly once) are each
/// wrapped in an `at` on the token's representative flow tab, so they break
/// to the token's column. The flow analyzer must run again afterwards to
/// attribute the new nodes.
pub fn weave_comments(doc: &AnnDoc) -> AnnDoc {
    match doc.inner() {
        AnnInner::Empty
        | AnnInner::Space
        | AnnInner::NoSpace
        | AnnInner::Newline
        | AnnInner::Text { .. }
        | AnnInner::Var(_) => doc.clone(),
        AnnInner::Token { flow, tok } => weave_token(flow, tok),
        AnnInner::Concat(a, b) => weave_comments(a).concat(weave_comments(b)),
        AnnInner::At { might_be_first, tab, body } => {
            AnnDoc::at(*might_be_first, tab.clone(), weave_comments(body))
        }
        AnnInner::NewTab { tab, body } => AnnDoc::new_tab(tab.clone(), weave_comments(body)),
        AnnInner::Cond { tab, inactive, active } => {
            AnnDoc::cond(tab.clone(), weave_comments(inactive), weave_comments(active))
        }
        AnnInner::Let { var, bound, body } => {
            AnnDoc::letdoc(*var, weave_comments(bound), weave_comments(body))
        }
    }
}

fn weave_token(flow: &Option<TabSet>, tok: &Token) -> AnnDoc {
    let before = tok.comments_before();
    let after = if tok.is_last_content() { tok.comments_after() } else { Vec::new() };
    if before.is_empty() && after.is_empty() {
        return AnnDoc::token(flow.clone(), tok.clone());
    }

    let mut out = AnnDoc::empty();
    for comment in before {
        out = out.concat(AnnDoc::token(None, comment));
    }
    out = out.concat(AnnDoc::token(flow.clone(), tok.clone()));
    match flow {
        None => {
            // Unattributed token: trailing comments are plain siblings too.
            for comment in after {
                out = out.concat(AnnDoc::token(None, comment));
            }
        }
        Some(set) => {
            let tab = set.first().expect("token flow set is empty");
            for comment in after {
                out = out.concat(AnnDoc::at(false, tab.clone(), AnnDoc::token(None, comment)));
            }
        }
    }
    out
}
