// Copyright 2025 Cameron Swords
// SPDX-License-Identifier: Apache-2.0

//! Test support: a tiny tokenizer and IR walkers.
//!
//! The core performs no lexing, so the tests bring their own: words split on
//! whitespace, `#` line comments and `(* ... *)` block comments (which may
//! span lines). Just enough surface to exercise comment weaving, blank-line
//! reconstruction and multi-line token lowering.

use crate::ann::{AnnDoc, AnnInner, TabSet};
use crate::stringdoc::{Inner, StringDoc};
use crate::token::{Source, Token, TokenKind, TokenStream};

pub fn tokenize(source: &Source) -> TokenStream {
    let text = source.text();
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let start = i;
        if bytes[i].is_ascii_whitespace() {
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            tokens.push((TokenKind::Whitespace, start, i));
        } else if bytes[i] == b'#' {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
            tokens.push((TokenKind::Comment, start, i));
        } else if text[i..].starts_with("(*") {
            i += 2;
            while i < bytes.len() && !text[i..].starts_with("*)") {
                i += 1;
            }
            i = (i + 2).min(bytes.len());
            tokens.push((TokenKind::Comment, start, i));
        } else {
            while i < bytes.len()
                && !bytes[i].is_ascii_whitespace()
                && bytes[i] != b'#'
                && !text[i..].starts_with("(*")
            {
                i += 1;
            }
            tokens.push((TokenKind::Content, start, i));
        }
    }
    TokenStream::new(source, tokens)
}

/// The content tokens of `text`, in textual order.
pub fn content_tokens(text: &str) -> Vec<Token> {
    let source = Source::new(text);
    tokenize(&source)
        .tokens()
        .filter(|t| t.kind() == TokenKind::Content)
        .collect()
}

/// In-order `(text, flow)` of every token node; a binding is visited once,
/// before the body that uses it.
pub fn token_flows(doc: &AnnDoc) -> Vec<(String, Option<TabSet>)> {
    fn go(doc: &AnnDoc, out: &mut Vec<(String, Option<TabSet>)>) {
        match doc.inner() {
            AnnInner::Empty
            | AnnInner::Space
            | AnnInner::NoSpace
            | AnnInner::Newline
            | AnnInner::Text { .. }
            | AnnInner::Var(_) => {}
            AnnInner::Token { flow, tok } => out.push((tok.text().to_string(), flow.clone())),
            AnnInner::Concat(a, b) => {
                go(a, out);
                go(b, out);
            }
            AnnInner::At { body, .. } | AnnInner::NewTab { body, .. } => go(body, out),
            AnnInner::Cond { inactive, active, .. } => {
                go(inactive, out);
                go(active, out);
            }
            AnnInner::Let { bound, body, .. } => {
                go(bound, out);
                go(body, out);
            }
        }
    }
    let mut out = Vec::new();
    go(doc, &mut out);
    out
}

/// In-order text leaves of a lowered document.
pub fn string_texts(doc: &StringDoc) -> Vec<String> {
    fn go(doc: &StringDoc, out: &mut Vec<String>) {
        match doc.inner() {
            Inner::Empty | Inner::Space | Inner::Newline => {}
            Inner::Text(text) => out.push(text.clone()),
            Inner::Concat(a, b) => {
                go(a, out);
                go(b, out);
            }
            Inner::At(_, body) | Inner::NewTab { body, .. } => go(body, out),
            Inner::Cond { inactive, active, .. } => {
                go(inactive, out);
                go(active, out);
            }
        }
    }
    let mut out = Vec::new();
    go(doc, &mut out);
    out
}
