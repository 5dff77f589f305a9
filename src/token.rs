// Copyright 2025 Cameron Swords
// SPDX-License-Identifier: Apache-2.0

//! The token and source interface the core consumes.
//!
//! Lexing is not this crate's job: a driver builds a [`TokenStream`] over a
//! shared [`Source`] and hands [`Token`]s to the document constructors. The
//! core only asks tokens for their spans, their neighbours and the comments
//! attached to them.

use std::fmt;
use std::rc::Rc;

// -------------------------------------------------------------------------------------------------
// Sources
// -------------------------------------------------------------------------------------------------

/// A shared source file: the full text plus precomputed line starts.
pub struct Source(Rc<SourceInner>);

struct SourceInner {
    text: String,
    // Byte offset of the start of each line, in order; always starts with 0.
    line_starts: Vec<usize>,
}

impl Source {
    pub fn new<S: Into<String>>(text: S) -> Source {
        let text = text.into();
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Source(Rc::new(SourceInner { text, line_starts }))
    }

    pub fn text(&self) -> &str {
        &self.0.text
    }

    /// The 1-based `(line, col)` of a byte offset.
    pub fn position(&self, offset: usize) -> (usize, usize) {
        let line = match self.0.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        (line + 1, offset - self.0.line_starts[line] + 1)
    }

    /// The text of a 1-based line, without its trailing newline.
    pub fn line_text(&self, line: usize) -> &str {
        let start = self.0.line_starts[line - 1];
        let end = match self.0.line_starts.get(line) {
            Some(next) => next - 1,
            None => self.0.text.len(),
        };
        &self.0.text[start..end]
    }

    pub fn line_count(&self) -> usize {
        self.0.line_starts.len()
    }

    fn ptr_eq(&self, other: &Source) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Clone for Source {
    fn clone(&self) -> Self {
        Source(Rc::clone(&self.0))
    }
}

// -------------------------------------------------------------------------------------------------
// Spans
// -------------------------------------------------------------------------------------------------

/// A byte range into a [`Source`].
#[derive(Clone)]
pub struct Span {
    source: Source,
    start: usize,
    end: usize,
}

impl Span {
    pub fn new(source: &Source, start: usize, end: usize) -> Span {
        assert!(start <= end && end <= source.text().len(), "span out of bounds");
        Span { source: source.clone(), start, end }
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn text(&self) -> &str {
        &self.source.text()[self.start..self.end]
    }

    /// 1-based `(line, col)` of the span's first byte.
    pub fn start_position(&self) -> (usize, usize) {
        self.source.position(self.start)
    }

    /// 1-based line of the span's first byte.
    pub fn start_line(&self) -> usize {
        self.start_position().0
    }

    /// 1-based line of the span's last byte (the start line if empty).
    pub fn end_line(&self) -> usize {
        if self.end == self.start {
            self.start_line()
        } else {
            self.source.position(self.end - 1).0
        }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{}..{}", self.text(), self.start, self.end)
    }
}

// -------------------------------------------------------------------------------------------------
// Token Streams
// -------------------------------------------------------------------------------------------------

/// What the core needs to know about a token.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TokenKind {
    /// A token that carries program text.
    Content,
    /// A comment token.
    Comment,
    /// A run of whitespace.
    Whitespace,
}

/// The token sequence of one source file, in textual order.
pub struct TokenStream(Rc<StreamInner>);

struct StreamInner {
    source: Source,
    tokens: Vec<(TokenKind, usize, usize)>,
}

impl TokenStream {
    /// Build a stream from `(kind, start, end)` byte ranges, which must be in
    /// textual order.
    pub fn new(source: &Source, tokens: Vec<(TokenKind, usize, usize)>) -> TokenStream {
        for window in tokens.windows(2) {
            assert!(window[0].2 <= window[1].1, "tokens out of order");
        }
        TokenStream(Rc::new(StreamInner { source: source.clone(), tokens }))
    }

    pub fn len(&self) -> usize {
        self.0.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Token> {
        if index < self.len() {
            Some(Token { stream: self.clone(), index })
        } else {
            None
        }
    }

    pub fn tokens(&self) -> impl Iterator<Item = Token> + '_ {
        (0..self.len()).map(|index| Token { stream: self.clone(), index })
    }

    pub fn source(&self) -> &Source {
        &self.0.source
    }
}

impl Clone for TokenStream {
    fn clone(&self) -> Self {
        TokenStream(Rc::clone(&self.0))
    }
}

// -------------------------------------------------------------------------------------------------
// Tokens
// -------------------------------------------------------------------------------------------------

/// A handle to one token of a [`TokenStream`].
///
/// Tokens are identities: two handles are equal when they point at the same
/// index of the same stream.
#[derive(Clone)]
pub struct Token {
    stream: TokenStream,
    index: usize,
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        self.stream.0.tokens[self.index].0
    }

    pub fn span(&self) -> Span {
        let (_, start, end) = self.stream.0.tokens[self.index];
        Span::new(self.stream.source(), start, end)
    }

    pub fn text(&self) -> &str {
        let (_, start, end) = self.stream.0.tokens[self.index];
        &self.stream.source().text()[start..end]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_whitespace(&self) -> bool {
        self.kind() == TokenKind::Whitespace
    }

    pub fn is_comment(&self) -> bool {
        self.kind() == TokenKind::Comment
    }

    /// 1-based line the token starts on.
    pub fn line(&self) -> usize {
        self.span().start_line()
    }

    /// 1-based line the token ends on.
    pub fn end_line(&self) -> usize {
        self.span().end_line()
    }

    pub fn prev_token(&self) -> Option<Token> {
        if self.index == 0 {
            None
        } else {
            self.stream.get(self.index - 1)
        }
    }

    pub fn next_token(&self) -> Option<Token> {
        self.stream.get(self.index + 1)
    }

    /// The nearest preceding token that is not whitespace.
    pub fn prev_token_not_whitespace(&self) -> Option<Token> {
        let mut cur = self.prev_token();
        while let Some(tok) = cur {
            if !tok.is_whitespace() {
                return Some(tok);
            }
            cur = tok.prev_token();
        }
        None
    }

    /// The nearest following token that is neither a comment nor whitespace.
    pub fn next_token_not_comment_or_whitespace(&self) -> Option<Token> {
        let mut cur = self.next_token();
        while let Some(tok) = cur {
            if tok.kind() == TokenKind::Content {
                return Some(tok);
            }
            cur = tok.next_token();
        }
        None
    }

    /// Whether no content token follows this one.
    pub fn is_last_content(&self) -> bool {
        self.next_token_not_comment_or_whitespace().is_none()
    }

    /// The contiguous run of comments directly before this token, in textual
    /// order. Whitespace between the comments and the token is skipped; any
    /// content token ends the run.
    pub fn comments_before(&self) -> Vec<Token> {
        let mut out = Vec::new();
        let mut cur = self.prev_token();
        while let Some(tok) = cur {
            match tok.kind() {
                TokenKind::Whitespace => {}
                TokenKind::Comment => out.push(tok.clone()),
                TokenKind::Content => break,
            }
            cur = tok.prev_token();
        }
        out.reverse();
        out
    }

    /// The contiguous run of comments directly after this token, in textual
    /// order.
    pub fn comments_after(&self) -> Vec<Token> {
        let mut out = Vec::new();
        let mut cur = self.next_token();
        while let Some(tok) = cur {
            match tok.kind() {
                TokenKind::Whitespace => {}
                TokenKind::Comment => out.push(tok.clone()),
                TokenKind::Content => break,
            }
            cur = tok.next_token();
        }
        out
    }

    /// How many lines down `later` starts, measured from the line this token
    /// ends on. Adjacent tokens on one line give 0; a token on the very next
    /// line gives 1.
    pub fn line_difference(&self, later: &Token) -> i64 {
        later.line() as i64 - self.end_line() as i64
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.stream.source().ptr_eq(other.stream.source())
    }
}

impl Eq for Token {}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}[{}]", self.kind(), self.text())
    }
}
