// Copyright 2025 Cameron Swords
// SPDX-License-Identifier: Apache-2.0

//! A tabbed token pretty-printing core.
//!
//! A [`Doc`] describes how the tokens of a parsed source file should be laid
//! out relative to dynamic indentation anchors ([`Tab`]s). This crate runs a
//! fixed pipeline of analysis passes over that document and produces a
//! [`stringdoc::StringDoc`], a lower-level algebra whose final line-break
//! selection belongs to a downstream layout engine:
//!
//! 1. annotate each `at` with whether it might be the first break onto its
//!    tab;
//! 2. propagate, for every token, the set of tabs its position flows from;
//! 3. weave each token's attached comments in as siblings at the right
//!    indentation, then re-run flow analysis over the new nodes;
//! 4. make every space between adjacent emitted pieces explicit, meeting
//!    conditional branches conservatively;
//! 5. reconstruct the source's blank lines as conditional newlines;
//! 6. lower to the string-document algebra.
//!
//! Each pass is a pure rewrite over an immutable IR; the only shared state
//! in the crate is the pair of monotonic id counters behind [`Tab`] and
//! [`DocVar`].

mod ann;
mod annotate;
mod blanks;
mod comments;
mod doc;
mod flow;
mod lower;
mod space;
pub mod stringdoc;
mod tab;
pub mod token;

#[cfg(test)]
mod tests;

pub use doc::Doc;
pub use tab::{DocVar, Style, Tab};

// -------------------------------------------------------------------------------------------------
// Entry Point
// -------------------------------------------------------------------------------------------------

/// Options for [`to_string_doc`].
#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// Width a literal tab character expands to when computing the effective
    /// indentation of multi-line tokens. Must be at least 1.
    pub tab_width: usize,
    /// Dump each pass's output through `log::debug!` (target `"tabdoc"`).
    /// Never affects the result.
    pub debug: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options { tab_width: 4, debug: false }
    }
}

/// Run the full pipeline, lowering `doc` to a string document.
///
/// # Example
/// ```
/// use tabdoc::{to_string_doc, Doc, Options, Style, Tab};
///
/// let doc = Doc::new_tab(&Tab::root(), Style::Inplace, |t| {
///     Doc::at(t, Doc::text("val")).concat(Doc::at(t, Doc::text("x")))
/// });
/// let lowered = to_string_doc(&Options::default(), &doc);
/// assert!(lowered.to_string().starts_with("newtab"));
/// ```
pub fn to_string_doc(options: &Options, doc: &Doc) -> stringdoc::StringDoc {
    assert!(options.tab_width >= 1, "tab width must be at least 1");

    let ann = annotate::annotate(doc);
    dump(options, "annotate", &ann);
    let ann = flow::analyze_flow(&ann);
    dump(options, "flow analysis", &ann);
    let ann = comments::weave_comments(&ann);
    let ann = flow::analyze_flow(&ann);
    dump(options, "comment weaving", &ann);
    let ann = space::ensure_spaces(&ann);
    dump(options, "space insertion", &ann);
    let ann = blanks::insert_blank_lines(&ann);
    dump(options, "blank-line insertion", &ann);
    let lowered = lower::lower(options.tab_width, &ann);
    if options.debug {
        log::debug!(target: "tabdoc", "lowered:\n{lowered}");
    }
    lowered
}

fn dump(options: &Options, pass: &str, doc: &impl std::fmt::Display) {
    if options.debug {
        log::debug!(target: "tabdoc", "after {pass}:\n{doc}");
    }
}
