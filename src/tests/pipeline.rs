// Copyright 2025 Cameron Swords
// SPDX-License-Identifier: Apache-2.0

use insta::assert_snapshot;

use crate::ann::AnnInner;
use crate::tests::support::*;
use crate::*;

fn lower_default(doc: &Doc) -> stringdoc::StringDoc {
    to_string_doc(&Options::default(), doc)
}

// -------------------------------------------------------------------------------------------------
// End-To-End Scenarios
// -------------------------------------------------------------------------------------------------

#[test]
fn adjacent_tokens_get_a_space() {
    let toks = content_tokens("a b");
    let doc = Doc::token(toks[0].clone()).concat(Doc::token(toks[1].clone()));
    assert_snapshot!(lower_default(&doc).to_string(), @r#"
concat
  text "a"
  space
  text "b"
"#);
}

#[test]
fn repeated_at_supplies_separation() {
    let toks = content_tokens("a b");
    let doc = Doc::new_tab(&Tab::root(), Style::Inplace, |t| {
        Doc::at(t, Doc::token(toks[0].clone())).concat(Doc::at(t, Doc::token(toks[1].clone())))
    });

    let ann = crate::flow::analyze_flow(&crate::annotate::annotate(&doc));
    assert_snapshot!(ann.to_string(), @r#"
newtab t0 inplace
  concat
    at t0 first
      token "a" {root, t0}
    at t0
      token "b" {t0}
"#);

    // The second break lands on the tab's column, so no space is inserted.
    assert_snapshot!(lower_default(&doc).to_string(), @r#"
newtab t0 inplace
  concat
    at t0
      text "a"
    at t0
      text "b"
"#);
}

#[test]
fn space_inserted_in_active_branch_only() {
    let toks = content_tokens("a b");
    let doc = Doc::new_tab(&Tab::root(), Style::Inplace, |t| {
        Doc::cond(
            t,
            Doc::token(toks[0].clone()),
            Doc::token(toks[0].clone()).concat(Doc::token(toks[1].clone())),
        )
    });
    assert_snapshot!(lower_default(&doc).to_string(), @r#"
newtab t0 inplace
  cond t0
    inactive:
      text "a"
    active:
      concat
        text "a"
        space
        text "b"
"#);
}

#[test]
fn shared_doc_with_separated_occurrences_needs_no_flags() {
    let toks = content_tokens("a");
    let doc = Doc::letdoc(Doc::token(toks[0].clone()), |v| {
        v.clone().concat(Doc::space()).concat(v)
    });

    let ann = crate::flow::analyze_flow(&crate::annotate::annotate(&doc));
    let (rewritten, table) = crate::space::ensure_spaces_with_table(&ann);
    let AnnInner::Let { var, .. } = ann.inner() else {
        panic!("expected a let at the top");
    };
    assert_eq!(table.get(var), Some(&(false, false)));
    assert_snapshot!(rewritten.to_string(), @r#"
let v0
  bound:
    token "a" {root}
  body:
    concat
      var v0
      space
      var v0
"#);

    // Both occurrences splice the one lowered copy, in order.
    assert_snapshot!(lower_default(&doc).to_string(), @r#"
concat
  text "a"
  space
  text "a"
"#);
}

#[test]
fn two_source_blank_lines_become_two_conditional_newlines() {
    let toks = content_tokens("a\n\n\nb");
    let doc = Doc::new_tab(&Tab::root(), Style::Indented { min_indent: None }, |t| {
        Doc::at(t, Doc::token(toks[0].clone())).concat(Doc::at(t, Doc::token(toks[1].clone())))
    });
    assert_snapshot!(lower_default(&doc).to_string(), @r#"
newtab t0 indented
  concat
    at t0
      text "a"
    at t0
      concat
        cond t0
          inactive:
            empty
          active:
            newline
        cond t0
          inactive:
            empty
          active:
            newline
        text "b"
"#);
}

#[test]
fn trailing_comment_breaks_to_the_tokens_column() {
    let toks = content_tokens("x (*c1*) (*c2*) a (*c3*)");
    let doc = Doc::new_tab(&Tab::root(), Style::Inplace, |t| {
        Doc::at(t, Doc::token(toks[0].clone())).concat(Doc::at(t, Doc::token(toks[1].clone())))
    });
    // Leading comments ride along in front of the token; the trailing one is
    // re-anchored to the token's flow tab.
    assert_snapshot!(lower_default(&doc).to_string(), @r#"
newtab t0 inplace
  concat
    at t0
      text "x"
    at t0
      concat
        text "(*c1*)"
        space
        text "(*c2*)"
        space
        text "a"
        at t0
          text "(*c3*)"
"#);
}

// -------------------------------------------------------------------------------------------------
// Invariants
// -------------------------------------------------------------------------------------------------

#[test]
fn token_sequence_is_preserved() {
    let toks = content_tokens("a b c d");
    let t = Tab::fresh(&Tab::root(), Style::Inplace);
    let doc = Doc::at(&t, Doc::token(toks[0].clone()))
        .concat(Doc::text("!"))
        .concat(Doc::at(&t, Doc::token(toks[1].clone()).concat(Doc::token(toks[2].clone()))))
        .concat(Doc::token(toks[3].clone()));
    let lowered = lower_default(&doc);
    assert_eq!(string_texts(&lowered), ["a", "!", "b", "c", "d"]);
}

#[test]
fn ensure_spaces_is_idempotent() {
    let toks = content_tokens("x (*c1*) (*c2*) a (*c3*)");
    let doc = Doc::new_tab(&Tab::root(), Style::Inplace, |t| {
        Doc::at(t, Doc::token(toks[0].clone())).concat(Doc::at(t, Doc::token(toks[1].clone())))
    });
    let ann = crate::annotate::annotate(&doc);
    let ann = crate::flow::analyze_flow(&ann);
    let ann = crate::flow::analyze_flow(&crate::comments::weave_comments(&ann));
    let once = crate::space::ensure_spaces(&ann);
    let twice = crate::space::ensure_spaces(&once);
    assert_eq!(once.to_string(), twice.to_string());
}

#[test]
fn blank_line_runs_clamp_at_two() {
    let toks = content_tokens("a\n\n\n\n\n\nb");
    let doc = Doc::new_tab(&Tab::root(), Style::Inplace, |t| {
        Doc::at(t, Doc::token(toks[0].clone())).concat(Doc::at(t, Doc::token(toks[1].clone())))
    });
    let lowered = lower_default(&doc).to_string();
    assert_eq!(lowered.matches("cond t0").count(), 2);
}

#[test]
fn annotation_is_confluent_over_concat_associativity() {
    let toks = content_tokens("a b c");
    let t = Tab::fresh(&Tab::root(), Style::Inplace);
    let a = Doc::at(&t, Doc::token(toks[0].clone()));
    let b = Doc::at(&t, Doc::token(toks[1].clone()));
    let c = Doc::at(&t, Doc::token(toks[2].clone()));
    let left = a.clone().concat(b.clone()).concat(c.clone());
    let right = a.concat(b.concat(c));
    assert_eq!(
        crate::annotate::annotate(&left).to_string(),
        crate::annotate::annotate(&right).to_string()
    );
}

#[test]
fn single_use_binding_is_inlining() {
    let toks = content_tokens("a b");
    let shared = Doc::token(toks[1].clone());
    let with_let =
        Doc::letdoc(shared.clone(), |v| Doc::token(toks[0].clone()).concat(v));
    let inlined = Doc::token(toks[0].clone()).concat(shared);
    assert_eq!(
        lower_default(&with_let).to_string(),
        lower_default(&inlined).to_string()
    );
}

#[test]
#[should_panic(expected = "tab width")]
fn zero_tab_width_is_rejected() {
    let doc = Doc::text("x");
    to_string_doc(&Options { tab_width: 0, debug: false }, &doc);
}
