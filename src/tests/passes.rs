// Copyright 2025 Cameron Swords
// SPDX-License-Identifier: Apache-2.0

use insta::assert_snapshot;

use crate::annotate::annotate;
use crate::comments::weave_comments;
use crate::flow::analyze_flow;
use crate::space::ensure_spaces;
use crate::tests::support::*;
use crate::*;

fn lower_default(doc: &Doc) -> stringdoc::StringDoc {
    to_string_doc(&Options::default(), doc)
}

// -------------------------------------------------------------------------------------------------
// Annotator
// -------------------------------------------------------------------------------------------------

#[test]
fn tab_broken_in_both_branches_stays_broken() {
    let toks = content_tokens("a b c");
    let t = Tab::fresh(&Tab::root(), Style::Inplace);
    let u = Tab::fresh(&Tab::root(), Style::Inplace);
    let doc = Doc::cond(
        &u,
        Doc::at(&t, Doc::token(toks[0].clone())),
        Doc::at(&t, Doc::token(toks[1].clone())),
    )
    .concat(Doc::at(&t, Doc::token(toks[2].clone())));
    assert_snapshot!(annotate(&doc).to_string(), @r#"
concat
  cond t0
    inactive:
      at t1 first
        token "a"
    active:
      at t1 first
        token "b"
  at t1
    token "c"
"#);
}

#[test]
fn tab_broken_in_one_branch_might_still_be_first() {
    let toks = content_tokens("a b c");
    let t = Tab::fresh(&Tab::root(), Style::Inplace);
    let u = Tab::fresh(&Tab::root(), Style::Inplace);
    let doc = Doc::cond(
        &u,
        Doc::token(toks[0].clone()),
        Doc::at(&t, Doc::token(toks[1].clone())),
    )
    .concat(Doc::at(&t, Doc::token(toks[2].clone())));
    assert_snapshot!(annotate(&doc).to_string(), @r#"
concat
  cond t0
    inactive:
      token "a"
    active:
      at t1 first
        token "b"
  at t1 first
    token "c"
"#);
}

#[test]
fn var_occurrence_replays_the_bindings_breaks() {
    let toks = content_tokens("a b");
    let t = Tab::fresh(&Tab::root(), Style::Inplace);
    let doc = Doc::letdoc(Doc::at(&t, Doc::token(toks[0].clone())), |v| {
        v.concat(Doc::at(&t, Doc::token(toks[1].clone())))
    });
    assert_snapshot!(annotate(&doc).to_string(), @r#"
let v0
  bound:
    at t0 first
      token "a"
  body:
    concat
      var v0
      at t0
        token "b"
"#);
}

// -------------------------------------------------------------------------------------------------
// Flow Analysis
// -------------------------------------------------------------------------------------------------

#[test]
fn binding_accumulates_flow_across_occurrences() {
    let toks = content_tokens("a");
    let t = Tab::fresh(&Tab::root(), Style::Inplace);
    let u = Tab::fresh(&Tab::root(), Style::Inplace);
    let doc = Doc::letdoc(Doc::token(toks[0].clone()), |v| {
        Doc::at(&t, v.clone()).concat(Doc::at(&u, v))
    });
    let ann = analyze_flow(&annotate(&doc));
    let flows = token_flows(&ann);
    assert_eq!(flows.len(), 1);
    let set = flows[0].1.as_ref().expect("bound token should be attributed");
    assert!(set.contains(&Tab::root()));
    assert!(set.contains(&t));
    assert!(set.contains(&u));
}

#[test]
fn cond_joins_outgoing_flow_by_union() {
    let toks = content_tokens("a b");
    let t = Tab::fresh(&Tab::root(), Style::Inplace);
    // The inactive branch passes the incoming flow through; the active branch
    // consumes it. The token after the cond keeps the surviving value.
    let doc = Doc::cond(&t, Doc::empty(), Doc::token(toks[0].clone()))
        .concat(Doc::token(toks[1].clone()));
    let ann = analyze_flow(&annotate(&doc));
    let flows = token_flows(&ann);
    assert_eq!(flows.len(), 2);
    for (_, flow) in flows {
        let set = flow.expect("both tokens should be attributed");
        assert_eq!(set.len(), 1);
        assert!(set.contains(&Tab::root()));
    }
}

// -------------------------------------------------------------------------------------------------
// Comment Weaving
// -------------------------------------------------------------------------------------------------

#[test]
fn unattributed_token_weaves_comments_as_plain_siblings() {
    let toks = content_tokens("a (*c*) b (*d*)");
    let doc = Doc::token(toks[0].clone()).concat(Doc::token(toks[1].clone()));
    let woven = weave_comments(&analyze_flow(&annotate(&doc)));
    assert_snapshot!(woven.to_string(), @r#"
concat
  token "a" {root}
  token "(*c*)"
  token "b"
  token "(*d*)"
"#);
}

#[test]
fn weaving_without_comments_changes_nothing() {
    let toks = content_tokens("a b");
    let doc = Doc::new_tab(&Tab::root(), Style::Inplace, |t| {
        Doc::at(t, Doc::token(toks[0].clone())).concat(Doc::at(t, Doc::token(toks[1].clone())))
    });
    let ann = analyze_flow(&annotate(&doc));
    assert_eq!(ann.to_string(), weave_comments(&ann).to_string());
}

// -------------------------------------------------------------------------------------------------
// Space Insertion
// -------------------------------------------------------------------------------------------------

#[test]
fn a_first_break_does_not_supply_separation() {
    let toks = content_tokens("a b");
    let t = Tab::fresh(&Tab::root(), Style::Inplace);
    let doc = Doc::token(toks[0].clone()).concat(Doc::at(&t, Doc::token(toks[1].clone())));
    let rewritten = ensure_spaces(&analyze_flow(&annotate(&doc)));
    assert_snapshot!(rewritten.to_string(), @r#"
concat
  token "a" {root}
  space
  at t0 first
    token "b" {t0}
"#);
}

#[test]
fn nospace_suppresses_insertion_and_is_elided() {
    let toks = content_tokens("a b");
    let doc = Doc::token(toks[0].clone())
        .concat(Doc::nospace())
        .concat(Doc::token(toks[1].clone()));
    assert_snapshot!(lower_default(&doc).to_string(), @r#"
concat
  text "a"
  text "b"
"#);
}

#[test]
fn unresolved_cond_is_met_conservatively() {
    let toks = content_tokens("a b");
    let t = Tab::fresh(&Tab::root(), Style::Inplace);
    // Only the inactive branch separates, so the active branch is made to.
    let doc = Doc::token(toks[0].clone())
        .concat(Doc::cond(&t, Doc::space(), Doc::empty()))
        .concat(Doc::token(toks[1].clone()));
    assert_snapshot!(lower_default(&doc).to_string(), @r#"
concat
  text "a"
  cond t0
    inactive:
      space
    active:
      space
  text "b"
"#);
}

#[test]
fn spacey_cond_branches_need_no_insertion() {
    let toks = content_tokens("a b");
    let t = Tab::fresh(&Tab::root(), Style::Inplace);
    let doc = Doc::token(toks[0].clone())
        .concat(Doc::cond(&t, Doc::space(), Doc::space()))
        .concat(Doc::token(toks[1].clone()));
    assert_snapshot!(lower_default(&doc).to_string(), @r#"
concat
  text "a"
  cond t0
    inactive:
      space
    active:
      space
  text "b"
"#);
}

#[test]
fn an_at_assumed_inactive_does_not_separate() {
    let toks = content_tokens("a b c");
    let doc = Doc::new_tab(&Tab::root(), Style::Inplace, |t| {
        Doc::at(t, Doc::token(toks[0].clone())).concat(Doc::cond(
            t,
            Doc::at(t, Doc::token(toks[1].clone())),
            Doc::at(t, Doc::token(toks[2].clone())),
        ))
    });
    // When the tab does not break, the inactive at is positionally inert, so
    // that branch needs a real space; the active branch's break suffices.
    assert_snapshot!(lower_default(&doc).to_string(), @r#"
newtab t0 inplace
  concat
    at t0
      text "a"
    cond t0
      inactive:
        concat
          space
          at t0
            text "b"
      active:
        at t0
          text "c"
"#);
}

// -------------------------------------------------------------------------------------------------
// Blank Lines
// -------------------------------------------------------------------------------------------------

#[test]
fn blank_line_is_reconstructed_before_a_leading_comment() {
    let toks = content_tokens("a\n\n# note\nb");
    let doc = Doc::new_tab(&Tab::root(), Style::Inplace, |t| {
        Doc::at(t, Doc::token(toks[0].clone())).concat(Doc::at(t, Doc::token(toks[1].clone())))
    });
    assert_snapshot!(lower_default(&doc).to_string(), @r##"
newtab t0 inplace
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
        text "# note"
        space
        text "b"
"##);
}

#[test]
fn leading_blank_lines_are_not_reconstructed() {
    let toks = content_tokens("\n\na");
    let doc = Doc::new_tab(&Tab::root(), Style::Inplace, |t| {
        Doc::at(t, Doc::token(toks[0].clone()))
    });
    assert_snapshot!(lower_default(&doc).to_string(), @r#"
newtab t0 inplace
  at t0
    text "a"
"#);
}
