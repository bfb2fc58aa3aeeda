//! Property-based tests for todo-list parsing and core domain types.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated inputs.

use proptest::prelude::*;

use revise::core::types::{Oid, RefName};
use revise::engine::action::{parse_action, Action, CommitAction, CommitlessAction};
use revise::engine::autosquash::strip_markers;
use revise::engine::step::split_entry;
use revise::ui::editor::{render_with_comments, strip_comments};

fn all_actions() -> Vec<Action> {
    CommitAction::ALL
        .into_iter()
        .map(Action::Commit)
        .chain(CommitlessAction::ALL.into_iter().map(Action::Commitless))
        .collect()
}

/// Strategy for picking any action.
fn any_action() -> impl Strategy<Value = Action> {
    prop::sample::select(all_actions())
}

/// Strategy for generating valid branch name characters.
fn branch_name_char() -> impl Strategy<Value = char> {
    prop_oneof![
        prop::char::range('a', 'z'),
        prop::char::range('A', 'Z'),
        prop::char::range('0', '9'),
        Just('-'),
        Just('_'),
        Just('/'),
    ]
}

/// Strategy for generating valid branch names.
fn valid_branch_name() -> impl Strategy<Value = String> {
    prop::collection::vec(branch_name_char(), 1..40).prop_filter_map(
        "must be valid branch name",
        |chars| {
            let name: String = chars.into_iter().collect();
            if name.starts_with('/') || name.ends_with('/') || name.contains("//") {
                None
            } else {
                Some(name)
            }
        },
    )
}

/// Strategy for generating valid OID strings (40 hex chars).
fn valid_oid_string() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select("0123456789abcdefABCDEF".chars().collect::<Vec<_>>()),
        40,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

/// A single-line token with no whitespace.
fn word() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_./-]{1,20}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn every_prefix_resolves_to_first_declared_match(
        action in any_action(),
        len in 1usize..12,
    ) {
        let name = action.as_str();
        let prefix = &name[..len.min(name.len())];

        let parsed = parse_action(prefix).unwrap();
        let expected = all_actions()
            .into_iter()
            .find(|a| a.as_str().starts_with(prefix))
            .unwrap();

        prop_assert_eq!(parsed, expected);
        prop_assert!(parsed.as_str().starts_with(prefix));
    }

    #[test]
    fn canonical_name_always_wins(action in any_action()) {
        prop_assert_eq!(parse_action(action.as_str()).unwrap(), action);
    }

    #[test]
    fn non_prefix_tokens_are_rejected(token in "[a-z]{1,10}") {
        let known = all_actions().iter().any(|a| a.as_str().starts_with(token.as_str()));
        prop_assert_eq!(parse_action(&token).is_ok(), known);
    }

    #[test]
    fn entry_splits_into_three_fields(
        action in word(),
        operand in word(),
        summary in "[ -~]{0,40}",
    ) {
        let line = format!("{action} {operand} {summary}");
        let trimmed = line.trim_end();
        let entry = split_entry(trimmed.as_bytes()).unwrap();

        prop_assert_eq!(entry.action, action.as_bytes());
        prop_assert_eq!(entry.operand, operand.as_bytes());
        let summary = summary.trim();
        if summary.is_empty() {
            prop_assert!(entry.summary.map_or(true, <[u8]>::is_empty));
        } else {
            prop_assert_eq!(entry.summary.map(|s| s.trim_ascii()), Some(summary.as_bytes()));
        }
    }

    #[test]
    fn markers_strip_to_a_fixed_point(
        markers in prop::collection::vec(prop::bool::ANY, 0..4),
        rest in "[a-z][a-z ]{0,20}",
    ) {
        let mut summary = String::new();
        for fixup in &markers {
            summary.push_str(if *fixup { "fixup! " } else { "squash! " });
        }
        summary.push_str(&rest);

        let needle = strip_markers(summary.as_bytes());
        prop_assert_eq!(needle, rest.as_bytes());
        prop_assert_eq!(strip_markers(needle), needle);
    }

    #[test]
    fn instructions_never_leak_into_response(
        lines in prop::collection::vec("[a-z][a-z0-9 ]{0,30}", 1..6),
        instructions in "[ -~\n]{0,200}",
    ) {
        let text = lines.join("\n");
        let rendered = render_with_comments(text.as_bytes(), &instructions);
        prop_assert_eq!(strip_comments(&rendered), strip_comments(text.as_bytes()));
    }

    #[test]
    fn stripped_response_ends_with_single_newline(body in "[ -~\n]{0,200}") {
        let stripped = strip_comments(body.as_bytes());
        if !stripped.is_empty() {
            prop_assert!(stripped.ends_with(b"\n"));
            prop_assert!(!stripped.ends_with(b"\n\n"));
        }
    }

    #[test]
    fn oid_normalized_to_lowercase(oid_str in valid_oid_string()) {
        let oid = Oid::new(&oid_str).unwrap();
        prop_assert_eq!(oid.as_str(), oid_str.to_lowercase());
    }

    #[test]
    fn oid_short_is_prefix(oid_str in valid_oid_string()) {
        let oid = Oid::new(&oid_str).unwrap();
        prop_assert_eq!(oid.short().len(), Oid::SHORT_LEN);
        prop_assert!(oid.as_str().starts_with(oid.short()));
    }

    #[test]
    fn branch_refs_are_valid(name in valid_branch_name()) {
        let refname = RefName::new(format!("refs/heads/{name}")).unwrap();
        prop_assert!(refname.is_branch_ref());
        prop_assert_eq!(refname.strip_prefix("refs/heads/"), Some(name.as_str()));
        prop_assert_eq!(RefName::from_bytes(refname.as_bytes()).unwrap(), refname);
    }
}
