//! Property-based tests for classification and the handler chain
//!
//! These tests verify key invariants hold across all possible inputs.

use crate::action::{classify, kinds, ActionIntent, ClassifyError, RawCardAction};
use crate::dispatch::decision::{CardHandler, Decision, Verdict};
use crate::dispatch::handlers::builtin_handlers;
use crate::roles::RoleCatalog;
use crate::session::{Session, SessionMutation};
use proptest::prelude::*;
use serde_json::json;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_known_kind() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just(kinds::CLEAR),
        Just(kinds::PIC_MODE_CHANGE),
        Just(kinds::PIC_RESOLUTION),
        Just(kinds::PIC_TEXT_MORE),
        Just(kinds::PIC_VAR_MORE),
        Just(kinds::ROLE_TAGS_CHOOSE),
        Just(kinds::ROLE_CHOOSE),
        Just(kinds::AI_MODE_CHOOSE),
    ]
}

fn arb_raw_action() -> impl Strategy<Value = RawCardAction> {
    (
        prop_oneof![arb_known_kind().prop_map(str::to_string), "[a-z_]{1,20}"],
        "[a-zA-Z0-9 ]{0,30}",
        "[a-z0-9]{1,12}",
        proptest::option::of("[a-zA-Z0-9x]{0,12}"),
    )
        .prop_map(|(kind, value, session_id, option)| RawCardAction {
            value: json!({
                "kind": kind,
                "value": value,
                "sessionId": session_id,
            }),
            option,
        })
}

fn arb_session() -> impl Strategy<Value = Session> {
    proptest::collection::vec(("[a-z ]{1,15}", "[a-z ]{1,15}"), 0..4).prop_map(|exchanges| {
        let mut session = Session::default();
        for (user, assistant) in exchanges {
            session.apply(&SessionMutation::AppendExchange { user, assistant });
        }
        session
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Classification is total: any payload yields a typed action or a
    /// typed error, never a panic.
    #[test]
    fn prop_classify_never_panics(raw in arb_raw_action()) {
        let _ = classify(&raw);
    }

    /// Only the eight known kinds are ever claimed; everything else is a
    /// routing signal.
    #[test]
    fn prop_unknown_kinds_pass_through(kind in "[a-z_]{1,20}", session_id in "[a-z0-9]{1,12}") {
        prop_assume!(![
            kinds::CLEAR, kinds::PIC_MODE_CHANGE, kinds::PIC_RESOLUTION,
            kinds::PIC_TEXT_MORE, kinds::PIC_VAR_MORE, kinds::ROLE_TAGS_CHOOSE,
            kinds::ROLE_CHOOSE, kinds::AI_MODE_CHOOSE,
        ].contains(&kind.as_str()));

        let raw = RawCardAction {
            value: json!({ "kind": kind.as_str(), "value": "1", "sessionId": session_id }),
            option: None,
        };
        prop_assert_eq!(classify(&raw).unwrap_err(), ClassifyError::UnknownKind(kind));
    }

    /// Confirm kinds only ever commit on the exact wire values "1" and
    /// "0"; every other value is rejected before a handler sees it.
    #[test]
    fn prop_confirms_fail_closed(value in "[a-zA-Z0-9 ]{0,10}") {
        prop_assume!(value != "1" && value != "0");
        let raw = RawCardAction {
            value: json!({ "kind": "clear", "value": value, "sessionId": "s1" }),
            option: None,
        };
        let rejected = matches!(classify(&raw), Err(ClassifyError::InvalidValue { .. }));
        prop_assert!(rejected);
    }

    /// Every successfully classified action is claimed by exactly one
    /// built-in handler.
    #[test]
    fn prop_classified_actions_have_one_owner(raw in arb_raw_action(), session in arb_session()) {
        if let Ok(action) = classify(&raw) {
            let handlers = builtin_handlers(RoleCatalog::new());
            let claims = handlers
                .iter()
                .filter(|h| h.try_handle(&session, &action) != Verdict::NotMine)
                .count();
            prop_assert_eq!(claims, 1);
        }
    }

    /// Handlers are pure: deciding twice on the same snapshot gives the
    /// same decision, and the snapshot itself is never touched.
    #[test]
    fn prop_handlers_are_deterministic(raw in arb_raw_action(), session in arb_session()) {
        if let Ok(action) = classify(&raw) {
            let before = session.clone();
            let handlers = builtin_handlers(RoleCatalog::new());
            for handler in &handlers {
                let first = handler.try_handle(&session, &action);
                let second = handler.try_handle(&session, &action);
                prop_assert_eq!(first, second);
            }
            prop_assert_eq!(session, before);
        }
    }

    /// Role selections that miss the catalog decide a no-op, never a
    /// mutation.
    #[test]
    fn prop_unknown_roles_never_mutate(name in "[A-Z][a-z]{1,12}", session in arb_session()) {
        let catalog = RoleCatalog::new();
        prop_assume!(catalog.find(&name).is_none());

        let action = crate::action::CardAction {
            intent: ActionIntent::RoleSelect { name },
            session_key: "s1".to_string(),
            message_id: "m1".to_string(),
            scope: crate::action::ChatScope::Direct,
        };
        let handler = crate::dispatch::handlers::RoleHandler { catalog };
        prop_assert_eq!(
            handler.try_handle(&session, &action),
            Verdict::Decide(Decision::NoOp)
        );
    }
}
