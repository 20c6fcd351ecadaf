//! Property-based tests for the intent resolver
//!
//! Invariants checked across arbitrary utterance sequences:
//! - Normalization is idempotent and folds spelling variants together
//! - A pending item exists exactly when a color is awaited
//! - Memory only ever grows, and never reorders
//! - Unrecognized color answers leave the pending item unchanged
//! - Sending emits one command per remembered entry, in order

use super::catalog::Catalog;
use super::context::{PendingAction, PendingSlot, ResolverContext, ResolverSettings};
use super::normalize::normalize;
use super::resolve::resolve;
use super::rules::{Effect, IntentKind};
use chrono::Utc;
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn arb_item() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("كنبة"),
        Just("كنبه"),
        Just("كرسي"),
        Just("ترابيزة"),
        Just("طاولة"),
        Just("sofa"),
        Just("chair"),
    ]
}

fn arb_color() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("أحمر"),
        Just("احمر"),
        Just("أزرق"),
        Just("أسود"),
        Just("بيضا"),
        Just("ذهبي"),
        Just("green"),
    ]
}

/// Item and color pairs the catalog actually offers
fn arb_available_pair() -> impl Strategy<Value = (&'static str, &'static str)> {
    prop_oneof![
        (Just("كنبة"), arb_color()),
        (Just("sofa"), arb_color()),
        (
            prop_oneof![Just("كرسي"), Just("chair")],
            prop_oneof![Just("أزرق"), Just("أسود"), Just("بيضا")],
        ),
        (
            prop_oneof![Just("ترابيزة"), Just("طاولة")],
            prop_oneof![Just("أسود"), Just("بيضا"), Just("ذهبي")],
        ),
    ]
}

/// Words that name no item, color or intent keyword
fn arb_filler() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("مش عارف"),
        Just("لا"),
        Just("ممكن"),
        Just("hmm"),
        Just("maybe later"),
        Just("123"),
    ]
}

fn arb_utterance() -> impl Strategy<Value = String> {
    prop_oneof![
        arb_item().prop_map(ToString::to_string),
        arb_color().prop_map(ToString::to_string),
        (arb_item(), arb_color()).prop_map(|(i, c)| format!("عايز {i} {c}")),
        arb_filler().prop_map(ToString::to_string),
        Just("ضفت ايه".to_string()),
        Just("ابعت".to_string()),
        Just("الوان".to_string()),
        Just("help".to_string()),
    ]
}

/// Arabic letters with the variants and diacritics the folder handles
fn arb_arabic_text() -> impl Strategy<Value = String> {
    "[اأإآبتةثجحخدذرزسشصضطظعغفقكلمنهوىي\u{064B}-\u{0652}\u{0640} ]{0,30}"
}

fn run(context: &ResolverContext, utterance: &str) -> Option<super::resolve::Resolution> {
    resolve(
        context,
        &Catalog::builtin(),
        &ResolverSettings::default(),
        utterance,
        Utc::now(),
    )
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_normalize_idempotent(text in arb_arabic_text()) {
        let once = normalize(&text);
        prop_assert_eq!(normalize(&once), once);
    }

    #[test]
    fn prop_hamza_forms_normalize_equal(text in arb_arabic_text()) {
        let plain = text.replace(['أ', 'إ', 'آ'], "ا");
        prop_assert_eq!(normalize(&text), normalize(&plain));
    }

    #[test]
    fn prop_pending_item_iff_awaiting(utterances in proptest::collection::vec(arb_utterance(), 1..20)) {
        let mut context = ResolverContext::new();
        for utterance in &utterances {
            if let Some(resolution) = run(&context, utterance) {
                context = resolution.context;
            }
            let awaiting = context.pending.pending_action() == PendingAction::AwaitingColor;
            prop_assert_eq!(awaiting, context.pending.pending_item().is_some());
        }
    }

    #[test]
    fn prop_memory_only_appends(utterances in proptest::collection::vec(arb_utterance(), 1..20)) {
        let mut context = ResolverContext::new();
        for utterance in &utterances {
            let before = context.memory.entries().to_vec();
            if let Some(resolution) = run(&context, utterance) {
                context = resolution.context;
            }
            let after = context.memory.entries();
            prop_assert!(after.len() >= before.len());
            prop_assert!(after.len() <= before.len() + 1);
            prop_assert_eq!(&after[..before.len()], &before[..]);
        }
    }

    #[test]
    fn prop_unknown_color_keeps_pending_item(
        item in arb_item(),
        fillers in proptest::collection::vec(arb_filler(), 1..10),
    ) {
        let Some(first) = run(&ResolverContext::new(), item) else {
            return Err(TestCaseError::fail("item was not recognized"));
        };
        let expected = first.context.pending.pending_item().map(ToString::to_string);
        prop_assert!(expected.is_some());

        let mut context = first.context;
        for filler in fillers {
            let Some(resolution) = run(&context, filler) else {
                return Err(TestCaseError::fail("awaiting color must answer locally"));
            };
            prop_assert_eq!(resolution.intent, IntentKind::FillColor);
            prop_assert!(resolution.context.memory.is_empty());
            context = resolution.context;
            prop_assert_eq!(context.pending.pending_item().map(ToString::to_string), expected.clone());
        }
    }

    #[test]
    fn prop_send_emits_one_command_per_entry(
        pairs in proptest::collection::vec(arb_available_pair(), 0..8),
    ) {
        let mut context = ResolverContext::new();
        for (item, color) in &pairs {
            let Some(resolution) = run(&context, &format!("{item} {color}")) else {
                return Err(TestCaseError::fail("one-shot add was not handled"));
            };
            context = resolution.context;
        }
        prop_assert_eq!(context.pending.clone(), PendingSlot::Idle);
        prop_assert_eq!(context.memory.len(), pairs.len());

        let Some(sent) = run(&context, "send") else {
            return Err(TestCaseError::fail("send was not handled"));
        };
        let catalog = Catalog::builtin();
        let expected: Vec<Effect> = context
            .memory
            .entries()
            .iter()
            .map(|e| Effect::Relay(catalog.relay.create_command(&e.item, &e.color)))
            .collect();
        prop_assert_eq!(sent.effects, expected);
        prop_assert_eq!(sent.context.memory.len(), pairs.len());
    }
}
