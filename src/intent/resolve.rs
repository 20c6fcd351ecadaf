//! Resolution entry point
//!
//! `resolve` is pure: it reads the current context and returns the next one
//! together with the reply and effects. Nothing is written until the caller
//! commits the returned context, so a resolution either fully applies or not
//! at all.

use super::catalog::Catalog;
use super::context::{PendingSlot, ResolverContext, ResolverSettings};
use super::normalize::{normalize, Language};
use super::replies;
use super::rules::{Effect, IntentKind, Outcome, Turn, IDLE_RULES};
use chrono::{DateTime, Utc};

/// A locally handled utterance
#[derive(Debug, Clone)]
pub struct Resolution {
    pub context: ResolverContext,
    pub intent: IntentKind,
    pub reply: String,
    pub effects: Vec<Effect>,
}

/// Resolve an utterance locally.
///
/// Returns `None` when no local intent applies and the utterance should go
/// to the remote completion client. While a color is pending every
/// utterance is treated as an answer to that question, so `None` is only
/// possible from the idle state.
pub fn resolve(
    context: &ResolverContext,
    catalog: &Catalog,
    settings: &ResolverSettings,
    utterance: &str,
    now: DateTime<Utc>,
) -> Option<Resolution> {
    let normalized = normalize(utterance);
    let language = Language::detect(utterance).unwrap_or(context.language);
    let turn = Turn {
        catalog,
        normalized: &normalized,
        language,
        now,
    };

    let mut next = context.clone();
    next.language = language;

    if let PendingSlot::AwaitingColor { item, reprompts } = &context.pending {
        let outcome = fill_color(&turn, settings, &mut next, item, *reprompts);
        return Some(Resolution::new(next, IntentKind::FillColor, outcome));
    }

    if normalized.is_empty() {
        let outcome = Outcome {
            reply: replies::empty_utterance(language),
            effects: Vec::new(),
        };
        return Some(Resolution::new(next, IntentKind::EmptyUtterance, outcome));
    }

    let rule = IDLE_RULES.iter().find(|rule| (rule.matches)(&turn))?;
    let outcome = (rule.handle)(&turn, &mut next);
    Some(Resolution::new(next, rule.intent, outcome))
}

/// Answer to a pending color question. Unknown and unavailable colors both
/// count toward the reprompt limit.
fn fill_color(
    turn: &Turn<'_>,
    settings: &ResolverSettings,
    next: &mut ResolverContext,
    item: &str,
    reprompts: u32,
) -> Outcome {
    let detected = turn.catalog.detect_color(turn.normalized);
    if let Some(color) = detected.filter(|c| turn.catalog.offers_color(item, &c.name)) {
        next.memory.add(item, &color.name, turn.now);
        next.pending = PendingSlot::Idle;
        return Outcome {
            reply: replies::added(turn.catalog, item, &color.name, turn.language),
            effects: Vec::new(),
        };
    }

    let reprompts = reprompts.saturating_add(1);
    let reply = if settings.reprompt_limit.is_some_and(|limit| reprompts >= limit) {
        next.pending = PendingSlot::Idle;
        replies::color_cancelled(turn.catalog, item, turn.language)
    } else {
        next.pending = PendingSlot::AwaitingColor {
            item: item.to_string(),
            reprompts,
        };
        match detected {
            Some(color) => replies::color_unavailable(turn.catalog, item, &color.name, turn.language),
            None => replies::reask_color(turn.catalog, item, turn.language),
        }
    };

    Outcome {
        reply,
        effects: Vec::new(),
    }
}

impl Resolution {
    fn new(context: ResolverContext, intent: IntentKind, outcome: Outcome) -> Self {
        Self {
            context,
            intent,
            reply: outcome.reply,
            effects: outcome.effects,
        }
    }
}
