//! Ordered intent table evaluated while no slot is pending
//!
//! Priority is the position in [`IDLE_RULES`]; the first rule whose
//! predicate accepts the utterance handles it and no other rule runs.

use super::catalog::Catalog;
use super::context::{PendingSlot, ResolverContext};
use super::normalize::{contains_term, Language};
use super::replies;
use crate::relay::SceneCommand;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Locally handled intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    ListFurniture,
    ListAdded,
    SendToRelay,
    ListColors,
    ListMaterials,
    Help,
    AddItem,
    FillColor,
    EmptyUtterance,
}

/// Side effects requested by a resolution, executed by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Forward a scene command through the relay
    Relay(SceneCommand),
}

/// Inputs shared by every rule for one utterance
pub(super) struct Turn<'a> {
    pub catalog: &'a Catalog,
    pub normalized: &'a str,
    pub language: Language,
    pub now: DateTime<Utc>,
}

impl Turn<'_> {
    fn mentions_any(&self, terms: &[&str]) -> bool {
        terms.iter().any(|term| contains_term(self.normalized, term))
    }

    fn item(&self) -> Option<&str> {
        self.catalog
            .detect_item(self.normalized)
            .map(|c| c.key.as_str())
    }
}

/// What a rule produced: reply text plus effects
pub(super) struct Outcome {
    pub reply: String,
    pub effects: Vec<Effect>,
}

impl Outcome {
    fn reply(reply: String) -> Self {
        Self {
            reply,
            effects: Vec::new(),
        }
    }
}

pub(super) struct Rule {
    pub intent: IntentKind,
    pub matches: fn(&Turn<'_>) -> bool,
    pub handle: fn(&Turn<'_>, &mut ResolverContext) -> Outcome,
}

const LIST_FURNITURE_TERMS: &[&str] = &["أثاث", "موديلات", "furniture", "catalog", "models"];
const LIST_ADDED_TERMS: &[&str] = &[
    "ضفت",
    "ضفنا",
    "ضيفنا",
    "what did i add",
    "what have i added",
    "show added",
];
const SEND_TERMS: &[&str] = &["ابعت", "ابعث", "أرسل", "نفذ", "send"];
const COLOR_TERMS: &[&str] = &["ألوان", "colors", "colours"];
const MATERIAL_TERMS: &[&str] = &["خامات", "خامة", "مواد", "materials"];
const HELP_TERMS: &[&str] = &["مساعدة", "ساعدني", "help"];

/// Idle-state intents in priority order
pub(super) const IDLE_RULES: &[Rule] = &[
    Rule {
        intent: IntentKind::ListFurniture,
        matches: asks_for_furniture,
        handle: list_furniture,
    },
    Rule {
        intent: IntentKind::ListAdded,
        matches: asks_for_added,
        handle: list_added,
    },
    Rule {
        intent: IntentKind::SendToRelay,
        matches: asks_to_send,
        handle: send_to_relay,
    },
    Rule {
        intent: IntentKind::ListColors,
        matches: asks_for_colors,
        handle: list_colors,
    },
    Rule {
        intent: IntentKind::ListMaterials,
        matches: asks_for_materials,
        handle: list_materials,
    },
    Rule {
        intent: IntentKind::Help,
        matches: asks_for_help,
        handle: help,
    },
    Rule {
        intent: IntentKind::AddItem,
        matches: names_item,
        handle: add_item,
    },
];

fn asks_for_furniture(turn: &Turn<'_>) -> bool {
    turn.mentions_any(LIST_FURNITURE_TERMS)
}

fn asks_for_added(turn: &Turn<'_>) -> bool {
    turn.mentions_any(LIST_ADDED_TERMS)
}

fn asks_to_send(turn: &Turn<'_>) -> bool {
    turn.mentions_any(SEND_TERMS)
}

fn asks_for_colors(turn: &Turn<'_>) -> bool {
    turn.mentions_any(COLOR_TERMS)
}

fn asks_for_materials(turn: &Turn<'_>) -> bool {
    turn.mentions_any(MATERIAL_TERMS)
}

fn asks_for_help(turn: &Turn<'_>) -> bool {
    turn.mentions_any(HELP_TERMS)
}

fn names_item(turn: &Turn<'_>) -> bool {
    turn.item().is_some()
}

fn list_furniture(turn: &Turn<'_>, _context: &mut ResolverContext) -> Outcome {
    Outcome::reply(replies::list_furniture(turn.catalog, turn.language))
}

fn list_added(turn: &Turn<'_>, context: &mut ResolverContext) -> Outcome {
    Outcome::reply(replies::list_added(turn.catalog, &context.memory, turn.language))
}

fn list_colors(turn: &Turn<'_>, _context: &mut ResolverContext) -> Outcome {
    Outcome::reply(replies::list_colors(turn.catalog, turn.item(), turn.language))
}

fn list_materials(turn: &Turn<'_>, _context: &mut ResolverContext) -> Outcome {
    Outcome::reply(replies::list_materials(turn.catalog, turn.item(), turn.language))
}

fn help(turn: &Turn<'_>, _context: &mut ResolverContext) -> Outcome {
    Outcome::reply(replies::help(turn.language))
}

/// One relay command per remembered entry, in insertion order. Memory is
/// left untouched so the same list can be sent again.
fn send_to_relay(turn: &Turn<'_>, context: &mut ResolverContext) -> Outcome {
    if context.memory.is_empty() {
        return Outcome::reply(replies::nothing_to_send(turn.language));
    }

    let effects: Vec<Effect> = context
        .memory
        .entries()
        .iter()
        .map(|entry| Effect::Relay(turn.catalog.relay.create_command(&entry.item, &entry.color)))
        .collect();

    Outcome {
        reply: replies::sending(effects.len(), turn.language),
        effects,
    }
}

fn add_item(turn: &Turn<'_>, context: &mut ResolverContext) -> Outcome {
    let Some(item) = turn.item() else {
        return Outcome::reply(replies::help(turn.language));
    };

    match turn.catalog.detect_color(turn.normalized) {
        Some(color) if turn.catalog.offers_color(item, &color.name) => {
            context.memory.add(item, &color.name, turn.now);
            Outcome::reply(replies::added(turn.catalog, item, &color.name, turn.language))
        }
        detected => {
            context.pending = PendingSlot::AwaitingColor {
                item: item.to_string(),
                reprompts: 0,
            };
            let reply = match detected {
                Some(color) => {
                    replies::color_unavailable(turn.catalog, item, &color.name, turn.language)
                }
                None => replies::ask_color(turn.catalog, item, turn.language),
            };
            Outcome::reply(reply)
        }
    }
}
