//! Per-session resolver state: remembered furniture and the pending slot

use super::normalize::Language;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One piece of furniture the user added this session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub item: String,
    pub color: String,
    pub added_at: DateTime<Utc>,
}

/// Append-only list of added furniture for the lifetime of a session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionMemory {
    entries: Vec<MemoryEntry>,
}

impl SessionMemory {
    pub(super) fn add(&mut self, item: &str, color: &str, now: DateTime<Utc>) {
        self.entries.push(MemoryEntry {
            item: item.to_string(),
            color: color.to_string(),
            added_at: now,
        });
    }

    pub fn entries(&self) -> &[MemoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Which slot the resolver is waiting on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingAction {
    None,
    AwaitingColor,
}

/// Outstanding slot request. The item is carried by the variant, so an item
/// is present exactly when a color is awaited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PendingSlot {
    #[default]
    Idle,
    AwaitingColor {
        item: String,
        /// Consecutive answers that named no known color
        reprompts: u32,
    },
}

impl PendingSlot {
    pub fn pending_action(&self) -> PendingAction {
        match self {
            PendingSlot::Idle => PendingAction::None,
            PendingSlot::AwaitingColor { .. } => PendingAction::AwaitingColor,
        }
    }

    pub fn pending_item(&self) -> Option<&str> {
        match self {
            PendingSlot::Idle => None,
            PendingSlot::AwaitingColor { item, .. } => Some(item),
        }
    }
}

/// Everything the resolver reads and writes between turns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolverContext {
    pub memory: SessionMemory,
    pub pending: PendingSlot,
    pub language: Language,
}

impl ResolverContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop remembered furniture and any pending slot together
    pub fn clear(&mut self) {
        self.memory = SessionMemory::default();
        self.pending = PendingSlot::Idle;
    }
}

/// Tunables for the resolver
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolverSettings {
    /// Unrecognized color answers tolerated before the pending item is
    /// dropped. `None` keeps asking forever.
    pub reprompt_limit: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_slot_accessors() {
        let idle = PendingSlot::Idle;
        assert_eq!(idle.pending_action(), PendingAction::None);
        assert_eq!(idle.pending_item(), None);

        let awaiting = PendingSlot::AwaitingColor {
            item: "كنبة".to_string(),
            reprompts: 0,
        };
        assert_eq!(awaiting.pending_action(), PendingAction::AwaitingColor);
        assert_eq!(awaiting.pending_item(), Some("كنبة"));
    }

    #[test]
    fn test_clear_resets_memory_and_slot() {
        let mut context = ResolverContext::new();
        context.memory.add("كنبة", "أحمر", Utc::now());
        context.pending = PendingSlot::AwaitingColor {
            item: "كرسي".to_string(),
            reprompts: 2,
        };
        context.language = Language::English;

        context.clear();

        assert!(context.memory.is_empty());
        assert_eq!(context.pending, PendingSlot::Idle);
        // Language is a display preference, not session content
        assert_eq!(context.language, Language::English);
    }

    #[test]
    fn test_memory_preserves_insertion_order() {
        let mut memory = SessionMemory::default();
        let now = Utc::now();
        memory.add("كنبة", "أحمر", now);
        memory.add("كرسي", "أسود", now);
        memory.add("كنبة", "أزرق", now);

        let items: Vec<_> = memory
            .entries()
            .iter()
            .map(|e| (e.item.as_str(), e.color.as_str()))
            .collect();
        assert_eq!(
            items,
            vec![("كنبة", "أحمر"), ("كرسي", "أسود"), ("كنبة", "أزرق")]
        );
    }
}
