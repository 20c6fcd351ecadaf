//! Local intent resolver
//!
//! Turns an utterance into a locally produced reply, or signals that the
//! utterance should be delegated to the remote completion client. State
//! between turns lives in an explicit [`ResolverContext`] owned by the
//! caller, one per chat session.

mod catalog;
mod context;
mod normalize;
mod replies;
mod resolve;
mod rules;

#[cfg(test)]
mod proptests;

pub use catalog::Catalog;
pub use context::{ResolverContext, ResolverSettings};
pub use normalize::Language;
pub use resolve::resolve;
pub use rules::{Effect, IntentKind};
