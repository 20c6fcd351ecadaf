//! Scene command relay
//!
//! An in-process pub/sub hub that forwards opaque payloads between the
//! browser widget and the scene (game engine) client, plus the typed
//! command model encoded onto the wire at the boundary.

mod command;
mod hub;

#[cfg(test)]
mod proptests;

pub use command::SceneCommand;
pub use hub::{ClientId, Envelope, RelayEvent, RelayHub};
