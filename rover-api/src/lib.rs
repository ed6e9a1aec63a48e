//! Rover API - Immutable domain model shared by the decoder, the layout
//! engine and the client.

mod block;
mod customer;
mod event;
mod message;
mod screen;
mod unit;

pub use block::*;
pub use customer::*;
pub use event::*;
pub use message::*;
pub use screen::*;
pub use unit::*;

/// A JSON:API `attributes` object.
pub type Attributes = serde_json::Map<String, serde_json::Value>;
