//! Rover JSON:API - Streaming resource decoder, type registry and encoder.

pub mod decoder;
pub mod encode;
pub mod error;
pub mod mapping;
pub mod reader;
pub mod registry;

pub use decoder::{Document, Primary, RawResource, ResourceFactory, decode_document, decode_slice};
pub use encode::{encode_document, encode_resource, encode_to_vec, event_document};
pub use error::{DecodeError, EncodeError};
pub use reader::{JsonReader, Token, TokenReader};
pub use registry::{Resource, ResourceRegistry};
