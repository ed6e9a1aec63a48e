//! Rover Client - Context, transport, background decode jobs, inbox state,
//! event submission and image loading.

pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod image_cache;
pub mod inbox;
pub mod job;
pub mod router;
pub mod transport;

pub use config::RoverConfig;
pub use context::RoverContext;
pub use error::{ClientError, TransportError};
pub use events::{EventQueue, EventReply, EventResponse};
pub use image_cache::{
    AssetFetcher, HttpAssetFetcher, ImageCache, ImageLoader, ImageReady, LoadState,
};
pub use inbox::Inbox;
pub use job::DecodeJob;
pub use router::Router;
pub use transport::{HttpRequest, HttpResponse, Method, ReqwestTransport, Transport};
