//! Event submission pipeline.
//!
//! A single worker task drains an mpsc queue and submits events one at a
//! time. Each event carries the customer and device snapshots taken at send
//! time. Failed submissions are reported, never retried.

use std::sync::Arc;

use rover_api::{Event, GeofenceRegion, Message};
use rover_jsonapi::{Resource, event_document};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::context::RoverContext;
use crate::error::ClientError;
use crate::job::fetch_document;

/// What the server sent back for one event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventResponse {
    /// Messages triggered by the event.
    pub messages: Vec<Message>,
    /// Regions the device should monitor from now on.
    pub regions: Vec<GeofenceRegion>,
}

pub type EventReply = oneshot::Receiver<Result<EventResponse, ClientError>>;

struct Submission {
    event: Event,
    reply: oneshot::Sender<Result<EventResponse, ClientError>>,
}

pub struct EventQueue {
    sender: mpsc::UnboundedSender<Submission>,
    worker: JoinHandle<()>,
}

impl EventQueue {
    /// Spawn the worker on the current runtime.
    pub fn start(ctx: Arc<RoverContext>) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Submission>();
        let worker = tokio::spawn(async move {
            while let Some(Submission { event, reply }) = receiver.recv().await {
                let result = submit(&ctx, event).await;
                if reply.send(result).is_err() {
                    debug!("event reply dropped by caller");
                }
            }
            debug!("event queue closed");
        });
        Self { sender, worker }
    }

    /// Queue an event. Events without an id get a fresh UUID.
    ///
    /// The receiver resolves once the server answered or the request failed.
    /// If the queue is already shut down the receiver resolves to a
    /// `RecvError`.
    pub fn track(&self, mut event: Event) -> EventReply {
        if event.id.is_none() {
            event.id = Some(Uuid::new_v4().to_string());
        }
        let (reply, receiver) = oneshot::channel();
        if self.sender.send(Submission { event, reply }).is_err() {
            warn!("event queue is closed, dropping event");
        }
        receiver
    }

    /// [`EventQueue::track`] and wait for the outcome.
    pub async fn submit(&self, event: Event) -> Result<EventResponse, ClientError> {
        self.track(event).await.map_err(|_| ClientError::Canceled)?
    }

    /// Stop accepting events and wait for queued ones to finish.
    pub async fn shutdown(self) {
        drop(self.sender);
        if let Err(err) = self.worker.await {
            warn!(error = %err, "event worker ended abnormally");
        }
    }
}

async fn submit(ctx: &RoverContext, event: Event) -> Result<EventResponse, ClientError> {
    let body = event_document(&event, &ctx.customer(), ctx.device())?;
    let request = ctx.router().events(body)?;
    let document = fetch_document(ctx, request).await?;

    let mut response = EventResponse::default();
    for resource in document.data.into_vec().into_iter().chain(document.included) {
        match resource {
            Resource::Message(message) => response.messages.push(message),
            Resource::GeofenceRegion(region) => response.regions.push(region),
            _ => {}
        }
    }
    info!(
        object = event.kind.object(),
        action = event.kind.action(),
        messages = response.messages.len(),
        regions = response.regions.len(),
        "event submitted"
    );
    Ok(response)
}
