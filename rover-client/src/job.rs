//! Background fetch + decode.
//!
//! Each caller-visible request is one `DecodeJob` call: the transport runs on
//! the async runtime, decoding runs on the blocking pool, and the caller gets
//! back a single structured result to apply on its own thread.

use std::sync::Arc;

use rover_api::{Experience, Message};
use rover_jsonapi::{Document, Resource, decode_slice};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::context::RoverContext;
use crate::error::ClientError;
use crate::transport::{HttpRequest, HttpResponse};

#[derive(Clone)]
pub struct DecodeJob {
    ctx: Arc<RoverContext>,
}

impl DecodeJob {
    pub fn new(ctx: Arc<RoverContext>) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &RoverContext {
        &self.ctx
    }

    /// Send `request` and decode the response body.
    pub async fn fetch_document(
        &self,
        request: HttpRequest,
    ) -> Result<Document<Resource>, ClientError> {
        fetch_document(&self.ctx, request).await
    }

    pub async fn fetch_inbox(&self) -> Result<Vec<Message>, ClientError> {
        let request = self.ctx.router().inbox()?;
        let document = self.fetch_document(request).await?;
        Ok(document
            .data
            .into_vec()
            .into_iter()
            .filter_map(Resource::into_message)
            .collect())
    }

    /// Run [`DecodeJob::fetch_inbox`] as a detached task.
    pub fn spawn_inbox(&self) -> JoinHandle<Result<Vec<Message>, ClientError>> {
        let job = self.clone();
        tokio::spawn(async move { job.fetch_inbox().await })
    }

    pub async fn fetch_experience(&self, id: &str) -> Result<Experience, ClientError> {
        let request = self.ctx.router().experience(id)?;
        let document = self.fetch_document(request).await?;
        document
            .data
            .into_single()
            .and_then(Resource::into_experience)
            .ok_or_else(|| ClientError::MissingResource(format!("experience {id}")))
    }

    pub async fn mark_read(&self, message_id: &str) -> Result<(), ClientError> {
        let request = self.ctx.router().mark_read(message_id)?;
        send_checked(&self.ctx, request).await.map(drop)
    }

    pub async fn delete_message(&self, message_id: &str) -> Result<(), ClientError> {
        let request = self.ctx.router().delete_message(message_id)?;
        send_checked(&self.ctx, request).await.map(drop)
    }
}

/// Send and reject non-2xx responses.
pub(crate) async fn send_checked(
    ctx: &RoverContext,
    request: HttpRequest,
) -> Result<HttpResponse, ClientError> {
    let url = request.url.clone();
    let response = ctx.transport().send(request).await.map_err(|err| {
        warn!(%url, error = %err, "request failed");
        ClientError::Transport(err)
    })?;
    if !response.is_success() {
        warn!(%url, status = response.status, "unexpected status");
        return Err(ClientError::Status {
            status: response.status,
            body: String::from_utf8_lossy(&response.body).into_owned(),
        });
    }
    Ok(response)
}

pub(crate) async fn fetch_document(
    ctx: &RoverContext,
    request: HttpRequest,
) -> Result<Document<Resource>, ClientError> {
    let response = send_checked(ctx, request).await?;
    let registry = ctx.registry();
    let body = response.body;
    debug!(bytes = body.len(), "decoding response");

    let decoded = tokio::task::spawn_blocking(move || {
        decode_slice::<Resource, _>(&body, registry.as_ref())
    })
    .await
        .map_err(|_| ClientError::Canceled)?;
    Ok(decoded?)
}
