//! Endpoint table: builds authenticated requests against the API root.

use serde_json::json;
use url::Url;

use crate::config::RoverConfig;
use crate::error::TransportError;
use crate::transport::{HttpRequest, Method};

pub const CONTENT_TYPE: &str = "application/vnd.api+json";

#[derive(Debug, Clone)]
pub struct Router {
    base: Url,
    api_key: String,
    device_id: String,
}

impl Router {
    pub fn new(config: &RoverConfig) -> Result<Self, TransportError> {
        let mut base = Url::parse(&config.base_url)
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {e}", config.base_url)))?;
        if base.cannot_be_a_base() {
            return Err(TransportError::InvalidUrl(config.base_url.clone()));
        }
        // Relative joins replace the last segment unless the path ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            base,
            api_key: config.api_key.clone(),
            device_id: config.device_id.clone(),
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// `GET v1/inbox`
    pub fn inbox(&self) -> Result<HttpRequest, TransportError> {
        Ok(self.request(Method::Get, self.url(&["v1", "inbox"])?, None))
    }

    /// `PATCH v1/inbox/messages/{id}` with `read: true`.
    pub fn mark_read(&self, message_id: &str) -> Result<HttpRequest, TransportError> {
        let body = json!({
            "data": {
                "id": message_id,
                "type": "messages",
                "attributes": { "read": true }
            }
        });
        Ok(self.request(
            Method::Patch,
            self.url(&["v1", "inbox", "messages", message_id])?,
            Some(body.to_string().into_bytes()),
        ))
    }

    /// `DELETE v1/inbox/messages/{id}`
    pub fn delete_message(&self, message_id: &str) -> Result<HttpRequest, TransportError> {
        Ok(self.request(
            Method::Delete,
            self.url(&["v1", "inbox", "messages", message_id])?,
            None,
        ))
    }

    /// `GET v1/experiences/{id}`
    pub fn experience(&self, experience_id: &str) -> Result<HttpRequest, TransportError> {
        Ok(self.request(
            Method::Get,
            self.url(&["v1", "experiences", experience_id])?,
            None,
        ))
    }

    /// `POST v1/events` with an encoded events document.
    pub fn events(&self, body: Vec<u8>) -> Result<HttpRequest, TransportError> {
        Ok(self.request(Method::Post, self.url(&["v1", "events"])?, Some(body)))
    }

    /// Join path segments onto the base, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Result<Url, TransportError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| TransportError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, body: Option<Vec<u8>>) -> HttpRequest {
        let mut headers = vec![
            ("X-Rover-Api-Key".to_string(), self.api_key.clone()),
            ("X-Rover-Device-Id".to_string(), self.device_id.clone()),
            ("Accept".to_string(), CONTENT_TYPE.to_string()),
        ];
        if body.is_some() {
            headers.push(("Content-Type".to_string(), CONTENT_TYPE.to_string()));
        }
        HttpRequest {
            method,
            url,
            headers,
            body,
        }
    }
}
