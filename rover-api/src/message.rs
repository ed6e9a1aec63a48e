//! Inbox messages and monitored geofence regions.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::screen::Screen;

/// What opening a message does.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageAction {
    Website(String),
    DeepLink(String),
    LandingPage(Box<Screen>),
    Experience(String),
}

impl MessageAction {
    /// The `content-type` attribute value for this action.
    pub fn content_type(&self) -> &'static str {
        match self {
            MessageAction::Website(_) => "website",
            MessageAction::DeepLink(_) => "deep-link",
            MessageAction::LandingPage(_) => "landing-page",
            MessageAction::Experience(_) => "experience",
        }
    }
}

/// A push/inbox message.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: String,
    pub title: Option<String>,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
    pub saved_to_inbox: bool,
    pub action: Option<MessageAction>,
    pub properties: IndexMap<String, String>,
}

impl Message {
    /// A plain unread message with no action.
    pub fn new(id: impl Into<String>, text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: None,
            text: text.into(),
            timestamp,
            read: false,
            saved_to_inbox: true,
            action: None,
            properties: IndexMap::new(),
        }
    }
}

/// A circular region the device should monitor.
#[derive(Debug, Clone, PartialEq)]
pub struct GeofenceRegion {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Meters.
    pub radius: f64,
    pub name: Option<String>,
    pub tags: Vec<String>,
}
