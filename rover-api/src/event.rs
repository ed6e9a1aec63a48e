//! Analytics events submitted by the device.

use chrono::{DateTime, FixedOffset, Utc};

/// Direction of a region crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    Enter,
    Exit,
}

impl Transition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transition::Enter => "enter",
            Transition::Exit => "exit",
        }
    }

    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "enter" => Some(Transition::Enter),
            "exit" => Some(Transition::Exit),
            _ => None,
        }
    }
}

/// Concrete event payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    LocationUpdate {
        latitude: f64,
        longitude: f64,
        accuracy: Option<f64>,
    },
    GeofenceTransition {
        region_id: String,
        transition: Transition,
    },
    BeaconTransition {
        uuid: String,
        major: u16,
        minor: u16,
        transition: Transition,
    },
    DeviceUpdate,
}

impl EventKind {
    /// The wire `object` attribute.
    pub fn object(&self) -> &'static str {
        match self {
            EventKind::LocationUpdate { .. } => "location",
            EventKind::GeofenceTransition { .. } => "geofence-region",
            EventKind::BeaconTransition { .. } => "beacon-region",
            EventKind::DeviceUpdate => "device",
        }
    }

    /// The wire `action` attribute.
    pub fn action(&self) -> &'static str {
        match self {
            EventKind::LocationUpdate { .. } | EventKind::DeviceUpdate => "update",
            EventKind::GeofenceTransition { transition, .. }
            | EventKind::BeaconTransition { transition, .. } => transition.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: Option<String>,
    pub time: DateTime<FixedOffset>,
    pub kind: EventKind,
}

impl Event {
    pub fn new(kind: EventKind, time: DateTime<FixedOffset>) -> Self {
        Self { id: None, time, kind }
    }

    /// Stamp with the current UTC time.
    pub fn now(kind: EventKind) -> Self {
        Self::new(kind, Utc::now().fixed_offset())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_action_pairs() {
        let enter = EventKind::GeofenceTransition {
            region_id: "r1".into(),
            transition: Transition::Enter,
        };
        assert_eq!((enter.object(), enter.action()), ("geofence-region", "enter"));
        assert_eq!(EventKind::DeviceUpdate.object(), "device");
        assert_eq!(Transition::parse("exit"), Some(Transition::Exit));
        assert_eq!(Transition::parse("dwell"), None);
    }
}
