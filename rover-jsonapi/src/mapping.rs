//! Per-type attribute mappers used by the registry.
//!
//! Each mapper turns `(id, attributes)` into a typed [`Resource`], or
//! `None` if a required field is missing or malformed.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use indexmap::IndexMap;
use rover_api::{
    Attributes, Customer, Device, Event, EventKind, Experience, GeofenceRegion, Message,
    MessageAction, Screen, Transition,
};
use serde_json::Value;
use tracing::warn;

use crate::registry::Resource;

/// Wire format of message timestamps (always UTC).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Wire format of event times, with a numeric zone offset.
pub const EVENT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

pub fn format_timestamp(time: &DateTime<Utc>) -> String {
    time.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_event_time(text: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(text, EVENT_TIME_FORMAT).ok()
}

pub fn format_event_time(time: &DateTime<FixedOffset>) -> String {
    time.format(EVENT_TIME_FORMAT).to_string()
}

// =========================================================================
// Attribute accessors
// =========================================================================

fn string(attrs: &Attributes, key: &str) -> Option<String> {
    attrs.get(key).and_then(Value::as_str).map(str::to_owned)
}

fn number(attrs: &Attributes, key: &str) -> Option<f64> {
    attrs.get(key).and_then(Value::as_f64)
}

fn flag(attrs: &Attributes, key: &str) -> bool {
    attrs.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn string_list(attrs: &Attributes, key: &str) -> Vec<String> {
    attrs
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_owned))
                .collect()
        })
        .unwrap_or_default()
}

/// Strings as-is, numbers as their decimal text.
fn text(attrs: &Attributes, key: &str) -> Option<String> {
    match attrs.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// =========================================================================
// messages
// =========================================================================

pub fn message(id: Option<&str>, attrs: &Attributes) -> Option<Resource> {
    let id = id?;
    let Some(timestamp) = attrs
        .get("timestamp")
        .and_then(Value::as_str)
        .and_then(parse_timestamp)
    else {
        warn!(id, "dropping message with missing or malformed timestamp");
        return None;
    };

    let properties: IndexMap<String, String> = attrs
        .get("properties")
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_owned())))
                .collect()
        })
        .unwrap_or_default();

    Some(Resource::Message(Message {
        id: id.to_owned(),
        title: string(attrs, "android-title"),
        text: string(attrs, "notification-text").unwrap_or_default(),
        timestamp,
        read: flag(attrs, "read"),
        saved_to_inbox: flag(attrs, "saved-to-inbox"),
        action: message_action(id, attrs),
        properties,
    }))
}

fn message_action(id: &str, attrs: &Attributes) -> Option<MessageAction> {
    match attrs.get("content-type").and_then(Value::as_str)? {
        "website" => string(attrs, "website-url").map(MessageAction::Website),
        "deep-link" => string(attrs, "deep-link-url").map(MessageAction::DeepLink),
        "experience" => string(attrs, "experience-id").map(MessageAction::Experience),
        "landing-page" => {
            let page = attrs.get("landing-page")?;
            match serde_json::from_value::<Screen>(page.clone()) {
                Ok(screen) => Some(MessageAction::LandingPage(Box::new(screen))),
                Err(err) => {
                    warn!(id, error = %err, "ignoring malformed landing page");
                    None
                }
            }
        }
        _ => None,
    }
}

// =========================================================================
// geofence-regions
// =========================================================================

pub fn geofence_region(id: Option<&str>, attrs: &Attributes) -> Option<Resource> {
    Some(Resource::GeofenceRegion(GeofenceRegion {
        id: id?.to_owned(),
        latitude: number(attrs, "latitude")?,
        longitude: number(attrs, "longitude")?,
        radius: number(attrs, "radius")?,
        name: string(attrs, "name"),
        tags: string_list(attrs, "tags"),
    }))
}

// =========================================================================
// events
// =========================================================================

/// Secondary dispatch on the `(object, action)` pair.
pub fn event(id: Option<&str>, attrs: &Attributes) -> Option<Resource> {
    let object = attrs.get("object").and_then(Value::as_str)?;
    let action = attrs.get("action").and_then(Value::as_str)?;
    let Some(time) = attrs
        .get("time")
        .and_then(Value::as_str)
        .and_then(parse_event_time)
    else {
        warn!(object, action, "dropping event with missing or malformed time");
        return None;
    };

    let kind = match (object, action) {
        ("location", "update") => EventKind::LocationUpdate {
            latitude: number(attrs, "latitude")?,
            longitude: number(attrs, "longitude")?,
            accuracy: number(attrs, "accuracy"),
        },
        ("geofence-region", action) => EventKind::GeofenceTransition {
            region_id: string(attrs, "geofence-region-id")?,
            transition: Transition::parse(action)?,
        },
        ("beacon-region", action) => EventKind::BeaconTransition {
            uuid: string(attrs, "uuid")?,
            major: u16::try_from(attrs.get("major-number")?.as_u64()?).ok()?,
            minor: u16::try_from(attrs.get("minor-number")?.as_u64()?).ok()?,
            transition: Transition::parse(action)?,
        },
        ("device", "update") => EventKind::DeviceUpdate,
        _ => return None,
    };

    Some(Resource::Event(Event {
        id: id.map(str::to_owned),
        time,
        kind,
    }))
}

// =========================================================================
// screens / experiences
// =========================================================================

pub fn screen(id: Option<&str>, attrs: &Attributes) -> Option<Resource> {
    let mut object = attrs.clone();
    object.insert("id".into(), Value::String(id?.to_owned()));
    match serde_json::from_value::<Screen>(Value::Object(object)) {
        Ok(screen) => Some(Resource::Screen(screen)),
        Err(err) => {
            warn!(id, error = %err, "dropping malformed screen");
            None
        }
    }
}

pub fn experience(id: Option<&str>, attrs: &Attributes) -> Option<Resource> {
    let id = id?;
    let screens = match attrs.get("screens") {
        Some(value) => match serde_json::from_value::<Vec<Screen>>(value.clone()) {
            Ok(screens) => screens,
            Err(err) => {
                warn!(id, error = %err, "dropping experience with malformed screens");
                return None;
            }
        },
        None => Vec::new(),
    };

    Some(Resource::Experience(Experience {
        id: id.to_owned(),
        name: string(attrs, "name").unwrap_or_default(),
        version: text(attrs, "version"),
        home_screen_id: string(attrs, "home-screen-id")?,
        screens,
    }))
}

// =========================================================================
// customers / devices
// =========================================================================

pub fn customer(id: Option<&str>, attrs: &Attributes) -> Option<Resource> {
    Some(Resource::Customer(Customer {
        identifier: string(attrs, "identifier").or_else(|| id.map(str::to_owned)),
        first_name: string(attrs, "first-name"),
        last_name: string(attrs, "last-name"),
        email: string(attrs, "email"),
        phone_number: string(attrs, "phone-number"),
        gender: string(attrs, "gender"),
        age: attrs
            .get("age")
            .and_then(Value::as_u64)
            .and_then(|age| u32::try_from(age).ok()),
        tags: string_list(attrs, "tags"),
        // Nulls stay: they mean "clear this trait" to `merge_traits`.
        traits: attrs
            .get("traits")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default(),
    }))
}

pub fn device(id: Option<&str>, attrs: &Attributes) -> Option<Resource> {
    let udid = string(attrs, "udid").or_else(|| id.map(str::to_owned))?;
    let mut device = Device::new(udid);
    device.token = string(attrs, "token");
    if let Some(lang) = string(attrs, "locale-lang") {
        device.locale_language = lang;
    }
    device.locale_region = string(attrs, "locale-region");
    if let Some(tz) = string(attrs, "time-zone") {
        device.time_zone = tz;
    }
    if let Some(version) = string(attrs, "sdk-version") {
        device.sdk_version = version;
    }
    if let Some(platform) = string(attrs, "platform") {
        device.platform = platform;
    }
    if let Some(os) = string(attrs, "os-name") {
        device.os_name = os;
    }
    device.os_version = string(attrs, "os-version").unwrap_or_default();
    device.manufacturer = string(attrs, "manufacturer");
    device.model = string(attrs, "model");
    device.carrier = string(attrs, "carrier");
    device.app_identifier = string(attrs, "app-identifier");
    device.development = flag(attrs, "development");
    device.notifications_enabled = flag(attrs, "notifications-enabled");
    device.location_monitoring_enabled = flag(attrs, "location-monitoring-enabled");
    device.bluetooth_enabled = flag(attrs, "bluetooth-enabled");
    Some(Resource::Device(device))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};
    use serde_json::json;

    fn attrs(value: Value) -> Attributes {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn timestamp_parses_millis_utc() {
        let time = parse_timestamp("2023-01-01T12:30:45.123Z").unwrap();
        let expected = Utc.with_ymd_and_hms(2023, 1, 1, 12, 30, 45).unwrap()
            + chrono::Duration::milliseconds(123);
        assert_eq!(time, expected);
        assert_eq!(format_timestamp(&time), "2023-01-01T12:30:45.123Z");
    }

    #[test]
    fn timestamp_rejects_other_shapes() {
        assert!(parse_timestamp("not-a-date").is_none());
        assert!(parse_timestamp("2023-01-01").is_none());
        assert!(parse_timestamp("2023-01-01T00:00:00.000+0100").is_none());
    }

    #[test]
    fn event_time_keeps_offset() {
        let time = parse_event_time("2023-06-01T08:00:00.250-0400").unwrap();
        assert_eq!(time.offset().local_minus_utc(), -4 * 3600);
        assert_eq!(time.nanosecond(), 250_000_000);
        assert_eq!(format_event_time(&time), "2023-06-01T08:00:00.250-0400");
    }

    #[test]
    fn message_actions_by_content_type() {
        let base = json!({"timestamp": "2023-01-01T00:00:00.000Z", "notification-text": "t"});

        let mut website = attrs(base.clone());
        website.insert("content-type".into(), json!("website"));
        website.insert("website-url".into(), json!("https://rover.io"));
        let Some(Resource::Message(msg)) = message(Some("1"), &website) else { panic!() };
        assert_eq!(msg.action, Some(MessageAction::Website("https://rover.io".into())));

        let mut landing = attrs(base.clone());
        landing.insert("content-type".into(), json!("landing-page"));
        landing.insert("landing-page".into(), json!({"rows": []}));
        let Some(Resource::Message(msg)) = message(Some("2"), &landing) else { panic!() };
        assert!(matches!(msg.action, Some(MessageAction::LandingPage(_))));

        let mut broken = attrs(base);
        broken.insert("content-type".into(), json!("website"));
        let Some(Resource::Message(msg)) = message(Some("3"), &broken) else { panic!() };
        assert_eq!(msg.action, None);
    }

    #[test]
    fn message_without_id_is_dropped() {
        let a = attrs(json!({"timestamp": "2023-01-01T00:00:00.000Z"}));
        assert!(message(None, &a).is_none());
    }

    #[test]
    fn geofence_requires_coordinates() {
        let ok = attrs(json!({
            "latitude": 43.6, "longitude": -79.4, "radius": 50, "tags": ["a", 1, "b"]
        }));
        let Some(Resource::GeofenceRegion(region)) = geofence_region(Some("g"), &ok) else {
            panic!()
        };
        assert_eq!(region.radius, 50.0);
        assert_eq!(region.tags, vec!["a", "b"]);

        let missing = attrs(json!({"latitude": 43.6, "radius": 50}));
        assert!(geofence_region(Some("g"), &missing).is_none());
    }

    #[test]
    fn event_dispatch_on_object_and_action() {
        let time = "2023-01-01T00:00:00.000+0000";
        let beacon = attrs(json!({
            "object": "beacon-region", "action": "exit", "time": time,
            "uuid": "B9407F30", "major-number": 1, "minor-number": 70000
        }));
        // minor out of u16 range
        assert!(event(None, &beacon).is_none());

        let device_update = attrs(json!({"object": "device", "action": "update", "time": time}));
        let Some(Resource::Event(ev)) = event(Some("e"), &device_update) else { panic!() };
        assert_eq!(ev.kind, EventKind::DeviceUpdate);

        let unknown = attrs(json!({"object": "app", "action": "open", "time": time}));
        assert!(event(None, &unknown).is_none());

        let dwell = attrs(json!({
            "object": "geofence-region", "action": "dwell", "time": time, "geofence-region-id": "g"
        }));
        assert!(event(None, &dwell).is_none());
    }

    #[test]
    fn customer_keeps_null_traits() {
        let a = attrs(json!({"traits": {"plan": null, "level": 2}, "age": 30}));
        let Some(Resource::Customer(customer)) = customer(Some("c1"), &a) else { panic!() };
        assert_eq!(customer.identifier.as_deref(), Some("c1"));
        assert!(customer.traits["plan"].is_null());
        assert_eq!(customer.age, Some(30));
    }

    #[test]
    fn experience_needs_home_screen() {
        let a = attrs(json!({"name": "x", "version": 3, "screens": []}));
        assert!(experience(Some("e"), &a).is_none());

        let a = attrs(json!({
            "name": "x", "version": 3, "home-screen-id": "h", "screens": [{"id": "h"}]
        }));
        let Some(Resource::Experience(exp)) = experience(Some("e"), &a) else { panic!() };
        assert_eq!(exp.version.as_deref(), Some("3"));
        assert!(exp.home_screen().is_some());
    }
}
