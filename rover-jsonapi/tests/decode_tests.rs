//! End-to-end decoding through the built-in registry.

use chrono::{TimeZone, Utc};
use indexmap::IndexMap;
use rover_api::{
    Block, Color, Customer, Device, Event, EventKind, Experience, GeofenceRegion, Image, Message,
    MessageAction, Offset, Row, Screen, Transition, Unit,
};
use rover_jsonapi::{
    DecodeError, Primary, Resource, ResourceRegistry, decode_slice, encode_to_vec,
};

fn registry() -> ResourceRegistry {
    ResourceRegistry::with_builtins()
}

#[test]
fn single_message_document() {
    let json = br#"{"data":{"id":"42","type":"messages","attributes":{"android-title":"Hi",
        "notification-text":"Body","timestamp":"2023-01-01T00:00:00.000Z","read":false,
        "content-type":"plain"}}}"#;

    let doc = decode_slice(json, &registry()).unwrap();
    let Primary::Single(Resource::Message(message)) = doc.data else {
        panic!("expected a single message");
    };

    assert_eq!(message.id, "42");
    assert_eq!(message.title.as_deref(), Some("Hi"));
    assert_eq!(message.text, "Body");
    assert!(!message.read);
    assert_eq!(message.action, None);
    assert_eq!(message.timestamp, Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap());
    assert!(doc.included.is_empty());
}

#[test]
fn unknown_included_types_are_dropped_in_order() {
    let json = br#"{"data": [], "included": [
        {"type": "geofence-regions", "id": "g1",
         "attributes": {"latitude": 1.0, "longitude": 2.0, "radius": 100}},
        {"type": "widgets", "id": "w1", "attributes": {"size": 3}},
        {"type": "geofence-regions", "id": "g2",
         "attributes": {"latitude": 3.0, "longitude": 4.0, "radius": 50}}
    ]}"#;

    let doc = decode_slice(json, &registry()).unwrap();
    let ids: Vec<_> = doc.included.iter().filter_map(Resource::id).collect();
    assert_eq!(ids, vec!["g1", "g2"]);
    assert_eq!(doc.data, Primary::List(vec![]));
}

#[test]
fn malformed_timestamp_drops_only_that_message() {
    let json = br#"{"data": [
        {"type": "messages", "id": "1", "attributes": {"timestamp": "2023-01-01T00:00:00.000Z"}},
        {"type": "messages", "id": "2", "attributes": {"timestamp": "not-a-date"}},
        {"type": "messages", "id": "3", "attributes": {"timestamp": "2023-01-02T00:00:00.000Z"}}
    ]}"#;

    let doc = decode_slice(json, &registry()).unwrap();
    let ids: Vec<_> = doc
        .data
        .into_vec()
        .into_iter()
        .filter_map(|r| r.id().map(str::to_owned))
        .collect();
    assert_eq!(ids, vec!["1", "3"]);
}

#[test]
fn malformed_timestamp_keeps_included_siblings() {
    let json = br#"{"data": {"type": "messages", "id": "bad",
        "attributes": {"timestamp": "not-a-date"}},
     "included": [
        {"type": "messages", "id": "m1", "attributes": {"timestamp": "2023-01-01T00:00:00.000Z"}},
        {"type": "messages", "id": "m2", "attributes": {"timestamp": "not-a-date"}},
        {"type": "geofence-regions", "id": "g1",
         "attributes": {"latitude": 1.0, "longitude": 2.0, "radius": 5}}
    ]}"#;

    let doc = decode_slice(json, &registry()).unwrap();
    assert_eq!(doc.data, Primary::Empty);
    let ids: Vec<_> = doc.included.iter().filter_map(Resource::id).collect();
    assert_eq!(ids, vec!["m1", "g1"]);
}

#[test]
fn bad_strings_and_literals_are_skipped_per_field() {
    let mut json = br#"{"data": {"type": "geofence-regions", "id": "g", "attributes": {
        "latitude": 1.5, "longitude": 2.5, "radius": 10, "flag": tru, "name": ""#
        .to_vec();
    json.extend_from_slice(&[0xFF, 0xFE]);
    json.extend_from_slice(br#""}}, "included": [{"type": "geofence-regions", "id": "h",
        "attributes": {"latitude": 0, "longitude": 0, "radius": 1, "tags": [nul, "t"]}}]}"#);

    let doc = decode_slice(&json, &registry()).unwrap();
    let Primary::Single(Resource::GeofenceRegion(region)) = doc.data else {
        panic!("expected the region to survive its bad fields");
    };
    assert_eq!(region.radius, 10.0);
    assert_eq!(region.name, None);
    let Some(Resource::GeofenceRegion(sibling)) = doc.included.first() else {
        panic!("expected the included region");
    };
    assert_eq!(sibling.tags, vec!["t".to_string()]);
}

#[test]
fn excessive_nesting_is_a_decode_error() {
    let depth = 5_000;
    let json = format!(
        r#"{{"data":{{"type":"messages","id":"1","attributes":{{"x": {}{}}}}}}}"#,
        "[".repeat(depth),
        "]".repeat(depth)
    );
    assert!(matches!(
        decode_slice(json.as_bytes(), &registry()),
        Err(DecodeError::DepthLimit { .. })
    ));
}

#[test]
fn malformed_attribute_keeps_resource() {
    let json = br#"{"data": {"type": "geofence-regions", "id": "g",
        "attributes": {"latitude": 1.5, "longitude": 2.5, "radius": 10, "extra": 1e}}}"#;
    let doc = decode_slice(json, &registry()).unwrap();
    assert!(matches!(doc.data, Primary::Single(Resource::GeofenceRegion(_))));
}

#[test]
fn truncated_document_is_an_error() {
    let json = br#"{"data": [{"type": "messages", "id": "1""#;
    assert!(decode_slice(json, &registry()).is_err());

    let json = br#"{"data": [1, 2,, 3]}"#;
    assert!(matches!(
        decode_slice(json, &registry()),
        Err(DecodeError::Syntax { .. } | DecodeError::UnexpectedToken { .. })
    ));
}

#[test]
fn decoding_is_deterministic() {
    let json = br#"{"data": [
        {"type": "messages", "id": "1", "attributes": {"timestamp": "2023-01-01T00:00:00.000Z",
         "content-type": "deep-link", "deep-link-url": "app://home"}},
        {"type": "experiences", "id": "e", "attributes": {"name": "n", "home-screen-id": "h",
         "screens": [{"id": "h", "rows": []}]}}
    ]}"#;
    let first = decode_slice(json, &registry()).unwrap();
    let second = decode_slice(json, &registry()).unwrap();
    assert_eq!(first, second);
}

fn round_trip(resource: Resource) {
    let bytes = encode_to_vec(&resource).unwrap();
    let doc = decode_slice(&bytes, &registry()).unwrap();
    assert_eq!(doc.data, Primary::Single(resource));
}

#[test]
fn message_round_trip() {
    let time = Utc.with_ymd_and_hms(2023, 5, 6, 7, 8, 9).unwrap();
    let mut properties = IndexMap::new();
    properties.insert("campaign".to_string(), "spring".to_string());

    let mut landing = Screen::new(
        "",
        vec![Row::new(vec![Block::text("Welcome").with_size(None, Some(Unit::Points(40.0)))])
            .with_height(Unit::Percentage(25.0))],
    );
    landing.chrome.background_color = Color::rgba(10, 20, 30, 0.5);

    round_trip(Resource::Message(Message {
        id: "m1".into(),
        title: Some("Title".into()),
        text: "Body".into(),
        timestamp: time,
        read: true,
        saved_to_inbox: false,
        action: Some(MessageAction::LandingPage(Box::new(landing))),
        properties,
    }));
    round_trip(Resource::Message(Message {
        action: Some(MessageAction::Website("https://rover.io".into())),
        ..Message::new("m2", "x", time)
    }));
}

#[test]
fn region_event_experience_round_trip() {
    round_trip(Resource::GeofenceRegion(GeofenceRegion {
        id: "g".into(),
        latitude: 43.65,
        longitude: -79.38,
        radius: 120.0,
        name: Some("Office".into()),
        tags: vec!["hq".into()],
    }));

    let time = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap().fixed_offset();
    round_trip(Resource::Event(Event {
        id: Some("ev".into()),
        time,
        kind: EventKind::GeofenceTransition {
            region_id: "g".into(),
            transition: Transition::Exit,
        },
    }));
    round_trip(Resource::Event(Event {
        id: Some("loc".into()),
        time,
        kind: EventKind::LocationUpdate {
            latitude: 1.25,
            longitude: 2.5,
            accuracy: Some(10.0),
        },
    }));

    round_trip(Resource::Experience(Experience {
        id: "e".into(),
        name: "Tour".into(),
        version: Some("7".into()),
        home_screen_id: "home".into(),
        screens: vec![Screen::new("home", vec![Row::new(vec![Block::image(Image {
            url: "https://cdn.rover.io/a.png".into(),
            width: 640.0,
            height: 480.0,
        })])])],
    }));
}

#[test]
fn screen_and_remaining_event_kinds_round_trip() {
    let mut screen = Screen::new(
        "s1",
        vec![Row::new(vec![Block::text("Fine print")
            .with_size(Some(Unit::Percentage(33.3)), Some(Unit::Points(0.1)))
            .with_offset(Offset::all(0.7))])],
    );
    screen.title = Some("Terms".into());
    round_trip(Resource::Screen(screen));

    let time = Utc.with_ymd_and_hms(2023, 6, 1, 12, 0, 0).unwrap().fixed_offset();
    round_trip(Resource::Event(Event {
        id: Some("b".into()),
        time,
        kind: EventKind::BeaconTransition {
            uuid: "B9407F30-F5F8-466E-AFF9-25556B57FE6D".into(),
            major: 1,
            minor: 65_535,
            transition: Transition::Enter,
        },
    }));
    round_trip(Resource::Event(Event {
        id: Some("d".into()),
        time,
        kind: EventKind::DeviceUpdate,
    }));
}

#[test]
fn fractional_units_encode_unchanged() {
    let json = br#"{"data": {"type": "screens", "id": "s", "attributes": {"rows": [{"blocks": [
        {"type": "text-block", "text": "x", "height": {"type": "points", "value": 0.1}}
    ]}]}}}"#;
    let doc = decode_slice(json, &registry()).unwrap();
    let Primary::Single(resource) = doc.data else {
        panic!("expected a screen");
    };
    let attrs = resource.to_attributes().unwrap();
    assert_eq!(attrs["rows"][0]["blocks"][0]["height"]["value"], serde_json::json!(0.1));
}

#[test]
fn customer_device_round_trip() {
    round_trip(Resource::Customer(Customer {
        identifier: Some("c1".into()),
        first_name: Some("Ada".into()),
        age: Some(36),
        tags: vec!["vip".into()],
        ..Customer::default()
    }));

    let mut device = Device::new("udid-1");
    device.token = Some("push".into());
    device.os_version = "14".into();
    device.notifications_enabled = true;
    round_trip(Resource::Device(device));
}
