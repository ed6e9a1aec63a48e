//! Inverse of the mappers: domain objects back to JSON:API documents.

use rover_api::{
    AttributeProvider, Attributes, Customer, Device, Event, EventKind, Experience, GeofenceRegion,
    Message, MessageAction, Screen,
};
use serde_json::{Value, json};

use crate::error::EncodeError;
use crate::mapping::{format_event_time, format_timestamp};
use crate::registry::Resource;

impl Resource {
    /// Attributes that the registered mapper turns back into `self`.
    pub fn to_attributes(&self) -> Result<Attributes, EncodeError> {
        match self {
            Resource::Message(message) => message_attributes(message),
            Resource::GeofenceRegion(region) => Ok(geofence_attributes(region)),
            Resource::Event(event) => Ok(event_attributes(event)),
            Resource::Screen(screen) => screen_attributes(screen),
            Resource::Experience(experience) => experience_attributes(experience),
            Resource::Customer(customer) => Ok(customer.attributes()),
            Resource::Device(device) => Ok(device.attributes()),
        }
    }
}

fn message_attributes(message: &Message) -> Result<Attributes, EncodeError> {
    let mut attrs = Attributes::new();
    if let Some(title) = &message.title {
        attrs.insert("android-title".into(), json!(title));
    }
    attrs.insert("notification-text".into(), json!(message.text));
    attrs.insert("timestamp".into(), json!(format_timestamp(&message.timestamp)));
    attrs.insert("read".into(), json!(message.read));
    attrs.insert("saved-to-inbox".into(), json!(message.saved_to_inbox));

    if let Some(action) = &message.action {
        attrs.insert("content-type".into(), json!(action.content_type()));
        match action {
            MessageAction::Website(url) => {
                attrs.insert("website-url".into(), json!(url));
            }
            MessageAction::DeepLink(url) => {
                attrs.insert("deep-link-url".into(), json!(url));
            }
            MessageAction::Experience(id) => {
                attrs.insert("experience-id".into(), json!(id));
            }
            MessageAction::LandingPage(screen) => {
                attrs.insert("landing-page".into(), serde_json::to_value(screen)?);
            }
        }
    }

    let properties: Attributes = message
        .properties
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    attrs.insert("properties".into(), Value::Object(properties));
    Ok(attrs)
}

fn geofence_attributes(region: &GeofenceRegion) -> Attributes {
    let mut attrs = Attributes::new();
    attrs.insert("latitude".into(), json!(region.latitude));
    attrs.insert("longitude".into(), json!(region.longitude));
    attrs.insert("radius".into(), json!(region.radius));
    if let Some(name) = &region.name {
        attrs.insert("name".into(), json!(name));
    }
    attrs.insert("tags".into(), json!(region.tags));
    attrs
}

fn event_attributes(event: &Event) -> Attributes {
    let mut attrs = Attributes::new();
    attrs.insert("time".into(), json!(format_event_time(&event.time)));
    attrs.insert("object".into(), json!(event.kind.object()));
    attrs.insert("action".into(), json!(event.kind.action()));

    match &event.kind {
        EventKind::LocationUpdate {
            latitude,
            longitude,
            accuracy,
        } => {
            attrs.insert("latitude".into(), json!(latitude));
            attrs.insert("longitude".into(), json!(longitude));
            if let Some(accuracy) = accuracy {
                attrs.insert("accuracy".into(), json!(accuracy));
            }
        }
        EventKind::GeofenceTransition { region_id, .. } => {
            attrs.insert("geofence-region-id".into(), json!(region_id));
        }
        EventKind::BeaconTransition {
            uuid, major, minor, ..
        } => {
            attrs.insert("uuid".into(), json!(uuid));
            attrs.insert("major-number".into(), json!(major));
            attrs.insert("minor-number".into(), json!(minor));
        }
        EventKind::DeviceUpdate => {}
    }
    attrs
}

fn screen_attributes(screen: &Screen) -> Result<Attributes, EncodeError> {
    match serde_json::to_value(screen)? {
        Value::Object(mut map) => {
            // The id travels as the resource id.
            map.remove("id");
            Ok(map)
        }
        _ => Ok(Attributes::new()),
    }
}

fn experience_attributes(experience: &Experience) -> Result<Attributes, EncodeError> {
    let mut attrs = Attributes::new();
    attrs.insert("name".into(), json!(experience.name));
    if let Some(version) = &experience.version {
        attrs.insert("version".into(), json!(version));
    }
    attrs.insert("home-screen-id".into(), json!(experience.home_screen_id));
    attrs.insert("screens".into(), serde_json::to_value(&experience.screens)?);
    Ok(attrs)
}

/// A single resource object: `{"id"?, "type", "attributes"}`.
pub fn encode_resource(resource: &Resource) -> Result<Value, EncodeError> {
    let mut object = serde_json::Map::new();
    if let Some(id) = resource.id() {
        object.insert("id".into(), json!(id));
    }
    object.insert("type".into(), json!(resource.kind()));
    object.insert("attributes".into(), Value::Object(resource.to_attributes()?));
    Ok(Value::Object(object))
}

/// A document whose primary data is `resource`.
pub fn encode_document(resource: &Resource) -> Result<Value, EncodeError> {
    Ok(json!({ "data": encode_resource(resource)? }))
}

pub fn encode_to_vec(resource: &Resource) -> Result<Vec<u8>, EncodeError> {
    Ok(serde_json::to_vec(&encode_document(resource)?)?)
}

/// Outbound `events` document with the customer and device snapshots
/// attached as `user` and `device`.
pub fn event_document(
    event: &Event,
    customer: &Customer,
    device: &Device,
) -> Result<Vec<u8>, EncodeError> {
    let mut attrs = event_attributes(event);
    attrs.insert("user".into(), Value::Object(customer.attributes()));
    attrs.insert("device".into(), Value::Object(device.attributes()));

    let mut data = serde_json::Map::new();
    if let Some(id) = &event.id {
        data.insert("id".into(), json!(id));
    }
    data.insert("type".into(), json!("events"));
    data.insert("attributes".into(), Value::Object(attrs));
    Ok(serde_json::to_vec(&json!({ "data": data }))?)
}
