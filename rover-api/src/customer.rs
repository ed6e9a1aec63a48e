//! Customer and device attributes attached to every outbound event.

use serde_json::Value;

use crate::Attributes;

/// An opaque key-value attribute source.
pub trait AttributeProvider {
    fn attributes(&self) -> Attributes;
}

/// The signed-in user, as far as the server knows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Customer {
    pub identifier: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub gender: Option<String>,
    pub age: Option<u32>,
    pub tags: Vec<String>,
    /// Free-form traits. May hold explicit nulls until merged.
    pub traits: Attributes,
}

impl Customer {
    /// Merge a traits update.
    ///
    /// An explicit `null` clears the trait; keys absent from `update` are
    /// left untouched.
    pub fn merge_traits(&mut self, update: &Attributes) {
        for (key, value) in update {
            if value.is_null() {
                self.traits.remove(key);
            } else {
                self.traits.insert(key.clone(), value.clone());
            }
        }
    }
}

fn put_opt(map: &mut Attributes, key: &str, value: &Option<String>) {
    if let Some(value) = value {
        map.insert(key.to_string(), Value::String(value.clone()));
    }
}

impl AttributeProvider for Customer {
    fn attributes(&self) -> Attributes {
        let mut map = Attributes::new();
        put_opt(&mut map, "identifier", &self.identifier);
        put_opt(&mut map, "first-name", &self.first_name);
        put_opt(&mut map, "last-name", &self.last_name);
        put_opt(&mut map, "email", &self.email);
        put_opt(&mut map, "phone-number", &self.phone_number);
        put_opt(&mut map, "gender", &self.gender);
        if let Some(age) = self.age {
            map.insert("age".into(), Value::from(age));
        }
        map.insert(
            "tags".into(),
            Value::Array(self.tags.iter().cloned().map(Value::String).collect()),
        );
        map.insert("traits".into(), Value::Object(self.traits.clone()));
        map
    }
}

/// Static facts about the host device, gathered by the platform layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    pub id: String,
    pub token: Option<String>,
    pub locale_language: String,
    pub locale_region: Option<String>,
    pub time_zone: String,
    pub sdk_version: String,
    pub platform: String,
    pub os_name: String,
    pub os_version: String,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub carrier: Option<String>,
    pub app_identifier: Option<String>,
    pub development: bool,
    pub notifications_enabled: bool,
    pub location_monitoring_enabled: bool,
    pub bluetooth_enabled: bool,
}

impl Device {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            token: None,
            locale_language: "en".into(),
            locale_region: None,
            time_zone: "UTC".into(),
            sdk_version: env!("CARGO_PKG_VERSION").into(),
            platform: "Android".into(),
            os_name: "Android".into(),
            os_version: String::new(),
            manufacturer: None,
            model: None,
            carrier: None,
            app_identifier: None,
            development: false,
            notifications_enabled: false,
            location_monitoring_enabled: false,
            bluetooth_enabled: false,
        }
    }
}

impl AttributeProvider for Device {
    fn attributes(&self) -> Attributes {
        let mut map = Attributes::new();
        map.insert("udid".into(), Value::String(self.id.clone()));
        put_opt(&mut map, "token", &self.token);
        map.insert("locale-lang".into(), Value::String(self.locale_language.clone()));
        put_opt(&mut map, "locale-region", &self.locale_region);
        map.insert("time-zone".into(), Value::String(self.time_zone.clone()));
        map.insert("sdk-version".into(), Value::String(self.sdk_version.clone()));
        map.insert("platform".into(), Value::String(self.platform.clone()));
        map.insert("os-name".into(), Value::String(self.os_name.clone()));
        map.insert("os-version".into(), Value::String(self.os_version.clone()));
        put_opt(&mut map, "manufacturer", &self.manufacturer);
        put_opt(&mut map, "model", &self.model);
        put_opt(&mut map, "carrier", &self.carrier);
        put_opt(&mut map, "app-identifier", &self.app_identifier);
        map.insert("development".into(), Value::Bool(self.development));
        map.insert(
            "notifications-enabled".into(),
            Value::Bool(self.notifications_enabled),
        );
        map.insert(
            "location-monitoring-enabled".into(),
            Value::Bool(self.location_monitoring_enabled),
        );
        map.insert("bluetooth-enabled".into(), Value::Bool(self.bluetooth_enabled));
        map
    }
}
