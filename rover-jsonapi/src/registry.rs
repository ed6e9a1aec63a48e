//! Resource registry - maps JSON:API `type` strings to typed constructors.

use indexmap::IndexMap;
use rover_api::{
    Attributes, Customer, Device, Event, Experience, GeofenceRegion, Message, Screen,
};

use crate::decoder::ResourceFactory;
use crate::mapping;

/// Every domain object the decoder knows how to build.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    Message(Message),
    GeofenceRegion(GeofenceRegion),
    Event(Event),
    Screen(Screen),
    Experience(Experience),
    Customer(Customer),
    Device(Device),
}

impl Resource {
    /// The JSON:API `type` this resource is registered under.
    pub fn kind(&self) -> &'static str {
        match self {
            Resource::Message(_) => "messages",
            Resource::GeofenceRegion(_) => "geofence-regions",
            Resource::Event(_) => "events",
            Resource::Screen(_) => "screens",
            Resource::Experience(_) => "experiences",
            Resource::Customer(_) => "customers",
            Resource::Device(_) => "devices",
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Resource::Message(m) => Some(&m.id),
            Resource::GeofenceRegion(g) => Some(&g.id),
            Resource::Event(e) => e.id.as_deref(),
            Resource::Screen(s) => Some(&s.id),
            Resource::Experience(e) => Some(&e.id),
            Resource::Customer(c) => c.identifier.as_deref(),
            Resource::Device(d) => Some(&d.id),
        }
    }

    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Resource::Message(m) => Some(m),
            _ => None,
        }
    }

    pub fn into_message(self) -> Option<Message> {
        match self {
            Resource::Message(m) => Some(m),
            _ => None,
        }
    }

    pub fn into_geofence_region(self) -> Option<GeofenceRegion> {
        match self {
            Resource::GeofenceRegion(g) => Some(g),
            _ => None,
        }
    }

    pub fn into_experience(self) -> Option<Experience> {
        match self {
            Resource::Experience(e) => Some(e),
            _ => None,
        }
    }
}

/// Constructor signature stored in the registry.
pub type Constructor = Box<dyn Fn(Option<&str>, &Attributes) -> Option<Resource> + Send + Sync>;

/// Registry of resource constructors, keyed by `type`.
///
/// Types without a constructor map to `None`, which the decoder treats as
/// "drop this resource".
pub struct ResourceRegistry {
    constructors: IndexMap<String, Constructor>,
}

impl ResourceRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            constructors: IndexMap::new(),
        }
    }

    /// Create a registry with every built-in domain type.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("messages", mapping::message);
        registry.register("geofence-regions", mapping::geofence_region);
        registry.register("events", mapping::event);
        registry.register("screens", mapping::screen);
        registry.register("experiences", mapping::experience);
        registry.register("customers", mapping::customer);
        registry.register("devices", mapping::device);
        registry
    }

    /// Register (or replace) the constructor for `kind`.
    pub fn register<F>(&mut self, kind: impl Into<String>, constructor: F)
    where
        F: Fn(Option<&str>, &Attributes) -> Option<Resource> + Send + Sync + 'static,
    {
        self.constructors.insert(kind.into(), Box::new(constructor));
    }

    /// Registered types, in registration order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.constructors.contains_key(kind)
    }
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl ResourceFactory<Resource> for ResourceRegistry {
    fn create(&self, kind: &str, id: Option<&str>, attributes: &Attributes) -> Option<Resource> {
        let constructor = self.constructors.get(kind)?;
        constructor(id, attributes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builtins_cover_all_kinds() {
        let registry = ResourceRegistry::with_builtins();
        let kinds: Vec<_> = registry.kinds().collect();
        assert_eq!(
            kinds,
            vec![
                "messages",
                "geofence-regions",
                "events",
                "screens",
                "experiences",
                "customers",
                "devices"
            ]
        );
    }

    #[test]
    fn unknown_kind_maps_to_none() {
        let registry = ResourceRegistry::with_builtins();
        assert!(registry.create("widgets", Some("1"), &Attributes::new()).is_none());
        assert!(!registry.contains("widgets"));
    }

    #[test]
    fn register_replaces_constructor() {
        let mut registry = ResourceRegistry::with_builtins();
        registry.register("devices", |_, _| None);
        let attrs = match json!({"udid": "x"}) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        assert!(registry.create("devices", None, &attrs).is_none());
        assert_eq!(registry.kinds().count(), 7);
    }
}
