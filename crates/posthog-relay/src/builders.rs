//! Fluent builder for event requests.

use crate::types::EventRequest;
use serde_json::Value;
use std::collections::HashMap;

/// Builder for a user event.
#[derive(Debug)]
pub struct TrackBuilder {
    user_id: String,
    event: String,
    properties: HashMap<String, Value>,
    set_properties: HashMap<String, Value>,
    set_once_properties: HashMap<String, Value>,
}

impl TrackBuilder {
    pub(crate) fn new(event: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            event: event.into(),
            properties: HashMap::new(),
            set_properties: HashMap::new(),
            set_once_properties: HashMap::new(),
        }
    }

    /// Add an event property.
    pub fn property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Add a person property, overwriting any existing value.
    pub fn set_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_properties.insert(key.into(), value.into());
        self
    }

    /// Add a person property that is only set if absent.
    pub fn set_once_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_once_properties.insert(key.into(), value.into());
        self
    }

    /// Build the request. Empty maps become `None`.
    pub(crate) fn build(self) -> EventRequest {
        EventRequest {
            user_id: self.user_id,
            event: self.event,
            properties: some_if_any(self.properties),
            set_properties: some_if_any(self.set_properties),
            set_once_properties: some_if_any(self.set_once_properties),
        }
    }
}

fn some_if_any(map: HashMap<String, Value>) -> Option<HashMap<String, Value>> {
    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}
