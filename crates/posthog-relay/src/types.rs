//! Event types and serialization.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Library name reported in every captured event.
pub const LIB_NAME: &str = "convex-posthog";

/// Library version reported in every captured event.
pub const LIB_VERSION: &str = "0.1.1";

/// A user event as supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventRequest {
    pub user_id: String,
    pub event: String,
    pub properties: Option<HashMap<String, Value>>,
    /// Person properties to overwrite (`$set`).
    pub set_properties: Option<HashMap<String, Value>>,
    /// Person properties to set only once (`$set_once`).
    pub set_once_properties: Option<HashMap<String, Value>>,
}

impl EventRequest {
    /// Create a request with no properties.
    pub fn new(user_id: impl Into<String>, event: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            event: event.into(),
            ..Default::default()
        }
    }
}

/// Arguments of the deferred `trackEvent` call.
///
/// Serialized in camelCase so it can be persisted by a host scheduler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackEventArgs {
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<HashMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_properties: Option<HashMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_once_properties: Option<HashMap<String, Value>>,
}

/// Body posted to the capture endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CapturePayload {
    pub api_key: String,
    pub event: String,
    pub distinct_id: String,
    pub properties: Map<String, Value>,
    pub timestamp: String,
}

impl CapturePayload {
    /// Build the payload for `args`, stamped with `timestamp`.
    ///
    /// Library identity fields are written last and override any caller
    /// property with the same key. Person properties are merged into a
    /// caller-supplied `$set`/`$set_once` object without replacing any of
    /// its keys; a non-object caller value is left as is.
    pub fn from_args(args: &TrackEventArgs, timestamp: String) -> Self {
        let mut properties = Map::new();

        if let Some(caller) = &args.properties {
            for (key, value) in caller {
                properties.insert(key.clone(), value.clone());
            }
        }
        if let Some(set) = non_empty(&args.set_properties) {
            merge_person_properties(&mut properties, "$set", set);
        }
        if let Some(set_once) = non_empty(&args.set_once_properties) {
            merge_person_properties(&mut properties, "$set_once", set_once);
        }

        properties.insert("$lib".into(), Value::from(LIB_NAME));
        properties.insert("$lib_version".into(), Value::from(LIB_VERSION));

        Self {
            api_key: args.api_key.clone(),
            event: args.event.clone(),
            distinct_id: args.user_id.clone(),
            properties,
            timestamp,
        }
    }
}

fn non_empty(map: &Option<HashMap<String, Value>>) -> Option<&HashMap<String, Value>> {
    map.as_ref().filter(|m| !m.is_empty())
}

fn merge_person_properties(
    properties: &mut Map<String, Value>,
    key: &str,
    person: &HashMap<String, Value>,
) {
    let target = properties
        .entry(key)
        .or_insert_with(|| Value::Object(Map::new()));

    if let Value::Object(existing) = target {
        for (k, v) in person {
            existing.entry(k.clone()).or_insert_with(|| v.clone());
        }
    }
}
