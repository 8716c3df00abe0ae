//! Get/set/subscribe request and result models
//!
//! Results are paired with requests by `request_id`, never by position.

use serde::{Deserialize, Serialize};

use super::{StatusCode, VehiclePropValue};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetValueRequest {
    pub request_id: i64,
    /// Selects the property; only `prop` and `area_id` are meaningful
    pub prop: VehiclePropValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetValueResult {
    pub request_id: i64,
    pub status: StatusCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prop: Option<VehiclePropValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetValueRequest {
    pub request_id: i64,
    pub value: VehiclePropValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetValueResult {
    pub request_id: i64,
    pub status: StatusCode,
}

/// Asynchronous failure of a previously accepted set request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetValueErrorEvent {
    pub error_code: StatusCode,
    pub prop_id: i32,
    pub area_id: i32,
}

/// Subscription parameters for one property.
///
/// A later call for the same property supersedes the earlier one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SubscribeOptions {
    pub prop_id: i32,
    #[serde(default)]
    pub area_ids: Vec<i32>,
    /// Hz, continuous properties only
    #[serde(default)]
    pub sample_rate: f32,
    #[serde(default)]
    pub resolution: f32,
    #[serde(default)]
    pub enable_variable_update_rate: bool,
}

/// Output of a diagnostic dump
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DumpResult {
    /// Whether the caller should also dump its own state
    pub caller_should_dump_state: bool,
    pub buffer: String,
    /// Whether property configs changed and should be fetched again
    pub refresh_property_configs: bool,
}
