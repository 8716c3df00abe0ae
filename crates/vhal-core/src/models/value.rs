//! Property value models

use serde::{Deserialize, Serialize};

/// Availability of a property value as reported by its source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum VehiclePropertyStatus {
    #[default]
    Available = 0,
    Unavailable = 1,
    Error = 2,
}

impl VehiclePropertyStatus {
    /// Decode a wire value, treating unknown values as `Error`
    pub fn from_wire(value: i32) -> Self {
        match value {
            0 => VehiclePropertyStatus::Available,
            1 => VehiclePropertyStatus::Unavailable,
            _ => VehiclePropertyStatus::Error,
        }
    }
}

/// Payload of a property value.
///
/// Only the field matching the property's type is populated.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawPropValues {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub int32_values: Vec<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub float_values: Vec<f32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub int64_values: Vec<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub byte_values: Vec<u8>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub string_value: String,
}

/// A timestamped value of one `(prop, area_id)` pair
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VehiclePropValue {
    /// Nanoseconds since an epoch chosen by the value's source
    pub timestamp: i64,
    pub area_id: i32,
    pub prop: i32,
    #[serde(default)]
    pub status: VehiclePropertyStatus,
    #[serde(default)]
    pub value: RawPropValues,
}

impl VehiclePropValue {
    /// Create an empty value selecting `(prop, area_id)`
    pub fn new(prop: i32, area_id: i32) -> Self {
        Self {
            prop,
            area_id,
            ..Default::default()
        }
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_int32_values(mut self, values: Vec<i32>) -> Self {
        self.value.int32_values = values;
        self
    }

    pub fn with_float_values(mut self, values: Vec<f32>) -> Self {
        self.value.float_values = values;
        self
    }

    pub fn with_string_value(mut self, value: impl Into<String>) -> Self {
        self.value.string_value = value.into();
        self
    }

    pub fn key(&self) -> PropIdAreaId {
        PropIdAreaId::of(self)
    }
}

/// Composite key identifying one property area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropIdAreaId {
    pub prop_id: i32,
    pub area_id: i32,
}

impl PropIdAreaId {
    pub fn new(prop_id: i32, area_id: i32) -> Self {
        Self { prop_id, area_id }
    }

    pub fn of(value: &VehiclePropValue) -> Self {
        Self::new(value.prop, value.area_id)
    }
}

impl std::fmt::Display for PropIdAreaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.prop_id, self.area_id)
    }
}

/// Last accepted timestamps of one property area.
///
/// `external_timestamp` is the source's timestamp; `local_timestamp` is the
/// local monotonic time at which that update was first accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampRecord {
    pub external_timestamp: i64,
    pub local_timestamp: i64,
}
