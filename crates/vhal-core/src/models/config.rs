//! Property configuration models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum VehiclePropertyAccess {
    #[default]
    None = 0,
    Read = 1,
    Write = 2,
    ReadWrite = 3,
}

impl VehiclePropertyAccess {
    pub fn from_wire(value: i32) -> Self {
        match value {
            1 => VehiclePropertyAccess::Read,
            2 => VehiclePropertyAccess::Write,
            3 => VehiclePropertyAccess::ReadWrite,
            _ => VehiclePropertyAccess::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum VehiclePropertyChangeMode {
    #[default]
    Static = 0,
    OnChange = 1,
    Continuous = 2,
}

impl VehiclePropertyChangeMode {
    pub fn from_wire(value: i32) -> Self {
        match value {
            1 => VehiclePropertyChangeMode::OnChange,
            2 => VehiclePropertyChangeMode::Continuous,
            _ => VehiclePropertyChangeMode::Static,
        }
    }
}

/// Per-area limits and capabilities of a property
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleAreaConfig {
    pub area_id: i32,
    pub access: VehiclePropertyAccess,
    pub min_int32_value: i32,
    pub max_int32_value: i32,
    pub min_int64_value: i64,
    pub max_int64_value: i64,
    pub min_float_value: f32,
    pub max_float_value: f32,
    pub supported_enum_values: Vec<i64>,
    pub support_variable_update_rate: bool,
}

/// Static description of one property
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VehiclePropConfig {
    pub prop: i32,
    pub access: VehiclePropertyAccess,
    pub change_mode: VehiclePropertyChangeMode,
    pub area_configs: Vec<VehicleAreaConfig>,
    pub config_array: Vec<i32>,
    pub config_string: String,
    /// Hz, continuous properties only
    pub min_sample_rate: f32,
    pub max_sample_rate: f32,
}

impl VehiclePropConfig {
    pub fn area_config(&self, area_id: i32) -> Option<&VehicleAreaConfig> {
        self.area_configs.iter().find(|c| c.area_id == area_id)
    }
}
