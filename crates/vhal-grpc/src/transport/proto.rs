//! Wire messages of the `VehicleServer` gRPC service
//!
//! Package `android.hardware.automotive.vehicle.proto`. Enum-typed fields are
//! carried as their `int32` wire values and decoded with the model's
//! `from_wire` helpers.

use vhal_core::{
    DumpResult as ModelDumpResult, GetValueRequest, GetValueResult as ModelGetValueResult,
    RawPropValues, SetValueRequest, SetValueResult as ModelSetValueResult, StatusCode,
    SubscribeOptions as ModelSubscribeOptions, VehicleAreaConfig as ModelAreaConfig,
    VehiclePropConfig as ModelPropConfig, VehiclePropValue as ModelPropValue,
    VehiclePropertyAccess, VehiclePropertyChangeMode, VehiclePropertyStatus,
};

/// Fully qualified service name used to build method paths
pub const SERVICE_NAME: &str = "android.hardware.automotive.vehicle.proto.VehicleServer";

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VehiclePropValue {
    #[prost(int64, tag = "1")]
    pub timestamp: i64,
    #[prost(int32, tag = "2")]
    pub area_id: i32,
    #[prost(int32, tag = "3")]
    pub prop: i32,
    #[prost(int32, tag = "4")]
    pub status: i32,
    #[prost(int32, repeated, tag = "5")]
    pub int32_values: Vec<i32>,
    #[prost(float, repeated, tag = "6")]
    pub float_values: Vec<f32>,
    #[prost(int64, repeated, tag = "7")]
    pub int64_values: Vec<i64>,
    #[prost(bytes = "vec", tag = "8")]
    pub byte_values: Vec<u8>,
    #[prost(string, tag = "9")]
    pub string_value: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VehiclePropValues {
    #[prost(message, repeated, tag = "1")]
    pub values: Vec<VehiclePropValue>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VehiclePropValueRequest {
    #[prost(int64, tag = "1")]
    pub request_id: i64,
    #[prost(message, optional, tag = "2")]
    pub value: Option<VehiclePropValue>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VehiclePropValueRequests {
    #[prost(message, repeated, tag = "1")]
    pub requests: Vec<VehiclePropValueRequest>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SetValueResult {
    #[prost(int64, tag = "1")]
    pub request_id: i64,
    #[prost(int32, tag = "2")]
    pub status: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SetValueResults {
    #[prost(message, repeated, tag = "1")]
    pub results: Vec<SetValueResult>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetValueResult {
    #[prost(int64, tag = "1")]
    pub request_id: i64,
    #[prost(int32, tag = "2")]
    pub status: i32,
    #[prost(message, optional, tag = "3")]
    pub value: Option<VehiclePropValue>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetValueResults {
    #[prost(message, repeated, tag = "1")]
    pub results: Vec<GetValueResult>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VehicleHalCallStatus {
    #[prost(int32, tag = "1")]
    pub status_code: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DumpOptions {
    #[prost(string, repeated, tag = "1")]
    pub options: Vec<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DumpResult {
    #[prost(bool, tag = "1")]
    pub caller_should_dump_state: bool,
    #[prost(string, tag = "2")]
    pub buffer: String,
    #[prost(bool, tag = "3")]
    pub refresh_property_configs: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateSampleRateRequest {
    #[prost(int32, tag = "1")]
    pub prop: i32,
    #[prost(int32, tag = "2")]
    pub area_id: i32,
    #[prost(float, tag = "3")]
    pub sample_rate: f32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubscribeOptions {
    #[prost(int32, tag = "1")]
    pub prop_id: i32,
    #[prost(int32, repeated, tag = "2")]
    pub area_ids: Vec<i32>,
    #[prost(float, tag = "3")]
    pub sample_rate: f32,
    #[prost(float, tag = "4")]
    pub resolution: f32,
    #[prost(bool, tag = "5")]
    pub enable_variable_update_rate: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubscribeRequest {
    #[prost(message, optional, tag = "1")]
    pub options: Option<SubscribeOptions>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UnsubscribeRequest {
    #[prost(int32, tag = "1")]
    pub prop_id: i32,
    #[prost(int32, tag = "2")]
    pub area_id: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VehicleAreaConfig {
    #[prost(int32, tag = "1")]
    pub area_id: i32,
    #[prost(int32, tag = "2")]
    pub min_int32_value: i32,
    #[prost(int32, tag = "3")]
    pub max_int32_value: i32,
    #[prost(int64, tag = "4")]
    pub min_int64_value: i64,
    #[prost(int64, tag = "5")]
    pub max_int64_value: i64,
    #[prost(float, tag = "6")]
    pub min_float_value: f32,
    #[prost(float, tag = "7")]
    pub max_float_value: f32,
    #[prost(int64, repeated, tag = "8")]
    pub supported_enum_values: Vec<i64>,
    #[prost(int32, tag = "9")]
    pub access: i32,
    #[prost(bool, tag = "10")]
    pub support_variable_update_rate: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VehiclePropConfig {
    #[prost(int32, tag = "1")]
    pub prop: i32,
    #[prost(int32, tag = "2")]
    pub access: i32,
    #[prost(int32, tag = "3")]
    pub change_mode: i32,
    #[prost(message, repeated, tag = "4")]
    pub area_configs: Vec<VehicleAreaConfig>,
    #[prost(int32, repeated, tag = "5")]
    pub config_array: Vec<i32>,
    #[prost(string, tag = "6")]
    pub config_string: String,
    #[prost(float, tag = "7")]
    pub min_sample_rate: f32,
    #[prost(float, tag = "8")]
    pub max_sample_rate: f32,
}

// =============================================================================
// Model conversions
// =============================================================================

impl From<&ModelPropValue> for VehiclePropValue {
    fn from(value: &ModelPropValue) -> Self {
        Self {
            timestamp: value.timestamp,
            area_id: value.area_id,
            prop: value.prop,
            status: value.status as i32,
            int32_values: value.value.int32_values.clone(),
            float_values: value.value.float_values.clone(),
            int64_values: value.value.int64_values.clone(),
            byte_values: value.value.byte_values.clone(),
            string_value: value.value.string_value.clone(),
        }
    }
}

impl From<VehiclePropValue> for ModelPropValue {
    fn from(value: VehiclePropValue) -> Self {
        Self {
            timestamp: value.timestamp,
            area_id: value.area_id,
            prop: value.prop,
            status: VehiclePropertyStatus::from_wire(value.status),
            value: RawPropValues {
                int32_values: value.int32_values,
                float_values: value.float_values,
                int64_values: value.int64_values,
                byte_values: value.byte_values,
                string_value: value.string_value,
            },
        }
    }
}

impl From<&[GetValueRequest]> for VehiclePropValueRequests {
    fn from(requests: &[GetValueRequest]) -> Self {
        Self {
            requests: requests
                .iter()
                .map(|request| VehiclePropValueRequest {
                    request_id: request.request_id,
                    value: Some((&request.prop).into()),
                })
                .collect(),
        }
    }
}

impl From<&[SetValueRequest]> for VehiclePropValueRequests {
    fn from(requests: &[SetValueRequest]) -> Self {
        Self {
            requests: requests
                .iter()
                .map(|request| VehiclePropValueRequest {
                    request_id: request.request_id,
                    value: Some((&request.value).into()),
                })
                .collect(),
        }
    }
}

impl From<GetValueResult> for ModelGetValueResult {
    fn from(result: GetValueResult) -> Self {
        Self {
            request_id: result.request_id,
            status: StatusCode::from_wire(result.status),
            prop: result.value.map(Into::into),
        }
    }
}

impl From<SetValueResult> for ModelSetValueResult {
    fn from(result: SetValueResult) -> Self {
        Self {
            request_id: result.request_id,
            status: StatusCode::from_wire(result.status),
        }
    }
}

impl From<DumpResult> for ModelDumpResult {
    fn from(result: DumpResult) -> Self {
        Self {
            caller_should_dump_state: result.caller_should_dump_state,
            buffer: result.buffer,
            refresh_property_configs: result.refresh_property_configs,
        }
    }
}

impl From<&ModelSubscribeOptions> for SubscribeOptions {
    fn from(options: &ModelSubscribeOptions) -> Self {
        Self {
            prop_id: options.prop_id,
            area_ids: options.area_ids.clone(),
            sample_rate: options.sample_rate,
            resolution: options.resolution,
            enable_variable_update_rate: options.enable_variable_update_rate,
        }
    }
}

impl From<VehicleAreaConfig> for ModelAreaConfig {
    fn from(config: VehicleAreaConfig) -> Self {
        Self {
            area_id: config.area_id,
            access: VehiclePropertyAccess::from_wire(config.access),
            min_int32_value: config.min_int32_value,
            max_int32_value: config.max_int32_value,
            min_int64_value: config.min_int64_value,
            max_int64_value: config.max_int64_value,
            min_float_value: config.min_float_value,
            max_float_value: config.max_float_value,
            supported_enum_values: config.supported_enum_values,
            support_variable_update_rate: config.support_variable_update_rate,
        }
    }
}

impl From<VehiclePropConfig> for ModelPropConfig {
    fn from(config: VehiclePropConfig) -> Self {
        Self {
            prop: config.prop,
            access: VehiclePropertyAccess::from_wire(config.access),
            change_mode: VehiclePropertyChangeMode::from_wire(config.change_mode),
            area_configs: config.area_configs.into_iter().map(Into::into).collect(),
            config_array: config.config_array,
            config_string: config.config_string,
            min_sample_rate: config.min_sample_rate,
            max_sample_rate: config.max_sample_rate,
        }
    }
}

impl From<VehiclePropValues> for Vec<ModelPropValue> {
    fn from(values: VehiclePropValues) -> Self {
        values.values.into_iter().map(Into::into).collect()
    }
}
