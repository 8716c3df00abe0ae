//! VehicleHardware trait - the contract a framework layer consumes

use std::sync::Arc;

use async_trait::async_trait;

use crate::models::{
    DumpResult, GetValueRequest, GetValueResult, SetValueErrorEvent, SetValueRequest,
    SetValueResult, StatusCode, SubscribeOptions, VehiclePropConfig, VehiclePropValue,
};

/// Receives the results of a `get_values` call.
///
/// May be invoked on any thread, before or after the call returns.
pub type GetValuesCallback = Arc<dyn Fn(Vec<GetValueResult>) + Send + Sync>;

/// Receives the results of a `set_values` call.
pub type SetValuesCallback = Arc<dyn Fn(Vec<SetValueResult>) + Send + Sync>;

/// Receives one batch of property change events
pub type PropertyChangeCallback = Box<dyn Fn(Vec<VehiclePropValue>) + Send + Sync>;

/// Receives asynchronous set failures
pub type PropertySetErrorCallback = Box<dyn Fn(Vec<SetValueErrorEvent>) + Send + Sync>;

/// Vehicle hardware backend.
///
/// Every operation except the two registrations is safe to call
/// concurrently with the others. Failures are reported as `StatusCode`s,
/// the contract has no other error channel.
#[async_trait]
pub trait VehicleHardware: Send + Sync {
    /// Get all the property configs
    async fn get_all_property_configs(&self) -> Vec<VehiclePropConfig>;

    /// Get the config of a single property
    async fn get_property_config(&self, prop_id: i32) -> Option<VehiclePropConfig> {
        self.get_all_property_configs()
            .await
            .into_iter()
            .find(|config| config.prop == prop_id)
    }

    /// Set property values.
    ///
    /// The aggregate status only reports whether the batch was handled;
    /// per-request failures are carried in each result.
    async fn set_values(
        &self,
        callback: SetValuesCallback,
        requests: Vec<SetValueRequest>,
    ) -> StatusCode;

    /// Get property values
    async fn get_values(
        &self,
        callback: GetValuesCallback,
        requests: Vec<GetValueRequest>,
    ) -> StatusCode;

    /// Dump debug information
    async fn dump(&self, options: &[String]) -> DumpResult;

    /// `StatusCode::Ok` when the backend is healthy
    async fn check_health(&self) -> StatusCode;

    /// Register the property change callback.
    ///
    /// Only the first registration is kept.
    fn register_on_property_change_event(&self, callback: PropertyChangeCallback);

    /// Register the property set error callback.
    ///
    /// Only the first registration is kept.
    fn register_on_property_set_error_event(&self, callback: PropertySetErrorCallback);

    /// Update the sample rate of a `(prop_id, area_id)` pair
    async fn update_sample_rate(&self, prop_id: i32, area_id: i32, sample_rate: f32)
        -> StatusCode;

    async fn subscribe(&self, options: SubscribeOptions) -> StatusCode;

    async fn unsubscribe(&self, prop_id: i32, area_id: i32) -> StatusCode;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VehiclePropertyChangeMode;
    use pretty_assertions::assert_eq;

    /// Backend exposing a fixed config list
    struct StaticConfigs(Vec<VehiclePropConfig>);

    #[async_trait]
    impl VehicleHardware for StaticConfigs {
        async fn get_all_property_configs(&self) -> Vec<VehiclePropConfig> {
            self.0.clone()
        }

        async fn set_values(&self, _: SetValuesCallback, _: Vec<SetValueRequest>) -> StatusCode {
            StatusCode::Ok
        }

        async fn get_values(&self, _: GetValuesCallback, _: Vec<GetValueRequest>) -> StatusCode {
            StatusCode::Ok
        }

        async fn dump(&self, _: &[String]) -> DumpResult {
            DumpResult::default()
        }

        async fn check_health(&self) -> StatusCode {
            StatusCode::Ok
        }

        fn register_on_property_change_event(&self, _: PropertyChangeCallback) {}

        fn register_on_property_set_error_event(&self, _: PropertySetErrorCallback) {}

        async fn update_sample_rate(&self, _: i32, _: i32, _: f32) -> StatusCode {
            StatusCode::Ok
        }

        async fn subscribe(&self, _: SubscribeOptions) -> StatusCode {
            StatusCode::Ok
        }

        async fn unsubscribe(&self, _: i32, _: i32) -> StatusCode {
            StatusCode::Ok
        }
    }

    #[tokio::test]
    async fn test_get_property_config_scans_all_configs() {
        let speed = VehiclePropConfig {
            prop: 0x1120_0207,
            change_mode: VehiclePropertyChangeMode::Continuous,
            max_sample_rate: 10.0,
            ..Default::default()
        };
        let gear = VehiclePropConfig {
            prop: 0x1140_0400,
            change_mode: VehiclePropertyChangeMode::OnChange,
            ..Default::default()
        };
        let backend = StaticConfigs(vec![speed, gear.clone()]);

        assert_eq!(backend.get_property_config(0x1140_0400).await, Some(gear));
        assert_eq!(backend.get_property_config(42).await, None);
    }
}
