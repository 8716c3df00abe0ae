//! Transport layer for the remote vehicle server
//!
//! This module provides the stub the bridge calls into:
//! - gRPC stub backed by a tonic channel
//! - Scripted mock stub for testing
//!
//! # Example
//!
//! ```ignore
//! use vhal_grpc::transport::{GrpcVehicleServerStub, VehicleServerStub};
//! use vhal_grpc::config::ServerConfig;
//!
//! let stub = GrpcVehicleServerStub::connect_lazy(&ServerConfig::default())?;
//! let health = stub.check_health().await?;
//! ```

mod grpc;
pub mod mock;
pub mod proto;
mod status;

pub use grpc::GrpcVehicleServerStub;
pub use mock::MockVehicleServer;
pub use status::{RpcCode, RpcResult, RpcStatus};

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::BoxStream;
use vhal_core::{
    DumpResult, GetValueRequest, GetValueResult, SetValueRequest, SetValueResult, StatusCode,
    SubscribeOptions, VehiclePropConfig, VehiclePropValue,
};

/// Server-pushed property value batches.
///
/// Dropping the stream cancels the underlying call.
pub type PropertyValueStream = BoxStream<'static, RpcResult<Vec<VehiclePropValue>>>;

/// Calls exposed by the remote vehicle server
#[async_trait]
pub trait VehicleServerStub: Send + Sync {
    /// Fetch every property config
    async fn get_all_property_config(&self) -> RpcResult<Vec<VehiclePropConfig>>;

    async fn set_values(&self, requests: Vec<SetValueRequest>) -> RpcResult<Vec<SetValueResult>>;

    async fn get_values(&self, requests: Vec<GetValueRequest>) -> RpcResult<Vec<GetValueResult>>;

    async fn dump(&self, options: Vec<String>) -> RpcResult<DumpResult>;

    async fn check_health(&self) -> RpcResult<StatusCode>;

    async fn subscribe(&self, options: SubscribeOptions) -> RpcResult<StatusCode>;

    async fn unsubscribe(&self, prop_id: i32, area_id: i32) -> RpcResult<StatusCode>;

    async fn update_sample_rate(
        &self,
        prop_id: i32,
        area_id: i32,
        sample_rate: f32,
    ) -> RpcResult<StatusCode>;

    /// Open the long-lived property value stream
    async fn start_property_values_stream(&self) -> RpcResult<PropertyValueStream>;

    /// Wait until the server is reachable or `timeout` elapses
    async fn wait_for_ready(&self, _timeout: Duration) -> bool {
        true
    }
}
