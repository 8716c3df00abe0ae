//! vhal-grpc - gRPC bridge backend for the vehicle hardware contract
//!
//! This crate implements `VehicleHardware` by forwarding every call to a
//! remote vehicle server and by consuming the server's property value push
//! stream in a background task.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   GrpcVehicleHardware                       │
//! │  Implements VehicleHardware trait                           │
//! │                                                             │
//! │  ┌────────────────┐  ┌──────────────┐  ┌─────────────────┐  │
//! │  │ TimestampTable │  │ Callbacks    │  │ Value stream    │  │
//! │  │ (reconcile)    │  │ (RwLock)     │  │ task (reconnect)│  │
//! │  └────────────────┘  └──────────────┘  └─────────────────┘  │
//! │                          │                                  │
//! │                 ┌────────┴──────────┐                       │
//! │                 │VehicleServerStub  │                       │
//! │                 │(tonic / mock)     │                       │
//! │                 └───────────────────┘                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod bridge;
mod callbacks;
pub mod clock;
pub mod config;
pub mod error;
mod stream;
pub mod timestamps;
pub mod transport;

pub use bridge::{BridgeOptions, GrpcVehicleHardware};
pub use config::{BridgeConfig, GetValuesConfig, ServerConfig, StreamConfig};
pub use error::BridgeError;
pub use timestamps::{Admission, TimestampTable};
pub use transport::{
    GrpcVehicleServerStub, MockVehicleServer, PropertyValueStream, RpcCode, RpcResult, RpcStatus,
    VehicleServerStub,
};

// Re-export for convenience
pub use vhal_core::{
    GetValueRequest, GetValueResult, PropIdAreaId, SetValueRequest, SetValueResult, StatusCode,
    SubscribeOptions, VehicleHardware, VehiclePropConfig, VehiclePropValue,
};
