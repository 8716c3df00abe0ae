//! vhal-core - Core traits and types for vehicle hardware backends
//!
//! This crate provides the vehicle hardware contract that a framework layer
//! consumes, together with the property data model shared by every backend
//! (local simulation, remote bridge, etc.).

pub mod error;
pub mod hardware;
pub mod models;

pub use error::InvalidStatusCode;
pub use hardware::{
    GetValuesCallback, PropertyChangeCallback, PropertySetErrorCallback, SetValuesCallback,
    VehicleHardware,
};
pub use models::*;
