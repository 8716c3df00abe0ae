//! Shared data models for vehicle hardware backends

mod config;
mod request;
mod status;
mod value;

pub use config::*;
pub use request::*;
pub use status::*;
pub use value::*;
