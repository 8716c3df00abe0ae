//! Registered event callbacks

use parking_lot::RwLock;
use tracing::error;
use vhal_core::{PropertyChangeCallback, PropertySetErrorCallback, VehiclePropValue};

#[derive(Default)]
struct Slots {
    on_property_change: Option<PropertyChangeCallback>,
    on_set_error: Option<PropertySetErrorCallback>,
    closed: bool,
}

/// Write-once callback slots.
///
/// Dispatch holds the read lock for the whole callback invocation, so
/// `close` returns only after in-flight dispatches have finished.
#[derive(Default)]
pub(crate) struct CallbackRegistry {
    slots: RwLock<Slots>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when a callback was already registered
    pub fn register_property_change(&self, callback: PropertyChangeCallback) -> bool {
        let mut slots = self.slots.write();
        if slots.on_property_change.is_some() {
            error!("Property change callback is already registered, ignoring");
            return false;
        }
        slots.on_property_change = Some(callback);
        true
    }

    /// Returns false when a callback was already registered
    pub fn register_set_error(&self, callback: PropertySetErrorCallback) -> bool {
        let mut slots = self.slots.write();
        if slots.on_set_error.is_some() {
            error!("Property set error callback is already registered, ignoring");
            return false;
        }
        slots.on_set_error = Some(callback);
        true
    }

    /// Deliver one batch to the property change callback.
    ///
    /// Returns whether a callback received it.
    pub fn dispatch_property_change(&self, values: Vec<VehiclePropValue>) -> bool {
        let slots = self.slots.read();
        if slots.closed {
            return false;
        }
        match slots.on_property_change.as_ref() {
            Some(callback) => {
                callback(values);
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub fn has_set_error_callback(&self) -> bool {
        self.slots.read().on_set_error.is_some()
    }

    /// Stop all further dispatches
    pub fn close(&self) {
        self.slots.write().closed = true;
    }

    #[cfg(test)]
    pub fn is_closed(&self) -> bool {
        self.slots.read().closed
    }
}
