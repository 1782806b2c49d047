//! Platform torch implementations
//!
//! This module defines the hardware boundary the rest of the application
//! talks to. Every backend exposes device enumeration, a set-mode call keyed
//! by device id and a subscribe/unsubscribe pair for state notifications.

#[cfg(windows)]
pub mod lamp;
pub mod simulated;

use std::sync::Arc;

use crate::domain::{DeviceId, TorchError, TorchNotification};

/// Callback invoked by a backend for every hardware notification
///
/// Backends may call it from any thread, so it must be `Send + Sync`.
pub type TorchCallback = Arc<dyn Fn(TorchNotification) + Send + Sync>;

/// Registration handle returned by [`TorchBackend::register_callback`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(pub u64);

/// Hardware torch control surface
pub trait TorchBackend: Send + Sync {
    /// Lists torch-capable devices; the first entry is the primary torch
    fn torch_devices(&self) -> Result<Vec<DeviceId>, TorchError>;

    /// Requests the torch mode of `device`
    ///
    /// Success means the request was accepted. The confirmed state arrives
    /// later through the registered callbacks.
    fn set_torch_mode(&self, device: &DeviceId, enabled: bool) -> Result<(), TorchError>;

    /// Registers a notification callback
    ///
    /// Implementations report the current mode of every device to the new
    /// callback right after registration.
    fn register_callback(&self, callback: TorchCallback) -> Result<CallbackId, TorchError>;

    /// Removes a callback registered earlier; unknown ids are ignored
    fn unregister_callback(&self, id: CallbackId);
}
