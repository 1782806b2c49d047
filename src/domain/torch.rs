//! Torch state and hardware notification types
//!
//! These types describe the flashlight without reference to any platform API.
//! Backends translate their native callbacks into [`TorchNotification`] values.

use std::fmt;

/// Confirmed on/off state of the torch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TorchState {
    On,
    #[default]
    Off,
}

impl TorchState {
    pub fn from_enabled(enabled: bool) -> Self {
        if enabled { Self::On } else { Self::Off }
    }

    pub fn is_on(self) -> bool {
        matches!(self, Self::On)
    }

    /// The state a tap would request
    pub fn toggled(self) -> Self {
        match self {
            Self::On => Self::Off,
            Self::Off => Self::On,
        }
    }
}

impl fmt::Display for TorchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TorchState::On => write!(f, "on"),
            TorchState::Off => write!(f, "off"),
        }
    }
}

/// Platform identifier of a torch-capable unit
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Asynchronous hardware notification delivered by a backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TorchNotification {
    /// The torch mode of `device` changed (or was reported on registration)
    ModeChanged { device: DeviceId, enabled: bool },
    /// `device` can no longer be controlled, typically because another
    /// process opened the camera
    Unavailable { device: DeviceId },
}

impl TorchNotification {
    pub fn device(&self) -> &DeviceId {
        match self {
            TorchNotification::ModeChanged { device, .. } => device,
            TorchNotification::Unavailable { device } => device,
        }
    }

    /// State this notification forces the torch into
    pub fn resulting_state(&self) -> TorchState {
        match self {
            TorchNotification::ModeChanged { enabled, .. } => TorchState::from_enabled(*enabled),
            TorchNotification::Unavailable { .. } => TorchState::Off,
        }
    }
}

/// Torch control errors
///
/// All variants are non-fatal: the screen logs them and keeps running.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TorchError {
    #[error("No torch-capable device is available")]
    Unavailable,

    #[error("Torch device {device} is held by another process")]
    DeviceBusy { device: DeviceId },

    #[error("Torch platform call failed: {0}")]
    Unknown(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_off() {
        assert_eq!(TorchState::default(), TorchState::Off);
        assert!(!TorchState::default().is_on());
    }

    #[test]
    fn toggled_flips_state() {
        assert_eq!(TorchState::Off.toggled(), TorchState::On);
        assert_eq!(TorchState::On.toggled(), TorchState::Off);
        assert_eq!(TorchState::from_enabled(true), TorchState::On);
    }

    #[test]
    fn unavailable_forces_off() {
        let notification = TorchNotification::Unavailable {
            device: DeviceId::new("0"),
        };
        assert_eq!(notification.resulting_state(), TorchState::Off);
        assert_eq!(notification.device().as_str(), "0");
    }

    #[test]
    fn error_messages_name_the_device() {
        let err = TorchError::DeviceBusy {
            device: DeviceId::new("rear"),
        };
        assert_eq!(err.to_string(), "Torch device rear is held by another process");
    }
}
