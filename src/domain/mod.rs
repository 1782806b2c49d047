//! Domain logic and core data structures
//!
//! This module contains pure logic that is independent
//! of platform APIs and rendering backends.

pub mod animation;
pub mod color;
pub mod core;
pub mod torch;

pub use animation::{ColorAnimation, Easing};
pub use color::Rgb;
pub use torch::{DeviceId, TorchError, TorchNotification, TorchState};
