//! Application orchestration layer
//!
//! This module coordinates between the torch platform, the view state and
//! the UI. It owns the confirmed torch state and the screen lifecycle.

pub mod adapter;
pub mod controller;
pub mod state;

pub use adapter::{TorchAdapter, TorchSubscription, UiWaker};
pub use controller::{AppError, ToggleScreen};
pub use state::{ToggleFrame, ToggleViewState};
