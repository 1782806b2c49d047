//! Configuration module for torch-toggle
//!
//! Settings default to the stock toggle screen look and can be
//! overridden through environment variables. Out-of-range values are
//! clamped; values that do not parse are rejected.

pub mod app;
pub mod theme;

pub use app::{AppConfig, ConfigError};
pub use theme::{Palette, Theme};
