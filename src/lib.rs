//! Single-screen flashlight toggle
//!
//! The crate is layered the same way top to bottom:
//! - [`domain`]: torch state, colors and color transitions
//! - [`platform`]: hardware torch backends behind [`platform::TorchBackend`]
//! - [`app`]: the torch adapter, view state and screen controller
//! - [`input`]: tap recognition
//! - [`ui`]: rendering and the native window
//! - [`config`]: theme and runtime settings

pub mod app;
pub mod config;
pub mod domain;
pub mod input;
pub mod platform;
pub mod ui;
