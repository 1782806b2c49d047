//! Presentation layer
//!
//! [`renderer`] turns a [`ToggleFrame`](crate::app::ToggleFrame) into pixels;
//! [`window`] hosts the screen in a native window.

pub mod renderer;
pub mod window;

pub use renderer::{RendererError, ToggleLayout, ToggleRenderer};
pub use window::WindowError;
