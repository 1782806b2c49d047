//! Pointer input handling
//!
//! Platform windows translate their native mouse/touch messages into
//! [`PointerEvent`]s and feed them to a [`TapRecognizer`].

pub mod tap;

pub use tap::{PointerEvent, TapRecognizer};
