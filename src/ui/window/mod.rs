//! Top-level application window
//!
//! The Win32 implementation hosts the toggle screen: it forwards mouse input
//! to the tap recognizer, presents rendered frames and marshals torch
//! notifications onto the UI thread through a posted window message.

#[cfg(windows)]
mod win32;

#[cfg(windows)]
pub use win32::run;

/// Window and message loop errors
#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    #[error("Failed to initialize the Windows Runtime: {0}")]
    RuntimeInitFailed(String),

    #[error("Failed to get module handle")]
    ModuleHandleFailed,

    #[error("Failed to register window class")]
    WindowClassRegistrationFailed,

    #[error("Failed to create main window")]
    WindowCreationFailed,

    #[error("Message loop failed")]
    MessageLoopFailed,
}
