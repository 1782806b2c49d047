//! Flashlight toggle binary
//!
//! Logging follows `RUST_LOG`, defaulting to `info`. Settings come from the
//! `TORCH_TOGGLE_*` environment variables.

use std::process::ExitCode;

use torch_toggle::app::AppError;
use torch_toggle::config::AppConfig;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "torch toggle failed");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    tracing::info!(
        transition_ms = config.transition.as_millis() as u64,
        toggle_size = config.toggle_size,
        "starting torch toggle"
    );
    launch(config)
}

#[cfg(windows)]
fn launch(config: AppConfig) -> Result<(), AppError> {
    torch_toggle::ui::window::run(config)
}

#[cfg(not(windows))]
fn launch(_config: AppConfig) -> Result<(), AppError> {
    Err(AppError::UnsupportedPlatform)
}
