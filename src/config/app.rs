use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::config::theme::Theme;

/// Environment variable overriding the color transition length in milliseconds
pub const ENV_ANIMATION_MS: &str = "TORCH_TOGGLE_ANIMATION_MS";
/// Environment variable overriding the toggle side in pixels
pub const ENV_TOGGLE_SIZE: &str = "TORCH_TOGGLE_SIZE";
/// Environment variable naming a TrueType/OpenType font for the caption
pub const ENV_FONT: &str = "TORCH_TOGGLE_FONT";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}: expected {expected}")]
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Runtime settings of the toggle screen
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub theme: Theme,
    pub transition: Duration,
    pub toggle_size: u32,
    pub window_width: u32,
    pub window_height: u32,
    pub caption_font: Option<PathBuf>,
}

impl AppConfig {
    pub const DEFAULT_TRANSITION_MS: u64 = 300;
    pub const MAX_TRANSITION_MS: u64 = 2_000;
    pub const DEFAULT_TOGGLE_SIZE: u32 = 260;
    pub const MIN_TOGGLE_SIZE: u32 = 120;
    pub const MAX_TOGGLE_SIZE: u32 = 1_024;
    pub const DEFAULT_WINDOW_WIDTH: u32 = 420;
    pub const DEFAULT_WINDOW_HEIGHT: u32 = 760;

    /// Defaults overridden by the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each known key
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_ANIMATION_MS) {
            let millis = parse_number(ENV_ANIMATION_MS, &raw)?;
            config.transition = Self::sanitize_transition(millis);
        }

        if let Some(raw) = lookup(ENV_TOGGLE_SIZE) {
            let size = parse_number(ENV_TOGGLE_SIZE, &raw)?;
            config.toggle_size = Self::sanitize_toggle_size(size);
        }

        if let Some(raw) = lookup(ENV_FONT) {
            let trimmed = raw.trim();
            config.caption_font = if trimmed.is_empty() {
                None
            } else {
                Some(PathBuf::from(trimmed))
            };
        }

        Ok(config)
    }

    pub fn sanitize_transition(millis: u64) -> Duration {
        Duration::from_millis(millis.min(Self::MAX_TRANSITION_MS))
    }

    pub fn sanitize_toggle_size(size: u64) -> u32 {
        size.clamp(Self::MIN_TOGGLE_SIZE as u64, Self::MAX_TOGGLE_SIZE as u64) as u32
    }

    fn default_caption_font() -> Option<PathBuf> {
        #[cfg(windows)]
        {
            let path = PathBuf::from(r"C:\Windows\Fonts\segoeui.ttf");
            if path.exists() {
                return Some(path);
            }
        }
        None
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            transition: Duration::from_millis(Self::DEFAULT_TRANSITION_MS),
            toggle_size: Self::DEFAULT_TOGGLE_SIZE,
            window_width: Self::DEFAULT_WINDOW_WIDTH,
            window_height: Self::DEFAULT_WINDOW_HEIGHT,
            caption_font: Self::default_caption_font(),
        }
    }
}

fn parse_number(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
        expected: "a non-negative integer",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_the_toggle_screen() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.transition, Duration::from_millis(300));
        assert_eq!(config.toggle_size, 260);
        assert_eq!(config.theme, Theme::default());
    }

    #[test]
    fn overrides_are_clamped() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (ENV_ANIMATION_MS, "99999"),
            (ENV_TOGGLE_SIZE, " 10 "),
        ]))
        .unwrap();

        assert_eq!(config.transition, Duration::from_millis(AppConfig::MAX_TRANSITION_MS));
        assert_eq!(config.toggle_size, AppConfig::MIN_TOGGLE_SIZE);
    }

    #[test]
    fn zero_transition_is_allowed() {
        let config = AppConfig::from_lookup(lookup_from(&[(ENV_ANIMATION_MS, "0")])).unwrap();
        assert!(config.transition.is_zero());
    }

    #[test]
    fn unparseable_value_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[(ENV_TOGGLE_SIZE, "large")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: ENV_TOGGLE_SIZE,
                value: "large".into(),
                expected: "a non-negative integer",
            }
        );
    }

    #[test]
    fn font_override_and_blank_reset() {
        let config = AppConfig::from_lookup(lookup_from(&[(ENV_FONT, "/fonts/caption.ttf")])).unwrap();
        assert_eq!(config.caption_font, Some(PathBuf::from("/fonts/caption.ttf")));

        let config = AppConfig::from_lookup(lookup_from(&[(ENV_FONT, "  ")])).unwrap();
        assert_eq!(config.caption_font, None);
    }
}
