//! Two-palette color theme for the toggle screen

use crate::domain::{Rgb, TorchState};

/// Colors used while the torch is in one state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Full-screen background
    pub background: Rgb,
    /// Fill of the toggle circles
    pub switch: Rgb,
}

/// On and off palettes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub on: Palette,
    pub off: Palette,
}

impl Theme {
    pub const LIGHT_YELLOW: Rgb = Rgb::from_hex(0xFFF3C4);
    pub const DARK_YELLOW: Rgb = Rgb::from_hex(0xF2B705);
    pub const LIGHT_PURPLE: Rgb = Rgb::from_hex(0xE4DAF4);
    pub const DARK_PURPLE: Rgb = Rgb::from_hex(0x5B3F99);

    /// Palette shown for `state`
    pub fn palette(&self, state: TorchState) -> Palette {
        match state {
            TorchState::On => self.on,
            TorchState::Off => self.off,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            on: Palette {
                background: Self::LIGHT_YELLOW,
                switch: Self::DARK_YELLOW,
            },
            off: Palette {
                background: Self::LIGHT_PURPLE,
                switch: Self::DARK_PURPLE,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_follows_state() {
        let theme = Theme::default();
        assert_eq!(theme.palette(TorchState::On).switch, Theme::DARK_YELLOW);
        assert_eq!(theme.palette(TorchState::Off).background, Theme::LIGHT_PURPLE);
        assert_ne!(theme.on, theme.off);
    }
}
