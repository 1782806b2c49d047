//! Toggle view state
//!
//! Holds the presentation side of the screen: which palette is targeted and
//! the two color tweens heading there. The targeted palette is a pure
//! function of the confirmed [`TorchState`]; nothing here reacts to taps.

use std::time::{Duration, Instant};

use crate::config::Theme;
use crate::domain::{ColorAnimation, Easing, Rgb, TorchState};

/// Accessibility description of the toggle for `state`
pub fn content_description(state: TorchState) -> &'static str {
    match state {
        TorchState::On => "Turn flashlight off",
        TorchState::Off => "Turn flashlight on",
    }
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleFrame {
    pub state: TorchState,
    pub background: Rgb,
    pub switch: Rgb,
    pub description: &'static str,
}

/// Animated presentation state of the toggle screen
#[derive(Debug, Clone)]
pub struct ToggleViewState {
    theme: Theme,
    state: TorchState,
    background: ColorAnimation,
    switch: ColorAnimation,
}

impl ToggleViewState {
    /// Creates a view resting on the palette for `state`
    pub fn new(state: TorchState, theme: Theme, transition: Duration, now: Instant) -> Self {
        let palette = theme.palette(state);
        Self {
            theme,
            state,
            background: ColorAnimation::settled(palette.background, now, transition, Easing::STANDARD),
            switch: ColorAnimation::settled(palette.switch, now, transition, Easing::STANDARD),
        }
    }

    pub fn state(&self) -> TorchState {
        self.state
    }

    /// Moves the view to a newly confirmed state
    ///
    /// Returns false when the view already shows `state`.
    pub fn apply(&mut self, state: TorchState, now: Instant) -> bool {
        if state == self.state {
            return false;
        }
        self.state = state;
        let palette = self.theme.palette(state);
        self.background.retarget(palette.background, now);
        self.switch.retarget(palette.switch, now);
        true
    }

    pub fn frame(&self, now: Instant) -> ToggleFrame {
        ToggleFrame {
            state: self.state,
            background: self.background.value_at(now),
            switch: self.switch.value_at(now),
            description: content_description(self.state),
        }
    }

    /// Colors the view settles on once animations finish
    pub fn target_frame(&self) -> ToggleFrame {
        ToggleFrame {
            state: self.state,
            background: self.background.target(),
            switch: self.switch.target(),
            description: content_description(self.state),
        }
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        self.background.is_running(now) || self.switch.is_running(now)
    }
}
