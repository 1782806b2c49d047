//! Application controller and coordination layer
//!
//! [`ToggleScreen`] is the screen's controller object. Creating it subscribes
//! to torch notifications, dropping it releases the subscription. Taps only
//! issue requests; the view follows the adapter's confirmed state.

use std::sync::Arc;
use std::time::Instant;

use crate::app::adapter::{TorchAdapter, UiWaker};
use crate::app::state::{ToggleFrame, ToggleViewState};
use crate::config::{AppConfig, ConfigError};
use crate::domain::{TorchError, TorchState};
use crate::platform::TorchBackend;
use crate::ui::renderer::RendererError;
use crate::ui::window::WindowError;

/// Application errors surfaced to `main`
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Torch error: {0}")]
    Torch(#[from] TorchError),

    #[error("Rendering error: {0}")]
    Renderer(#[from] RendererError),

    #[error("Window error: {0}")]
    Window(#[from] WindowError),

    #[error("No flashlight backend exists for this platform")]
    UnsupportedPlatform,
}

/// Controller of the single toggle screen
pub struct ToggleScreen {
    adapter: TorchAdapter,
    view: ToggleViewState,
}

impl ToggleScreen {
    /// Creates the screen: subscribes to the backend and starts the view on
    /// the adapter's current state
    pub fn create(
        backend: Arc<dyn TorchBackend>,
        config: &AppConfig,
        waker: Option<UiWaker>,
        now: Instant,
    ) -> Result<Self, AppError> {
        let adapter = TorchAdapter::new(backend, waker)?;
        let view = ToggleViewState::new(adapter.state(), config.theme, config.transition, now);

        tracing::info!(state = %adapter.state(), "toggle screen created");
        Ok(Self { adapter, view })
    }

    /// Registers a render callback run after each confirmed state change
    pub fn observe<F>(&mut self, listener: F)
    where
        F: FnMut(TorchState) + 'static,
    {
        self.adapter.observe(listener);
    }

    /// Handles a tap on the toggle
    ///
    /// Requests the opposite of the confirmed state. Failures are logged by
    /// the adapter and otherwise ignored; the toggle simply does not change.
    pub fn on_tap(&mut self) {
        let requested = !self.adapter.current();
        if let Err(err) = self.adapter.set_torch(requested) {
            tracing::warn!(requested, error = %err, "tap ignored");
        }
    }

    /// Applies pending hardware notifications; returns true if the view changed
    pub fn pump(&mut self, now: Instant) -> bool {
        match self.adapter.pump() {
            Some(state) => self.view.apply(state, now),
            None => false,
        }
    }

    /// Confirmed torch state
    pub fn state(&self) -> TorchState {
        self.adapter.state()
    }

    pub fn adapter(&self) -> &TorchAdapter {
        &self.adapter
    }

    pub fn view(&self) -> &ToggleViewState {
        &self.view
    }

    pub fn frame(&self, now: Instant) -> ToggleFrame {
        self.view.frame(now)
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        self.view.is_animating(now)
    }
}

impl Drop for ToggleScreen {
    fn drop(&mut self) {
        tracing::info!("toggle screen destroyed");
        // The adapter's subscription guard unregisters from the backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Theme;
    use crate::domain::{DeviceId, TorchNotification};
    use crate::platform::simulated::SimulatedTorch;
    use std::time::Duration;

    fn screen_on(torch: &Arc<SimulatedTorch>, now: Instant) -> ToggleScreen {
        let backend: Arc<dyn TorchBackend> = torch.clone();
        ToggleScreen::create(backend, &AppConfig::default(), None, now).unwrap()
    }

    #[test]
    fn tap_cycle_animates_both_ways() {
        let theme = Theme::default();
        let start = Instant::now();
        let torch = Arc::new(SimulatedTorch::single_torch());
        let mut screen = screen_on(&torch, start);
        assert_eq!(screen.state(), TorchState::Off);
        assert_eq!(screen.frame(start).switch, theme.off.switch);

        screen.on_tap();
        assert!(screen.pump(start));
        assert_eq!(screen.state(), TorchState::On);
        assert!(screen.is_animating(start + Duration::from_millis(100)));
        let settled = start + Duration::from_millis(300);
        assert_eq!(screen.frame(settled).switch, theme.on.switch);
        assert_eq!(screen.frame(settled).background, theme.on.background);

        screen.on_tap();
        assert!(screen.pump(settled));
        let back = settled + Duration::from_millis(300);
        assert_eq!(screen.state(), TorchState::Off);
        assert_eq!(screen.frame(back).switch, theme.off.switch);
        assert!(!screen.is_animating(back));
    }

    #[test]
    fn rejected_request_does_not_stick() {
        let now = Instant::now();
        let torch = Arc::new(SimulatedTorch::single_torch());
        let mut screen = screen_on(&torch, now);
        torch.fail_next(TorchError::Unknown("camera service died".into()));

        screen.on_tap();

        assert!(!screen.pump(now));
        assert_eq!(screen.state(), TorchState::Off);
        assert_eq!(screen.view().target_frame().switch, Theme::default().off.switch);
    }

    #[test]
    fn unconfirmed_request_keeps_old_colors() {
        let now = Instant::now();
        let torch = Arc::new(SimulatedTorch::single_torch());
        let mut screen = screen_on(&torch, now);
        torch.set_deferred(true);

        screen.on_tap();
        assert!(!screen.pump(now));
        assert_eq!(screen.view().state(), TorchState::Off);

        torch.deliver_pending();
        assert!(screen.pump(now));
        assert_eq!(screen.view().state(), TorchState::On);
    }

    #[test]
    fn double_tap_before_confirmation_is_one_transition() {
        let now = Instant::now();
        let torch = Arc::new(SimulatedTorch::single_torch());
        let mut screen = screen_on(&torch, now);
        torch.set_deferred(true);

        screen.on_tap();
        screen.on_tap();
        torch.deliver_pending();
        screen.pump(now);

        assert_eq!(torch.transition_count(), 1);
        assert_eq!(screen.state(), TorchState::On);
        assert!(torch.is_enabled(&DeviceId::new("0")));
    }

    #[test]
    fn external_unavailable_turns_view_off_without_tap() {
        let now = Instant::now();
        let torch = Arc::new(SimulatedTorch::single_torch());
        let mut screen = screen_on(&torch, now);
        screen.on_tap();
        screen.pump(now);
        assert_eq!(screen.state(), TorchState::On);

        torch.inject(TorchNotification::Unavailable {
            device: DeviceId::new("0"),
        });

        let later = now + Duration::from_millis(50);
        assert!(screen.pump(later));
        assert_eq!(screen.state(), TorchState::Off);
        assert_eq!(
            screen.frame(later + Duration::from_millis(300)).background,
            Theme::default().off.background
        );
    }

    #[test]
    fn screen_recreation_resubscribes_cleanly() {
        let now = Instant::now();
        let torch = Arc::new(SimulatedTorch::single_torch());

        let screen = screen_on(&torch, now);
        drop(screen);
        assert_eq!(torch.active_callbacks(), 0);
        assert_eq!(torch.unregistration_count(), 1);

        let mut screen = screen_on(&torch, now);
        assert_eq!(torch.active_callbacks(), 1);
        screen.on_tap();
        assert!(screen.pump(now));
        drop(screen);
        assert_eq!(torch.active_callbacks(), 0);
        assert_eq!(torch.unregistration_count(), 2);
    }

    #[test]
    fn observers_run_on_confirmed_changes() {
        use std::cell::Cell;
        use std::rc::Rc;

        let now = Instant::now();
        let torch = Arc::new(SimulatedTorch::single_torch());
        let mut screen = screen_on(&torch, now);
        let redraws = Rc::new(Cell::new(0));
        let counter = Rc::clone(&redraws);
        screen.observe(move |_| counter.set(counter.get() + 1));

        screen.on_tap();
        screen.pump(now);
        torch.seize(&DeviceId::new("0"));
        screen.on_tap(); // busy, ignored
        screen.pump(now);

        assert_eq!(redraws.get(), 2);
    }
}
