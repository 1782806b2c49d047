//! Property-based tests for the toggle screen.
//!
//! Drives a screen over the simulated torch with arbitrary sequences of taps,
//! hardware events and dispatcher delays, and checks that the view only ever
//! reflects confirmed hardware state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use proptest::prelude::*;
use torch_toggle::app::ToggleScreen;
use torch_toggle::config::{AppConfig, Theme};
use torch_toggle::domain::{DeviceId, TorchError, TorchState};
use torch_toggle::platform::TorchBackend;
use torch_toggle::platform::simulated::SimulatedTorch;

#[derive(Debug, Clone)]
enum Event {
    Tap,
    Pump,
    Defer(bool),
    Deliver,
    Seize,
    Release,
    ExternalSet(bool),
    FailNext,
}

fn event_strategy() -> impl Strategy<Value = Event> {
    prop_oneof![
        4 => Just(Event::Tap),
        4 => Just(Event::Pump),
        1 => any::<bool>().prop_map(Event::Defer),
        2 => Just(Event::Deliver),
        1 => Just(Event::Seize),
        1 => Just(Event::Release),
        1 => any::<bool>().prop_map(Event::ExternalSet),
        1 => Just(Event::FailNext),
    ]
}

fn torch_id() -> DeviceId {
    DeviceId::new("0")
}

fn open_screen(torch: &Arc<SimulatedTorch>, now: Instant) -> ToggleScreen {
    let backend: Arc<dyn TorchBackend> = torch.clone();
    ToggleScreen::create(backend, &AppConfig::default(), None, now).unwrap()
}

fn apply(torch: &SimulatedTorch, screen: &mut ToggleScreen, event: &Event, now: Instant) {
    match event {
        Event::Tap => screen.on_tap(),
        Event::Pump => {
            screen.pump(now);
        }
        Event::Defer(deferred) => torch.set_deferred(*deferred),
        Event::Deliver => {
            torch.deliver_pending();
        }
        Event::Seize => torch.seize(&torch_id()),
        Event::Release => torch.release(&torch_id()),
        Event::ExternalSet(enabled) => torch.external_set(&torch_id(), *enabled),
        Event::FailNext => torch.fail_next(TorchError::Unknown("injected".into())),
    }
}

proptest! {
    /// The view's target colors always match the confirmed adapter state.
    #[test]
    fn prop_view_follows_confirmed_state(events in prop::collection::vec(event_strategy(), 0..60)) {
        let theme = Theme::default();
        let start = Instant::now();
        let torch = Arc::new(SimulatedTorch::single_torch());
        let mut screen = open_screen(&torch, start);

        for (step, event) in events.iter().enumerate() {
            let now = start + Duration::from_millis(step as u64 * 40);
            let before = screen.view().state();
            apply(&torch, &mut screen, event, now);

            if matches!(event, Event::Tap) {
                prop_assert_eq!(screen.view().state(), before, "tap changed the view directly");
            }
            if matches!(event, Event::Pump) {
                let confirmed = screen.adapter().state();
                let palette = theme.palette(confirmed);
                let target = screen.view().target_frame();
                prop_assert_eq!(target.state, confirmed);
                prop_assert_eq!(target.background, palette.background);
                prop_assert_eq!(target.switch, palette.switch);
            }
        }
    }

    /// Once every queued notification is delivered the adapter agrees with
    /// the hardware, and an unavailable torch always reads as off.
    #[test]
    fn prop_adapter_converges_to_hardware(events in prop::collection::vec(event_strategy(), 0..60)) {
        let now = Instant::now();
        let torch = Arc::new(SimulatedTorch::single_torch());
        let mut screen = open_screen(&torch, now);

        for event in &events {
            apply(&torch, &mut screen, event, now);
        }

        torch.set_deferred(false);
        torch.deliver_pending();
        screen.pump(now);

        prop_assert_eq!(screen.adapter().current(), torch.is_enabled(&torch_id()));
        if matches!(events.iter().rev().find(|e| matches!(e, Event::Seize | Event::Release)), Some(Event::Seize)) {
            prop_assert_eq!(screen.state(), TorchState::Off);
        }
    }

    /// Every screen instance unsubscribes exactly once.
    #[test]
    fn prop_subscriptions_balance(
        lifetimes in prop::collection::vec(prop::collection::vec(event_strategy(), 0..10), 1..6)
    ) {
        let now = Instant::now();
        let torch = Arc::new(SimulatedTorch::single_torch());

        for events in &lifetimes {
            let mut screen = open_screen(&torch, now);
            prop_assert_eq!(torch.active_callbacks(), 1);
            for event in events {
                apply(&torch, &mut screen, event, now);
            }
            drop(screen);
            prop_assert_eq!(torch.active_callbacks(), 0);
        }

        prop_assert_eq!(torch.registration_count(), lifetimes.len());
        prop_assert_eq!(torch.unregistration_count(), lifetimes.len());
    }
}
