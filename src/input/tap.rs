//! Tap recognition over the toggle region
//!
//! A tap is a press that starts inside the region followed by a release
//! inside the region. Releasing outside, or a cancelled pointer, drops the
//! gesture without firing.

use crate::domain::core::{Point, Rect};

/// Pointer input in canvas pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Up(Point),
    /// Capture was lost or the window was deactivated mid-gesture
    Cancel,
}

/// Recognizes taps on a single rectangular target
#[derive(Debug, Clone)]
pub struct TapRecognizer {
    region: Rect,
    pressed: bool,
}

impl TapRecognizer {
    pub fn new(region: Rect) -> Self {
        Self {
            region,
            pressed: false,
        }
    }

    /// Moves the target, e.g. after a resize; a gesture in progress is dropped
    pub fn set_region(&mut self, region: Rect) {
        if region != self.region {
            self.region = region;
            self.pressed = false;
        }
    }

    /// Whether a press inside the region is in progress
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Feeds one pointer event; returns true when it completes a tap
    pub fn handle(&mut self, event: PointerEvent) -> bool {
        match event {
            PointerEvent::Down(point) => {
                self.pressed = self.region.contains(point);
                false
            }
            PointerEvent::Up(point) => {
                let was_pressed = std::mem::replace(&mut self.pressed, false);
                was_pressed && self.region.contains(point)
            }
            PointerEvent::Cancel => {
                self.pressed = false;
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recognizer() -> TapRecognizer {
        TapRecognizer::new(Rect::new(100.0, 100.0, 200.0, 200.0))
    }

    #[test]
    fn press_and_release_inside_is_a_tap() {
        let mut tap = recognizer();
        assert!(!tap.handle(PointerEvent::Down(Point::new(150.0, 150.0))));
        assert!(tap.is_pressed());
        assert!(tap.handle(PointerEvent::Up(Point::new(160.0, 170.0))));
        assert!(!tap.is_pressed());
    }

    #[test]
    fn release_outside_is_not_a_tap() {
        let mut tap = recognizer();
        tap.handle(PointerEvent::Down(Point::new(150.0, 150.0)));
        assert!(!tap.handle(PointerEvent::Up(Point::new(10.0, 10.0))));
    }

    #[test]
    fn press_outside_is_not_a_tap() {
        let mut tap = recognizer();
        tap.handle(PointerEvent::Down(Point::new(10.0, 10.0)));
        assert!(!tap.handle(PointerEvent::Up(Point::new(150.0, 150.0))));
    }

    #[test]
    fn cancel_and_resize_drop_the_gesture() {
        let mut tap = recognizer();
        tap.handle(PointerEvent::Down(Point::new(150.0, 150.0)));
        tap.handle(PointerEvent::Cancel);
        assert!(!tap.handle(PointerEvent::Up(Point::new(150.0, 150.0))));

        tap.handle(PointerEvent::Down(Point::new(150.0, 150.0)));
        tap.set_region(Rect::new(0.0, 0.0, 400.0, 400.0));
        assert!(!tap.handle(PointerEvent::Up(Point::new(150.0, 150.0))));
    }

    #[test]
    fn lone_release_is_not_a_tap() {
        let mut tap = recognizer();
        assert!(!tap.handle(PointerEvent::Up(Point::new(150.0, 150.0))));
    }
}
