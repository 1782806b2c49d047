//! Time-based color tweens
//!
//! A [`ColorAnimation`] interpolates between two colors over a fixed duration
//! using an [`Easing`] curve. Time is always passed in explicitly so that the
//! view can be driven deterministically from tests.

use std::time::{Duration, Instant};

use crate::domain::color::Rgb;

/// Default transition length of the toggle colors
pub const DEFAULT_TRANSITION: Duration = Duration::from_millis(300);

/// Maps linear progress to eased progress, both in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Easing {
    Linear,
    /// Cubic Bézier through (0,0), (x1,y1), (x2,y2), (1,1)
    CubicBezier { x1: f32, y1: f32, x2: f32, y2: f32 },
}

impl Easing {
    /// Standard "fast out, slow in" curve used for material transitions
    pub const STANDARD: Easing = Easing::CubicBezier {
        x1: 0.4,
        y1: 0.0,
        x2: 0.2,
        y2: 1.0,
    };

    pub fn transform(&self, progress: f32) -> f32 {
        let progress = progress.clamp(0.0, 1.0);
        match *self {
            Easing::Linear => progress,
            Easing::CubicBezier { x1, y1, x2, y2 } => {
                if progress <= 0.0 || progress >= 1.0 {
                    return progress;
                }
                let t = solve_bezier_parameter(progress, x1, x2);
                bezier_coordinate(t, y1, y2)
            }
        }
    }
}

fn bezier_coordinate(t: f32, p1: f32, p2: f32) -> f32 {
    let inv = 1.0 - t;
    3.0 * inv * inv * t * p1 + 3.0 * inv * t * t * p2 + t * t * t
}

fn bezier_slope(t: f32, p1: f32, p2: f32) -> f32 {
    let inv = 1.0 - t;
    3.0 * inv * inv * p1 + 6.0 * inv * t * (p2 - p1) + 3.0 * t * t * (1.0 - p2)
}

/// Finds the curve parameter whose x coordinate equals `x`
///
/// Newton iterations converge quickly on well-formed easing curves; bisection
/// takes over where the slope flattens out.
fn solve_bezier_parameter(x: f32, x1: f32, x2: f32) -> f32 {
    const EPSILON: f32 = 1e-5;

    let mut t = x;
    for _ in 0..8 {
        let error = bezier_coordinate(t, x1, x2) - x;
        if error.abs() < EPSILON {
            return t;
        }
        let slope = bezier_slope(t, x1, x2);
        if slope.abs() < 1e-6 {
            break;
        }
        t -= error / slope;
    }

    let (mut low, mut high) = (0.0_f32, 1.0_f32);
    t = x;
    for _ in 0..32 {
        let value = bezier_coordinate(t, x1, x2);
        if (value - x).abs() < EPSILON {
            break;
        }
        if value < x {
            low = t;
        } else {
            high = t;
        }
        t = (low + high) / 2.0;
    }
    t
}

/// Color tween between two colors
#[derive(Debug, Clone, PartialEq)]
pub struct ColorAnimation {
    from: Rgb,
    to: Rgb,
    started: Instant,
    duration: Duration,
    easing: Easing,
}

impl ColorAnimation {
    /// A finished animation resting on `color`
    pub fn settled(color: Rgb, now: Instant, duration: Duration, easing: Easing) -> Self {
        Self {
            from: color,
            to: color,
            started: now,
            duration,
            easing,
        }
    }

    /// Target color the animation is heading to
    pub fn target(&self) -> Rgb {
        self.to
    }

    /// Starts a new transition towards `target` from the color shown at `now`
    ///
    /// Retargeting to the current target is a no-op so a running transition
    /// is not restarted.
    pub fn retarget(&mut self, target: Rgb, now: Instant) {
        if target == self.to {
            return;
        }
        self.from = self.value_at(now);
        self.to = target;
        self.started = now;
    }

    /// Linear progress of the transition at `now`
    pub fn progress_at(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    /// Displayed color at `now`
    pub fn value_at(&self, now: Instant) -> Rgb {
        let progress = self.progress_at(now);
        if progress >= 1.0 {
            return self.to;
        }
        self.from.lerp(self.to, self.easing.transform(progress))
    }

    pub fn is_running(&self, now: Instant) -> bool {
        self.from != self.to && self.progress_at(now) < 1.0
    }
}
