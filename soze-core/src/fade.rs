use std::time::Duration;

use crate::color::{Color, BLACK};

/// Steps through a list of colors, blending from each entry toward the next.
///
/// The index only advances when queried after a full step has elapsed, so a
/// long gap between queries moves forward by a single entry. Time is passed
/// in by the caller.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FadeSequencer {
    index: usize,
    step_start: Duration,
}

impl FadeSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn step_start(&self) -> Duration {
        self.step_start
    }

    /// Color at time `now`, for a fade through `colors` spending `step` on
    /// each transition.
    ///
    /// An empty list gives black. A zero `step` cannot be interpolated; it
    /// advances on every query and returns the reached color unblended.
    pub fn current_color(&mut self, colors: &[Color], step: Duration, now: Duration) -> Color {
        if colors.is_empty() {
            return BLACK;
        }
        let color_at = |i: usize| colors[i % colors.len()];

        if now.saturating_sub(self.step_start) >= step {
            self.index = (self.index + 1) % colors.len();
            self.step_start = now;
        }

        let last = color_at(self.index);
        if step.is_zero() {
            return last;
        }
        let next = color_at(self.index + 1);
        let bias = now.saturating_sub(self.step_start).as_secs_f64() / step.as_secs_f64();
        last.blend(&next, (1.0 - bias).clamp(0.0, 1.0)).unwrap_or(last)
    }
}
