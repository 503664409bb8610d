//! Simulated time accumulated from host-reported tick deltas.

use std::cell::Cell;
use std::rc::Rc;

use super::behavior::Behavior;

/// Milliseconds of simulated time, advanced only by the tick driver.
///
/// Time-gated combinators read the clock through [`SimClock::behavior`], so
/// they never touch wall-clock time and stay deterministic under replay.
#[derive(Clone, Debug, Default)]
pub struct SimClock {
    now_ms: Rc<Cell<f64>>,
}

impl SimClock {
    /// Creates a clock reading zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances by a host delta expressed in seconds.
    pub fn advance_s(&self, dt_s: f64) {
        self.advance_ms(dt_s * 1000.0);
    }

    /// Advances by a delta already expressed in milliseconds.
    pub fn advance_ms(&self, dt_ms: f64) {
        debug_assert!(dt_ms.is_finite(), "tick delta must be finite");
        self.now_ms.set(self.now_ms.get() + dt_ms);
    }

    /// Current simulated time in milliseconds.
    #[must_use]
    pub fn now_ms(&self) -> f64 {
        self.now_ms.get()
    }

    /// The clock as a behavior reading milliseconds.
    #[must_use]
    pub fn behavior(&self) -> Behavior<f64> {
        let now_ms = Rc::clone(&self.now_ms);
        Behavior::from_fn(move || now_ms.get())
    }
}
