//! Utility helpers for tests.
//!
//! [`Recorder`] and [`Counter`] observe what reaches a sink; the tick
//! constructors build the host payloads most tests need.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rail_frp::host::HostTick;
use rail_frp::Stream;

/// Collects every event delivered to the sinks it hands out.
#[derive(Debug)]
pub struct Recorder<T> {
    events: Rc<RefCell<Vec<T>>>,
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self {
            events: Rc::clone(&self.events),
        }
    }
}

impl<T> Default for Recorder<T> {
    fn default() -> Self {
        Self {
            events: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl<T: Clone + 'static> Recorder<T> {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a recording sink to `stream` and returns the recorder.
    #[must_use]
    pub fn attach(stream: &Stream<T>) -> Self {
        let recorder = Self::new();
        recorder.record(stream);
        recorder
    }

    /// Subscribes another recording sink to `stream`.
    pub fn record(&self, stream: &Stream<T>) {
        let events = Rc::clone(&self.events);
        stream.subscribe(move |value| events.borrow_mut().push(value));
    }

    /// Copy of everything recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<T> {
        self.events.borrow().clone()
    }

    /// Most recent event, if any.
    #[must_use]
    pub fn last(&self) -> Option<T> {
        self.events.borrow().last().cloned()
    }

    /// Number of events recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

/// Shared invocation counter for side-effect checks.
#[derive(Clone, Debug, Default)]
pub struct Counter(Rc<Cell<usize>>);

impl Counter {
    /// Creates a counter at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the count.
    pub fn hit(&self) {
        self.0.set(self.0.get() + 1);
    }

    /// Current count.
    #[must_use]
    pub fn get(&self) -> usize {
        self.0.get()
    }

    /// Wraps `f` so that every call also increments the counter.
    pub fn counting<A, B>(&self, f: impl Fn(A) -> B + 'static) -> impl Fn(A) -> B + 'static {
        let counter = self.clone();
        move |arg| {
            counter.hit();
            f(arg)
        }
    }
}

/// A player tick of `dt` seconds, with or without control authority.
#[must_use]
pub fn player_tick(dt: f64, has_key: bool) -> HostTick {
    HostTick {
        dt,
        is_player: true,
        has_key,
        ..HostTick::default()
    }
}

/// An AI tick of `dt` seconds.
#[must_use]
pub fn ai_tick(dt: f64) -> HostTick {
    HostTick {
        dt,
        ..HostTick::default()
    }
}
