//! Higher-level combinators built from the core stream operations.

use std::cell::{Cell, RefCell};
use std::fmt::Debug;
use std::rc::Rc;

use super::behavior::Behavior;
use super::stream::{Sink, Stream};
use crate::constants::DEBUG_MESSAGE_TITLE;
use crate::host::{report, HostApi};

#[derive(Clone)]
enum OnceState<T> {
    Wait,
    Emit(T),
    Discard,
}

impl<T: Clone + 'static> Stream<T> {
    /// Pairs each event with the previous one as `(from, to)`.
    ///
    /// The first event is paired with `initial`.
    #[must_use]
    pub fn fsm(&self, initial: T) -> Stream<(T, T)> {
        self.fold(
            |(_, to): &(T, T), value| (to.clone(), value),
            (initial.clone(), initial),
        )
    }

    /// Emits only the first event; everything after it is discarded.
    #[must_use]
    pub fn once(&self) -> Self {
        self.fold(
            |state: &OnceState<T>, value| match state {
                OnceState::Wait => OnceState::Emit(value),
                OnceState::Emit(_) | OnceState::Discard => OnceState::Discard,
            },
            OnceState::Wait,
        )
        .filter_map(|state| match state {
            OnceState::Emit(value) => Some(value),
            OnceState::Wait | OnceState::Discard => None,
        })
    }

    /// Forwards `early` events only until this stream produces its first one.
    ///
    /// Useful to seed a pipeline with an initial value that the real source
    /// later supersedes.
    #[must_use]
    pub fn merge_before_start(&self, early: &Self) -> Self {
        let main = self.clone();
        let early = early.clone();
        Self::new(move |next: Sink<T>| {
            let started = Rc::new(Cell::new(false));
            {
                let started = Rc::clone(&started);
                let next = Rc::clone(&next);
                early.subscribe(move |value| {
                    if !started.get() {
                        next(value);
                    }
                });
            }
            main.subscribe(move |value| {
                started.set(true);
                next(value);
            });
        })
    }

    /// Shows every event on screen through `host`, at most once per
    /// `period_s` of simulated time.
    pub fn debug(&self, clock: &Behavior<f64>, host: Rc<dyn HostApi>, period_s: f64)
    where
        T: Debug,
    {
        self.throttle(period_s * 1000.0, clock).subscribe(move |value| {
            report(
                "stream debug display",
                host.show_info_message(DEBUG_MESSAGE_TITLE, &format!("{value:?}"), period_s),
            );
        });
    }
}

impl<T: Clone + PartialEq + 'static> Stream<T> {
    /// Drops events equal to the one delivered just before them.
    #[must_use]
    pub fn reject_repeats(&self) -> Self {
        let upstream = self.clone();
        Self::new(move |next: Sink<T>| {
            let last: Rc<RefCell<Option<T>>> = Rc::new(RefCell::new(None));
            upstream.subscribe(move |value| {
                let repeat = last.borrow().as_ref() == Some(&value);
                if !repeat {
                    last.replace(Some(value.clone()));
                    next(value);
                }
            });
        })
    }
}

impl<T: Clone + 'static> Stream<Option<T>> {
    /// Drops `None` events and unwraps the rest.
    #[must_use]
    pub fn reject_none(&self) -> Stream<T> {
        self.filter_map(|value| value)
    }
}
