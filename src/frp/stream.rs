//! Push-based event streams and their core combinators.
//!
//! A [`Stream`] is a subscription function: handing it a sink arranges for the
//! sink to be invoked synchronously for every future event. Building a
//! pipeline never subscribes anything; only [`Stream::subscribe`] does.
//!
//! Streams produced by the combinators here are *cold*. Every sink attached
//! to a cold stream re-runs the whole upstream pipeline for itself, including
//! any side effects in mapping functions and a private copy of any fold or
//! throttle state. Call [`Stream::hub`] once a derived stream needs more than
//! one subscriber.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use log::debug;

use super::behavior::Behavior;
use super::source::Broadcast;

/// Callback receiving the events of a [`Stream`].
pub type Sink<T> = Rc<dyn Fn(T)>;

/// Value of a stream merged from two streams of different types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Either<L, R> {
    /// Event delivered by the receiver of [`Stream::merge_either`].
    Left(L),
    /// Event delivered by the other stream.
    Right(R),
}

/// A push-based, memoryless notification of future events of type `T`.
///
/// Cloning a stream clones the description of the computation, not any
/// subscription.
///
/// # Examples
///
/// ```rust
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use rail_frp::frp::FrpSource;
///
/// let source = FrpSource::new();
/// let total = Rc::new(Cell::new(0));
/// let seen = Rc::clone(&total);
/// source
///     .create_stream()
///     .map(|v: i32| v * 2)
///     .filter(|v| *v > 2)
///     .subscribe(move |v| seen.set(seen.get() + v));
/// source.call(1);
/// source.call(3);
/// assert_eq!(total.get(), 6);
/// ```
pub struct Stream<T> {
    subscribe: Rc<dyn Fn(Sink<T>)>,
}

impl<T> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Self {
            subscribe: Rc::clone(&self.subscribe),
        }
    }
}

impl<T> fmt::Debug for Stream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream").finish_non_exhaustive()
    }
}

impl<T: Clone + 'static> Stream<T> {
    /// Builds a stream from a raw subscription function.
    ///
    /// The function is run once per attached sink.
    pub fn new(subscribe: impl Fn(Sink<T>) + 'static) -> Self {
        Self {
            subscribe: Rc::new(subscribe),
        }
    }

    /// A stream that never fires.
    #[must_use]
    pub fn never() -> Self {
        Self::new(|_| {})
    }

    /// Attaches a terminal sink, starting the pipeline for that sink.
    pub fn subscribe(&self, sink: impl Fn(T) + 'static) {
        (self.subscribe)(Rc::new(sink));
    }

    /// Attaches an already shared sink.
    pub fn subscribe_sink(&self, sink: Sink<T>) {
        (self.subscribe)(sink);
    }

    /// Applies `op` to this stream; the building block of [`compose!`](crate::compose).
    #[must_use]
    pub fn pipe<U>(self, op: impl FnOnce(Self) -> U) -> U {
        op(self)
    }

    /// Transforms every event with `f`.
    ///
    /// Any side effect in `f` runs once per event per attached sink.
    #[must_use]
    pub fn map<U: Clone + 'static>(&self, f: impl Fn(T) -> U + 'static) -> Stream<U> {
        let upstream = self.clone();
        let f = Rc::new(f);
        Stream::new(move |next: Sink<U>| {
            let f = Rc::clone(&f);
            upstream.subscribe(move |value| next(f(value)));
        })
    }

    /// Keeps the events for which `pred` holds.
    #[must_use]
    pub fn filter(&self, pred: impl Fn(&T) -> bool + 'static) -> Self {
        let upstream = self.clone();
        let pred = Rc::new(pred);
        Self::new(move |next: Sink<T>| {
            let pred = Rc::clone(&pred);
            upstream.subscribe(move |value| {
                if pred(&value) {
                    next(value);
                }
            });
        })
    }

    /// Drops the events for which `pred` holds.
    #[must_use]
    pub fn reject(&self, pred: impl Fn(&T) -> bool + 'static) -> Self {
        self.filter(move |value| !pred(value))
    }

    /// Maps every event to an optional value and keeps only the `Some`s.
    #[must_use]
    pub fn filter_map<U: Clone + 'static>(
        &self,
        f: impl Fn(T) -> Option<U> + 'static,
    ) -> Stream<U> {
        let upstream = self.clone();
        let f = Rc::new(f);
        Stream::new(move |next: Sink<U>| {
            let f = Rc::clone(&f);
            upstream.subscribe(move |value| {
                if let Some(mapped) = f(value) {
                    next(mapped);
                }
            });
        })
    }

    /// Interleaves the events of two streams of the same type.
    ///
    /// Events are delivered in the order their upstream sources were called.
    /// Within one tick the driver's call order is the tie-break.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        let left = self.clone();
        let right = other.clone();
        Self::new(move |next: Sink<T>| {
            left.subscribe_sink(Rc::clone(&next));
            right.subscribe_sink(next);
        })
    }

    /// Interleaves the events of two streams of different types.
    ///
    /// Ordering follows the same rule as [`Stream::merge`].
    #[must_use]
    pub fn merge_either<U: Clone + 'static>(&self, other: &Stream<U>) -> Stream<Either<T, U>> {
        self.map(Either::Left).merge(&other.map(Either::Right))
    }

    /// Folds events into an accumulator, emitting the new state after each.
    ///
    /// The accumulator is private to each attached sink. `reducer` runs inside
    /// event delivery and must depend only on its arguments.
    #[must_use]
    pub fn fold<S: Clone + 'static>(
        &self,
        reducer: impl Fn(&S, T) -> S + 'static,
        initial: S,
    ) -> Stream<S> {
        let upstream = self.clone();
        let reducer = Rc::new(reducer);
        Stream::new(move |next: Sink<S>| {
            let reducer = Rc::clone(&reducer);
            let state = Rc::new(RefCell::new(initial.clone()));
            upstream.subscribe(move |value| {
                let updated = reducer(&state.borrow(), value);
                state.replace(updated.clone());
                next(updated);
            });
        })
    }

    /// Lets an event through at most once per `period_ms` of simulated time.
    ///
    /// The first event always passes. Later events pass only once `clock`
    /// reads at least `period_ms` past the last emission, which then restarts
    /// the window. Nothing is emitted without an arriving event.
    #[must_use]
    pub fn throttle(&self, period_ms: f64, clock: &Behavior<f64>) -> Self {
        let upstream = self.clone();
        let clock = clock.clone();
        Self::new(move |next: Sink<T>| {
            let clock = clock.clone();
            let last_emit: Rc<Cell<Option<f64>>> = Rc::new(Cell::new(None));
            upstream.subscribe(move |value| {
                let now = clock.snapshot();
                let open = last_emit
                    .get()
                    .map_or(true, |last| now - last >= period_ms);
                if open {
                    last_emit.set(Some(now));
                    next(value);
                }
            });
        })
    }

    /// Converts this stream into a hot one.
    ///
    /// Nothing is subscribed until the first sink attaches to the hub. That
    /// first attachment subscribes the upstream pipeline exactly once, and
    /// every later event is re-broadcast to the hub's sinks in attachment
    /// order. Upstream work therefore runs once per event no matter how many
    /// sinks attach.
    #[must_use]
    pub fn hub(&self) -> Self {
        let upstream = self.clone();
        let broadcast = Broadcast::new();
        let started = Rc::new(Cell::new(false));
        Self::new(move |sink: Sink<T>| {
            if !started.replace(true) {
                let feed = broadcast.clone();
                upstream.subscribe(move |value| feed.deliver(&value));
                debug!("hub attached to upstream");
            }
            broadcast.stream().subscribe_sink(sink);
        })
    }

    /// Replaces every event with the value of `behavior` at that instant.
    #[must_use]
    pub fn map_behavior<U: Clone + 'static>(&self, behavior: &Behavior<U>) -> Stream<U> {
        let behavior = behavior.clone();
        self.map(move |_| behavior.snapshot())
    }

    /// Samples `behavior` each time this stream fires and combines the two.
    #[must_use]
    pub fn sample_with<B, U>(
        &self,
        behavior: &Behavior<B>,
        f: impl Fn(T, B) -> U + 'static,
    ) -> Stream<U>
    where
        B: Clone + 'static,
        U: Clone + 'static,
    {
        let behavior = behavior.clone();
        self.map(move |value| f(value, behavior.snapshot()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frp::{FrpSource, SimClock};
    use rstest::rstest;

    fn collect<T: Clone + 'static>(stream: &Stream<T>) -> Rc<RefCell<Vec<T>>> {
        let out = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&out);
        stream.subscribe(move |v| sink.borrow_mut().push(v));
        out
    }

    #[rstest]
    fn map_and_reject_compose() {
        let source = FrpSource::new();
        let out = collect(&source.create_stream().map(|v: i32| v + 1).reject(|v| v % 2 == 0));
        for v in 0..5 {
            source.call(v);
        }
        assert_eq!(*out.borrow(), vec![1, 3, 5]);
    }

    #[rstest]
    fn filter_map_drops_none() {
        let source = FrpSource::new();
        let out = collect(
            &source
                .create_stream()
                .filter_map(|s: &'static str| s.parse::<u8>().ok()),
        );
        source.call("7");
        source.call("x");
        source.call("9");
        assert_eq!(*out.borrow(), vec![7, 9]);
    }

    #[rstest]
    fn fold_state_is_private_per_sink() {
        let source = FrpSource::new();
        let sums = source.create_stream().fold(|acc: &i32, v: i32| acc + v, 0);
        let first = collect(&sums);
        source.call(1);
        let second = collect(&sums);
        source.call(2);
        assert_eq!(*first.borrow(), vec![1, 3]);
        assert_eq!(*second.borrow(), vec![2]);
    }

    #[rstest]
    fn merge_either_tags_each_side() {
        let numbers = FrpSource::new();
        let flags = FrpSource::new();
        let out = collect(&numbers.create_stream().merge_either(&flags.create_stream()));
        flags.call(true);
        numbers.call(4_u8);
        assert_eq!(*out.borrow(), vec![Either::Right(true), Either::Left(4)]);
    }

    #[rstest]
    fn throttle_keeps_state_per_sink() {
        let clock = SimClock::new();
        let source = FrpSource::new();
        let throttled = source.create_stream().throttle(1000.0, &clock.behavior());
        let early = collect(&throttled);
        clock.advance_s(0.5);
        source.call(1);
        let late = collect(&throttled);
        clock.advance_s(0.2);
        source.call(2);
        assert_eq!(*early.borrow(), vec![1]);
        assert_eq!(*late.borrow(), vec![2]);
    }

    #[rstest]
    fn hub_stays_idle_until_a_sink_attaches() {
        let source = FrpSource::new();
        let runs = Rc::new(Cell::new(0));
        let counted = Rc::clone(&runs);
        let hot = source
            .create_stream()
            .map(move |v: u8| {
                counted.set(counted.get() + 1);
                v
            })
            .hub();
        source.call(1);
        source.call(2);
        assert_eq!(runs.get(), 0);
        assert_eq!(source.subscriber_count(), 0);

        let out = collect(&hot);
        let again = collect(&hot);
        source.call(3);
        assert_eq!(runs.get(), 1);
        assert_eq!(source.subscriber_count(), 1);
        assert_eq!(*out.borrow(), vec![3]);
        assert_eq!(*again.borrow(), vec![3]);
    }

    #[rstest]
    fn hub_delivers_in_attachment_order() {
        let source = FrpSource::new();
        let hot = source.create_stream().hub();
        let order = Rc::new(RefCell::new(Vec::new()));
        for tag in ["a", "b", "c"] {
            let order = Rc::clone(&order);
            hot.subscribe(move |v: u8| order.borrow_mut().push((tag, v)));
        }
        source.call(1);
        source.call(2);
        assert_eq!(
            *order.borrow(),
            vec![("a", 1), ("b", 1), ("c", 1), ("a", 2), ("b", 2), ("c", 2)]
        );
    }

    #[rstest]
    fn never_is_silent() {
        let out = collect(&Stream::<u8>::never());
        assert!(out.borrow().is_empty());
    }

    #[rstest]
    fn sample_with_reads_behavior_at_event_time() {
        let source = FrpSource::new();
        let level = FrpSource::new();
        let current = Behavior::stepper(&level.create_stream(), 1);
        let out = collect(&source.create_stream().sample_with(&current, |a: i32, b| a * b));
        source.call(5);
        level.call(3);
        source.call(5);
        assert_eq!(*out.borrow(), vec![5, 15]);
    }
}
