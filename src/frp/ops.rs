//! Curried stream operators for use with [`compose!`](crate::compose).
//!
//! Each function returns a closure turning one stream into another, mirroring
//! the inherent methods on [`Stream`]. They only exist so pipelines can be
//! written left to right as a list of steps.

use super::behavior::Behavior;
use super::stream::Stream;

/// See [`Stream::map`].
pub fn map<T, U>(f: impl Fn(T) -> U + 'static) -> impl FnOnce(Stream<T>) -> Stream<U>
where
    T: Clone + 'static,
    U: Clone + 'static,
{
    move |stream| stream.map(f)
}

/// See [`Stream::filter`].
pub fn filter<T: Clone + 'static>(
    pred: impl Fn(&T) -> bool + 'static,
) -> impl FnOnce(Stream<T>) -> Stream<T> {
    move |stream| stream.filter(pred)
}

/// See [`Stream::reject`].
pub fn reject<T: Clone + 'static>(
    pred: impl Fn(&T) -> bool + 'static,
) -> impl FnOnce(Stream<T>) -> Stream<T> {
    move |stream| stream.reject(pred)
}

/// See [`Stream::filter_map`].
pub fn filter_map<T, U>(f: impl Fn(T) -> Option<U> + 'static) -> impl FnOnce(Stream<T>) -> Stream<U>
where
    T: Clone + 'static,
    U: Clone + 'static,
{
    move |stream| stream.filter_map(f)
}

/// See [`Stream::merge`].
pub fn merge<T: Clone + 'static>(other: Stream<T>) -> impl FnOnce(Stream<T>) -> Stream<T> {
    move |stream| stream.merge(&other)
}

/// See [`Stream::fold`].
pub fn fold<T, S>(
    reducer: impl Fn(&S, T) -> S + 'static,
    initial: S,
) -> impl FnOnce(Stream<T>) -> Stream<S>
where
    T: Clone + 'static,
    S: Clone + 'static,
{
    move |stream| stream.fold(reducer, initial)
}

/// See [`Stream::throttle`].
pub fn throttle<T: Clone + 'static>(
    period_ms: f64,
    clock: Behavior<f64>,
) -> impl FnOnce(Stream<T>) -> Stream<T> {
    move |stream| stream.throttle(period_ms, &clock)
}

/// See [`Stream::hub`].
pub fn hub<T: Clone + 'static>() -> impl FnOnce(Stream<T>) -> Stream<T> {
    move |stream| stream.hub()
}

/// See [`Stream::map_behavior`].
pub fn map_behavior<T, U>(behavior: Behavior<U>) -> impl FnOnce(Stream<T>) -> Stream<U>
where
    T: Clone + 'static,
    U: Clone + 'static,
{
    move |stream| stream.map_behavior(&behavior)
}

/// See [`Stream::reject_repeats`].
pub fn reject_repeats<T: Clone + PartialEq + 'static>() -> impl FnOnce(Stream<T>) -> Stream<T> {
    move |stream| stream.reject_repeats()
}

/// Terminates a pipeline in a [`Behavior::stepper`].
pub fn stepper<T: Clone + 'static>(initial: T) -> impl FnOnce(Stream<T>) -> Behavior<T> {
    move |stream| Behavior::stepper(&stream, initial)
}
