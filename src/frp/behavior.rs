//! Pull-based behaviors: values readable at any instant.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::stream::Stream;

/// The current value of something, read on demand via [`Behavior::snapshot`].
///
/// A behavior never pushes and reading it never triggers stream events.
pub struct Behavior<T> {
    read: Rc<dyn Fn() -> T>,
}

impl<T> Clone for Behavior<T> {
    fn clone(&self) -> Self {
        Self {
            read: Rc::clone(&self.read),
        }
    }
}

impl<T> fmt::Debug for Behavior<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Behavior").finish_non_exhaustive()
    }
}

impl<T: Clone + 'static> Behavior<T> {
    /// A behavior that always reads `value`.
    #[must_use]
    pub fn constant(value: T) -> Self {
        Self::from_fn(move || value.clone())
    }

    /// A behavior computed afresh by `read` on every snapshot.
    ///
    /// `read` must be cheap and free of side effects.
    pub fn from_fn(read: impl Fn() -> T + 'static) -> Self {
        Self {
            read: Rc::new(read),
        }
    }

    /// Holds `initial` until `stream` fires, then its latest event.
    ///
    /// The stream is subscribed immediately and updated synchronously during
    /// delivery. If the same stream also feeds a terminal subscriber with side
    /// effects, hub it first.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rail_frp::frp::{Behavior, FrpSource};
    ///
    /// let source = FrpSource::new();
    /// let latest = Behavior::stepper(&source.create_stream(), 7);
    /// assert_eq!(latest.snapshot(), 7);
    /// source.call(3);
    /// assert_eq!(latest.snapshot(), 3);
    /// ```
    #[must_use]
    pub fn stepper(stream: &Stream<T>, initial: T) -> Self {
        let cell = Rc::new(RefCell::new(initial));
        let writer = Rc::clone(&cell);
        stream.subscribe(move |value| {
            writer.replace(value);
        });
        Self::from_fn(move || cell.borrow().clone())
    }

    /// Reads the current value.
    #[must_use]
    pub fn snapshot(&self) -> T {
        (self.read)()
    }

    /// Derives a behavior by applying `f` to every read of this one.
    #[must_use]
    pub fn map<U: Clone + 'static>(&self, f: impl Fn(T) -> U + 'static) -> Behavior<U> {
        let source = self.clone();
        Behavior::from_fn(move || f(source.snapshot()))
    }
}

/// Reads the current value of `behavior`.
#[must_use]
pub fn snapshot<T: Clone + 'static>(behavior: &Behavior<T>) -> T {
    behavior.snapshot()
}

/// Combines two behaviors; `f` runs on every snapshot with no caching.
#[must_use]
pub fn lift2<A, B, U>(f: impl Fn(A, B) -> U + 'static, a: &Behavior<A>, b: &Behavior<B>) -> Behavior<U>
where
    A: Clone + 'static,
    B: Clone + 'static,
    U: Clone + 'static,
{
    let (a, b) = (a.clone(), b.clone());
    Behavior::from_fn(move || f(a.snapshot(), b.snapshot()))
}

/// Combines three behaviors; `f` runs on every snapshot with no caching.
#[must_use]
pub fn lift3<A, B, C, U>(
    f: impl Fn(A, B, C) -> U + 'static,
    a: &Behavior<A>,
    b: &Behavior<B>,
    c: &Behavior<C>,
) -> Behavior<U>
where
    A: Clone + 'static,
    B: Clone + 'static,
    C: Clone + 'static,
    U: Clone + 'static,
{
    let (a, b, c) = (a.clone(), b.clone(), c.clone());
    Behavior::from_fn(move || f(a.snapshot(), b.snapshot(), c.snapshot()))
}

/// Combines any number of behaviors of one type.
///
/// `f` receives the snapshots in the order the behaviors were given.
#[must_use]
pub fn lift_all<T, U>(f: impl Fn(&[T]) -> U + 'static, behaviors: &[Behavior<T>]) -> Behavior<U>
where
    T: Clone + 'static,
    U: Clone + 'static,
{
    let behaviors = behaviors.to_vec();
    Behavior::from_fn(move || {
        let values: Vec<T> = behaviors.iter().map(Behavior::snapshot).collect();
        f(&values)
    })
}
