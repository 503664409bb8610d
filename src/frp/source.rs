//! Event sources: the injection point for host events.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::debug;

use super::stream::{Sink, Stream};

/// Ordered list of sinks sharing one delivery.
///
/// Backs both [`FrpSource`] and [`Stream::hub`]. The list is copied before
/// delivery, so sinks may subscribe further sinks or call other sources
/// without tripping over an outstanding borrow. Sinks attached during a
/// delivery see the next event, not the current one.
pub(crate) struct Broadcast<T> {
    sinks: Rc<RefCell<Vec<Sink<T>>>>,
}

impl<T> Clone for Broadcast<T> {
    fn clone(&self) -> Self {
        Self {
            sinks: Rc::clone(&self.sinks),
        }
    }
}

impl<T: Clone + 'static> Broadcast<T> {
    pub(crate) fn new() -> Self {
        Self {
            sinks: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub(crate) fn deliver(&self, value: &T) {
        let sinks: Vec<Sink<T>> = self.sinks.borrow().clone();
        for sink in sinks {
            sink(value.clone());
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.sinks.borrow().len()
    }

    pub(crate) fn stream(&self) -> Stream<T> {
        let sinks = Rc::clone(&self.sinks);
        Stream::new(move |sink| {
            let mut sinks = sinks.borrow_mut();
            sinks.push(sink);
            debug!("broadcast gained subscriber #{}", sinks.len());
        })
    }
}

/// An owned, mutable producer of events.
///
/// [`FrpSource::call`] pushes a value synchronously to every sink attached
/// through any stream returned by [`FrpSource::create_stream`], in
/// subscription order. Only the component that owns the source should call it.
///
/// Clones share their subscribers; they exist so the owner can hand the
/// source to its own host-callback closures.
///
/// # Examples
///
/// ```rust
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use rail_frp::frp::FrpSource;
///
/// let source = FrpSource::new();
/// let log = Rc::new(RefCell::new(Vec::new()));
/// for tag in ["a", "b"] {
///     let log = Rc::clone(&log);
///     source
///         .create_stream()
///         .subscribe(move |v: u8| log.borrow_mut().push((tag, v)));
/// }
/// source.call(1);
/// assert_eq!(*log.borrow(), vec![("a", 1), ("b", 1)]);
/// ```
pub struct FrpSource<T> {
    broadcast: Broadcast<T>,
}

impl<T> Clone for FrpSource<T> {
    fn clone(&self) -> Self {
        Self {
            broadcast: self.broadcast.clone(),
        }
    }
}

impl<T> fmt::Debug for FrpSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrpSource").finish_non_exhaustive()
    }
}

impl<T: Clone + 'static> Default for FrpSource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> FrpSource<T> {
    /// Creates a source with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            broadcast: Broadcast::new(),
        }
    }

    /// Pushes `value` to every current subscriber before returning.
    ///
    /// Panics raised by downstream mappers or reducers unwind through here.
    pub fn call(&self, value: T) {
        self.broadcast.deliver(&value);
    }

    /// Returns a fresh stream view onto this source.
    ///
    /// Safe to call any number of times; every returned stream observes every
    /// future [`FrpSource::call`].
    #[must_use]
    pub fn create_stream(&self) -> Stream<T> {
        self.broadcast.stream()
    }

    /// Number of sinks attached so far.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.broadcast.len()
    }
}
