//! Functional-reactive primitives.
//!
//! [`Stream`] is the push side: a description of future events that does
//! nothing until a sink subscribes. [`Behavior`] is the pull side: a current
//! value read synchronously with [`Behavior::snapshot`]. [`FrpSource`] injects
//! host events into the graph and [`SimClock`] supplies host-driven time.
//!
//! Delivery is a plain synchronous call stack. `source.call(v)` returns only
//! after every downstream sink has run, nested merges, folds and hubs
//! included. Nothing here is `Send`; the whole graph lives on the host's tick
//! thread.

mod behavior;
mod clock;
mod extra;
pub mod ops;
mod source;
mod stream;

pub use behavior::{lift2, lift3, lift_all, snapshot, Behavior};
pub use clock::SimClock;
pub use source::FrpSource;
pub use stream::{Either, Sink, Stream};
