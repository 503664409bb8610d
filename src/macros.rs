//! Macros for writing stream pipelines left to right.
//!
//! Provides `compose!`, which threads a stream through a list of operators
//! such as those in [`frp::ops`](crate::frp::ops).
//!
//! # Examples
//!
//! ```rust
//! use rail_frp::compose;
//! use rail_frp::frp::{ops, FrpSource};
//!
//! let source = FrpSource::new();
//! let latest = compose!(
//!     source.create_stream(),
//!     ops::map(|v: u32| v + 1),
//!     ops::filter(|v: &u32| v % 2 == 0),
//!     ops::stepper(0),
//! );
//! source.call(1);
//! source.call(2);
//! assert_eq!(latest.snapshot(), 2);
//! ```
//!
//! `compose!(s, f, g, h)` is exactly `h(g(f(s)))`; it has no other effect.

/// Threads a stream through operators from left to right.
///
/// Each operator is any `FnOnce` taking the previous result, typically one
/// from [`frp::ops`](crate::frp::ops). The last operator may end the
/// pipeline in a [`Behavior`](crate::frp::Behavior).
#[macro_export]
macro_rules! compose {
    ($stream:expr $(, $op:expr)* $(,)?) => {{
        let composed = $stream;
        $(let composed = ($op)(composed);)*
        composed
    }};
}
