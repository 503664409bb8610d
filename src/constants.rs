//! Runtime constants shared across the vehicle and engine layers.
//!
//! Consist message identifiers are fixed by the vehicle scripts that
//! exchange them; changing them breaks interoperability with coupled stock.

/// Consist message id carrying brake pipe or brake applied status.
pub const BRAKE_MESSAGE_ID: u32 = 10101;
/// Consist message id carrying the trapdoor position.
pub const TRAPDOOR_MESSAGE_ID: u32 = 10146;
/// Period between on-screen updates of a debugged stream, in seconds.
pub const DEFAULT_DEBUG_PERIOD_S: f64 = 0.5;
/// Title of the on-screen box used by stream debugging.
pub const DEBUG_MESSAGE_TITLE: &str = "Event Stream";
/// Hook name under which the engine registers signal-message handlers.
pub const SIGNAL_MESSAGE_HOOK: &str = "OnCustomSignalMessage";
