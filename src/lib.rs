#![cfg_attr(docsrs, feature(doc_cfg))]
//! Functional-reactive runtime for scripted rail vehicles.
//!
//! The host simulator drives vehicles through a handful of imperative,
//! single-slot callbacks. This crate turns them into composable [`Stream`]s
//! and [`Behavior`]s: [`vehicle::FrpVehicle`] classifies every tick,
//! [`engine::FrpEngine`] adds authority, signal and player-location logic, and
//! [`chain`] attaches to host hooks without displacing existing handlers.
pub mod chain;
pub mod constants;
pub mod engine;
pub mod frp;
pub mod host;
pub mod logging;
mod macros;
pub mod messages;
pub mod scenario;
pub mod settings;
pub mod vehicle;
pub use constants::*;

pub use chain::{CallbackSlot, ChainOrder, HookError, HookRegistry};
pub use engine::{FrpEngine, PlayerLocation};
pub use frp::{Behavior, FrpSource, SimClock, Stream};
pub use host::{HostApi, HostError, HostHooks, HostTick, LoggingHost, VehicleCamera};
pub use logging::init as init_logging;
pub use messages::{ConsistMessage, PulseCode, SignalMessage};
pub use scenario::{HostEvent, Scenario};
pub use settings::{EngineSettings, SettingsError};
pub use vehicle::{FrpVehicle, VehicleUpdate};

pub mod prelude {
    //! Prelude exports used in documentation examples.
    //!
    //! ```rust,no_run
    //! use rail_frp::prelude::*;
    //! ```

    pub use crate::compose;
    pub use crate::frp::{lift2, lift3, lift_all, ops, snapshot};
    pub use crate::Behavior;
    pub use crate::ChainOrder;
    pub use crate::FrpEngine;
    pub use crate::FrpSource;
    pub use crate::HostHooks;
    pub use crate::PlayerLocation;
    pub use crate::Stream;
}
