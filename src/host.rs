//! Interfaces of the host simulation the runtime is embedded in.
//!
//! The host owns the tick driver and a handful of single-slot global hooks
//! ([`HostHooks`]). Terminal subscribers reach back into the host through
//! [`HostApi`], whose side-effecting calls may fail.

use std::cell::RefCell;

use hashbrown::HashMap;
use log::{error, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chain::CallbackSlot;

/// Failure reported by a host call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The vehicle exposes no control with this name.
    #[error("unknown control {name:?}")]
    UnknownControl {
        /// Control name passed to the host.
        name: String,
    },
    /// The vehicle model has no node or light with this name.
    #[error("unknown node {name:?}")]
    UnknownNode {
        /// Node name passed to the host.
        name: String,
    },
    /// The host refused the call for another reason.
    #[error("host rejected {call}: {detail}")]
    Rejected {
        /// Host API entry point that failed.
        call: &'static str,
        /// Human-readable reason supplied by the host.
        detail: String,
    },
}

/// Camera the player is viewing the vehicle through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleCamera {
    /// Any external camera.
    #[default]
    Outside,
    /// Passenger view inside a carriage.
    Carriage,
    /// Driving cab at the front end.
    FrontCab,
    /// Driving cab at the rear end.
    RearCab,
}

/// Direction a consist message travels along the train.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistDirection {
    /// Towards the front of the vehicle.
    #[default]
    Forward,
    /// Towards the rear of the vehicle.
    Backward,
}

/// Message exchanged between coupled vehicles, as delivered by the host.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawConsistMessage {
    /// Numeric message identifier.
    pub id: u32,
    /// Opaque payload.
    #[serde(default)]
    pub content: String,
    /// Travel direction.
    #[serde(default)]
    pub direction: ConsistDirection,
}

/// Coupling state at each end of the vehicle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Couplings {
    /// Something is coupled at the front.
    pub front: bool,
    /// Something is coupled at the rear.
    pub rear: bool,
}

/// Door state on each side of the vehicle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DoorsOpen {
    /// Left-hand doors are commanded open.
    pub left: bool,
    /// Right-hand doors are commanded open.
    pub right: bool,
}

/// State reported by the host for one simulated tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostTick {
    /// Simulated seconds elapsed since the previous tick.
    pub dt: f64,
    /// The vehicle belongs to the player's train this tick.
    pub is_player: bool,
    /// The vehicle holds control authority (the player's key) this tick.
    pub has_key: bool,
    /// Signed speed in metres per second.
    pub speed_mps: f64,
    /// Coupling state.
    pub couplings: Couplings,
    /// Door state.
    pub doors_open: DoorsOpen,
}

/// The host's single-slot global callbacks.
///
/// Each slot holds at most one handler; assigning replaces whatever was there.
/// Attach through [`CallbackSlot::chain`] to keep earlier handlers alive.
#[derive(Default)]
pub struct HostHooks {
    /// Per-tick update callback.
    pub update: CallbackSlot<HostTick>,
    /// Camera-change callback.
    pub camera: CallbackSlot<VehicleCamera>,
    /// Consist-message callback.
    pub consist_message: CallbackSlot<RawConsistMessage>,
    /// Custom signal-message callback.
    pub signal_message: CallbackSlot<String>,
}

/// Entity and control API of the host vehicle.
pub trait HostApi {
    /// Reads a named control value.
    ///
    /// # Errors
    /// Returns [`HostError::UnknownControl`] if the control does not exist.
    fn control_value(&self, name: &str) -> Result<f64, HostError>;

    /// Writes a named control value.
    ///
    /// # Errors
    /// Returns [`HostError::UnknownControl`] if the control does not exist.
    fn set_control_value(&self, name: &str, value: f64) -> Result<(), HostError>;

    /// Shows or hides a named node of the vehicle model.
    ///
    /// # Errors
    /// Returns [`HostError::UnknownNode`] if the node does not exist.
    fn activate_node(&self, name: &str, on: bool) -> Result<(), HostError>;

    /// Switches a named light.
    ///
    /// # Errors
    /// Returns [`HostError::UnknownNode`] if the light does not exist.
    fn activate_light(&self, name: &str, on: bool) -> Result<(), HostError>;

    /// Sends a message to the coupled neighbour.
    ///
    /// # Errors
    /// Returns [`HostError::Rejected`] if the host cannot deliver it.
    fn send_consist_message(&self, message: &RawConsistMessage) -> Result<(), HostError>;

    /// Displays an on-screen message for `duration_s` seconds.
    ///
    /// # Errors
    /// Returns [`HostError::Rejected`] if the host cannot display it.
    fn show_info_message(&self, title: &str, text: &str, duration_s: f64)
        -> Result<(), HostError>;
}

/// Logs a failed host call made from a terminal subscriber.
///
/// Returns whether the call succeeded.
pub fn report<T>(context: &str, result: Result<T, HostError>) -> bool {
    match result {
        Ok(_) => true,
        Err(err) => {
            error!("host call failed during {context}: {err}");
            false
        }
    }
}

/// Headless [`HostApi`] that records controls and logs every side effect.
///
/// Used by the command-line driver and tests in place of a real simulator.
#[derive(Debug, Default)]
pub struct LoggingHost {
    controls: RefCell<HashMap<String, f64>>,
    nodes: RefCell<HashMap<String, bool>>,
    messages: RefCell<Vec<String>>,
}

impl LoggingHost {
    /// Creates a host exposing the given controls.
    pub fn with_controls<I, S>(controls: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let host = Self::default();
        host.controls
            .borrow_mut()
            .extend(controls.into_iter().map(|(name, value)| (name.into(), value)));
        host
    }

    /// Last state written to a node or light, if any.
    #[must_use]
    pub fn node_state(&self, name: &str) -> Option<bool> {
        self.nodes.borrow().get(name).copied()
    }

    /// On-screen messages shown so far, formatted as `title: text`.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }
}

impl HostApi for LoggingHost {
    fn control_value(&self, name: &str) -> Result<f64, HostError> {
        self.controls
            .borrow()
            .get(name)
            .copied()
            .ok_or_else(|| HostError::UnknownControl { name: name.into() })
    }

    fn set_control_value(&self, name: &str, value: f64) -> Result<(), HostError> {
        let mut controls = self.controls.borrow_mut();
        let slot = controls
            .get_mut(name)
            .ok_or_else(|| HostError::UnknownControl { name: name.into() })?;
        *slot = value;
        info!("control {name} = {value}");
        Ok(())
    }

    fn activate_node(&self, name: &str, on: bool) -> Result<(), HostError> {
        self.nodes.borrow_mut().insert(name.into(), on);
        info!("node {name} -> {on}");
        Ok(())
    }

    fn activate_light(&self, name: &str, on: bool) -> Result<(), HostError> {
        self.nodes.borrow_mut().insert(name.into(), on);
        info!("light {name} -> {on}");
        Ok(())
    }

    fn send_consist_message(&self, message: &RawConsistMessage) -> Result<(), HostError> {
        info!(
            "consist message {} {:?} ({:?})",
            message.id, message.content, message.direction
        );
        Ok(())
    }

    fn show_info_message(
        &self,
        title: &str,
        text: &str,
        duration_s: f64,
    ) -> Result<(), HostError> {
        info!("[{title}] {text} ({duration_s}s)");
        self.messages.borrow_mut().push(format!("{title}: {text}"));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn logging_host_rejects_unknown_controls() {
        let host = LoggingHost::with_controls([("Regulator", 0.0)]);
        assert_eq!(host.control_value("Regulator"), Ok(0.0));
        assert!(host.set_control_value("Regulator", 0.5).is_ok());
        assert_eq!(host.control_value("Regulator"), Ok(0.5));
        assert_eq!(
            host.set_control_value("Horn", 1.0),
            Err(HostError::UnknownControl {
                name: "Horn".into()
            })
        );
    }

    #[rstest]
    fn report_flags_failures() {
        assert!(report("test", Ok::<(), HostError>(())));
        assert!(!report(
            "test",
            Err::<(), _>(HostError::UnknownNode { name: "x".into() })
        ));
    }

    #[rstest]
    fn host_tick_fields_default_when_absent() {
        let tick: HostTick = serde_json::from_str(r#"{"dt": 0.1, "is_player": true}"#)
            .expect("tick should parse");
        assert!(tick.is_player);
        assert!(!tick.has_key);
        assert_eq!(tick.couplings, Couplings::default());
    }
}
