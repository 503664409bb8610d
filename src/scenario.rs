//! Headless replay of host callbacks.
//!
//! A [`Scenario`] is a JSON list of [`HostEvent`]s fired through
//! [`HostHooks`] in order, standing in for the simulator's tick driver.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::host::{ConsistDirection, HostHooks, HostTick, RawConsistMessage, VehicleCamera};
use crate::settings::{EngineSettings, SettingsError};

/// One host callback invocation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    /// Per-tick update.
    Tick(HostTick),
    /// Camera change.
    Camera {
        /// Camera now in use.
        camera: VehicleCamera,
    },
    /// Custom signal message.
    Signal {
        /// Raw payload.
        message: String,
    },
    /// Consist message from a neighbour.
    Consist(RawConsistMessage),
}

/// Counts of events delivered while replaying a scenario.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplayReport {
    /// Events whose hook held a handler.
    pub delivered: usize,
    /// Events fired at an empty hook.
    pub dropped: usize,
}

/// Scripted sequence of host callbacks.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Settings to build engines with; defaults apply when absent.
    #[serde(default)]
    pub settings: EngineSettings,
    /// Events in delivery order.
    pub events: Vec<HostEvent>,
}

impl Scenario {
    /// Parses a scenario document.
    ///
    /// # Errors
    /// Returns [`SettingsError::Parse`] for malformed JSON and
    /// [`SettingsError::InvalidDebugPeriod`] for invalid embedded settings.
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let scenario: Self = serde_json::from_str(json)?;
        scenario.settings.validate()?;
        Ok(scenario)
    }

    /// Fires every event through `hooks` in order.
    pub fn fire(&self, hooks: &HostHooks) -> ReplayReport {
        let mut report = ReplayReport::default();
        for event in &self.events {
            let delivered = match event {
                HostEvent::Tick(tick) => hooks.update.fire(tick),
                HostEvent::Camera { camera } => hooks.camera.fire(camera),
                HostEvent::Signal { message } => hooks.signal_message.fire(message),
                HostEvent::Consist(message) => hooks.consist_message.fire(message),
            };
            if delivered {
                report.delivered += 1;
            } else {
                warn!("no handler installed for {event:?}");
                report.dropped += 1;
            }
        }
        info!(
            "scenario replayed: {} delivered, {} dropped",
            report.delivered, report.dropped
        );
        report
    }

    /// A short drive: board the front cab, take the key, pass two signals,
    /// move to the rear cab, then hand the train to the AI.
    #[must_use]
    pub fn demo() -> Self {
        let tick = |is_player, has_key, speed_mps| {
            HostEvent::Tick(HostTick {
                dt: 0.1,
                is_player,
                has_key,
                speed_mps,
                ..HostTick::default()
            })
        };
        let mut events = vec![HostEvent::Camera {
            camera: VehicleCamera::FrontCab,
        }];
        events.extend((0..10).map(|i| tick(true, true, f64::from(i))));
        events.push(HostEvent::Signal {
            message: "sig1speed60".into(),
        });
        events.push(HostEvent::Consist(RawConsistMessage {
            id: crate::constants::BRAKE_MESSAGE_ID,
            content: "0.5".into(),
            direction: ConsistDirection::Backward,
        }));
        events.push(HostEvent::Signal {
            message: "M12".into(),
        });
        events.push(HostEvent::Camera {
            camera: VehicleCamera::RearCab,
        });
        events.extend((0..5).map(|_| tick(true, false, 0.0)));
        events.push(HostEvent::Camera {
            camera: VehicleCamera::Outside,
        });
        events.extend((0..5).map(|_| tick(false, false, 4.0)));
        Self {
            settings: EngineSettings::default(),
            events,
        }
    }
}
