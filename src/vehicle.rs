//! Per-tick classification of host callbacks for any rail vehicle.
//!
//! [`FrpVehicle`] turns the host's single update callback into typed streams.
//! Each tick first advances the vehicle's [`SimClock`] and authority flag,
//! then fires the unconditional update stream, then exactly one of the
//! player-update and AI-update streams.

use std::cell::Cell;

use log::trace;

use crate::chain::HookError;
use crate::frp::{Behavior, FrpSource, SimClock, Stream};
use crate::host::{Couplings, DoorsOpen, HostHooks, HostTick, RawConsistMessage, VehicleCamera};
use crate::messages::ConsistMessage;
use crate::settings::EngineSettings;

/// Vehicle state published with every classified tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VehicleUpdate {
    /// Simulated seconds since the previous tick.
    pub dt: f64,
    /// Signed speed in metres per second.
    pub speed_mps: f64,
    /// Coupling state.
    pub couplings: Couplings,
    /// Door state.
    pub doors_open: DoorsOpen,
}

impl From<&HostTick> for VehicleUpdate {
    fn from(tick: &HostTick) -> Self {
        Self {
            dt: tick.dt,
            speed_mps: tick.speed_mps,
            couplings: tick.couplings,
            doors_open: tick.doors_open,
        }
    }
}

/// Sources owned by a vehicle; cloned into the host-hook closures.
#[derive(Clone, Default)]
struct VehicleSources {
    clock: SimClock,
    authority: FrpSource<bool>,
    update: FrpSource<f64>,
    player_update: FrpSource<VehicleUpdate>,
    ai_update: FrpSource<VehicleUpdate>,
    camera: FrpSource<VehicleCamera>,
    consist_message: FrpSource<RawConsistMessage>,
}

impl VehicleSources {
    fn publish_tick(&self, tick: &HostTick) {
        self.clock.advance_s(tick.dt);
        self.authority.call(tick.has_key);
        self.update.call(tick.dt);
        let update = VehicleUpdate::from(tick);
        if tick.is_player {
            trace!("player tick dt={} key={}", tick.dt, tick.has_key);
            self.player_update.call(update);
        } else {
            trace!("ai tick dt={}", tick.dt);
            self.ai_update.call(update);
        }
    }
}

/// Stream adapter for one scripted rail vehicle.
///
/// Create it once at script load, build pipelines from its streams, then call
/// [`FrpVehicle::setup`] to attach to the host hooks.
pub struct FrpVehicle {
    settings: EngineSettings,
    sources: VehicleSources,
    authority: Behavior<bool>,
    camera: Behavior<VehicleCamera>,
    set_up: Cell<bool>,
}

impl FrpVehicle {
    /// Creates a vehicle that is not yet attached to any host hook.
    #[must_use]
    pub fn new(settings: EngineSettings) -> Self {
        let sources = VehicleSources::default();
        let authority = Behavior::stepper(&sources.authority.create_stream(), false);
        let camera = Behavior::stepper(&sources.camera.create_stream(), VehicleCamera::Outside);
        Self {
            settings,
            sources,
            authority,
            camera,
            set_up: Cell::new(false),
        }
    }

    /// Settings this vehicle was created with.
    #[must_use]
    pub const fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Chains the vehicle's handlers onto the host's update, camera and
    /// consist-message hooks, keeping any handlers already installed.
    ///
    /// # Errors
    /// Returns [`HookError::AlreadySetUp`] when called a second time.
    pub fn setup(&self, hooks: &HostHooks) -> Result<(), HookError> {
        if self.set_up.replace(true) {
            return Err(HookError::AlreadySetUp { owner: "vehicle" });
        }
        let order = self.settings.chain_order;
        let sources = self.sources.clone();
        hooks
            .update
            .chain(move |tick: &HostTick| sources.publish_tick(tick), order);
        let camera = self.sources.camera.clone();
        hooks
            .camera
            .chain(move |cam: &VehicleCamera| camera.call(*cam), order);
        let consist = self.sources.consist_message.clone();
        hooks.consist_message.chain(
            move |msg: &RawConsistMessage| consist.call(msg.clone()),
            order,
        );
        Ok(())
    }

    /// Feeds one host tick directly, as the update hook would.
    pub fn on_update(&self, tick: &HostTick) {
        self.sources.publish_tick(tick);
    }

    /// Feeds one camera change directly, as the camera hook would.
    pub fn on_camera(&self, camera: VehicleCamera) {
        self.sources.camera.call(camera);
    }

    /// Feeds one consist message directly, as the consist hook would.
    pub fn on_consist_message(&self, message: RawConsistMessage) {
        self.sources.consist_message.call(message);
    }

    /// Simulated time driven by tick deltas.
    #[must_use]
    pub const fn clock(&self) -> &SimClock {
        &self.sources.clock
    }

    /// Simulated time in milliseconds, for [`Stream::throttle`].
    #[must_use]
    pub fn time_behavior(&self) -> Behavior<f64> {
        self.sources.clock.behavior()
    }

    /// Whether the vehicle held control authority on the latest tick.
    #[must_use]
    pub fn authority_behavior(&self) -> Behavior<bool> {
        self.authority.clone()
    }

    /// Every tick's delta time, regardless of who controls the vehicle.
    #[must_use]
    pub fn update_stream(&self) -> Stream<f64> {
        self.sources.update.create_stream()
    }

    /// Ticks while the vehicle is part of the player's train.
    #[must_use]
    pub fn player_update_stream(&self) -> Stream<VehicleUpdate> {
        self.sources.player_update.create_stream()
    }

    /// Ticks while the vehicle is simulated as part of an AI train.
    #[must_use]
    pub fn ai_update_stream(&self) -> Stream<VehicleUpdate> {
        self.sources.ai_update.create_stream()
    }

    /// Every classified tick, player or AI.
    #[must_use]
    pub fn vehicle_update_stream(&self) -> Stream<VehicleUpdate> {
        self.player_update_stream().merge(&self.ai_update_stream())
    }

    /// Camera changes reported by the host.
    #[must_use]
    pub fn camera_stream(&self) -> Stream<VehicleCamera> {
        self.sources.camera.create_stream()
    }

    /// The most recently reported camera, initially [`VehicleCamera::Outside`].
    #[must_use]
    pub fn camera_behavior(&self) -> Behavior<VehicleCamera> {
        self.camera.clone()
    }

    /// Raw consist messages received from coupled vehicles.
    #[must_use]
    pub fn consist_message_stream(&self) -> Stream<RawConsistMessage> {
        self.sources.consist_message.create_stream()
    }

    /// Consist messages decoded into [`ConsistMessage`] variants.
    #[must_use]
    pub fn decoded_consist_message_stream(&self) -> Stream<ConsistMessage> {
        self.consist_message_stream()
            .map(|raw| ConsistMessage::decode(&raw))
    }
}
