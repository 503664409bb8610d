//! Driving-vehicle layer on top of [`FrpVehicle`].
//!
//! An engine additionally distinguishes player ticks taken with and without
//! control authority, exposes custom signal messages, and derives where the
//! player currently is relative to the cabs.

use std::cell::Cell;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::chain::{HookError, HookRegistry};
use crate::constants::SIGNAL_MESSAGE_HOOK;
use crate::frp::{Behavior, FrpSource, Stream};
use crate::host::{HostHooks, VehicleCamera};
use crate::messages::{PulseCode, SignalMessage};
use crate::settings::EngineSettings;
use crate::vehicle::{FrpVehicle, VehicleUpdate};

/// Where the player is relative to this engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerLocation {
    /// Not driving this engine.
    Away,
    /// In the front cab.
    #[default]
    InFrontCab,
    /// In the rear cab.
    InRearCab,
}

impl PlayerLocation {
    /// Location implied by a camera change, if any.
    #[must_use]
    pub const fn from_camera(camera: VehicleCamera) -> Option<Self> {
        match camera {
            VehicleCamera::FrontCab => Some(Self::InFrontCab),
            VehicleCamera::RearCab => Some(Self::InRearCab),
            VehicleCamera::Outside | VehicleCamera::Carriage => None,
        }
    }
}

/// Stream adapter for a scripted locomotive or cab car.
///
/// # Examples
///
/// ```rust
/// use rail_frp::engine::{FrpEngine, PlayerLocation};
/// use rail_frp::host::{HostTick, VehicleCamera};
/// use rail_frp::settings::EngineSettings;
///
/// let engine = FrpEngine::new(EngineSettings::default());
/// let location = engine.player_location_behavior();
/// engine.vehicle().on_camera(VehicleCamera::RearCab);
/// assert_eq!(location.snapshot(), PlayerLocation::InRearCab);
/// engine.vehicle().on_update(&HostTick { dt: 0.1, ..HostTick::default() });
/// assert_eq!(location.snapshot(), PlayerLocation::Away);
/// ```
pub struct FrpEngine {
    vehicle: FrpVehicle,
    with_key: FrpSource<VehicleUpdate>,
    without_key: FrpSource<VehicleUpdate>,
    signal_message: FrpSource<String>,
    registry: HookRegistry<String>,
    location: Behavior<PlayerLocation>,
    set_up: Cell<bool>,
}

impl FrpEngine {
    /// Creates an engine with its own hook registry.
    ///
    /// The registry is private to this engine, so [`Self::setup`] chains one
    /// more dispatcher onto the host's signal hook for every engine built this
    /// way. Build engines that attach to the same [`HostHooks`] with
    /// [`Self::with_registry`] and a shared [`HookRegistry`] to chain it once.
    #[must_use]
    pub fn new(settings: EngineSettings) -> Self {
        Self::with_registry(settings, HookRegistry::new())
    }

    /// Creates an engine sharing `registry` with other engines, so the
    /// signal-message dispatcher is chained onto the host only once.
    #[must_use]
    pub fn with_registry(settings: EngineSettings, registry: HookRegistry<String>) -> Self {
        let vehicle = FrpVehicle::new(settings);
        let with_key = FrpSource::new();
        let without_key = FrpSource::new();
        {
            let authority = vehicle.authority_behavior();
            let with_key = with_key.clone();
            let without_key = without_key.clone();
            vehicle.player_update_stream().subscribe(move |update| {
                if authority.snapshot() {
                    with_key.call(update);
                } else {
                    without_key.call(update);
                }
            });
        }
        let away = vehicle
            .ai_update_stream()
            .merge(&without_key.create_stream())
            .map(|_| PlayerLocation::Away);
        let cab = vehicle
            .camera_stream()
            .map(PlayerLocation::from_camera)
            .reject_none();
        let location = Behavior::stepper(&away.merge(&cab), PlayerLocation::InFrontCab);
        Self {
            vehicle,
            with_key,
            without_key,
            signal_message: FrpSource::new(),
            registry,
            location,
            set_up: Cell::new(false),
        }
    }

    /// The underlying vehicle classifier.
    #[must_use]
    pub const fn vehicle(&self) -> &FrpVehicle {
        &self.vehicle
    }

    /// Registry holding this engine's signal-message handler.
    #[must_use]
    pub const fn registry(&self) -> &HookRegistry<String> {
        &self.registry
    }

    /// Attaches the vehicle hooks, then registers for custom signal messages
    /// and chains the registry's dispatcher onto the host's signal hook if no
    /// engine sharing the registry has done so yet.
    ///
    /// # Errors
    /// Returns [`HookError::AlreadySetUp`] when called a second time.
    pub fn setup(&self, hooks: &HostHooks) -> Result<(), HookError> {
        if self.set_up.get() {
            return Err(HookError::AlreadySetUp { owner: "engine" });
        }
        self.vehicle.setup(hooks)?;
        self.set_up.set(true);
        let signal = self.signal_message.clone();
        self.registry
            .register(SIGNAL_MESSAGE_HOOK, move |msg: &String| signal.call(msg.clone()));
        if self.registry.is_installed(SIGNAL_MESSAGE_HOOK) {
            debug!("signal hook already chained by a sibling engine");
        } else {
            self.registry.install(
                SIGNAL_MESSAGE_HOOK,
                &hooks.signal_message,
                self.vehicle.settings().chain_order,
            )?;
        }
        Ok(())
    }

    /// Feeds one signal message directly, as the signal hook would.
    pub fn on_signal_message(&self, message: impl Into<String>) {
        self.signal_message.call(message.into());
    }

    /// Player ticks taken while this engine holds control authority.
    #[must_use]
    pub fn player_with_key_update_stream(&self) -> Stream<VehicleUpdate> {
        self.with_key.create_stream()
    }

    /// Player ticks taken while another engine holds control authority.
    #[must_use]
    pub fn player_without_key_update_stream(&self) -> Stream<VehicleUpdate> {
        self.without_key.create_stream()
    }

    /// Raw custom signal messages.
    #[must_use]
    pub fn signal_message_stream(&self) -> Stream<String> {
        self.signal_message.create_stream()
    }

    /// Signal messages decoded once at the boundary.
    #[must_use]
    pub fn signal_stream(&self) -> Stream<SignalMessage> {
        self.signal_message_stream()
            .map(|raw| SignalMessage::parse(&raw))
    }

    /// Recognised pulse codes; unrecognised messages are dropped.
    #[must_use]
    pub fn pulse_code_stream(&self) -> Stream<PulseCode> {
        self.signal_stream().filter_map(|msg| msg.pulse_code())
    }

    /// Where the player is, starting in the front cab.
    #[must_use]
    pub fn player_location_behavior(&self) -> Behavior<PlayerLocation> {
        self.location.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostTick;
    use rstest::{fixture, rstest};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[fixture]
    fn engine() -> FrpEngine {
        FrpEngine::new(EngineSettings::default())
    }

    fn player_tick(has_key: bool) -> HostTick {
        HostTick {
            dt: 0.05,
            is_player: true,
            has_key,
            ..HostTick::default()
        }
    }

    fn count<T: Clone + 'static>(stream: &Stream<T>) -> Rc<Cell<usize>> {
        let hits = Rc::new(Cell::new(0));
        let sink = Rc::clone(&hits);
        stream.subscribe(move |_| sink.set(sink.get() + 1));
        hits
    }

    #[rstest]
    fn player_ticks_split_on_authority(engine: FrpEngine) {
        let with_key = count(&engine.player_with_key_update_stream());
        let without_key = count(&engine.player_without_key_update_stream());
        for has_key in [true, true, false, true] {
            engine.vehicle().on_update(&player_tick(has_key));
        }
        engine.vehicle().on_update(&HostTick::default());
        assert_eq!(with_key.get(), 3);
        assert_eq!(without_key.get(), 1);
    }

    #[rstest]
    #[case(VehicleCamera::FrontCab, Some(PlayerLocation::InFrontCab))]
    #[case(VehicleCamera::RearCab, Some(PlayerLocation::InRearCab))]
    #[case(VehicleCamera::Outside, None)]
    #[case(VehicleCamera::Carriage, None)]
    fn cameras_map_to_locations(
        #[case] camera: VehicleCamera,
        #[case] expected: Option<PlayerLocation>,
    ) {
        assert_eq!(PlayerLocation::from_camera(camera), expected);
    }

    #[rstest]
    fn location_follows_ticks_and_cameras(engine: FrpEngine) {
        let location = engine.player_location_behavior();
        assert_eq!(location.snapshot(), PlayerLocation::InFrontCab);
        engine.vehicle().on_update(&player_tick(true));
        assert_eq!(location.snapshot(), PlayerLocation::InFrontCab);
        engine.vehicle().on_update(&player_tick(false));
        assert_eq!(location.snapshot(), PlayerLocation::Away);
        engine.vehicle().on_camera(VehicleCamera::RearCab);
        assert_eq!(location.snapshot(), PlayerLocation::InRearCab);
        engine.vehicle().on_camera(VehicleCamera::Carriage);
        assert_eq!(location.snapshot(), PlayerLocation::InRearCab);
    }

    #[rstest]
    fn pulse_codes_drop_unrecognized_messages(engine: FrpEngine) {
        let codes = Rc::new(RefCell::new(Vec::new()));
        {
            let codes = Rc::clone(&codes);
            engine
                .pulse_code_stream()
                .subscribe(move |code| codes.borrow_mut().push(code));
        }
        engine.on_signal_message("sig1speed150");
        engine.on_signal_message("garbage");
        assert_eq!(*codes.borrow(), vec![PulseCode::C180_180]);
    }

    #[rstest]
    fn engines_sharing_a_registry_chain_the_signal_hook_once() {
        let hooks = HostHooks::default();
        let registry = HookRegistry::new();
        let first = FrpEngine::with_registry(EngineSettings::default(), registry.clone());
        let second = FrpEngine::with_registry(EngineSettings::default(), registry.clone());
        let a = count(&first.signal_message_stream());
        let b = count(&second.signal_message_stream());
        first.setup(&hooks).expect("first engine setup");
        second.setup(&hooks).expect("second engine setup");
        assert_eq!(registry.handler_count(SIGNAL_MESSAGE_HOOK), 2);
        hooks.signal_message.fire(&"sig4".to_owned());
        assert_eq!((a.get(), b.get()), (1, 1));
    }

    #[rstest]
    fn engines_with_private_registries_each_chain_the_signal_hook() {
        let hooks = HostHooks::default();
        let first = FrpEngine::new(EngineSettings::default());
        let second = FrpEngine::new(EngineSettings::default());
        let a = count(&first.signal_message_stream());
        let b = count(&second.signal_message_stream());
        first.setup(&hooks).expect("first engine setup");
        second.setup(&hooks).expect("second engine setup");
        assert!(first.registry().is_installed(SIGNAL_MESSAGE_HOOK));
        assert!(second.registry().is_installed(SIGNAL_MESSAGE_HOOK));
        assert_eq!(first.registry().handler_count(SIGNAL_MESSAGE_HOOK), 1);
        hooks.signal_message.fire(&"sig4".to_owned());
        assert_eq!((a.get(), b.get()), (1, 1));
    }

    #[rstest]
    fn second_setup_is_rejected(engine: FrpEngine) {
        let hooks = HostHooks::default();
        engine.setup(&hooks).expect("setup");
        assert_eq!(
            engine.setup(&hooks),
            Err(HookError::AlreadySetUp { owner: "engine" })
        );
    }
}
