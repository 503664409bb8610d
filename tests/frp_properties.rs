//! Core guarantees of the stream runtime, exercised end to end.
//!
//! Covers cold re-evaluation versus hubs, stepper reads, merge ordering,
//! throttle gating against host time, the player-location state machine and
//! non-destructive hook chaining.

use anyhow::{ensure, Result};
use rail_frp::chain::{CallbackSlot, ChainOrder};
use rail_frp::frp::{lift2, FrpSource, SimClock, Stream};
use rail_frp::{Behavior, EngineSettings, FrpEngine, PlayerLocation, VehicleCamera};
use rstest::rstest;
use static_assertions::assert_not_impl_any;
use test_utils::{ai_tick, player_tick, Counter, Recorder};

assert_not_impl_any!(Stream<u8>: Send, Sync);
assert_not_impl_any!(Behavior<u8>: Send, Sync);
assert_not_impl_any!(FrpSource<u8>: Send, Sync);

#[rstest]
#[case::cold(false, 2)]
#[case::hub(true, 1)]
fn side_effects_run_per_sink_unless_hubbed(
    #[case] hubbed: bool,
    #[case] per_event: usize,
) -> Result<()> {
    let source = FrpSource::new();
    let counter = Counter::new();
    let mapped = source.create_stream().map(counter.counting(|v: u32| v * 2));
    let stream = if hubbed { mapped.hub() } else { mapped };
    let first = Recorder::attach(&stream);
    let second = Recorder::attach(&stream);
    for v in 1..=3 {
        source.call(v);
    }
    ensure!(counter.get() == 3 * per_event, "counter was {}", counter.get());
    ensure!(first.events() == vec![2, 4, 6]);
    ensure!(second.events() == first.events());
    Ok(())
}

#[rstest]
fn stepper_reads_initial_then_latest() -> Result<()> {
    let source = FrpSource::new();
    let latest = Behavior::stepper(&source.create_stream(), 7);
    ensure!(latest.snapshot() == 7);
    for v in [3, 9, 4] {
        source.call(v);
        ensure!(latest.snapshot() == v, "stepper lagged behind {v}");
    }
    Ok(())
}

#[rstest]
fn hub_sinks_run_in_attachment_order() -> Result<()> {
    let source = FrpSource::new();
    let hot = source.create_stream().hub();
    let log = FrpSource::new();
    let order = Recorder::attach(&log.create_stream());
    for name in ["a", "b", "c"] {
        let log = log.clone();
        hot.subscribe(move |_: u8| log.call(name));
    }
    source.call(1);
    source.call(2);
    ensure!(
        order.events() == vec!["a", "b", "c", "a", "b", "c"],
        "got {:?}",
        order.events()
    );
    Ok(())
}

#[rstest]
fn hub_feeds_stepper_and_sink_once_per_call() -> Result<()> {
    let source = FrpSource::new();
    let counter = Counter::new();
    let hot = source
        .create_stream()
        .map(counter.counting(|v: u32| v + 100))
        .hub();
    let latest = Behavior::stepper(&hot, 0);
    let stale = Counter::new();
    {
        let latest = latest.clone();
        let stale = stale.clone();
        hot.subscribe(move |v| {
            if latest.snapshot() != v {
                stale.hit();
            }
        });
    }
    for (calls, v) in (1..=4_u32).enumerate() {
        source.call(v);
        ensure!(counter.get() == calls + 1, "counter was {}", counter.get());
        ensure!(latest.snapshot() == v + 100);
    }
    ensure!(stale.get() == 0, "sink saw a stale stepper {} times", stale.get());
    Ok(())
}

#[rstest]
fn merge_delivers_in_call_order() -> Result<()> {
    let a = FrpSource::new();
    let b = FrpSource::new();
    let merged = Recorder::attach(&a.create_stream().merge(&b.create_stream()));
    a.call("a1");
    b.call("b1");
    b.call("b2");
    a.call("a2");
    ensure!(merged.events() == vec!["a1", "b1", "b2", "a2"]);
    Ok(())
}

#[rstest]
fn throttle_gates_on_host_time() -> Result<()> {
    let clock = SimClock::new();
    let source = FrpSource::new();
    let passed = Recorder::attach(&source.create_stream().throttle(1000.0, &clock.behavior()));
    for tick in 0..20_u32 {
        source.call(tick);
        clock.advance_ms(100.0);
    }
    ensure!(passed.events() == vec![0, 10], "got {:?}", passed.events());
    Ok(())
}

#[rstest]
fn lifted_behaviors_recompute_on_each_read() -> Result<()> {
    let speed = FrpSource::new();
    let limit = FrpSource::new();
    let overspeed = lift2(
        |speed: f64, limit: f64| speed > limit,
        &Behavior::stepper(&speed.create_stream(), 0.0),
        &Behavior::stepper(&limit.create_stream(), 20.0),
    );
    ensure!(!overspeed.snapshot());
    speed.call(25.0);
    ensure!(overspeed.snapshot());
    limit.call(30.0);
    ensure!(!overspeed.snapshot());
    Ok(())
}

#[rstest]
fn player_location_ignores_unrelated_cameras() -> Result<()> {
    let engine = FrpEngine::new(EngineSettings::default());
    let location = engine.player_location_behavior();
    ensure!(location.snapshot() == PlayerLocation::InFrontCab);
    engine.vehicle().on_update(&ai_tick(0.1));
    ensure!(location.snapshot() == PlayerLocation::Away);
    engine.vehicle().on_camera(VehicleCamera::RearCab);
    ensure!(location.snapshot() == PlayerLocation::InRearCab);
    engine.vehicle().on_camera(VehicleCamera::Outside);
    ensure!(location.snapshot() == PlayerLocation::InRearCab);
    engine.vehicle().on_update(&player_tick(0.1, true));
    ensure!(location.snapshot() == PlayerLocation::InRearCab);
    Ok(())
}

#[rstest]
#[case(ChainOrder::PriorFirst, vec!["h1", "h2"])]
#[case(ChainOrder::NewFirst, vec!["h2", "h1"])]
fn chaining_keeps_the_prior_handler(
    #[case] order: ChainOrder,
    #[case] expected: Vec<&'static str>,
) -> Result<()> {
    let slot = CallbackSlot::<()>::new();
    let calls = FrpSource::new();
    let seen = Recorder::attach(&calls.create_stream());
    {
        let calls = calls.clone();
        let _ = slot.set(move |_: &()| calls.call("h1"));
    }
    {
        let calls = calls.clone();
        slot.chain(move |_: &()| calls.call("h2"), order);
    }
    ensure!(slot.fire(&()));
    ensure!(seen.events() == expected, "got {:?}", seen.events());
    Ok(())
}
