//! Command-line driver replaying scripted host callbacks through an engine.
//!
//! Without arguments it runs a built-in demo drive and logs what the demo
//! consumers did in response.

use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use rail_frp::host::report;
use rail_frp::{
    init_logging, EngineSettings, FrpEngine, HostApi, HostHooks, LoggingHost, PlayerLocation,
    Scenario,
};

/// Replays host callbacks through a scripted engine
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
    /// JSON scenario to replay instead of the built-in demo
    #[arg(long)]
    scenario: Option<PathBuf>,
    /// JSON settings overriding those embedded in the scenario
    #[arg(long)]
    settings: Option<PathBuf>,
}

fn load_scenario(args: &Args) -> Result<Scenario> {
    let mut scenario = match &args.scenario {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading scenario {}", path.display()))?;
            Scenario::from_json_str(&json)
                .with_context(|| format!("parsing scenario {}", path.display()))?
        }
        None => Scenario::demo(),
    };
    if let Some(path) = &args.settings {
        let json = fs::read_to_string(path)
            .with_context(|| format!("reading settings {}", path.display()))?;
        scenario.settings = EngineSettings::from_json_str(&json)
            .with_context(|| format!("parsing settings {}", path.display()))?;
    }
    Ok(scenario)
}

fn wire_consumers(engine: &FrpEngine, host: &Rc<LoggingHost>) {
    let vehicle = engine.vehicle();
    let debug_host: Rc<dyn HostApi> = Rc::clone(host) as Rc<dyn HostApi>;
    vehicle
        .vehicle_update_stream()
        .map_behavior(&engine.player_location_behavior())
        .reject_repeats()
        .debug(
            &vehicle.time_behavior(),
            debug_host,
            vehicle.settings().debug_period_s,
        );

    let cab_host = Rc::clone(host);
    vehicle
        .player_update_stream()
        .map_behavior(&engine.player_location_behavior())
        .reject_repeats()
        .subscribe(move |location| {
            report(
                "cab light update",
                cab_host.activate_light("CabLight", location != PlayerLocation::Away),
            );
        });

    engine
        .pulse_code_stream()
        .reject_repeats()
        .subscribe(|code| info!("cab signal now {code:?}"));
    vehicle
        .decoded_consist_message_stream()
        .subscribe(|msg| info!("consist message {msg:?}"));
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let scenario = load_scenario(&args)?;
    let host = Rc::new(LoggingHost::default());
    let hooks = HostHooks::default();
    let engine = FrpEngine::new(scenario.settings);
    wire_consumers(&engine, &host);
    engine.setup(&hooks).context("attaching engine to host hooks")?;

    let replay = scenario.fire(&hooks);
    info!(
        "simulated {:.1}s, {} events delivered, {} dropped",
        engine.vehicle().clock().now_ms() / 1000.0,
        replay.delivered,
        replay.dropped
    );
    for message in host.messages() {
        info!("on screen: {message}");
    }
    Ok(())
}
