//! # Mixer Control Unit
//!
//! Runs the mixing-valve regulator against a simulated heating circuit.
//!
//! The configuration comes from a TOML file (`--config`), a built-in
//! deployment preset (`--preset`) or the system default file. The simulation advances a virtual clock
//! in fixed steps for `--hours`, optionally paced in real time, and logs a
//! controller snapshot at a fixed interval.

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use mixer_common::config::LogLevel;
use mixer_common::consts::DEFAULT_CONFIG_PATH;
use mixer_common::control_unit::config::{MixerConfig, Variant};
use mixer_common::control_unit::state::Timestamp;
use mixer_control_unit::config::resolve_config;
use mixer_control_unit::controller::MixerController;
use mixer_control_unit::cycle::CycleRunner;
use mixer_control_unit::error::ControlUnitError;
use mixer_control_unit::sim::{PlantConfig, PlantModel, SimActuator, SimParameterStore, SimSensors};
use mixer_control_unit::status::TracingStatusSink;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Deployment presets selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Preset {
    PulsedWithBuffer,
    PulsedNoBuffer,
    AbsoluteWithBuffer,
    PulsedLegacy,
}

impl From<Preset> for Variant {
    fn from(preset: Preset) -> Self {
        match preset {
            Preset::PulsedWithBuffer => Variant::PulsedWithBuffer,
            Preset::PulsedNoBuffer => Variant::PulsedNoBuffer,
            Preset::AbsoluteWithBuffer => Variant::AbsoluteWithBuffer,
            Preset::PulsedLegacy => Variant::PulsedLegacy,
        }
    }
}

/// Mixer Control Unit: PID mixing-valve regulator (simulation run)
#[derive(Parser, Debug)]
#[command(name = "mixer_control_unit")]
#[command(version)]
#[command(about = "PID mixing-valve regulator with buffer-storage interlock")]
struct Args {
    /// Path to the control-unit configuration TOML.
    /// Without `--config` or `--preset`, `/etc/mixer/mixer.toml` is used when
    /// present, else the absolute-with-buffer preset.
    #[arg(long, value_name = "FILE", conflicts_with = "preset")]
    config: Option<PathBuf>,

    /// Built-in deployment preset.
    #[arg(long, value_enum)]
    preset: Option<Preset>,

    /// Simulated duration [h].
    #[arg(long, default_value_t = 24.0)]
    hours: f64,

    /// Simulation step [ms].
    #[arg(long, default_value_t = 1000)]
    step_ms: u64,

    /// Snapshot log interval [s] of simulated time.
    #[arg(long, default_value_t = 600)]
    snapshot_s: u64,

    /// Pace the simulation in real time.
    #[arg(long)]
    realtime: bool,

    /// Print the effective configuration as TOML and exit.
    #[arg(long)]
    print_config: bool,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    let config = resolve_config(
        args.config.as_deref(),
        args.preset.map(Variant::from),
        Path::new(DEFAULT_CONFIG_PATH),
    );

    let level = match &config {
        Ok(c) => c.shared.log_level,
        Err(_) => LogLevel::Info,
    };
    setup_tracing(&args, level);

    info!("Mixer Control Unit v{} starting...", env!("CARGO_PKG_VERSION"));

    let result = config
        .map_err(ControlUnitError::from)
        .and_then(|config| run(&args, config));
    if let Err(e) = result {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Mixer Control Unit shutdown complete");
}

fn run(args: &Args, config: MixerConfig) -> Result<(), ControlUnitError> {
    if args.print_config {
        println!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }
    if !(args.hours.is_finite() && args.hours > 0.0) {
        return Err(ControlUnitError::InvalidArgument(format!(
            "--hours must be positive, got {}",
            args.hours
        )));
    }
    if args.step_ms == 0 {
        return Err(ControlUnitError::InvalidArgument(
            "--step-ms must be positive".to_string(),
        ));
    }

    let plant = PlantModel::new(
        PlantConfig {
            full_travel_s: config.actuator.full_travel_s,
            ..PlantConfig::default()
        },
        config.position.initial as f64,
    )
    .shared();
    let sensors = SimSensors::new(plant.clone(), &config.sensors);
    let params = SimParameterStore::from_config(&config.pid);
    let actuator = SimActuator::new(config.actuator.style).with_plant(plant.clone());
    let controller = MixerController::new(config, sensors, params, actuator, TracingStatusSink::new());

    let mut runner = CycleRunner::start(controller, Timestamp::ZERO)?;

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    let step = Duration::from_millis(args.step_ms);
    let end = Timestamp::from_millis((args.hours * 3_600_000.0) as u64);
    let snapshot_ms = args.snapshot_s.max(1) * 1000;
    let mut next_snapshot = Timestamp::ZERO;
    let mut now = Timestamp::ZERO;

    info!(hours = args.hours, step_ms = args.step_ms, realtime = args.realtime, "simulation started");

    while running.load(Ordering::SeqCst) && now < end {
        if now >= next_snapshot {
            log_snapshot(&runner, now, args.json)?;
            next_snapshot = next_snapshot.add_millis(snapshot_ms);
        }

        plant.borrow_mut().step(step);
        now = now.add_millis(args.step_ms);
        runner.advance_to(now);

        if args.realtime {
            std::thread::sleep(step);
        }
    }

    log_snapshot(&runner, now, args.json)?;
    let stats = runner.stats();
    info!(
        simulated = %now,
        pid_steps = stats.pid_steps,
        interlock_checks = stats.interlock_checks,
        moves_issued = stats.moves_issued,
        moves_rejected = stats.moves_rejected,
        completions = stats.completions,
        transitions = runner.controller().status().announced(),
        "simulation finished"
    );
    Ok(())
}

fn log_snapshot(
    runner: &CycleRunner<SimSensors, SimParameterStore, SimActuator, TracingStatusSink>,
    now: Timestamp,
    json: bool,
) -> Result<(), ControlUnitError> {
    let snapshot = runner.controller().snapshot(now);
    if json {
        info!(snapshot = %serde_json::to_string(&snapshot)?, "snapshot");
    } else {
        info!(
            at = %snapshot.at,
            state = %snapshot.state,
            position = snapshot.position,
            flow = ?snapshot.flow_temp,
            buffer = ?snapshot.buffer_temp,
            setpoint = snapshot.setpoint,
            integral = snapshot.integral,
            "snapshot"
        );
    }
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments and the configured level.
fn setup_tracing(args: &Args, level: LogLevel) {
    let level = if args.verbose { LogLevel::Debug } else { level };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_directive()));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
