//! `touchd`: the sensor-wrapper driver binary. Wires together
//! configuration loading, the contact tracker, the adaptor chain and the
//! server endpoint into the event loop §5 describes — one blocking input
//! read, one commit, one blocking UDP send per sync group, no task
//! runtime.

mod adaptor;
mod axis;
mod config;
mod error;
mod input;
mod pidlock;
mod registry;
mod server;
mod trace;
mod tracker;

use std::io::Write as _;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use fnv::FnvHasher;
use std::hash::Hasher;
use tracing::{info, warn};

use tuio2_types::contact::OutputMode;
use tuio2_types::Timetag;

use adaptor::{AppendOnInterval, CoordinateMarker, ViewportProjector};
use axis::AxisMapping;
use config::ResolvedSensor;
use error::{ConfigError, DeviceError};
use input::{InputSource, RawEvent, TraceReplaySource};
use pidlock::PidLock;
use registry::AdaptorRegistry;
use server::{Server, SourceIdentity};
use tracker::Tracker;

/// Exit codes, per §6: 0 success, 1 configuration error, 2 device error,
/// 3 runtime failure.
#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Device(#[from] DeviceError),
    #[error("{0}")]
    Runtime(String),
}

impl AppError {
    fn exit_code(&self) -> i32 {
        match self {
            AppError::Config(_) => 1,
            AppError::Device(_) => 2,
            AppError::Runtime(_) => 3,
        }
    }
}

/// TUIO2 sensor wrapper daemon: tracker, adaptor chain and server endpoint.
#[derive(Parser, Debug)]
#[command(name = "touchd", version, about)]
struct Cli {
    /// Raw trace file to replay (the only concrete `InputSource` this core
    /// ships; a live evdev source is an external collaborator).
    trace: Option<PathBuf>,

    /// XML `muse_config` document.
    #[arg(long = "config")]
    config_path: Option<PathBuf>,

    /// Which `<wrapper name="...">` element to use from `--config`.
    #[arg(long = "wrapper", default_value = "mwtouch")]
    wrapper: String,

    #[arg(short, long)]
    verbose: bool,

    /// List available devices. This core only replays recorded traces;
    /// live device enumeration is an external collaborator (§1).
    #[arg(short = 'l', long = "list")]
    list_devices: bool,

    /// Calibration GUI mode. Not built in this core (§1); accepted for CLI
    /// surface compatibility and exits 0 immediately.
    #[arg(short = 'c', long = "calibration")]
    calibration: bool,

    #[arg(short = 't', long = "target")]
    target: Option<String>,

    #[arg(short = 'D', long = "device")]
    device: Option<String>,

    #[arg(short = 'o', long = "output-trace")]
    output_trace: Option<PathBuf>,

    /// Disable coordinate transforms (scaling and viewport projection).
    #[arg(short = 'T')]
    no_transforms: bool,

    /// Replay delay scale; 0 replays as fast as the trace can be read.
    #[arg(short = 'd', long = "delay", default_value_t = 1.0)]
    delay: f64,

    #[arg(short = 'p', long = "no-pid")]
    no_pid: bool,
}

fn init_logging(verbose: bool) {
    let default_directive = if verbose { "touchd=debug,info" } else { "touchd=info,warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive.into()),
        )
        .init();
}

/// 32-bit non-cryptographic hash of `app_name`, generated at startup so
/// clients can distinguish concurrent instances on the same host (§6).
fn instance_id(app_name: &str) -> u32 {
    let mut hasher = FnvHasher::default();
    hasher.write(app_name.as_bytes());
    hasher.finish() as u32
}

fn build_chain(sensor: Option<&ResolvedSensor>, disable_transforms: bool) -> Vec<Box<dyn adaptor::Adaptor>> {
    let mut registry = AdaptorRegistry::new();

    if let Some(sensor) = sensor {
        if !disable_transforms {
            registry.push(Box::new(ViewportProjector {
                viewport: sensor.viewport,
                strip_outside: false,
            }));
        }
        registry.push(Box::new(CoordinateMarker {
            uuid: sensor.uuid,
            translation_mode: sensor.topology.translation_mode,
            purpose: sensor.topology.purpose,
        }));

        let mut topology_messages = Vec::new();
        topology_messages.push(tuio2_types::message::Message::Sensor(
            tuio2_types::message::SensorMessage {
                uuid: sensor.uuid,
                translation_mode: sensor.topology.translation_mode,
                purpose: sensor.topology.purpose,
            },
        ));
        for &group in &sensor.topology.groups {
            topology_messages.push(tuio2_types::message::Message::Group(
                tuio2_types::message::GroupMessage {
                    uuid: sensor.uuid,
                    group_uuid: group,
                },
            ));
        }
        for neighbour in &sensor.topology.neighbours {
            topology_messages.push(tuio2_types::message::Message::Neighbour(
                tuio2_types::message::NeighbourMessage {
                    uuid: sensor.uuid,
                    neighbour_uuid: neighbour.neighbour_uuid,
                    azimuth: neighbour.azimuth,
                    altitude: neighbour.altitude,
                    distance: neighbour.distance,
                },
            ));
        }
        topology_messages.push(tuio2_types::message::Message::Viewport(
            tuio2_types::message::ViewportMessage {
                uuid: sensor.uuid,
                width: sensor.viewport.width,
                height: sensor.viewport.height,
                center: sensor.viewport.center,
                orientation: sensor.viewport.orientation,
            },
        ));
        if !topology_messages.is_empty() {
            registry.push(Box::new(AppendOnInterval::new(topology_messages, 30)));
        }
    }

    registry.into_chain()
}

/// Registers SIGTERM/SIGINT/SIGHUP/SIGABRT against a shared flag, read
/// once per event-loop iteration (§5's cancellation model). The flag
/// starts clear and is set by `signal_hook::flag::register` the moment
/// any of those signals arrives.
fn install_shutdown_flag() -> Arc<AtomicBool> {
    let shutdown = Arc::new(AtomicBool::new(false));
    for &signal in &[
        signal_hook::consts::SIGTERM,
        signal_hook::consts::SIGINT,
        signal_hook::consts::SIGHUP,
        signal_hook::consts::SIGABRT,
    ] {
        if let Err(error) = signal_hook::flag::register(signal, shutdown.clone()) {
            warn!(%error, signal, "failed to install signal handler");
        }
    }
    shutdown
}

fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.calibration {
        println!("calibration GUI is not built in this core; see an external collaborator");
        return Ok(());
    }
    if cli.list_devices {
        println!("device enumeration requires a live evdev source, not available in this build");
        return Ok(());
    }

    let wrapper_name = cli.wrapper.clone();

    let (mut wrapper_options, resolved_sensor) = if let Some(config_path) = &cli.config_path {
        let config_path = config_path.to_string_lossy().into_owned();
        let parsed = config::load_config(&config_path)?;
        let wrapper = config::find_wrapper(&parsed, &config_path, &wrapper_name)?.clone();
        let resolved = wrapper
            .config
            .sensors
            .first()
            .map(|sensor| config::resolve_sensor(&config_path, sensor))
            .transpose()?;
        (wrapper.config, resolved)
    } else {
        (config::WrapperOptions::default(), None)
    };

    if let Some(target) = &cli.target {
        wrapper_options.target = Some(target.clone());
    }
    if let Some(device) = &cli.device {
        wrapper_options.device = Some(device.clone());
    }

    let target = wrapper_options.target.unwrap_or_else(|| "127.0.0.1:3333".to_owned());
    let device = wrapper_options.device.unwrap_or_else(|| "trace".to_owned());

    let _pid_lock = PidLock::acquire(&wrapper_name, &device, cli.no_pid)?;

    let app_name = "touchd".to_owned();
    let identity = SourceIdentity {
        source_address: 0,
        instance_id: instance_id(&app_name),
        app_name,
        sensor_width: resolved_sensor
            .as_ref()
            .map(|s| s.viewport.width as u32)
            .unwrap_or(1920),
        sensor_height: resolved_sensor
            .as_ref()
            .map(|s| s.viewport.height as u32)
            .unwrap_or(1080),
    };

    let Some(trace_path) = cli.trace.as_deref() else {
        return Err(AppError::Runtime(
            "no trace file to replay; a live evdev source is an external collaborator".into(),
        ));
    };

    let mut input = TraceReplaySource::open(&trace_path.to_string_lossy(), cli.delay)?;

    let mapping = resolved_sensor
        .as_ref()
        .map(|s| s.mapping.clone())
        .unwrap_or_else(AxisMapping::new);

    let mut tracker = Tracker::new(mapping, 0.05, OutputMode::Both);
    tracker.refresh_ranges(input.axis_capabilities());

    let mut server = Server::bind(&target, identity).map_err(|e| {
        AppError::Runtime(format!("failed to bind UDP socket toward {target}: {e}"))
    })?;
    for stage in build_chain(resolved_sensor.as_ref(), cli.no_transforms) {
        server.push_adaptor(stage);
    }

    let shutdown_requested = install_shutdown_flag();

    info!(%target, %device, "touchd starting");

    let mut recorded = Vec::new();
    let record_trace = cli.output_trace.is_some();

    while !shutdown_requested.load(Ordering::Relaxed) {
        let event = match input.next_event() {
            Ok(Some(event)) => event,
            Ok(None) => break,
            Err(error) => {
                warn!(%error, "input source failed; shutting down");
                break;
            }
        };

        if record_trace {
            recorded.push(event);
        }

        match event {
            RawEvent::SynReport => {
                let frame_id = server.begin_commit();
                let now = Timetag::now().as_secs_f64();
                let commit = tracker.commit(server.allocator_mut(), now);
                for id in commit.newly_alive {
                    server.mark_alive(id);
                }
                for id in commit.released {
                    server.retire_session(id);
                }
                server.stage_all(commit.messages);
                server.commit(frame_id, Timetag::now());
            }
            other => tracker.feed(other),
        }
    }

    let frame_id = server.begin_commit();
    let shutdown_commit = tracker.shutdown();
    for id in shutdown_commit.released {
        server.retire_session(id);
    }
    server.stage_all(shutdown_commit.messages);
    server.commit(frame_id, Timetag::now());

    if let Some(output_path) = &cli.output_trace {
        if let Err(error) = write_recorded_trace(output_path, input.axis_capabilities(), &recorded) {
            warn!(%error, "failed to write output trace");
        }
    }

    info!("touchd shut down cleanly");
    Ok(())
}

fn write_recorded_trace(
    path: &std::path::Path,
    axes: &[trace::AxisCapability],
    events: &[RawEvent],
) -> std::io::Result<()> {
    let timed = events
        .iter()
        .map(|&event| trace::TimedEvent { sec: 0, usec: 0, event })
        .collect();
    let recorded = trace::Trace {
        axes: axes.to_vec(),
        events: timed,
    };
    let mut file = std::fs::File::create(path)?;
    trace::write_trace(&mut file, &recorded)?;
    file.flush()
}

fn main() {
    if let Err(error) = run() {
        eprintln!("touchd: {error}");
        std::process::exit(error.exit_code());
    }
}
