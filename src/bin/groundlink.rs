//! Command-line ground station.
//!
//! Connects to one autopilot, optionally downloads the parameter table,
//! applies parameter writes and a mode change, then prints fused
//! telemetry until Ctrl+C or the link closes.
//!
//! Usage:
//!   cargo run --bin groundlink -- [OPTIONS]
//!
//! Options:
//!   --udp <ADDR>            Listen for the vehicle on UDP (default: 0.0.0.0:14550)
//!   --udp-peer <ADDR>       Send to this UDP endpoint before the vehicle speaks
//!   --tcp <ADDR>            Connect over TCP instead (e.g. 127.0.0.1:5760)
//!   --serial <PATH>         Use a serial device instead (8N1)
//!   --baud <N>              Serial baud rate (default: 115200)
//!   --config <PATH>         Load link settings from a TOML file
//!   --vehicle-type <N>      MAV_TYPE to lock onto (default: 1, fixed wing)
//!   --params                Download the full parameter table
//!   --set <NAME=VALUE>      Write a parameter (repeatable)
//!   --mode <NAME>           Request a flight mode once locked
//!   --interval <SECS>       Telemetry print interval (default: 1)

use std::env;
use std::net::SocketAddr;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use groundlink::communication::mavlink::transport::{
    SerialTransport, StreamTransport, Transport, UdpTransport,
};
use groundlink::error::TransportError;
use groundlink::config::SerialSettings;
use groundlink::{Link, LinkConfig, LinkEvent};
use groundlink_core::params::ParamType;
use groundlink_core::telemetry::TelemetryState;
use log::{error, info, warn};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

enum TransportArg {
    Udp {
        bind: String,
        peer: Option<SocketAddr>,
    },
    Tcp(String),
    Serial(String),
}

struct Args {
    transport: TransportArg,
    config: Option<String>,
    baud: Option<u32>,
    vehicle_type: Option<u8>,
    params: bool,
    writes: Vec<(String, f32)>,
    mode: Option<String>,
    interval_secs: u64,
}

fn parse_args() -> Args {
    let mut args = Args {
        transport: TransportArg::Udp {
            bind: "0.0.0.0:14550".to_string(),
            peer: None,
        },
        config: None,
        baud: None,
        vehicle_type: None,
        params: false,
        writes: Vec::new(),
        mode: None,
        interval_secs: 1,
    };
    let mut udp_peer = None;

    let raw: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < raw.len() {
        match raw[i].as_str() {
            "--udp" => {
                i += 1;
                args.transport = TransportArg::Udp {
                    bind: string_arg(&raw, i, "udp"),
                    peer: None,
                };
            }
            "--udp-peer" => {
                i += 1;
                udp_peer = Some(string_arg(&raw, i, "udp-peer").parse().unwrap_or_else(|_| {
                    eprintln!("Error: invalid value for --udp-peer");
                    process::exit(1);
                }));
            }
            "--tcp" => {
                i += 1;
                args.transport = TransportArg::Tcp(string_arg(&raw, i, "tcp"));
            }
            "--serial" => {
                i += 1;
                args.transport = TransportArg::Serial(string_arg(&raw, i, "serial"));
            }
            "--baud" => {
                i += 1;
                args.baud = Some(parse_arg(&raw, i, "baud"));
            }
            "--config" => {
                i += 1;
                args.config = Some(string_arg(&raw, i, "config"));
            }
            "--vehicle-type" => {
                i += 1;
                args.vehicle_type = Some(parse_arg(&raw, i, "vehicle-type"));
            }
            "--params" => args.params = true,
            "--set" => {
                i += 1;
                let pair = string_arg(&raw, i, "set");
                let Some((name, value)) = pair.split_once('=') else {
                    eprintln!("Error: --set expects NAME=VALUE");
                    process::exit(1);
                };
                let value = value.trim().parse().unwrap_or_else(|_| {
                    eprintln!("Error: invalid value for parameter {name}");
                    process::exit(1);
                });
                args.writes.push((name.trim().to_string(), value));
            }
            "--mode" => {
                i += 1;
                args.mode = Some(string_arg(&raw, i, "mode"));
            }
            "--interval" => {
                i += 1;
                args.interval_secs = parse_arg(&raw, i, "interval");
            }
            "-h" | "--help" => {
                print_usage();
                process::exit(0);
            }
            other => {
                eprintln!("Unknown option: {other}");
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    if let (TransportArg::Udp { peer, .. }, Some(addr)) = (&mut args.transport, udp_peer) {
        *peer = Some(addr);
    }
    if args.baud == Some(0) {
        eprintln!("Error: baud must be positive");
        process::exit(1);
    }
    if args.interval_secs == 0 {
        eprintln!("Error: interval must be at least 1");
        process::exit(1);
    }

    args
}

fn string_arg(raw: &[String], i: usize, name: &str) -> String {
    raw.get(i).cloned().unwrap_or_else(|| {
        eprintln!("Error: --{name} requires a value");
        process::exit(1);
    })
}

fn parse_arg<T: std::str::FromStr>(raw: &[String], i: usize, name: &str) -> T {
    string_arg(raw, i, name).parse().unwrap_or_else(|_| {
        eprintln!("Error: invalid value for --{name}");
        process::exit(1);
    })
}

fn print_usage() {
    eprintln!(
        "Usage: groundlink [OPTIONS]\n\
         \n\
         Options:\n\
         \x20 --udp <ADDR>            Listen for the vehicle on UDP (default: 0.0.0.0:14550)\n\
         \x20 --udp-peer <ADDR>       Send to this UDP endpoint before the vehicle speaks\n\
         \x20 --tcp <ADDR>            Connect over TCP instead (e.g. 127.0.0.1:5760)\n\
         \x20 --serial <PATH>         Use a serial device instead (8N1)\n\
         \x20 --baud <N>              Serial baud rate (default: 115200)\n\
         \x20 --config <PATH>         Load link settings from a TOML file\n\
         \x20 --vehicle-type <N>      MAV_TYPE to lock onto (default: 1, fixed wing)\n\
         \x20 --params                Download the full parameter table\n\
         \x20 --set <NAME=VALUE>      Write a parameter (repeatable)\n\
         \x20 --mode <NAME>           Request a flight mode once locked\n\
         \x20 --interval <SECS>       Telemetry print interval (default: 1)\n\
         \x20 -h, --help              Show this help"
    );
}

async fn open_transport(
    arg: &TransportArg,
    serial: &SerialSettings,
) -> Result<Arc<dyn Transport>, TransportError> {
    let transport: Arc<dyn Transport> = match arg {
        TransportArg::Udp { bind, peer: None } => Arc::new(UdpTransport::bind(bind.as_str()).await?),
        TransportArg::Udp {
            bind,
            peer: Some(peer),
        } => Arc::new(UdpTransport::connect(bind.as_str(), *peer).await?),
        TransportArg::Tcp(addr) => Arc::new(StreamTransport::tcp(addr.as_str()).await?),
        TransportArg::Serial(path) => Arc::new(SerialTransport::open(path, serial)?),
    };
    Ok(transport)
}

fn print_telemetry(state: &TelemetryState) {
    println!(
        "{:<12} {:<8} roll {:>7.2} pitch {:>7.2} hdg {:>6.1} | as {:>5.1} gs {:>5.1} alt {:>7.1} | \
         {:.6},{:.6} sats {:>2} | {:>5.2} V",
        state.mode,
        if state.armed { "ARMED" } else { "disarmed" },
        state.roll_deg,
        state.pitch_deg,
        state.heading_deg,
        state.airspeed,
        state.groundspeed,
        state.altitude,
        state.lat,
        state.lon,
        state.satellites,
        state.battery_volts,
    );
}

/// Parameter writes and mode change, run once the vehicle is locked.
async fn run_requests(link: Link, writes: Vec<(String, f32)>, mode: Option<String>, params: bool) {
    let mut target = link.target_updates();
    if target.wait_for(Option::is_some).await.is_err() {
        return;
    }

    if params {
        link.request_param_list().await;
    }

    for (name, value) in writes {
        let param_type = link
            .param(&name)
            .map_or(ParamType::Real32, |record| record.param_type);
        match link.set_param(&name, value, param_type).await {
            Ok(echo) => info!("{name} = {}", echo.value),
            Err(err) => error!("{err}"),
        }
    }

    if let Some(mode) = mode {
        if let Err(err) = link.commands().set_mode(&mode).await {
            error!("Mode change failed: {err}");
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = parse_args();

    let mut config = match &args.config {
        Some(path) => LinkConfig::load(path).unwrap_or_else(|err| {
            eprintln!("Error: failed to load {path}: {err}");
            process::exit(1);
        }),
        None => LinkConfig::default(),
    };
    if let Some(vehicle_type) = args.vehicle_type {
        config.expected_vehicle_type = vehicle_type;
    }
    if let Some(baud) = args.baud {
        config.serial.baud = baud;
    }

    let transport = open_transport(&args.transport, &config.serial).await.unwrap_or_else(|err| {
        eprintln!("Error: failed to open transport: {err}");
        process::exit(1);
    });

    println!("=== groundlink ===");
    let link = Link::start(transport, config);
    let mut events = link.subscribe();
    let mut telemetry = link.telemetry();

    tokio::spawn(run_requests(link.clone(), args.writes, args.mode, args.params));

    let mut interval = tokio::time::interval(Duration::from_secs(args.interval_secs));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                println!("\nShutdown requested.");
                link.shutdown();
                break;
            }
            _ = interval.tick() => {
                if telemetry.has_changed().unwrap_or(false) {
                    print_telemetry(&telemetry.borrow_and_update());
                }
            }
            event = events.recv() => match event {
                Ok(LinkEvent::ParamSyncFinished(outcome)) => {
                    println!("Parameter download finished: {outcome:?} ({} known)", link.params().len());
                }
                Ok(LinkEvent::Closed { reason }) => {
                    println!("Link closed: {reason}");
                    break;
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => warn!("Event receiver lagged by {skipped}"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    let stats = link.decoder_stats();
    println!(
        "Frames: {}, checksum errors: {}, dropped bytes: {}",
        stats.frames, stats.crc_errors, stats.dropped_bytes
    );
}
