//! vhal-bridged - Vehicle hardware bridge daemon
//!
//! Forwards the vehicle hardware contract to a remote vehicle server and logs
//! every property event the server pushes.
//!
//! Usage:
//!   vhal-bridged [OPTIONS] [config.toml]
//!
//! If no config file is provided, the default server address is used.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vhal_core::{
    SubscribeOptions, VehicleAreaConfig, VehicleHardware, VehiclePropConfig, VehiclePropValue,
    VehiclePropertyAccess, VehiclePropertyChangeMode,
};
use vhal_grpc::{BridgeConfig, GrpcVehicleHardware, MockVehicleServer};

/// PERF_VEHICLE_SPEED
const DEMO_SPEED_PROP: i32 = 0x1160_0207;
/// HVAC_TEMPERATURE_SET
const DEMO_HVAC_PROP: i32 = 0x1560_0503;

/// Parsed command-line arguments
struct Args {
    /// Bridge config file (TOML)
    config_path: Option<String>,
    /// Emit logs as JSON lines
    json_logs: bool,
    /// Serve from an in-process mock server instead of connecting
    mock: bool,
    /// How long to wait for the server before starting anyway
    wait_ms: u64,
    /// Arguments that were not understood, reported once logging is up
    unknown: Vec<String>,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut result = Args {
        config_path: None,
        json_logs: false,
        mock: false,
        wait_ms: 5000,
        unknown: Vec::new(),
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--json-logs" => {
                result.json_logs = true;
                i += 1;
            }
            "--mock" => {
                result.mock = true;
                i += 1;
            }
            "--wait-ms" => match args.get(i + 1).and_then(|v| v.parse().ok()) {
                Some(ms) => {
                    result.wait_ms = ms;
                    i += 2;
                }
                None => {
                    result.unknown.push(args[i].clone());
                    i += 1;
                }
            },
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            arg if !arg.starts_with('-') => {
                // Positional argument = config file
                result.config_path = Some(arg.to_string());
                i += 1;
            }
            _ => {
                result.unknown.push(args[i].clone());
                i += 1;
            }
        }
    }

    result
}

fn print_help() {
    eprintln!(
        r#"vhal-bridged - Vehicle Hardware Bridge Daemon

Usage: vhal-bridged [OPTIONS] [config.toml]

Options:
  --json-logs      Emit logs as JSON lines
  --mock           Serve from an in-process mock vehicle server
  --wait-ms <ms>   Wait this long for the server before starting (default 5000)
  -h, --help       Print this help message

Examples:
  # Connect to the default server address
  vhal-bridged

  # Run with config file
  vhal-bridged bridge.toml

  # Demo without a vehicle server
  vhal-bridged --mock
"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = parse_args();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vhal_bridged=info,vhal_grpc=info".into()),
        )
        .with(args.json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!args.json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!("Starting vhal-bridged (Vehicle Hardware Bridge Daemon)");
    for arg in &args.unknown {
        tracing::warn!("Unknown argument: {}", arg);
    }

    let config = match args.config_path {
        Some(ref path) => {
            tracing::info!("Loading config from: {}", path);
            BridgeConfig::load(path)?
        }
        None => {
            tracing::info!("No config file provided, using defaults");
            BridgeConfig::default()
        }
    };

    let mut demo_feed = None;
    let hardware = if args.mock {
        tracing::info!("Using in-process mock vehicle server");
        let server = Arc::new(MockVehicleServer::with_configs(demo_configs()));
        demo_feed = Some(tokio::spawn(feed_demo_values(server.clone())));
        GrpcVehicleHardware::with_stub(server, config.options())
    } else {
        GrpcVehicleHardware::connect(&config)?
    };

    if hardware
        .wait_for_connected(Duration::from_millis(args.wait_ms))
        .await
    {
        tracing::info!("Vehicle server is reachable");
    } else {
        tracing::warn!(
            "Vehicle server not reachable after {}ms, continuing",
            args.wait_ms
        );
    }

    hardware.register_on_property_change_event(Box::new(log_property_events));

    let configs = hardware.get_all_property_configs().await;
    tracing::info!("Vehicle server exposes {} properties", configs.len());
    tracing::info!("Health: {}", hardware.check_health().await);

    let subscribed = subscribe_all(&hardware, &configs).await;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");

    for (prop_id, area_id) in subscribed {
        hardware.unsubscribe(prop_id, area_id).await;
    }
    if let Some(feed) = demo_feed {
        feed.abort();
    }
    hardware.shutdown().await;

    Ok(())
}

fn log_property_events(values: Vec<VehiclePropValue>) {
    for value in values {
        match serde_json::to_string(&value) {
            Ok(json) => tracing::info!(prop_id = value.prop, area_id = value.area_id, "{}", json),
            Err(e) => tracing::warn!("Failed to encode property event: {}", e),
        }
    }
}

/// Subscribe to every readable, non-static property area
async fn subscribe_all(
    hardware: &GrpcVehicleHardware,
    configs: &[VehiclePropConfig],
) -> Vec<(i32, i32)> {
    let mut subscribed = Vec::new();

    for config in configs {
        if config.change_mode == VehiclePropertyChangeMode::Static
            || config.access == VehiclePropertyAccess::Write
        {
            continue;
        }

        let area_ids: Vec<i32> = if config.area_configs.is_empty() {
            vec![0]
        } else {
            config.area_configs.iter().map(|a| a.area_id).collect()
        };
        let sample_rate = match config.change_mode {
            VehiclePropertyChangeMode::Continuous => config.min_sample_rate,
            _ => 0.0,
        };

        let options = SubscribeOptions {
            prop_id: config.prop,
            area_ids: area_ids.clone(),
            sample_rate,
            ..Default::default()
        };
        let status = hardware.subscribe(options).await;
        if status.is_ok() {
            subscribed.extend(area_ids.into_iter().map(|area_id| (config.prop, area_id)));
        } else {
            tracing::warn!("Failed to subscribe to property {:#x}: {}", config.prop, status);
        }
    }

    tracing::info!("Subscribed to {} property areas", subscribed.len());
    subscribed
}

fn demo_configs() -> Vec<VehiclePropConfig> {
    vec![
        VehiclePropConfig {
            prop: DEMO_SPEED_PROP,
            access: VehiclePropertyAccess::Read,
            change_mode: VehiclePropertyChangeMode::Continuous,
            min_sample_rate: 1.0,
            max_sample_rate: 10.0,
            ..Default::default()
        },
        VehiclePropConfig {
            prop: DEMO_HVAC_PROP,
            access: VehiclePropertyAccess::ReadWrite,
            change_mode: VehiclePropertyChangeMode::OnChange,
            area_configs: vec![VehicleAreaConfig {
                area_id: 0x31,
                access: VehiclePropertyAccess::ReadWrite,
                min_float_value: 16.0,
                max_float_value: 28.0,
                ..Default::default()
            }],
            ..Default::default()
        },
    ]
}

/// Push a vehicle speed sample into the mock server once per second
async fn feed_demo_values(server: Arc<MockVehicleServer>) {
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    let mut tick: i64 = 0;
    loop {
        interval.tick().await;
        tick += 1;
        let speed = (tick % 30) as f32;
        server.inject_values(vec![VehiclePropValue::new(DEMO_SPEED_PROP, 0)
            .with_timestamp(tick * 1_000_000_000)
            .with_float_values(vec![speed])]);
    }
}
