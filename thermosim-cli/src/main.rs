// Copyright (C) 2024 Laixer Equipment B.V.
// All rights reserved.
//
// This software may be modified and distributed under the terms
// of the included license.  See the LICENSE file for details.

use std::{io::Write, path::PathBuf, sync::Arc};

use clap::Parser;
use thermosim::{
    core::Sensor,
    logger::{LogConfig, Logger},
    sink::NdjsonSink,
    RunConfig, Simulator,
};

mod config;

#[derive(Parser)]
#[command(author = "Copyright (C) 2024 Laixer Equipment B.V.")]
#[command(version, propagate_version = true)]
#[command(about = "Sensor temperature simulator", long_about = None)]
struct Args {
    /// Sensor configuration file.
    #[arg(
        short = 'c',
        long = "config",
        alias = "sensor-config",
        default_value = thermosim::consts::DEFAULT_CONFIG_PATH,
        value_name = "FILE"
    )]
    config: PathBuf,
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", value_name = "LEVEL")]
    log_level: String,
    /// Log output ('stdout' or file path), overrides the configuration.
    #[arg(long, value_name = "OUTPUT")]
    log_output: Option<String>,
    /// Output file for the readings ('-' for stdout), overrides the configuration.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
    /// Advance a virtual clock instead of waiting between readings.
    #[arg(long)]
    simulate: bool,
    /// Random generator seed, overrides the configuration.
    #[arg(long)]
    seed: Option<u64>,
    /// Write readings as soon as they are generated.
    #[arg(long)]
    stream: bool,
    /// Level of verbosity.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let bin_name = env!("CARGO_BIN_NAME");

    let loaded = thermosim::SensorConfig::read(&args.config);

    let log_output = args
        .log_output
        .as_deref()
        .or_else(|| loaded.as_ref().ok().and_then(|c| c.config.log_file()))
        .unwrap_or("stdout");

    let mut global = thermosim::GlobalConfig {
        bin_name: bin_name.to_string(),
        ..Default::default()
    };

    global.log = LogConfig {
        level: LogConfig::parse_level(&args.log_level)?,
        output: log_output.parse()?,
        daemon: false,
    }
    .with_verbosity(args.verbose);

    let logger = Logger::from_config(&global)?;

    log::debug!("Logging to {} with level {}", logger.output(), logger.level());

    log::info!("Starting temperature simulator...");

    let sensor_config = loaded.map_err(|e| {
        log::error!("Error loading configuration: {}", e);
        e
    })?;

    sensor_config.check_sensors()?;

    let (mut run_config, sensors) = sensor_config.into_parts();

    if args.simulate {
        run_config.simulate = true;
    }
    if let Some(seed) = args.seed {
        run_config.seed = Some(seed);
    }

    let output = args
        .output
        .or_else(|| run_config.output_file().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(thermosim::consts::DEFAULT_OUTPUT_FILE));

    let config = config::CliConfig {
        config_path: args.config,
        output,
        stream: args.stream,
        global,
    };

    log::trace!("{:#?}", config);

    log::info!("Loaded configuration: {}", run_config);

    run_config.validate()?;

    if config.stream {
        stream(&config, &run_config, sensors)?;
    } else {
        let readings = thermosim::generate_readings(&sensors, &run_config)?;

        if config.is_stdout() {
            thermosim::sink::write_readings(&readings, std::io::stdout().lock())?.flush()?;
        } else {
            thermosim::sink::save_to_file(&readings, &config.output)?;
        }
    }

    log::info!("Temperature simulation completed successfully.");

    logger.close();

    Ok(())
}

/// Write every tick to the output as soon as it is generated.
fn stream(
    config: &config::CliConfig,
    run_config: &RunConfig,
    sensors: Vec<Arc<Sensor>>,
) -> anyhow::Result<()> {
    let simulator = Simulator::from_config(sensors, run_config)?;

    log::info!("Streaming readings to {}", config.output.display());

    if config.is_stdout() {
        let mut sink = NdjsonSink::new(std::io::stdout().lock());
        drain(simulator, &mut sink)?;
        sink.finish()?;
    } else {
        let mut sink = NdjsonSink::create(&config.output)?;
        drain(simulator, &mut sink)?;
        sink.close()?;
    }

    Ok(())
}

fn drain<W: Write>(
    simulator: Simulator<thermosim::rand::rngs::StdRng, thermosim::simulator::RunClock>,
    sink: &mut NdjsonSink<W>,
) -> thermosim::Result<()> {
    for batch in simulator {
        sink.write_all(&batch)?;
        sink.flush()?;
    }

    log::info!("Wrote {} readings", sink.count());

    Ok(())
}
