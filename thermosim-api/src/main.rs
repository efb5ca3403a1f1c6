// Copyright (C) 2024 Laixer Equipment B.V.
// All rights reserved.
//
// This software may be modified and distributed under the terms
// of the included license.  See the LICENSE file for details.

use std::net::SocketAddr;

use clap::Parser;
use hyper::service::{make_service_fn, service_fn};
use hyper::Server;
use thermosim::logger::{LogConfig, Logger};

mod config;
mod service;

#[derive(Parser)]
#[command(author = "Copyright (C) 2024 Laixer Equipment B.V.")]
#[command(version, propagate_version = true)]
#[command(about = "Sensor temperature simulator HTTP daemon", long_about = None)]
struct Args {
    /// Network address to listen on.
    #[arg(long, default_value = thermosim::consts::DEFAULT_LISTEN_ADDRESS, value_name = "ADDR")]
    listen: SocketAddr,
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", value_name = "LEVEL")]
    log_level: String,
    /// Log output ('stdout' or file path).
    #[arg(long, default_value = "stdout", value_name = "OUTPUT")]
    log_output: String,
    /// Daemonize the service.
    #[arg(short = 'D', long)]
    daemon: bool,
    /// Level of verbosity.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let bin_name = env!("CARGO_BIN_NAME");

    let mut config = config::ApiConfig {
        listen: args.listen,
        global: thermosim::GlobalConfig::default(),
    };

    config.global.bin_name = bin_name.to_string();
    config.global.log = LogConfig {
        level: LogConfig::parse_level(&args.log_level)?,
        output: args.log_output.parse()?,
        daemon: args.daemon,
    }
    .with_verbosity(args.verbose);

    let logger = Logger::from_config(&config)?;

    log::debug!("Logging to {} with level {}", logger.output(), logger.level());

    if config.global.log.daemon {
        log::debug!("Running service as daemon");
    }

    log::trace!("{:#?}", config);

    daemonize(&config).await?;

    logger.close();

    Ok(())
}

async fn daemonize(config: &config::ApiConfig) -> anyhow::Result<()> {
    log::info!("Starting {}", config.global.bin_name);
    log::debug!("Runtime version: {}", thermosim::consts::VERSION);

    let make_svc = make_service_fn(|_| async {
        Ok::<_, hyper::Error>(service_fn(service::service))
    });

    let server = Server::try_bind(&config.listen)?.serve(make_svc);

    log::info!("Listening http://{}", config.listen);

    server
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            log::info!("Shutting down");
        })
        .await?;

    Ok(())
}
