//! rsharkd - RadioSHARK control daemon

#![deny(static_mut_refs)]
#![deny(clippy::unwrap_used)]

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use radioshark_hid::HidApiPort;
use rsharkd::DaemonSettings;
use rsharkd::daemon;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    let settings = DaemonSettings::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(settings.log_level()).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match execute(settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn execute(settings: DaemonSettings) -> Result<()> {
    let port = HidApiPort::new().context("Failed to initialise the HID library")?;

    if settings.list {
        for line in daemon::describe_units(&port)? {
            println!("{line}");
        }
        return Ok(());
    }

    daemon::run(settings, &port).await?;
    Ok(())
}

fn default_filter(level: &str) -> String {
    format!("rsharkd={level},radioshark_hid={level}")
}
