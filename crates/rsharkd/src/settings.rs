//! Process settings, parsed once from the command line.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::error::StartupError;
use crate::server::CommitPolicy;

pub const DEFAULT_ADDRESS: &str = "0.0.0.0:8080";

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "rsharkd")]
#[command(about = "HTTP control daemon for the Griffin RadioSHARK USB radio")]
#[command(version)]
pub struct DaemonSettings {
    /// RadioSHARK to manage (hidraw path as listed by --list)
    #[arg(long, env = "RSHARKD_SHARK", value_name = "ID")]
    pub shark: Option<String>,

    /// Address to listen on
    #[arg(long, default_value = DEFAULT_ADDRESS, value_name = "ADDR")]
    pub address: SocketAddr,

    /// Configuration file [default: /etc/rsharkd.<ID>.conf]
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// When a requested configuration becomes visible to readers
    #[arg(long, value_enum, default_value_t = CommitPolicy::Optimistic)]
    pub commit_policy: CommitPolicy,

    /// Print attached RadioSHARK units and exit
    #[arg(long)]
    pub list: bool,

    /// Verbose logging (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl DaemonSettings {
    /// The device identifier.
    ///
    /// # Errors
    ///
    /// [`StartupError::MissingDevice`] when neither `--shark` nor
    /// `RSHARKD_SHARK` named one.
    pub fn shark(&self) -> Result<&str, StartupError> {
        self.shark
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or(StartupError::MissingDevice)
    }

    /// `--config`, or the per-device default.
    pub fn config_path(&self) -> Result<PathBuf, StartupError> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => Ok(default_config_path(self.shark()?)),
        }
    }

    /// Log filter directive for the `-v` count.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// `/etc/rsharkd.<id>.conf`, with path separators in `id` replaced by `_`.
pub fn default_config_path(shark: &str) -> PathBuf {
    let sanitized = shark
        .trim_start_matches(['/', '\\'])
        .replace(['/', '\\'], "_");
    PathBuf::from(format!("/etc/rsharkd.{sanitized}.conf"))
}
