//! rsharkd: HTTP control daemon for the Griffin RadioSHARK.
//!
//! - [`config`]: the persisted configuration record and its stores
//! - [`validation`]: side-effect free checks of a candidate configuration
//! - [`server`]: [`ServerState`], which applies configurations to the device
//! - [`http`]: the axum control surface
//! - [`settings`] and [`daemon`]: command line and startup sequencing

#![deny(static_mut_refs)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod daemon;
pub mod error;
pub mod http;
pub mod server;
pub mod settings;
pub mod validation;

pub use config::{ConfigStore, Configuration, ConfigurationPatch, JsonFileStore, MemoryStore};
pub use error::{AggregateError, ApplyError, StartupError, ValidationErrors, WriteErrors};
pub use server::{Channel, CommitPolicy, ServerState};
pub use settings::DaemonSettings;
pub use validation::ValidationIssue;
