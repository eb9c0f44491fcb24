//! Startup and shutdown sequencing.

use std::sync::Arc;

use radioshark_hid::{HidPort, RadioShark};
use tracing::{info, warn};

use crate::config::{JsonFileStore, load_or_default};
use crate::error::StartupError;
use crate::http;
use crate::server::ServerState;
use crate::settings::DaemonSettings;

/// Load the stored configuration, open the unit and push the configuration
/// to it.
///
/// # Errors
///
/// Every [`StartupError`] except the HTTP ones.
pub fn start_server(
    settings: &DaemonSettings,
    port: &dyn HidPort,
) -> Result<ServerState, StartupError> {
    let shark = settings.shark()?;
    let store = JsonFileStore::new(settings.config_path()?);
    let initial = load_or_default(&store)?;

    info!(shark, config = %store.path().display(), "Opening RadioSHARK");
    let device = RadioShark::open(port, shark)?;

    Ok(ServerState::start(
        initial,
        device,
        Box::new(store),
        settings.commit_policy,
    )?)
}

/// Run the daemon until Ctrl-C, then close the device.
pub async fn run(settings: DaemonSettings, port: &dyn HidPort) -> Result<(), StartupError> {
    let server = Arc::new(start_server(&settings, port)?);
    let served = http::serve(Arc::clone(&server), settings.address).await;

    server.shutdown();
    served
}

/// Attached units as printable lines.
pub fn describe_units(port: &dyn HidPort) -> Result<Vec<String>, StartupError> {
    let units = port.list_devices()?;
    if units.is_empty() {
        warn!("No RadioSHARK attached");
    }
    Ok(units
        .iter()
        .map(|unit| {
            format!(
                "{}\t{}\t{}",
                unit.path,
                unit.serial_number.as_deref().unwrap_or("-"),
                unit.display_name()
            )
        })
        .collect())
}
