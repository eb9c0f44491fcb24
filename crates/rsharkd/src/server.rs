//! Server state: the applied configuration and the device that realises it.
//!
//! # Locking
//!
//! All configuration state lives behind one `RwLock`. [`ServerState::apply`]
//! holds the write lock for the whole validate, write, persist sequence, so
//! applies never interleave their device writes and readers never see a
//! half-applied configuration. [`ServerState::get`] and
//! [`ServerState::validate`] share the read lock and therefore wait for an
//! in-flight apply, including its device I/O. The device sits in its own
//! mutex, always taken after the state lock.
//!
//! # Commit policy
//!
//! The visible configuration ([`ServerState::get`]) and the last configuration
//! whose writes all succeeded ([`ServerState::last_applied`]) can differ after
//! a partial device failure. [`CommitPolicy`] decides which one `get` follows.

use core::fmt;

use parking_lot::{Mutex, RwLock};
use radioshark_hid::{RadioShark, SharkDeviceInfo};
use radioshark_protocol::{
    Band, CommandPacket, build_blue_intensity_packet, build_blue_pulse_packet, build_frequency_packet,
    build_red_led_packet,
};
use tracing::{debug, error, info};

use crate::config::{ConfigStore, Configuration, ConfigurationPatch};
use crate::error::{ApplyError, ChannelWriteError, ValidationErrors, WriteErrors};
use crate::validation::{self, DeviceSettings};

/// When a candidate becomes the visible configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CommitPolicy {
    /// Visible as soon as it validates, before any device write. A failed
    /// write leaves the request visible as the new intent.
    #[default]
    Optimistic,
    /// Visible only once every device write succeeded.
    Confirmed,
}

/// Independent hardware channels, in write order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Frequency,
    BlueIntensity,
    BluePulse,
    RedLed,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Frequency => "frequency",
            Channel::BlueIntensity => "blue LED intensity",
            Channel::BluePulse => "blue LED pulse rate",
            Channel::RedLed => "red LED",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
struct AppliedState {
    current: Configuration,
    last_applied: Option<Configuration>,
    /// Band and tuning of the last frequency packet the device accepted.
    tuned: Option<(Band, u16)>,
}

pub struct ServerState {
    state: RwLock<AppliedState>,
    device: Mutex<RadioShark>,
    store: Box<dyn ConfigStore>,
    policy: CommitPolicy,
}

impl ServerState {
    /// Take ownership of `device` and push `initial` to it.
    ///
    /// Every channel is written, frequency included, and the configuration is
    /// persisted on success.
    ///
    /// # Errors
    ///
    /// Any [`ApplyError`] of the initial push; the device is closed on failure.
    pub fn start(
        initial: Configuration,
        device: RadioShark,
        store: Box<dyn ConfigStore>,
        policy: CommitPolicy,
    ) -> Result<Self, ApplyError> {
        let server = Self {
            state: RwLock::new(AppliedState {
                current: initial.clone(),
                last_applied: None,
                tuned: None,
            }),
            device: Mutex::new(device),
            store,
            policy,
        };

        {
            let mut state = server.state.write();
            let mut device = server.device.lock();
            if let Err(e) = server.apply_locked(&mut state, &mut device, initial, true) {
                device.close();
                return Err(e);
            }
        }

        info!(
            path = %server.device.lock().info().path,
            store = %server.store.location(),
            ?policy,
            "RadioSHARK initialised"
        );
        Ok(server)
    }

    pub fn policy(&self) -> CommitPolicy {
        self.policy
    }

    pub fn device_info(&self) -> SharkDeviceInfo {
        self.device.lock().info().clone()
    }

    /// An independent copy of the visible configuration.
    pub fn get(&self) -> Configuration {
        self.state.read().current.clone()
    }

    /// The last configuration whose device writes all succeeded.
    pub fn last_applied(&self) -> Option<Configuration> {
        self.state.read().last_applied.clone()
    }

    /// Validate `candidate` without side effects.
    ///
    /// Shares the read side of the state lock, so it waits for an apply in
    /// progress.
    pub fn validate(&self, candidate: &Configuration) -> Result<(), ValidationErrors> {
        let _state = self.state.read();
        validation::validate(candidate)
    }

    /// Validate, write and persist `candidate`.
    ///
    /// # Errors
    ///
    /// - [`ApplyError::Invalid`]: nothing was changed, written or stored
    /// - [`ApplyError::Device`]: every channel was attempted; the listed ones
    ///   failed and nothing was stored
    /// - [`ApplyError::Persistence`]: the device is configured but the record
    ///   could not be stored
    pub fn apply(&self, candidate: Configuration) -> Result<(), ApplyError> {
        let mut state = self.state.write();
        let mut device = self.device.lock();
        self.apply_locked(&mut state, &mut device, candidate, false)
    }

    /// Overlay `patch` on the visible configuration and apply the result.
    ///
    /// The read of the base and the apply happen under one write lock.
    pub fn apply_patch(&self, patch: &ConfigurationPatch) -> Result<Configuration, ApplyError> {
        let mut state = self.state.write();
        let mut device = self.device.lock();
        let candidate = patch.overlay(&state.current);
        self.apply_locked(&mut state, &mut device, candidate.clone(), false)?;
        Ok(candidate)
    }

    /// Close the device. Later applies fail with a closed-handle write error.
    pub fn shutdown(&self) {
        let _state = self.state.write();
        self.device.lock().close();
        info!("RadioSHARK closed");
    }

    fn apply_locked(
        &self,
        state: &mut AppliedState,
        device: &mut RadioShark,
        candidate: Configuration,
        force_frequency: bool,
    ) -> Result<(), ApplyError> {
        let settings = validation::check(&candidate).map_err(|errors| {
            debug!(%errors, "Rejected configuration");
            ApplyError::Invalid(errors)
        })?;

        let previous = state.current.clone();
        if self.policy == CommitPolicy::Optimistic {
            state.current = candidate.clone();
        }

        // A failed confirmed apply can leave the radio tuned to a frequency
        // that `current` does not show.
        let target = (settings.band, settings.tuning);
        let retune = force_frequency
            || retunes(&previous, &candidate)
            || (self.policy == CommitPolicy::Confirmed && state.tuned != Some(target));
        let errors = write_channels(device, &settings, retune);
        if retune && !errors.iter().any(|e| e.channel == Channel::Frequency) {
            state.tuned = Some(target);
        }
        if !errors.is_empty() {
            error!(%errors, failed = errors.len(), "Device writes failed");
            return Err(ApplyError::Device(errors));
        }

        state.current = candidate.clone();
        state.last_applied = Some(candidate.clone());
        self.store.save(&candidate)?;

        info!(
            modulation = %candidate.modulation,
            frequency = %candidate.frequency,
            blue_led_intensity = candidate.blue_led_intensity,
            blue_led_pulse_rate = candidate.blue_led_pulse_rate,
            red_led = candidate.red_led,
            "Configuration applied"
        );
        Ok(())
    }
}

impl Drop for ServerState {
    fn drop(&mut self) {
        self.device.get_mut().close();
    }
}

fn retunes(previous: &Configuration, candidate: &Configuration) -> bool {
    previous.modulation != candidate.modulation || previous.frequency != candidate.frequency
}

/// Write every channel once, collecting failures instead of stopping.
///
/// LED channels are always re-sent: the unit cannot report its LED state,
/// and repeating a packet is harmless.
fn write_channels(
    device: &mut RadioShark,
    settings: &DeviceSettings,
    retune: bool,
) -> WriteErrors {
    let mut packets: Vec<(Channel, CommandPacket)> = Vec::with_capacity(4);
    if retune {
        packets.push((
            Channel::Frequency,
            build_frequency_packet(settings.tuning, settings.band),
        ));
    }
    packets.push((
        Channel::BlueIntensity,
        build_blue_intensity_packet(settings.blue_led_intensity),
    ));
    packets.push((
        Channel::BluePulse,
        build_blue_pulse_packet(settings.blue_led_pulse_rate),
    ));
    packets.push((Channel::RedLed, build_red_led_packet(settings.red_led)));

    let mut errors = WriteErrors::new();
    for (channel, packet) in packets {
        errors.record(
            device
                .send(&packet)
                .map_err(|source| ChannelWriteError { channel, source }),
        );
    }
    errors
}
