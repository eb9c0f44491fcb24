//! The owned RadioSHARK device handle.
//!
//! One handle per physical unit, created at startup and closed at shutdown.
//! The handle takes `&mut self` for every operation; callers that share it
//! across threads put it behind a lock.

use radioshark_protocol::CommandPacket;
use tracing::{debug, warn};

use crate::{HidDevice, HidError, HidPort, HidResult, SharkDeviceInfo};

pub struct RadioShark {
    device: Option<Box<dyn HidDevice>>,
    info: SharkDeviceInfo,
}

impl RadioShark {
    /// Wrap an already open HID device.
    pub fn new(device: Box<dyn HidDevice>) -> Self {
        let info = device.get_device_info().clone();
        Self {
            device: Some(device),
            info,
        }
    }

    /// Open the unit named by `path` through `port`.
    pub fn open(port: &dyn HidPort, path: &str) -> HidResult<Self> {
        let device = port.open_device(path)?;
        if !device.get_device_info().is_radioshark() {
            warn!(path, "Opened device does not report the RadioSHARK vendor/product id");
        }
        Ok(Self::new(device))
    }

    pub fn info(&self) -> &SharkDeviceInfo {
        &self.info
    }

    pub fn is_open(&self) -> bool {
        self.device.is_some()
    }

    /// Transmit one control packet.
    ///
    /// # Errors
    ///
    /// [`HidError::Closed`] after [`RadioShark::close`]; any transport error
    /// reported by the device otherwise. Failures are never retried here.
    pub fn send(&mut self, packet: &CommandPacket) -> HidResult<()> {
        let device = self.device.as_mut().ok_or(HidError::Closed)?;
        device.write_report(packet.as_ref())?;
        debug!(path = %self.info.path, ?packet, "Sent control packet");
        Ok(())
    }

    /// Release the channel. Calling it again is a no-op.
    pub fn close(&mut self) {
        if let Some(mut device) = self.device.take() {
            if let Err(e) = device.close() {
                warn!(path = %self.info.path, "Error while closing device: {}", e);
            }
            debug!(path = %self.info.path, "Device handle closed");
        }
    }
}

impl Drop for RadioShark {
    fn drop(&mut self) {
        self.close();
    }
}
