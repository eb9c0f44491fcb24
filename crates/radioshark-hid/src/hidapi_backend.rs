//! `hidapi` backed port and device.
//!
//! The RadioSHARK uses unnumbered output reports, so every write is prefixed
//! with report id `0x00` before it reaches `hid_write`.

use std::ffi::CString;

use hidapi::HidApi;
use radioshark_protocol::ids::{self, UNNUMBERED_REPORT_ID};
use tracing::{debug, trace};

use crate::{HidDevice, HidError, HidPort, HidResult, SharkDeviceInfo};

/// Port over the system HID library.
pub struct HidApiPort {
    api: HidApi,
}

impl HidApiPort {
    /// Initialise the HID library and take a snapshot of attached devices.
    pub fn new() -> HidResult<Self> {
        let api = HidApi::new().map_err(|e| HidError::Backend(e.to_string()))?;
        Ok(Self { api })
    }
}

impl HidPort for HidApiPort {
    fn list_devices(&self) -> HidResult<Vec<SharkDeviceInfo>> {
        let devices = self
            .api
            .device_list()
            .filter(|dev| ids::is_radioshark(dev.vendor_id(), dev.product_id()))
            .map(|dev| {
                let mut info = SharkDeviceInfo::new(
                    dev.vendor_id(),
                    dev.product_id(),
                    dev.path().to_string_lossy().into_owned(),
                );
                info.serial_number = dev.serial_number().map(str::to_string);
                info.product_name = dev.product_string().map(str::to_string);
                info
            })
            .collect::<Vec<_>>();
        debug!(count = devices.len(), "Enumerated RadioSHARK units");
        Ok(devices)
    }

    fn open_device(&self, path: &str) -> HidResult<Box<dyn HidDevice>> {
        let c_path = CString::new(path)
            .map_err(|e| HidError::OpenError(format!("invalid device path {path:?}: {e}")))?;
        let device = self
            .api
            .open_path(&c_path)
            .map_err(|e| HidError::OpenError(format!("{path}: {e}")))?;

        let mut info = SharkDeviceInfo::radioshark(path);
        if let Ok(Some(serial)) = device.get_serial_number_string() {
            info = info.with_serial(serial);
        }
        if let Ok(Some(product)) = device.get_product_string() {
            info = info.with_product_name(product);
        }

        debug!(path, product = %info.display_name(), "Opened HID device");
        Ok(Box::new(HidApiDevice {
            device: Some(device),
            info,
        }))
    }
}

/// An open unit. Dropping it closes the underlying handle.
pub struct HidApiDevice {
    device: Option<hidapi::HidDevice>,
    info: SharkDeviceInfo,
}

impl HidDevice for HidApiDevice {
    fn write_report(&mut self, data: &[u8]) -> HidResult<usize> {
        let device = self.device.as_ref().ok_or(HidError::Closed)?;

        let mut report = Vec::with_capacity(data.len() + 1);
        report.push(UNNUMBERED_REPORT_ID);
        report.extend_from_slice(data);

        let written = device
            .write(&report)
            .map_err(|e| HidError::WriteError(e.to_string()))?;
        trace!(path = %self.info.path, written, "hid_write");

        // Backends differ on whether the report id byte is counted.
        if written < data.len() {
            return Err(HidError::ShortWrite {
                expected: data.len(),
                actual: written,
            });
        }
        Ok(data.len())
    }

    fn get_device_info(&self) -> &SharkDeviceInfo {
        &self.info
    }

    fn is_connected(&self) -> bool {
        self.device.is_some()
    }

    fn close(&mut self) -> HidResult<()> {
        if self.device.take().is_some() {
            debug!(path = %self.info.path, "Closed HID device");
        }
        Ok(())
    }
}
