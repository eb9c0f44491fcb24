//! HID device traits

use crate::{HidResult, SharkDeviceInfo};

/// An open HID unit that accepts raw output reports.
pub trait HidDevice: Send {
    /// Write one output report, returning the number of payload bytes accepted.
    fn write_report(&mut self, data: &[u8]) -> HidResult<usize>;

    fn get_device_info(&self) -> &SharkDeviceInfo;

    fn is_connected(&self) -> bool;

    fn close(&mut self) -> HidResult<()>;
}

/// Enumerates and opens units.
pub trait HidPort {
    fn list_devices(&self) -> HidResult<Vec<SharkDeviceInfo>>;

    fn open_device(&self, path: &str) -> HidResult<Box<dyn HidDevice>>;
}

pub mod mock {
    use super::*;
    use crate::HidError;
    use parking_lot::Mutex;
    use std::collections::HashSet;
    use std::sync::Arc;

    /// In-memory unit. Clones share write history, fault plan and connection
    /// state, so a test can keep one clone while the daemon owns another.
    #[derive(Clone)]
    pub struct MockHidDevice {
        info: SharkDeviceInfo,
        write_history: Arc<Mutex<Vec<Vec<u8>>>>,
        failing_opcodes: Arc<Mutex<HashSet<u8>>>,
        connected: Arc<Mutex<bool>>,
    }

    impl MockHidDevice {
        pub fn new(path: impl Into<String>) -> Self {
            Self::with_info(SharkDeviceInfo::radioshark(path))
        }

        pub fn with_info(info: SharkDeviceInfo) -> Self {
            Self {
                info,
                write_history: Arc::new(Mutex::new(Vec::new())),
                failing_opcodes: Arc::new(Mutex::new(HashSet::new())),
                connected: Arc::new(Mutex::new(true)),
            }
        }

        pub fn get_write_history(&self) -> Vec<Vec<u8>> {
            self.write_history.lock().clone()
        }

        /// Opcodes (byte 0) of every accepted write, in order.
        pub fn written_opcodes(&self) -> Vec<u8> {
            self.write_history
                .lock()
                .iter()
                .filter_map(|report| report.first().copied())
                .collect()
        }

        pub fn clear_history(&self) {
            self.write_history.lock().clear();
        }

        /// Make every later write whose byte 0 is `opcode` fail.
        pub fn fail_opcode(&self, opcode: u8) {
            self.failing_opcodes.lock().insert(opcode);
        }

        pub fn clear_failures(&self) {
            self.failing_opcodes.lock().clear();
        }

        pub fn disconnect(&self) {
            *self.connected.lock() = false;
        }

        pub fn reconnect(&self) {
            *self.connected.lock() = true;
        }
    }

    impl HidDevice for MockHidDevice {
        fn write_report(&mut self, data: &[u8]) -> HidResult<usize> {
            if !*self.connected.lock() {
                return Err(HidError::Disconnected);
            }

            if let Some(opcode) = data.first()
                && self.failing_opcodes.lock().contains(opcode)
            {
                return Err(HidError::WriteError(format!(
                    "injected failure for opcode {opcode:#04x}"
                )));
            }

            self.write_history.lock().push(data.to_vec());
            Ok(data.len())
        }

        fn get_device_info(&self) -> &SharkDeviceInfo {
            &self.info
        }

        fn is_connected(&self) -> bool {
            *self.connected.lock()
        }

        fn close(&mut self) -> HidResult<()> {
            self.disconnect();
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct MockHidPort {
        devices: Vec<MockHidDevice>,
    }

    impl MockHidPort {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn add_device(&mut self, device: MockHidDevice) {
            self.devices.push(device);
        }

        pub fn device_count(&self) -> usize {
            self.devices.len()
        }
    }

    impl HidPort for MockHidPort {
        fn list_devices(&self) -> HidResult<Vec<SharkDeviceInfo>> {
            Ok(self
                .devices
                .iter()
                .map(|d| d.get_device_info().clone())
                .collect())
        }

        fn open_device(&self, path: &str) -> HidResult<Box<dyn HidDevice>> {
            self.devices
                .iter()
                .find(|device| device.info.path == path)
                .map(|device| Box::new(device.clone()) as Box<dyn HidDevice>)
                .ok_or_else(|| HidError::DeviceNotFound(path.to_string()))
        }
    }
}
