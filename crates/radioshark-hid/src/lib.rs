//! USB HID transport for the Griffin RadioSHARK.
//!
//! The crate splits hardware access into two seams:
//!
//! - [`HidPort`] enumerates attached units and opens one by path
//! - [`HidDevice`] writes raw output reports to an open unit
//!
//! [`HidApiPort`] implements both on top of `hidapi`; [`mock`] provides an
//! in-memory implementation with write history and fault injection.
//! [`RadioShark`] is the owned device handle the daemon talks to.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod device;
pub mod device_info;
pub mod hid_traits;
pub mod hidapi_backend;

pub use device::RadioShark;
pub use device_info::SharkDeviceInfo;
pub use hid_traits::{HidDevice, HidPort, mock};
pub use hidapi_backend::{HidApiDevice, HidApiPort};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HidError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Failed to open device: {0}")]
    OpenError(String),

    #[error("Failed to write to device: {0}")]
    WriteError(String),

    #[error("Short write: expected {expected} bytes, device accepted {actual}")]
    ShortWrite { expected: usize, actual: usize },

    #[error("Device disconnected")]
    Disconnected,

    #[error("Device handle is closed")]
    Closed,

    #[error("HID backend error: {0}")]
    Backend(String),
}

pub type HidResult<T> = Result<T, HidError>;
