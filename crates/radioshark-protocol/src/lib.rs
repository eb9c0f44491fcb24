//! Griffin RadioSHARK USB HID protocol: frequency encoding and control packets.
//!
//! This crate is intentionally I/O-free. It provides pure functions and value
//! types that can be tested without hardware:
//!
//! - [`ids`]: USB vendor/product ids, endpoint and opcode constants
//! - [`types`]: the [`Band`] (AM/FM) classification
//! - [`frequency`]: conversion from human-entered frequency strings to the
//!   16-bit hardware tuning value, with range checks
//! - [`output`]: the fixed 6-byte [`CommandPacket`] builders
//!
//! Packet builders do no validation; callers validate first.

#![deny(static_mut_refs)]
#![deny(clippy::unwrap_used)]

pub mod frequency;
pub mod ids;
pub mod output;
pub mod types;

pub use frequency::{parse_am, parse_fm, parse_frequency};
pub use ids::{PACKET_LEN, PRODUCT_ID, VENDOR_ID};
pub use output::{
    CommandPacket, build_blue_intensity_packet, build_blue_pulse_packet, build_frequency_packet,
    build_red_led_packet,
};
pub use types::{Band, UnknownBand};

use thiserror::Error;

/// Errors returned while decoding a human-entered frequency.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrequencyError {
    /// The text is not a number of the kind the band expects.
    #[error("invalid {band} frequency '{input}': {reason}")]
    Format {
        band: Band,
        input: String,
        reason: String,
    },

    /// The number parsed but lies outside the band.
    #[error("{band} frequency must be between {min} and {max}, got {value}")]
    Range {
        band: Band,
        value: String,
        min: String,
        max: String,
    },
}

impl FrequencyError {
    /// The band the failing input was decoded for.
    pub fn band(&self) -> Band {
        match self {
            FrequencyError::Format { band, .. } | FrequencyError::Range { band, .. } => *band,
        }
    }
}

/// Convenience result alias for frequency decoding.
pub type FrequencyResult<T> = Result<T, FrequencyError>;
