//! RadioSHARK USB identifiers and command opcodes.
//!
//! The unit enumerates as a HID device with a single interrupt OUT endpoint
//! (`0x05`). Every command is a 6-byte unnumbered output report whose first
//! byte selects the operation.

#![deny(static_mut_refs)]

/// Griffin Technology USB vendor ID.
pub const VENDOR_ID: u16 = 0x077D;

/// RadioSHARK product ID.
pub const PRODUCT_ID: u16 = 0x627A;

/// Wire size of every control packet.
pub const PACKET_LEN: usize = 6;

/// HID report id prepended by the host for unnumbered reports.
pub const UNNUMBERED_REPORT_ID: u8 = 0x00;

/// Command opcodes carried in byte 0 of a control packet.
pub mod opcodes {
    /// Tune the receiver; bytes 2..=3 hold the big-endian tuning value.
    pub const SET_FREQUENCY: u8 = 0xC0;
    /// Blue LED steady intensity (byte 1 = 0..=127).
    pub const BLUE_INTENSITY: u8 = 0xA0;
    /// Blue LED pulse rate (byte 1 = 0..=127).
    pub const BLUE_PULSE: u8 = 0xA1;
    /// Red LED on.
    pub const RED_ON: u8 = 0xA9;
    /// Red LED off.
    pub const RED_OFF: u8 = 0xA8;
}

/// Byte 1 of a frequency packet when tuning the AM band.
pub const AM_BAND_DISCRIMINATOR: u8 = 0x12;

/// Byte 1 of a frequency packet when tuning the FM band.
pub const FM_BAND_DISCRIMINATOR: u8 = 0x00;

/// Returns `true` when the vendor/product pair is a RadioSHARK.
pub fn is_radioshark(vendor_id: u16, product_id: u16) -> bool {
    vendor_id == VENDOR_ID && product_id == PRODUCT_ID
}
