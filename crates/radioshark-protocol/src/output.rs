//! Control packet encoding.
//!
//! All builders are pure and allocation-free.
//!
//! # Wire layout
//!
//! ```text
//! Byte 0: opcode
//! Byte 1: value / band discriminator
//! Byte 2: tuning value MSB (frequency packets only)
//! Byte 3: tuning value LSB (frequency packets only)
//! Bytes 4-5: always zero
//! ```
//!
//! | Command | Byte 0 | Byte 1 | Bytes 2-3 |
//! |---------|--------|--------|-----------|
//! | FM tune | `0xC0` | `0x00` | tuning value, big-endian |
//! | AM tune | `0xC0` | `0x12` | tuning value, big-endian |
//! | Blue intensity | `0xA0` | 0..=127 | 0 |
//! | Blue pulse rate | `0xA1` | 0..=127 | 0 |
//! | Red on | `0xA9` | `0x01` | 0 |
//! | Red off | `0xA8` | `0x00` | 0 |

use core::fmt;

use crate::Band;
use crate::ids::{AM_BAND_DISCRIMINATOR, FM_BAND_DISCRIMINATOR, PACKET_LEN, opcodes};

/// A fixed 6-byte control packet. Built fresh for every command.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandPacket([u8; PACKET_LEN]);

impl CommandPacket {
    /// Wrap raw bytes. Used by tests and captures; builders are preferred.
    pub const fn from_bytes(bytes: [u8; PACKET_LEN]) -> Self {
        Self(bytes)
    }

    pub const fn opcode(&self) -> u8 {
        self.0[0]
    }

    pub const fn as_bytes(&self) -> &[u8; PACKET_LEN] {
        &self.0
    }

    pub const fn into_bytes(self) -> [u8; PACKET_LEN] {
        self.0
    }
}

impl AsRef<[u8]> for CommandPacket {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for CommandPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommandPacket({:02X?})", self.0)
    }
}

/// Build the tune packet for `tuning` on `band`.
///
/// `tuning` is the output of [`crate::frequency::parse_frequency`].
pub fn build_frequency_packet(tuning: u16, band: Band) -> CommandPacket {
    let [msb, lsb] = tuning.to_be_bytes();
    let discriminator = match band {
        Band::Am => AM_BAND_DISCRIMINATOR,
        Band::Fm => FM_BAND_DISCRIMINATOR,
    };
    CommandPacket([opcodes::SET_FREQUENCY, discriminator, msb, lsb, 0x00, 0x00])
}

/// Build the blue LED intensity packet. The caller guarantees `intensity <= 127`.
pub fn build_blue_intensity_packet(intensity: u8) -> CommandPacket {
    CommandPacket([opcodes::BLUE_INTENSITY, intensity, 0x00, 0x00, 0x00, 0x00])
}

/// Build the blue LED pulse rate packet. The caller guarantees `rate <= 127`.
pub fn build_blue_pulse_packet(rate: u8) -> CommandPacket {
    CommandPacket([opcodes::BLUE_PULSE, rate, 0x00, 0x00, 0x00, 0x00])
}

/// Build the red LED packet.
pub fn build_red_led_packet(on: bool) -> CommandPacket {
    if on {
        CommandPacket([opcodes::RED_ON, 0x01, 0x00, 0x00, 0x00, 0x00])
    } else {
        CommandPacket([opcodes::RED_OFF, 0x00, 0x00, 0x00, 0x00, 0x00])
    }
}
