//! Frequency codec: human-entered frequency strings to hardware tuning values.
//!
//! # Encoding
//!
//! | Band | Input | Accepted range | Tuning value |
//! |------|-------|----------------|--------------|
//! | FM | decimal MHz (`"101.1"`) | 88.0 to 108.0 | `round((mhz * 1000 + 10701) / 12.5) + 3` |
//! | AM | integer kHz (`"1010"`) | 535 to 1705 | `khz + 450` |
//!
//! The FM formula is the receiver's PLL divisor: the tuned frequency in kHz
//! plus the 10.7 MHz intermediate frequency, in 12.5 kHz steps, offset by 3.
//! The AM value is the kHz figure plus the 450 kHz intermediate frequency.

use core::num::{IntErrorKind, ParseIntError};

use crate::{Band, FrequencyError, FrequencyResult};

/// Lowest tunable FM frequency in MHz.
pub const FM_MIN_MHZ: f64 = 88.0;
/// Highest tunable FM frequency in MHz.
pub const FM_MAX_MHZ: f64 = 108.0;
/// Lowest tunable AM frequency in kHz.
pub const AM_MIN_KHZ: i64 = 535;
/// Highest tunable AM frequency in kHz.
pub const AM_MAX_KHZ: i64 = 1705;

const FM_IF_OFFSET_KHZ: f64 = 10_701.0;
const FM_STEP_KHZ: f64 = 12.5;
const FM_DIVISOR_OFFSET: f64 = 3.0;
const AM_IF_OFFSET_KHZ: i64 = 450;

/// Parse an FM frequency in MHz and encode it as a tuning value.
///
/// # Errors
///
/// [`FrequencyError::Format`] when `text` is not a decimal number,
/// [`FrequencyError::Range`] when it lies outside 88.0 to 108.0 MHz. Values too
/// large for `f64` are out of range.
pub fn parse_fm(text: &str) -> FrequencyResult<u16> {
    let mhz: f64 = text.parse().map_err(|e: core::num::ParseFloatError| {
        FrequencyError::Format {
            band: Band::Fm,
            input: text.to_string(),
            reason: e.to_string(),
        }
    })?;

    if mhz.is_nan() {
        return Err(FrequencyError::Format {
            band: Band::Fm,
            input: text.to_string(),
            reason: "not a number".to_string(),
        });
    }

    if !(FM_MIN_MHZ..=FM_MAX_MHZ).contains(&mhz) {
        return Err(FrequencyError::Range {
            band: Band::Fm,
            value: text.to_string(),
            min: format!("{FM_MIN_MHZ:.1}"),
            max: format!("{FM_MAX_MHZ:.1}"),
        });
    }

    let divisor = ((mhz * 1000.0 + FM_IF_OFFSET_KHZ) / FM_STEP_KHZ).round() + FM_DIVISOR_OFFSET;
    Ok(divisor as u16)
}

/// Parse an AM frequency in kHz and encode it as a tuning value.
///
/// # Errors
///
/// [`FrequencyError::Format`] when `text` is not a base-10 integer,
/// [`FrequencyError::Range`] when it lies outside 535 to 1705 kHz. Integers
/// too large for `i64` are out of range.
pub fn parse_am(text: &str) -> FrequencyResult<u16> {
    let khz: i64 = text.parse().map_err(|e: ParseIntError| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => am_out_of_range(text),
        _ => FrequencyError::Format {
            band: Band::Am,
            input: text.to_string(),
            reason: e.to_string(),
        },
    })?;

    if !(AM_MIN_KHZ..=AM_MAX_KHZ).contains(&khz) {
        return Err(am_out_of_range(&khz.to_string()));
    }

    Ok((khz + AM_IF_OFFSET_KHZ) as u16)
}

fn am_out_of_range(value: &str) -> FrequencyError {
    FrequencyError::Range {
        band: Band::Am,
        value: value.to_string(),
        min: AM_MIN_KHZ.to_string(),
        max: AM_MAX_KHZ.to_string(),
    }
}

/// Dispatch to [`parse_am`] or [`parse_fm`].
pub fn parse_frequency(band: Band, text: &str) -> FrequencyResult<u16> {
    match band {
        Band::Am => parse_am(text),
        Band::Fm => parse_fm(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fm_band_edges() -> FrequencyResult<()> {
        assert_eq!(parse_fm("88.0")?, 7899);
        assert_eq!(parse_fm("108.0")?, 9499);
        assert_eq!(parse_fm("88")?, 7899);
        Ok(())
    }

    #[test]
    fn test_fm_tenth_step_is_eight_units() -> FrequencyResult<()> {
        assert_eq!(parse_fm("101.1")? - parse_fm("101.0")?, 8);
        Ok(())
    }

    #[test]
    fn test_fm_out_of_range() {
        assert!(matches!(parse_fm("87.9"), Err(FrequencyError::Range { .. })));
        assert!(matches!(parse_fm("108.1"), Err(FrequencyError::Range { .. })));
        assert!(matches!(parse_fm("-100"), Err(FrequencyError::Range { .. })));
    }

    #[test]
    fn test_fm_rejects_non_numeric() {
        for input in ["", "abc", "101,1", "101.1MHz", "NaN"] {
            assert!(
                matches!(parse_fm(input), Err(FrequencyError::Format { .. })),
                "expected format error for {input:?}"
            );
        }
    }

    #[test]
    fn test_fm_overflow_is_out_of_range() {
        for input in ["inf", "-inf", "1e400", "-1e400"] {
            assert!(
                matches!(
                    parse_fm(input),
                    Err(FrequencyError::Range { band: Band::Fm, ref value, .. }) if value == input
                ),
                "expected range error for {input:?}"
            );
        }
    }

    #[test]
    fn test_am_adds_intermediate_frequency() -> FrequencyResult<()> {
        assert_eq!(parse_am("600")?, 1050);
        assert_eq!(parse_am("535")?, 985);
        assert_eq!(parse_am("1705")?, 2155);
        Ok(())
    }

    #[test]
    fn test_am_out_of_range() {
        assert!(matches!(parse_am("534"), Err(FrequencyError::Range { .. })));
        assert!(matches!(parse_am("1706"), Err(FrequencyError::Range { .. })));
    }

    #[test]
    fn test_am_overflow_is_out_of_range() {
        for input in ["99999999999999999999", "-99999999999999999999"] {
            assert_eq!(
                parse_am(input).map_err(|e| e.to_string()),
                Err(format!("AM frequency must be between 535 and 1705, got {input}"))
            );
        }
    }

    #[test]
    fn test_am_rejects_decimals() {
        assert!(matches!(parse_am("600.0"), Err(FrequencyError::Format { .. })));
        assert!(matches!(parse_am("six"), Err(FrequencyError::Format { .. })));
    }

    #[test]
    fn test_dispatch_by_band() -> FrequencyResult<()> {
        assert_eq!(parse_frequency(Band::Am, "1000")?, 1450);
        assert_eq!(parse_frequency(Band::Fm, "88.0")?, 7899);
        assert_eq!(
            parse_frequency(Band::Am, "88.0").map_err(|e| e.band()),
            Err(Band::Am)
        );
        Ok(())
    }
}
