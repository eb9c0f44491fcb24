//! Configuration validation.
//!
//! Four independent checks run on every candidate: modulation, frequency
//! (dispatched by modulation), blue LED intensity and blue LED pulse rate.
//! All failures are reported together, in that order. Validation never
//! touches hardware or state.

use radioshark_protocol::{Band, FrequencyError, UnknownBand, parse_frequency};
use thiserror::Error;

use crate::config::Configuration;
use crate::error::{AggregateError, ValidationErrors};

/// Highest value the blue LED intensity and pulse rate registers accept.
pub const LED_VALUE_MAX: u8 = 127;

/// One failed check.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    #[error(transparent)]
    UnknownModulation(#[from] UnknownBand),

    #[error(transparent)]
    Frequency(#[from] FrequencyError),

    #[error("blue LED intensity must be at most {LED_VALUE_MAX}, got {0}")]
    BlueLedIntensity(u8),

    #[error("blue LED pulse rate must be at most {LED_VALUE_MAX}, got {0}")]
    BlueLedPulseRate(u8),
}

impl ValidationIssue {
    /// Persisted-record key of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationIssue::UnknownModulation(_) => "modulation",
            ValidationIssue::Frequency(_) => "frequency",
            ValidationIssue::BlueLedIntensity(_) => "blue-led-intensity",
            ValidationIssue::BlueLedPulseRate(_) => "blue-led-pulse-rate",
        }
    }
}

/// Hardware-level values of a configuration that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceSettings {
    pub band: Band,
    pub tuning: u16,
    pub blue_led_intensity: u8,
    pub blue_led_pulse_rate: u8,
    pub red_led: bool,
}

/// Validate `config` and resolve it to device values.
///
/// # Errors
///
/// Every failing check, in check order.
pub fn check(config: &Configuration) -> Result<DeviceSettings, ValidationErrors> {
    let mut issues = AggregateError::new();

    let band = Band::parse(&config.modulation);
    // Frequency has no meaning without a band.
    let tuning = match &band {
        Ok(band) => parse_frequency(*band, &config.frequency).map(Some),
        Err(_) => Ok(None),
    };

    if config.blue_led_intensity > LED_VALUE_MAX {
        issues.push(ValidationIssue::BlueLedIntensity(config.blue_led_intensity));
    }
    if config.blue_led_pulse_rate > LED_VALUE_MAX {
        issues.push(ValidationIssue::BlueLedPulseRate(config.blue_led_pulse_rate));
    }

    match (band, tuning) {
        (Ok(band), Ok(Some(tuning))) if issues.is_empty() => Ok(DeviceSettings {
            band,
            tuning,
            blue_led_intensity: config.blue_led_intensity,
            blue_led_pulse_rate: config.blue_led_pulse_rate,
            red_led: config.red_led,
        }),
        (band, tuning) => {
            let mut ordered = AggregateError::new();
            ordered.record(band.map_err(ValidationIssue::from));
            ordered.record(tuning.map_err(ValidationIssue::from));
            for issue in issues {
                ordered.push(issue);
            }
            Err(ordered)
        }
    }
}

/// Validate `config` without resolving it.
pub fn validate(config: &Configuration) -> Result<(), ValidationErrors> {
    check(config).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(modulation: &str, frequency: &str, intensity: u8, pulse: u8) -> Configuration {
        Configuration {
            modulation: modulation.to_string(),
            frequency: frequency.to_string(),
            blue_led_intensity: intensity,
            blue_led_pulse_rate: pulse,
            red_led: false,
        }
    }

    #[test]
    fn test_default_is_valid() {
        assert_eq!(validate(&Configuration::default()), Ok(()));
    }

    #[test]
    fn test_check_resolves_device_settings() -> Result<(), ValidationErrors> {
        let settings = check(&config("am", "600", 10, 20))?;
        assert_eq!(
            settings,
            DeviceSettings {
                band: Band::Am,
                tuning: 1050,
                blue_led_intensity: 10,
                blue_led_pulse_rate: 20,
                red_led: false,
            }
        );
        Ok(())
    }

    #[test]
    fn test_led_bounds() {
        assert_eq!(validate(&config("FM", "99.9", 127, 127)), Ok(()));

        let err = validate(&config("FM", "99.9", 128, 0)).err();
        assert_eq!(
            err.map(|e| e.errors().to_vec()),
            Some(vec![ValidationIssue::BlueLedIntensity(128)])
        );

        let err = validate(&config("FM", "99.9", 0, 255)).err();
        assert_eq!(
            err.map(|e| e.errors().to_vec()),
            Some(vec![ValidationIssue::BlueLedPulseRate(255)])
        );
    }

    #[test]
    fn test_reports_every_defect() -> Result<(), String> {
        let Err(errors) = validate(&config("XM", "88.0", 200, 0)) else {
            return Err("two defects must fail validation".to_string());
        };

        assert_eq!(errors.len(), 2);
        let message = errors.to_string();
        assert!(message.contains("unknown modulation 'XM'"), "{message}");
        assert!(message.contains("blue LED intensity"), "{message}");
        let fields: Vec<_> = errors.iter().map(ValidationIssue::field).collect();
        assert_eq!(fields, vec!["modulation", "blue-led-intensity"]);
        Ok(())
    }

    #[test]
    fn test_checks_fail_in_order() -> Result<(), String> {
        let Err(errors) = validate(&config("AM", "2000", 128, 129)) else {
            return Err("three defects must fail validation".to_string());
        };
        let fields: Vec<_> = errors.iter().map(ValidationIssue::field).collect();
        assert_eq!(
            fields,
            vec!["frequency", "blue-led-intensity", "blue-led-pulse-rate"]
        );
        Ok(())
    }

    #[test]
    fn test_frequency_checked_against_band() {
        assert_eq!(validate(&config("fm", "101.1", 0, 0)), Ok(()));
        assert!(matches!(
            validate(&config("am", "101.1", 0, 0)).err().as_ref().map(|e| e.errors()),
            Some([ValidationIssue::Frequency(FrequencyError::Format { .. })])
        ));
        assert!(matches!(
            validate(&config("fm", "1010", 0, 0)).err().as_ref().map(|e| e.errors()),
            Some([ValidationIssue::Frequency(FrequencyError::Range { .. })])
        ));
    }
}
