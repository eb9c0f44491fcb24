//! Band classification.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Modulation family. Selects the frequency formula and the packet
/// discriminator byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Band {
    /// Amplitude modulation, integer kHz.
    #[serde(rename = "AM")]
    Am,
    /// Frequency modulation, MHz with one decimal.
    #[serde(rename = "FM")]
    Fm,
}

/// A modulation string that names neither band.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown modulation '{0}'")]
pub struct UnknownBand(pub String);

impl Band {
    /// Case-insensitive lookup: `"fm"`, `"FM"` and `"Fm"` all name [`Band::Fm`].
    pub fn parse(text: &str) -> Result<Self, UnknownBand> {
        if text.eq_ignore_ascii_case("am") {
            Ok(Band::Am)
        } else if text.eq_ignore_ascii_case("fm") {
            Ok(Band::Fm)
        } else {
            Err(UnknownBand(text.to_string()))
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Band::Am => "AM",
            Band::Fm => "FM",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Band {
    type Err = UnknownBand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Band::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() -> Result<(), UnknownBand> {
        assert_eq!(Band::parse("am")?, Band::Am);
        assert_eq!(Band::parse("AM")?, Band::Am);
        assert_eq!(Band::parse("fM")?, Band::Fm);
        assert_eq!("FM".parse::<Band>()?, Band::Fm);
        Ok(())
    }

    #[test]
    fn test_parse_rejects_other_text() {
        assert_eq!(Band::parse("sw"), Err(UnknownBand("sw".to_string())));
        assert!(Band::parse("").is_err());
        assert!(Band::parse(" fm").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Band::Am.to_string(), "AM");
        assert_eq!(Band::Fm.to_string(), "FM");
        assert_eq!(
            UnknownBand("xm".to_string()).to_string(),
            "unknown modulation 'xm'"
        );
    }
}
