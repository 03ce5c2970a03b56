use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::proto::conv::parse_float_prefix;

/// Number of status bytes preceding the value in a response line.
pub const FRAMING_LEN: usize = 4;

/// Decimal digits reported for every reading.
pub const DISPLAY_DIGITS: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    Voltage,
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Voltage => f.write_str("Voltage"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Volt,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Volt => f.write_str("V"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MqFlags {
    pub dc: bool,
    pub rms: bool,
}

impl MqFlags {
    pub const DC_RMS: MqFlags = MqFlags { dc: true, rms: true };
}

impl fmt::Display for MqFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sep = "";
        if self.dc {
            f.write_str("DC")?;
            sep = " ";
        }
        if self.rms {
            write!(f, "{}RMS", sep)?;
        }
        Ok(())
    }
}

/// A single reading as decoded from one response line.
///
/// The device reports only its numeric value. Range and function are
/// not decoded, every reading is taken as a DC RMS voltage.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub value: f64,
    pub quantity: Quantity,
    pub unit: Unit,
    pub flags: MqFlags,
    pub digits: u8,
    pub ts: DateTime<Utc>,
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = format!("{:.*}", self.digits as usize, self.value);
        if let Some(width) = f.width() {
            write!(f, "{:>width$} {} {}", value, self.unit, self.flags, width = width)
        } else {
            write!(f, "{} {} {}", value, self.unit, self.flags)
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Malformed measurement line: {:?}", _0)]
    MalformedLine(String),
}

/// Decode a response line (without terminator) into a [`Measurement`].
///
/// The status bytes are skipped whatever they contain.
pub fn decode(line: &[u8]) -> Result<Measurement, DecodeError> {
    let value = line
        .get(FRAMING_LEN..)
        .and_then(|payload| parse_float_prefix(&String::from_utf8_lossy(payload)))
        .ok_or_else(|| DecodeError::MalformedLine(String::from_utf8_lossy(line).into_owned()))?;
    log::debug!("Converted value: {}", value);

    Ok(Measurement {
        value,
        quantity: Quantity::Voltage,
        unit: Unit::Volt,
        flags: MqFlags::DC_RMS,
        digits: DISPLAY_DIGITS,
        ts: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_status_and_value() {
        let mea = decode(b"OK01+3.300").expect("valid line");
        assert!((mea.value - 3.3).abs() < 1e-9);
        assert_eq!(mea.quantity, Quantity::Voltage);
        assert_eq!(mea.unit, Unit::Volt);
        assert!(mea.flags.dc);
        assert!(mea.flags.rms);
        assert_eq!(mea.digits, 4);
    }

    #[test]
    fn ignores_trailing_characters() {
        let mea = decode(b"RD00-12.5 V").expect("valid line");
        assert!((mea.value + 12.5).abs() < 1e-9);
    }

    #[test]
    fn short_line_is_malformed() {
        assert_eq!(
            decode(b"OK0"),
            Err(DecodeError::MalformedLine("OK0".to_string()))
        );
        assert!(decode(b"").is_err());
        assert!(decode(b"OK01").is_err());
    }

    #[test]
    fn non_numeric_payload_is_malformed() {
        assert!(decode(b"OK01 OL").is_err());
        assert!(decode(b"OK01----").is_err());
    }

    #[test]
    fn framing_is_not_parsed() {
        // Digits inside the framing must not leak into the value.
        let mea = decode(b"1234+0.5").expect("valid line");
        assert!((mea.value - 0.5).abs() < 1e-9);
    }

    #[test]
    fn status_bytes_need_not_be_ascii() {
        let mea = decode(b"\xB0K01+3.300").expect("valid line");
        assert!((mea.value - 3.3).abs() < 1e-9);
        let mea = decode(b"O\xC3\xA9K-1.5").expect("valid line");
        assert!((mea.value + 1.5).abs() < 1e-9);
    }

    #[test]
    fn display() {
        let mea = decode(b"OK01+3.3").expect("valid line");
        assert_eq!(mea.to_string(), "3.3000 V DC RMS");
        assert_eq!(format!("{:8}", mea), "  3.3000 V DC RMS");
    }
}
