//! Serial link parameters.
//!
//! Connection strings look like `9600/8n1/dtr=1/rts=0/flow=1`: a baud
//! rate, a `<databits><parity><stopbits>` frame, optional DTR/RTS levels
//! and the flow control mode (0 none, 1 hardware, 2 software).

use std::{fmt, str::FromStr, time::Duration};

use tokio_serial::{
    DataBits, FlowControl, Parity, SerialPort, SerialPortBuilder, SerialPortBuilderExt,
    SerialStream, StopBits,
};

use crate::proto::{ProtoError, Result};
use crate::DEFAULT_BAUDRATE;

/// Link settings used when the caller does not supply any.
pub const DEFAULT_SERIALCOMM: &str = "9600/8n1/dtr=1/rts=0/flow=1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialParams {
    pub baudrate: u32,
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub flow_control: FlowControl,
    pub dtr: Option<bool>,
    pub rts: Option<bool>,
}

impl Default for SerialParams {
    fn default() -> Self {
        Self {
            baudrate: DEFAULT_BAUDRATE,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            flow_control: FlowControl::Hardware,
            dtr: Some(true),
            rts: Some(false),
        }
    }
}

impl SerialParams {
    pub fn builder(&self, path: impl AsRef<str>) -> SerialPortBuilder {
        tokio_serial::new(path.as_ref(), self.baudrate)
            .data_bits(self.data_bits)
            .parity(self.parity)
            .stop_bits(self.stop_bits)
            .flow_control(self.flow_control)
    }

    pub fn open(&self, path: impl AsRef<str>) -> Result<SerialStream> {
        log::info!("Opening serial port {} ({}).", path.as_ref(), self);
        let mut port = self.builder(path).open_native_async()?;

        #[cfg(unix)]
        port.set_exclusive(false)?;

        if let Some(dtr) = self.dtr {
            port.write_data_terminal_ready(dtr)?;
        }
        if let Some(rts) = self.rts {
            port.write_request_to_send(rts)?;
        }
        Ok(port)
    }

    pub fn bits_per_frame(&self) -> u32 {
        let data = match self.data_bits {
            DataBits::Five => 5,
            DataBits::Six => 6,
            DataBits::Seven => 7,
            DataBits::Eight => 8,
        };
        let parity = match self.parity {
            Parity::None => 0,
            Parity::Odd | Parity::Even => 1,
        };
        let stop = match self.stop_bits {
            StopBits::One => 1,
            StopBits::Two => 2,
        };
        1 + data + parity + stop
    }

    /// Time allowed for writing `len` bytes: the transfer time plus 10 ms.
    pub fn write_timeout(&self, len: usize) -> Duration {
        let bits = len as u64 * u64::from(self.bits_per_frame());
        let ms = 1000 * bits / u64::from(self.baudrate.max(1));
        Duration::from_millis(ms + 10)
    }
}

fn parse_frame(token: &str) -> Option<(DataBits, Parity, StopBits)> {
    let bytes = token.as_bytes();
    if bytes.len() != 3 {
        return None;
    }
    let data_bits = match bytes[0] {
        b'5' => DataBits::Five,
        b'6' => DataBits::Six,
        b'7' => DataBits::Seven,
        b'8' => DataBits::Eight,
        _ => return None,
    };
    let parity = match bytes[1].to_ascii_lowercase() {
        b'n' => Parity::None,
        b'e' => Parity::Even,
        b'o' => Parity::Odd,
        _ => return None,
    };
    let stop_bits = match bytes[2] {
        b'1' => StopBits::One,
        b'2' => StopBits::Two,
        _ => return None,
    };
    Some((data_bits, parity, stop_bits))
}

fn parse_level(value: &str) -> Option<bool> {
    match value {
        "0" => Some(false),
        "1" => Some(true),
        _ => None,
    }
}

impl FromStr for SerialParams {
    type Err = ProtoError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = |token: &str| ProtoError::SerialComm(format!("{:?} in {:?}", token, s));

        let mut params = SerialParams {
            flow_control: FlowControl::None,
            dtr: None,
            rts: None,
            ..Default::default()
        };

        for token in s.split('/').filter(|t| !t.is_empty()) {
            if token.bytes().all(|b| b.is_ascii_digit()) {
                params.baudrate = match token.parse::<u32>() {
                    Ok(baud) if baud > 0 => baud,
                    _ => return Err(invalid(token)),
                };
            } else if let Some((data_bits, parity, stop_bits)) = parse_frame(token) {
                params.data_bits = data_bits;
                params.parity = parity;
                params.stop_bits = stop_bits;
            } else if let Some((key, value)) = token.split_once('=') {
                match key {
                    "dtr" => params.dtr = Some(parse_level(value).ok_or_else(|| invalid(token))?),
                    "rts" => params.rts = Some(parse_level(value).ok_or_else(|| invalid(token))?),
                    "flow" => {
                        params.flow_control = match value {
                            "0" => FlowControl::None,
                            "1" => FlowControl::Hardware,
                            "2" => FlowControl::Software,
                            _ => return Err(invalid(token)),
                        }
                    }
                    _ => return Err(invalid(token)),
                }
            } else {
                return Err(invalid(token));
            }
        }
        Ok(params)
    }
}

impl fmt::Display for SerialParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parity = match self.parity {
            Parity::None => 'n',
            Parity::Odd => 'o',
            Parity::Even => 'e',
        };
        let data = match self.data_bits {
            DataBits::Five => 5,
            DataBits::Six => 6,
            DataBits::Seven => 7,
            DataBits::Eight => 8,
        };
        let stop = match self.stop_bits {
            StopBits::One => 1,
            StopBits::Two => 2,
        };
        write!(f, "{}/{}{}{}", self.baudrate, data, parity, stop)?;
        if let Some(dtr) = self.dtr {
            write!(f, "/dtr={}", u8::from(dtr))?;
        }
        if let Some(rts) = self.rts {
            write!(f, "/rts={}", u8::from(rts))?;
        }
        let flow = match self.flow_control {
            FlowControl::None => 0,
            FlowControl::Hardware => 1,
            FlowControl::Software => 2,
        };
        write!(f, "/flow={}", flow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_string_matches_default_params() {
        let params: SerialParams = DEFAULT_SERIALCOMM.parse().unwrap();
        assert_eq!(params, SerialParams::default());
        assert_eq!(params.to_string(), DEFAULT_SERIALCOMM);
    }

    #[test]
    fn partial_string() {
        let params: SerialParams = "19200/7e2".parse().unwrap();
        assert_eq!(params.baudrate, 19200);
        assert_eq!(params.data_bits, DataBits::Seven);
        assert_eq!(params.parity, Parity::Even);
        assert_eq!(params.stop_bits, StopBits::Two);
        assert_eq!(params.flow_control, FlowControl::None);
        assert_eq!(params.dtr, None);
        assert_eq!(params.to_string(), "19200/7e2/flow=0");
    }

    #[test]
    fn rejects_unknown_tokens() {
        assert!(matches!(
            "9600/8x1".parse::<SerialParams>(),
            Err(ProtoError::SerialComm(_))
        ));
        assert!("9600/flow=3".parse::<SerialParams>().is_err());
        assert!("9600/dtr=yes".parse::<SerialParams>().is_err());
        assert!("0".parse::<SerialParams>().is_err());
        assert!("9600/baud=1".parse::<SerialParams>().is_err());
    }

    #[test]
    fn write_timeout_for_request() {
        let params = SerialParams::default();
        assert_eq!(params.bits_per_frame(), 10);
        // 7 bytes * 10 bits at 9600 baud = 7 ms, plus margin.
        assert_eq!(params.write_timeout(7), Duration::from_millis(17));
    }
}
