pub mod assembler;
pub mod codec;
pub mod command;
pub mod conv;
pub mod response;

#[cfg(test)]
pub mod fake;

use thiserror::Error;

use crate::config::ConfigKey;
use crate::measurement::DecodeError;

#[derive(Error, Debug)]
pub enum ProtoError {
    #[error("I/O error: {:?}", _0)]
    Io(#[from] std::io::Error),

    #[error("Serial I/O error: {:?}", _0)]
    Serial(#[from] tokio_serial::Error),

    #[error("Timeout while writing to device")]
    Timeout,
    #[error("Response line exceeds the line buffer")]
    BufferOverflow,
    #[error("Malformed response line: {:?}", _0)]
    MalformedLine(String),
    #[error("Invalid serial parameters: {}", _0)]
    SerialComm(String),
    #[error("Configuration key {:?} is not applicable", _0)]
    NotApplicable(ConfigKey),
    #[error("Invalid value for configuration key {:?}", _0)]
    InvalidValue(ConfigKey),
    #[error("Acquisition is already running")]
    AlreadyAcquiring,
    #[error("Acquisition is not running")]
    NotAcquiring,
    #[error("Readiness callback is not registered")]
    NotRegistered,
    #[error("Connection was closed")]
    Abort,
}

impl From<DecodeError> for ProtoError {
    fn from(value: DecodeError) -> Self {
        match value {
            DecodeError::MalformedLine(line) => Self::MalformedLine(line),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProtoError>;
