//! Driver options as key/value pairs.
//!
//! Only the sample limit can be read and changed at runtime; the other
//! keys are advertised so a frontend knows what the driver accepts.
//! Values are held in memory only.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    /// Serial port path.
    Conn,
    /// Serial connection string, see [`crate::serial::SerialParams`].
    SerialComm,
    /// Driver class.
    Multimeter,
    /// Acquisition runs until stopped.
    Continuous,
    /// Stop after this many samples, 0 means no limit.
    LimitSamples,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    Text(String),
    UInt(u64),
    Bool(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionScope {
    Scan,
    Driver,
    Device,
}

const SCAN_OPTIONS: &[ConfigKey] = &[ConfigKey::Conn, ConfigKey::SerialComm];
const DRIVER_OPTIONS: &[ConfigKey] = &[ConfigKey::Multimeter];
const DEVICE_OPTIONS: &[ConfigKey] = &[ConfigKey::Continuous, ConfigKey::LimitSamples];

pub fn config_list(scope: OptionScope) -> &'static [ConfigKey] {
    match scope {
        OptionScope::Scan => SCAN_OPTIONS,
        OptionScope::Driver => DRIVER_OPTIONS,
        OptionScope::Device => DEVICE_OPTIONS,
    }
}

impl ConfigKey {
    pub fn is_settable(&self) -> bool {
        matches!(self, ConfigKey::LimitSamples)
    }
}
