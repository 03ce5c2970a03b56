use crate::config::{ConfigKey, ConfigValue};
use crate::proto::{ProtoError, Result};

/// Counts emitted samples against an optional maximum.
#[derive(Debug, Clone, Default)]
pub struct SampleLimitTracker {
    limit: Option<u64>,
    samples_read: u64,
}

impl SampleLimitTracker {
    pub fn new(limit: Option<u64>) -> Self {
        Self {
            limit,
            samples_read: 0,
        }
    }

    pub fn configure(&mut self, limit: Option<u64>) {
        self.limit = limit;
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn samples_read(&self) -> u64 {
        self.samples_read
    }

    pub fn record_sample(&mut self) {
        self.samples_read += 1;
    }

    pub fn limit_reached(&self) -> bool {
        match self.limit {
            Some(limit) => self.samples_read >= limit,
            None => false,
        }
    }

    /// Start counting from zero for a new acquisition.
    pub fn reset(&mut self) {
        self.samples_read = 0;
    }

    pub fn config_get(&self, key: ConfigKey) -> Result<ConfigValue> {
        match key {
            ConfigKey::LimitSamples => Ok(ConfigValue::UInt(self.limit.unwrap_or(0))),
            _ => Err(ProtoError::NotApplicable(key)),
        }
    }

    pub fn config_set(&mut self, key: ConfigKey, value: &ConfigValue) -> Result<()> {
        match (key, value) {
            (ConfigKey::LimitSamples, ConfigValue::UInt(0)) => self.configure(None),
            (ConfigKey::LimitSamples, ConfigValue::UInt(n)) => self.configure(Some(*n)),
            (ConfigKey::LimitSamples, _) => return Err(ProtoError::InvalidValue(key)),
            _ => return Err(ProtoError::NotApplicable(key)),
        }
        Ok(())
    }
}
