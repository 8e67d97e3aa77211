use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Harness configuration from `Harness Settings.yaml`.
///
/// Holds the timing knobs for the driver: the hang-mitigation budget
/// applied to every public operation and the poll interval used by the
/// verify-closed loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    #[serde(rename = "Harness_Settings")]
    pub harness_settings: HarnessSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessSettings {
    /// Upper bound on any single driver operation, in seconds.
    #[serde(rename = "Hang Timeout Secs", default = "default_hang_timeout_secs")]
    pub hang_timeout_secs: u64,

    /// Sleep between discovery attempts while waiting for the dialog to
    /// disappear, in milliseconds.
    #[serde(rename = "Poll Interval Ms", default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(rename = "Debug Mode", default)]
    pub debug_mode: bool,
}

impl Default for HarnessSettings {
    fn default() -> Self {
        Self {
            hang_timeout_secs: default_hang_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            debug_mode: false,
        }
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            harness_settings: HarnessSettings::default(),
        }
    }
}

fn default_hang_timeout_secs() -> u64 {
    60
}

fn default_poll_interval_ms() -> u64 {
    10
}

/// Runtime timing configuration consumed by the driver.
///
/// Production code takes the defaults (a one-minute budget, matching the
/// hang-mitigation timeout the original harness used); tests inject much
/// shorter budgets so timeout paths finish quickly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// Hang-mitigation budget for one public operation.
    pub hang_timeout: Duration,

    /// Poll interval for the verify-closed loop.
    pub poll_interval: Duration,
}

impl DriverConfig {
    /// Configuration with a custom budget and the default poll interval.
    pub fn with_timeout(hang_timeout: Duration) -> Self {
        Self {
            hang_timeout,
            ..Self::default()
        }
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        HarnessSettings::default().to_driver_config()
    }
}

impl HarnessSettings {
    /// Convert the serialized settings into the runtime form.
    pub fn to_driver_config(&self) -> DriverConfig {
        DriverConfig {
            hang_timeout: Duration::from_secs(self.hang_timeout_secs),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }
}
