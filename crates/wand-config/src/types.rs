use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use wand_gesture::schema::{BUFFERED_WINDOW_SAMPLES, MIN_WINDOW_SAMPLES, STATELESS_WINDOW_SAMPLES};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Gesture detector configuration.
    pub detector: DetectorConfig,
    /// Watch message source.
    pub link: LinkConfig,
    /// Cloud telemetry relay.
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub mode: DetectorMode,
    /// Samples per message in stateless mode.
    pub window_samples: usize,
    /// Samples accumulated before evaluation in buffered mode.
    pub buffered_samples: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            mode: DetectorMode::Stateless,
            window_samples: STATELESS_WINDOW_SAMPLES,
            buffered_samples: BUFFERED_WINDOW_SAMPLES,
        }
    }
}

impl DetectorConfig {
    /// Both window sizes must hold a transition; `--buffered` can switch
    /// modes after loading.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.window_samples >= MIN_WINDOW_SAMPLES,
            "detector.window_samples is {}, must be at least {MIN_WINDOW_SAMPLES}",
            self.window_samples
        );
        ensure!(
            self.buffered_samples >= MIN_WINDOW_SAMPLES,
            "detector.buffered_samples is {}, must be at least {MIN_WINDOW_SAMPLES}",
            self.buffered_samples
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorMode {
    /// Each message carries a full window.
    Stateless,
    /// Each message carries one sample; windows are assembled on the host.
    Buffered,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Watch bridge address (`host:port`). `None` reads stdin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bridge_addr: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Whether menu selections are relayed at all.
    pub enabled: bool,
    /// Telemetry bridge address. `None` logs readings instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relay_addr: Option<String>,
    /// Feed the stream belongs to.
    pub feed_id: String,
    /// Stream receiving the readings.
    pub stream: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            relay_addr: None,
            feed_id: "1e93ba89b35bc96e32fac1c43cc1d9f5".into(),
            stream: "amb-temp".into(),
        }
    }
}
