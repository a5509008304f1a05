use serde::Deserialize;

use crate::axis::{Hysteresis, QuantizedAxis, SlidingWindow};
use crate::reader::{DEFAULT_PROC_ROOT, DEFAULT_SYS_ROOT};
use crate::series::DEFAULT_CAPACITY;

/// Every section is optional; missing keys fall back to the built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub sampling: SamplingConfig,
    pub sources: SourcesConfig,
    pub series: SeriesConfig,
    pub axis: AxisConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub interval_ms: u64,
    /// How often to log sampler stats (ticks sampled / failed) at INFO level.
    pub stats_log_interval_secs: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 250,
            stats_log_interval_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub proc_root: String,
    pub sys_root: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            proc_root: DEFAULT_PROC_ROOT.into(),
            sys_root: DEFAULT_SYS_ROOT.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SeriesConfig {
    /// Max points kept per series.
    pub capacity: usize,
    /// X window of throughput charts, in ticks.
    pub tick_window: u64,
    /// X window of CPU/memory charts, in milliseconds.
    pub time_window_ms: u64,
    /// Drop a disk/interface chart after this many ticks without data; 0 keeps it forever.
    pub prune_after_missed_ticks: u32,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            tick_window: SlidingWindow::DEFAULT_TICKS,
            time_window_ms: SlidingWindow::DEFAULT_MILLIS,
            prune_after_missed_ticks: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AxisConfig {
    pub pad: f64,
    pub step: f64,
    pub grow_ratio: f64,
    pub shrink_ratio: f64,
    pub headroom: f64,
    pub floor: f64,
}

impl Default for AxisConfig {
    fn default() -> Self {
        let h = Hysteresis::default();
        Self {
            pad: QuantizedAxis::DEFAULT_PAD,
            step: QuantizedAxis::DEFAULT_STEP,
            grow_ratio: h.grow_ratio,
            shrink_ratio: h.shrink_ratio,
            headroom: h.headroom,
            floor: h.floor,
        }
    }
}

impl AxisConfig {
    pub fn hysteresis(&self) -> Hysteresis {
        Hysteresis {
            grow_ratio: self.grow_ratio,
            shrink_ratio: self.shrink_ratio,
            headroom: self.headroom,
            floor: self.floor,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Print every tick as one JSON line on stdout.
    pub json_lines: bool,
}

impl AppConfig {
    /// Loads `$CONFIG_FILE` if set (must exist), else `./config.toml` if present, else defaults.
    pub fn load() -> anyhow::Result<Self> {
        let (path, required) = match std::env::var("CONFIG_FILE") {
            Ok(p) => (p, true),
            Err(_) => ("config.toml".to_string(), false),
        };
        if !required && !std::path::Path::new(&path).exists() {
            tracing::info!("No {} found, using default configuration", path);
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }
        let s = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("reading config {}: {}", path, e))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.sampling.interval_ms > 0,
            "sampling.interval_ms must be > 0, got {}",
            self.sampling.interval_ms
        );
        anyhow::ensure!(
            self.sampling.stats_log_interval_secs > 0,
            "sampling.stats_log_interval_secs must be > 0, got {}",
            self.sampling.stats_log_interval_secs
        );
        anyhow::ensure!(
            !self.sources.proc_root.is_empty(),
            "sources.proc_root must be non-empty"
        );
        anyhow::ensure!(
            !self.sources.sys_root.is_empty(),
            "sources.sys_root must be non-empty"
        );
        anyhow::ensure!(
            self.series.capacity > 0,
            "series.capacity must be > 0, got {}",
            self.series.capacity
        );
        anyhow::ensure!(
            self.series.tick_window > 0,
            "series.tick_window must be > 0, got {}",
            self.series.tick_window
        );
        anyhow::ensure!(
            self.series.time_window_ms > 0,
            "series.time_window_ms must be > 0, got {}",
            self.series.time_window_ms
        );
        anyhow::ensure!(
            self.axis.pad >= 0.0,
            "axis.pad must be >= 0, got {}",
            self.axis.pad
        );
        anyhow::ensure!(
            self.axis.step > 0.0,
            "axis.step must be > 0, got {}",
            self.axis.step
        );
        anyhow::ensure!(
            self.axis.grow_ratio >= 1.0,
            "axis.grow_ratio must be >= 1, got {}",
            self.axis.grow_ratio
        );
        anyhow::ensure!(
            self.axis.shrink_ratio > 0.0 && self.axis.shrink_ratio < 1.0,
            "axis.shrink_ratio must be in (0, 1), got {}",
            self.axis.shrink_ratio
        );
        // A shrunk bound must not sit below the next shrink threshold.
        anyhow::ensure!(
            self.axis.headroom >= 1.0 && self.axis.headroom * self.axis.shrink_ratio <= 1.0,
            "axis.headroom must be >= 1 and <= 1 / axis.shrink_ratio, got {}",
            self.axis.headroom
        );
        anyhow::ensure!(
            self.axis.floor > 0.0,
            "axis.floor must be > 0, got {}",
            self.axis.floor
        );
        Ok(())
    }
}
