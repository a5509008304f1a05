// One sampling cycle, as handed from the sampler to the renderer

use serde::{Deserialize, Serialize};

use super::RateSample;

/// Everything collected during one tick. Moved whole through the handoff
/// channel, so a consumer never sees a partially updated sample.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickSample {
    pub timestamp_ms: u64,
    /// CPU load in percent; `None` on the first tick or when /proc/stat is unreadable.
    pub cpu_percent: Option<f64>,
    /// Memory usage in percent; `None` when /proc/meminfo is unreadable.
    pub memory_percent: Option<f64>,
    /// Disk read/write rates in MB/s per block device.
    pub disks: RateSample,
    /// Network receive/transmit rates in MB/s per interface.
    pub networks: RateSample,
}
