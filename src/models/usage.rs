// CPU and memory counter models

use serde::{Deserialize, Serialize};

/// Aggregate CPU time in jiffies, from the `cpu ` line of /proc/stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CpuTicks {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
}

impl CpuTicks {
    /// Sum of all fields, saturating at `u64::MAX`.
    pub fn total(&self) -> u64 {
        self.user
            .saturating_add(self.nice)
            .saturating_add(self.system)
            .saturating_add(self.idle)
    }
}

/// Memory totals in kB, from /proc/meminfo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryCounters {
    pub total_kb: u64,
    pub available_kb: u64,
}
