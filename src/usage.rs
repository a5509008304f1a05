// CPU load and memory usage as percentages.

use crate::error::Result;
use crate::models::{CpuTicks, MemoryCounters};
use crate::reader::CounterReader;

/// Busy share of the CPU time elapsed between two readings, clamped to `[0, 100]`.
/// Zero elapsed jiffies gives 0.
pub fn cpu_load_percent(previous: &CpuTicks, current: &CpuTicks) -> f64 {
    let total = current.total().saturating_sub(previous.total());
    if total == 0 {
        return 0.0;
    }
    let idle = current.idle.saturating_sub(previous.idle);
    let busy = total.saturating_sub(idle);
    (busy as f64 * 100.0 / total as f64).clamp(0.0, 100.0)
}

/// Used share of memory, clamped to `[0, 100]`. `None` when total is zero.
pub fn memory_usage_percent(memory: &MemoryCounters) -> Option<f64> {
    if memory.total_kb == 0 {
        return None;
    }
    let used = memory.total_kb.saturating_sub(memory.available_kb);
    Some((used as f64 * 100.0 / memory.total_kb as f64).clamp(0.0, 100.0))
}

/// Aggregate CPU load between consecutive calls.
pub struct CpuLoadSampler {
    reader: CounterReader,
    previous: Option<CpuTicks>,
}

impl CpuLoadSampler {
    pub fn new(reader: CounterReader) -> Self {
        Self {
            reader,
            previous: None,
        }
    }

    pub fn is_warm(&self) -> bool {
        self.previous.is_some()
    }

    /// Load since the previous call; `Ok(None)` on the first call.
    pub fn sample(&mut self) -> Result<Option<f64>> {
        let current = self.reader.read_cpu_counters()?;
        let load = self
            .previous
            .map(|previous| cpu_load_percent(&previous, &current));
        self.previous = Some(current);
        Ok(load)
    }
}

/// Current memory usage read through `reader`.
pub fn sample_memory_percent(reader: &CounterReader) -> Result<Option<f64>> {
    let memory = reader.read_memory_counters()?;
    Ok(memory_usage_percent(&memory))
}
