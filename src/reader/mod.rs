// Raw counter reads from /proc and /sys.

pub mod parse;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{Result, SampleError};
use crate::models::{CpuTicks, Entity, MemoryCounters};

pub const DEFAULT_PROC_ROOT: &str = "/proc";
pub const DEFAULT_SYS_ROOT: &str = "/sys";

/// Reads pseudo-files relative to a proc and a sys root.
///
/// The roots are configurable so tests (and containers with bind-mounted host
/// trees) can point elsewhere. Sector sizes are cached per device for the
/// lifetime of the reader; everything else is re-read on every call.
#[derive(Debug, Clone)]
pub struct CounterReader {
    proc_root: PathBuf,
    sys_root: PathBuf,
    sector_sizes: HashMap<Entity, u64>,
}

impl Default for CounterReader {
    fn default() -> Self {
        Self::new(DEFAULT_PROC_ROOT, DEFAULT_SYS_ROOT)
    }
}

impl CounterReader {
    pub fn new(proc_root: impl Into<PathBuf>, sys_root: impl Into<PathBuf>) -> Self {
        Self {
            proc_root: proc_root.into(),
            sys_root: sys_root.into(),
            sector_sizes: HashMap::new(),
        }
    }

    pub fn proc_root(&self) -> &Path {
        &self.proc_root
    }

    pub fn sys_root(&self) -> &Path {
        &self.sys_root
    }

    /// user, nice, system and idle jiffies of the aggregate CPU.
    pub fn read_cpu_counters(&self) -> Result<CpuTicks> {
        let path = self.proc_root.join("stat");
        parse::parse_cpu_ticks(&read_source(&path)?, &path)
    }

    pub fn read_memory_counters(&self) -> Result<MemoryCounters> {
        let path = self.proc_root.join("meminfo");
        parse::parse_meminfo(&read_source(&path)?, &path)
    }

    /// Sectors read and sectors written since boot for one block device.
    pub fn read_block_device_counters(&self, device: &str) -> Result<(u64, u64)> {
        let path = self.sys_root.join("block").join(device).join("stat");
        parse::parse_block_stat(&read_source(&path)?, &path)
    }

    /// Hardware sector size in bytes. Cached after the first successful read.
    pub fn read_sector_size(&mut self, device: &str) -> Result<u64> {
        if let Some(size) = self.sector_sizes.get(device) {
            return Ok(*size);
        }
        let path = self
            .sys_root
            .join("block")
            .join(device)
            .join("queue")
            .join("hw_sector_size");
        let size = parse::parse_sector_size(&read_source(&path)?, &path)?;
        self.sector_sizes.insert(device.to_string(), size);
        Ok(size)
    }

    /// Bytes received / transmitted per interface, loopback excluded.
    /// Interfaces whose line is malformed come back in `failures`.
    pub fn read_network_counters(&self) -> Result<parse::NetDevTable> {
        let path = self.proc_root.join("net").join("dev");
        parse::parse_net_dev(&read_source(&path)?, &path)
    }
}

pub(crate) fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| SampleError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    })
}
