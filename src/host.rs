// Static host identity, logged once at startup.

use serde::Serialize;
use sysinfo::System;

use crate::reader::{CounterReader, read_source};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostInfo {
    pub host_name: String,
    pub os_name: String,
    pub os_version: String,
    pub kernel_version: String,
    pub processor_name: String,
    pub logical_cores: usize,
}

impl HostInfo {
    /// Blocking: queries the OS once.
    pub fn detect(reader: &CounterReader) -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_all();
        let processor_name = read_cpu_model(reader)
            .or_else(|| {
                sys.cpus()
                    .first()
                    .map(|c| c.brand().trim().to_string())
                    .filter(|s| !s.is_empty())
            })
            .unwrap_or_else(|| "Unknown".into());
        Self {
            host_name: System::host_name().unwrap_or_default(),
            os_name: System::name().unwrap_or_else(|| std::env::consts::OS.into()),
            os_version: System::os_version().unwrap_or_default(),
            kernel_version: System::kernel_version().unwrap_or_default(),
            processor_name,
            logical_cores: sys.cpus().len(),
        }
    }
}

/// First "model name" from cpuinfo under the reader's proc root.
fn read_cpu_model(reader: &CounterReader) -> Option<String> {
    let content = read_source(&reader.proc_root().join("cpuinfo")).ok()?;
    content
        .lines()
        .find(|line| line.starts_with("model name"))
        .and_then(|line| line.split_once(':'))
        .map(|(_, name)| name.trim().to_string())
        .filter(|name| !name.is_empty())
}
