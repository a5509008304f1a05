// Pure parsers for the pseudo-files under /proc and /sys.
// Each takes the file content plus its path (for error context only).

use std::collections::BTreeMap;
use std::path::Path;

use crate::devices;
use crate::error::{Result, SampleError};
use crate::models::{CounterPair, CpuTicks, Entity, MemoryCounters};

/// `cpu` label plus user, nice, system, idle, iowait, irq, softirq.
const CPU_LINE_MIN_TOKENS: usize = 8;

/// Oldest /sys/block/<dev>/stat layout has 11 fields; newer kernels append more.
const BLOCK_STAT_MIN_FIELDS: usize = 11;

/// Receive columns (8) plus at least the first transmit column.
const NET_DEV_MIN_FIELDS: usize = 9;

/// Header lines at the top of /proc/net/dev.
const NET_DEV_HEADER_LINES: usize = 2;

/// Loopback interface, never monitored.
pub const LOOPBACK_INTERFACE: &str = "lo";

fn parse_u64(path: &Path, field: &'static str, value: &str) -> Result<u64> {
    value.trim().parse::<u64>().map_err(|_| SampleError::Parse {
        path: path.to_path_buf(),
        field,
        value: value.to_string(),
    })
}

/// Aggregate CPU jiffies from the first `cpu ` line of /proc/stat.
pub fn parse_cpu_ticks(content: &str, path: &Path) -> Result<CpuTicks> {
    let line = content
        .lines()
        .find(|l| l.starts_with("cpu "))
        .ok_or_else(|| SampleError::schema(path, "no aggregate `cpu` line"))?;
    let values: Vec<&str> = line.split_whitespace().collect();
    if values.len() < CPU_LINE_MIN_TOKENS {
        return Err(SampleError::schema(
            path,
            format!(
                "cpu line has {} fields, expected at least {}",
                values.len(),
                CPU_LINE_MIN_TOKENS
            ),
        ));
    }
    Ok(CpuTicks {
        user: parse_u64(path, "user", values[1])?,
        nice: parse_u64(path, "nice", values[2])?,
        system: parse_u64(path, "system", values[3])?,
        idle: parse_u64(path, "idle", values[4])?,
    })
}

/// `MemTotal` and `MemAvailable` (kB) from /proc/meminfo.
pub fn parse_meminfo(content: &str, path: &Path) -> Result<MemoryCounters> {
    let mut total = None;
    let mut available = None;
    for line in content.lines() {
        let (field, slot) = if line.starts_with("MemTotal:") {
            ("MemTotal", &mut total)
        } else if line.starts_with("MemAvailable:") {
            ("MemAvailable", &mut available)
        } else {
            continue;
        };
        let value = line
            .split_whitespace()
            .nth(1)
            .ok_or_else(|| SampleError::schema(path, format!("{} has no value", field)))?;
        *slot = Some(parse_u64(path, field, value)?);
    }
    match (total, available) {
        (Some(total_kb), Some(available_kb)) => Ok(MemoryCounters {
            total_kb,
            available_kb,
        }),
        (None, _) => Err(SampleError::schema(path, "missing MemTotal")),
        (_, None) => Err(SampleError::schema(path, "missing MemAvailable")),
    }
}

/// Sectors read (field 3) and sectors written (field 7) from /sys/block/<dev>/stat.
pub fn parse_block_stat(content: &str, path: &Path) -> Result<(u64, u64)> {
    let fields: Vec<&str> = content.split_whitespace().collect();
    if fields.len() < BLOCK_STAT_MIN_FIELDS {
        return Err(SampleError::schema(
            path,
            format!(
                "block stat has {} fields, expected at least {}",
                fields.len(),
                BLOCK_STAT_MIN_FIELDS
            ),
        ));
    }
    let read = parse_u64(path, "sectors_read", fields[2])?;
    let written = parse_u64(path, "sectors_written", fields[6])?;
    Ok((read, written))
}

/// Hardware sector size in bytes from /sys/block/<dev>/queue/hw_sector_size.
pub fn parse_sector_size(content: &str, path: &Path) -> Result<u64> {
    let size = parse_u64(path, "hw_sector_size", content)?;
    if size == 0 {
        return Err(SampleError::schema(path, "sector size is zero"));
    }
    Ok(size)
}

/// One read of /proc/net/dev. An interface whose line does not parse is listed
/// in `failures` and absent from `counters`.
#[derive(Debug, Default)]
pub struct NetDevTable {
    pub counters: BTreeMap<Entity, CounterPair>,
    pub failures: Vec<(Entity, SampleError)>,
}

/// Received and transmitted bytes per interface from /proc/net/dev, loopback excluded.
///
/// Only a missing header or a line without an interface name fails the whole read.
pub fn parse_net_dev(content: &str, path: &Path) -> Result<NetDevTable> {
    if content.lines().take(NET_DEV_HEADER_LINES).count() < NET_DEV_HEADER_LINES {
        return Err(SampleError::schema(path, "missing net/dev header"));
    }
    let mut table = NetDevTable::default();
    for line in content.lines().skip(NET_DEV_HEADER_LINES) {
        if line.trim().is_empty() {
            continue;
        }
        let (name, rest) = line
            .split_once(':')
            .ok_or_else(|| SampleError::schema(path, format!("no ':' in line {:?}", line)))?;
        let name = name.trim();
        if devices::is_loopback_interface(name) {
            continue;
        }
        match parse_interface_fields(name, rest, path) {
            Ok(pair) => {
                table.counters.insert(name.to_string(), pair);
            }
            Err(e) => table.failures.push((name.to_string(), e)),
        }
    }
    Ok(table)
}

fn parse_interface_fields(name: &str, rest: &str, path: &Path) -> Result<CounterPair> {
    let fields: Vec<&str> = rest.split_whitespace().collect();
    if fields.len() < NET_DEV_MIN_FIELDS {
        return Err(SampleError::schema(
            path,
            format!(
                "interface {} has {} fields, expected at least {}",
                name,
                fields.len(),
                NET_DEV_MIN_FIELDS
            ),
        ));
    }
    let received = parse_u64(path, "rx_bytes", fields[0])?;
    let transmitted = parse_u64(path, "tx_bytes", fields[8])?;
    Ok(CounterPair::new(received, transmitted))
}

#[cfg(test)]
mod tests {
    use super::*;

    const STAT: &str = "cpu  4705 356 584 3699 23 23 0 0 0 0\n\
                        cpu0 1393280 32966 572056 13343292 6130 0 17875 0 0 0\n\
                        intr 114930548 113199788 3 0 5 263 0 4 [... lots more numbers ...]\n";

    const MEMINFO: &str = "MemTotal:       16318012 kB\n\
                           MemFree:         1234567 kB\n\
                           MemAvailable:    8159006 kB\n\
                           Buffers:          123456 kB\n";

    const NET_DEV: &str = "Inter-|   Receive                                                |  Transmit\n \
face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed\n    \
lo: 2776770   11307    0    0    0     0          0         0  2776770   11307    0    0    0     0       0          0\n  \
eth0: 1215645    2751    0    0    0     0          0         0  1782404    4324    0    0    0   427       0          0\n\
wlan0:     100       1    0    0    0     0          0         0      200       2    0    0    0     0       0          0\n";

    fn p() -> &'static Path {
        Path::new("/test")
    }

    #[test]
    fn parse_cpu_ticks_reads_aggregate_line() {
        let t = parse_cpu_ticks(STAT, p()).unwrap();
        assert_eq!(
            t,
            CpuTicks {
                user: 4705,
                nice: 356,
                system: 584,
                idle: 3699
            }
        );
        assert_eq!(t.total(), 4705 + 356 + 584 + 3699);
    }

    #[test]
    fn parse_cpu_ticks_rejects_short_line() {
        let err = parse_cpu_ticks("cpu  1 2 3 4\n", p()).unwrap_err();
        assert!(err.is_unavailable());
    }

    #[test]
    fn parse_cpu_ticks_rejects_missing_line() {
        let err = parse_cpu_ticks("cpu0 1 2 3 4 5 6 7\n", p()).unwrap_err();
        assert!(err.is_unavailable());
    }

    #[test]
    fn parse_cpu_ticks_rejects_non_numeric() {
        let err = parse_cpu_ticks("cpu  1 x 3 4 5 6 7\n", p()).unwrap_err();
        assert!(matches!(err, SampleError::Parse { field: "nice", .. }));
    }

    #[test]
    fn parse_meminfo_reads_total_and_available() {
        let m = parse_meminfo(MEMINFO, p()).unwrap();
        assert_eq!(m.total_kb, 16318012);
        assert_eq!(m.available_kb, 8159006);
    }

    #[test]
    fn parse_meminfo_requires_available() {
        let err = parse_meminfo("MemTotal: 100 kB\nMemFree: 50 kB\n", p()).unwrap_err();
        assert!(err.to_string().contains("MemAvailable"));
    }

    #[test]
    fn parse_block_stat_reads_sector_fields() {
        let s = "    1000 0 1000 0 50 0 2000 0 0 0 0 0 0 0 0 0 0\n";
        assert_eq!(parse_block_stat(s, p()).unwrap(), (1000, 2000));
    }

    #[test]
    fn parse_block_stat_accepts_eleven_fields() {
        let s = "1 2 3 4 5 6 7 8 9 10 11";
        assert_eq!(parse_block_stat(s, p()).unwrap(), (3, 7));
    }

    #[test]
    fn parse_block_stat_rejects_short_content() {
        let err = parse_block_stat("1 2 3", p()).unwrap_err();
        assert!(err.is_unavailable());
    }

    #[test]
    fn parse_sector_size_trims_newline_and_rejects_zero() {
        assert_eq!(parse_sector_size("512\n", p()).unwrap(), 512);
        assert!(parse_sector_size("0\n", p()).is_err());
        assert!(matches!(
            parse_sector_size("abc", p()).unwrap_err(),
            SampleError::Parse { .. }
        ));
    }

    #[test]
    fn parse_net_dev_skips_loopback_and_headers() {
        let t = parse_net_dev(NET_DEV, p()).unwrap();
        assert_eq!(t.counters.len(), 2);
        assert!(t.failures.is_empty());
        assert!(!t.counters.contains_key("lo"));
        assert_eq!(t.counters["eth0"], CounterPair::new(1215645, 1782404));
        assert_eq!(t.counters["wlan0"], CounterPair::new(100, 200));
    }

    #[test]
    fn parse_net_dev_truncated_line_fails_only_that_interface() {
        let content = "h1\nh2\neth0: 1 2 3\nwlan0: 5 0 0 0 0 0 0 0 6 0\n";
        let t = parse_net_dev(content, p()).unwrap();
        assert_eq!(t.counters["wlan0"], CounterPair::new(5, 6));
        assert_eq!(t.failures.len(), 1);
        assert_eq!(t.failures[0].0, "eth0");
        assert!(t.failures[0].1.is_unavailable());
    }

    #[test]
    fn parse_net_dev_non_numeric_field_fails_only_that_interface() {
        let content = "h1\nh2\nwlan1: xyz 0 0 0 0 0 0 0 1 0\neth0: 10 0 0 0 0 0 0 0 20 0\n";
        let t = parse_net_dev(content, p()).unwrap();
        assert_eq!(t.counters.keys().collect::<Vec<_>>(), vec!["eth0"]);
        assert!(matches!(
            t.failures[0].1,
            SampleError::Parse { field: "rx_bytes", .. }
        ));
    }

    #[test]
    fn parse_net_dev_requires_header() {
        assert!(parse_net_dev("", p()).unwrap_err().is_unavailable());
        assert!(parse_net_dev("Inter-|\n", p()).unwrap_err().is_unavailable());
    }
}
