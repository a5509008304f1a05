// Shared test helpers: a fake /proc and /sys tree in a temp dir

#![allow(dead_code)]

use std::path::PathBuf;
use sysgraph::reader::CounterReader;
use tempfile::TempDir;

pub struct FakeHost {
    dir: TempDir,
}

impl FakeHost {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("proc/net")).unwrap();
        std::fs::create_dir_all(dir.path().join("sys/block")).unwrap();
        Self { dir }
    }

    pub fn proc_root(&self) -> PathBuf {
        self.dir.path().join("proc")
    }

    pub fn sys_root(&self) -> PathBuf {
        self.dir.path().join("sys")
    }

    pub fn reader(&self) -> CounterReader {
        CounterReader::new(self.proc_root(), self.sys_root())
    }

    pub fn write_cpu(&self, user: u64, nice: u64, system: u64, idle: u64) {
        let content = format!(
            "cpu  {} {} {} {} 0 0 0 0 0 0\ncpu0 {} {} {} {} 0 0 0 0 0 0\nctxt 12345\n",
            user, nice, system, idle, user, nice, system, idle
        );
        std::fs::write(self.proc_root().join("stat"), content).unwrap();
    }

    pub fn write_meminfo(&self, total_kb: u64, available_kb: u64) {
        let content = format!(
            "MemTotal:       {} kB\nMemFree:        1024 kB\nMemAvailable:   {} kB\n",
            total_kb, available_kb
        );
        std::fs::write(self.proc_root().join("meminfo"), content).unwrap();
    }

    /// Creates (or updates) a block device with the given sector counters.
    pub fn write_block_device(&self, name: &str, sectors_read: u64, sectors_written: u64) {
        let dev = self.sys_root().join("block").join(name);
        std::fs::create_dir_all(dev.join("queue")).unwrap();
        let stat = format!(
            "{:>8} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8} 0 0 0 0 0 0 0 0 0 0\n",
            10, 0, sectors_read, 5, 20, 0, sectors_written
        );
        std::fs::write(dev.join("stat"), stat).unwrap();
    }

    pub fn write_sector_size(&self, name: &str, size: u64) {
        let queue = self.sys_root().join("block").join(name).join("queue");
        std::fs::create_dir_all(&queue).unwrap();
        std::fs::write(queue.join("hw_sector_size"), format!("{}\n", size)).unwrap();
    }

    pub fn write_raw_block_stat(&self, name: &str, content: &str) {
        let dev = self.sys_root().join("block").join(name);
        std::fs::create_dir_all(&dev).unwrap();
        std::fs::write(dev.join("stat"), content).unwrap();
    }

    pub fn remove_block_device(&self, name: &str) {
        std::fs::remove_dir_all(self.sys_root().join("block").join(name)).unwrap();
    }

    /// Writes /proc/net/dev with `lo` first, then the given interfaces.
    pub fn write_net_dev(&self, interfaces: &[(&str, u64, u64)]) {
        let mut content = String::from(
            "Inter-|   Receive                                                |  Transmit\n \
             face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed\n",
        );
        content.push_str(
            "    lo:    9999      10    0    0    0     0          0         0     9999      10    0    0    0     0       0          0\n",
        );
        for (name, rx, tx) in interfaces {
            content.push_str(&format!(
                "{:>6}: {:>8} 1 0 0 0 0 0 0 {:>8} 1 0 0 0 0 0 0\n",
                name, rx, tx
            ));
        }
        std::fs::write(self.proc_root().join("net").join("dev"), content).unwrap();
    }

    /// Appends a raw line to /proc/net/dev, e.g. a malformed interface entry.
    pub fn append_net_dev_line(&self, line: &str) {
        let path = self.proc_root().join("net").join("dev");
        let mut content = std::fs::read_to_string(&path).unwrap();
        content.push_str(line);
        content.push('\n');
        std::fs::write(path, content).unwrap();
    }
}
