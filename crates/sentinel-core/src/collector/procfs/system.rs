//! System collector for host-wide load, memory and uptime.

use std::path::Path;

use crate::collector::procfs::parser::{parse_loadavg, parse_meminfo, parse_uptime};
use crate::collector::procfs::process::CollectError;
use crate::collector::traits::SystemSource;
use crate::model::SystemSummary;

/// Collects host-wide metrics from `/proc/`.
pub struct SystemCollector<F: SystemSource> {
    fs: F,
    proc_path: String,
}

impl<F: SystemSource> SystemCollector<F> {
    /// Creates a new system collector.
    ///
    /// # Arguments
    /// * `fs` - System source implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: F, proc_path: impl Into<String>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
        }
    }

    fn read(&self, name: &str) -> Result<String, CollectError> {
        let path = format!("{}/{}", self.proc_path, name);
        self.fs
            .read_to_string(Path::new(&path))
            .map_err(|e| CollectError::unavailable(Path::new(&path), e))
    }

    /// Kernel host name from `/proc/sys/kernel/hostname`.
    pub fn hostname(&self) -> Result<String, CollectError> {
        Ok(self.read("sys/kernel/hostname")?.trim().to_string())
    }

    /// Reads load averages, memory, swap, uptime and hostname.
    pub fn summary(&self) -> Result<SystemSummary, CollectError> {
        let load =
            parse_loadavg(&self.read("loadavg")?).map_err(|e| CollectError::Parse(e.message))?;
        let mem =
            parse_meminfo(&self.read("meminfo")?).map_err(|e| CollectError::Parse(e.message))?;
        let uptime_secs =
            parse_uptime(&self.read("uptime")?).map_err(|e| CollectError::Parse(e.message))?;
        let hostname = self.hostname()?;

        Ok(SystemSummary {
            hostname,
            load1: load.load1,
            load5: load.load5,
            load15: load.load15,
            mem_total: mem.mem_total * 1024,
            mem_free: mem.mem_free * 1024,
            swap_total: mem.swap_total * 1024,
            swap_free: mem.swap_free * 1024,
            uptime_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;

    #[test]
    fn test_summary() {
        let collector = SystemCollector::new(MockFs::two_process_system(), "/proc");
        let summary = collector.summary().unwrap();

        assert_eq!(summary.hostname, "sentinel-test");
        assert_eq!(summary.load1, 0.15);
        assert_eq!(summary.load15, 0.05);
        assert_eq!(summary.mem_total, 16_384_000 * 1024);
        assert_eq!(summary.swap_free, 2_048_000 * 1024);
        assert_eq!(summary.uptime_secs, 1000.0);
    }

    #[test]
    fn test_summary_missing_source() {
        let mut fs = MockFs::two_process_system();
        fs.remove("/proc/loadavg");
        let collector = SystemCollector::new(fs, "/proc");
        assert!(matches!(
            collector.summary(),
            Err(CollectError::Unavailable { .. })
        ));
    }
}
