//! Process collector for gathering per-process records from `/proc/[pid]/`.

use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::collector::procfs::cpu::{TimeBase, cpu_usage_percent};
use crate::collector::procfs::parser::{
    ProcStat, UserResolver, parse_proc_stat, parse_smaps_pss,
};
use crate::collector::traits::SystemSource;
use crate::model::ProcessRecord;

/// Error type for collection failures.
#[derive(Debug)]
pub enum CollectError {
    /// Process disappeared during collection.
    ProcessGone(u32),
    /// A host-wide source could not be opened at all.
    Unavailable { path: String, source: io::Error },
    /// I/O error reading a source.
    Io(io::Error),
    /// Source content does not match the kernel format.
    Parse(String),
}

impl CollectError {
    pub(crate) fn unavailable(path: &Path, source: io::Error) -> Self {
        CollectError::Unavailable {
            path: path.display().to_string(),
            source,
        }
    }
}

impl std::fmt::Display for CollectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectError::ProcessGone(pid) => write!(f, "process {} disappeared", pid),
            CollectError::Unavailable { path, source } => {
                write!(f, "cannot open {}: {}", path, source)
            }
            CollectError::Io(e) => write!(f, "I/O error: {}", e),
            CollectError::Parse(msg) => write!(f, "parse error: {}", msg),
        }
    }
}

impl std::error::Error for CollectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollectError::Unavailable { source, .. } => Some(source),
            CollectError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for CollectError {
    fn from(e: io::Error) -> Self {
        CollectError::Io(e)
    }
}

/// Lists the numeric entries of the proc root, ascending.
///
/// Non-numeric entries (`self`, `net`, `uptime`, ...) are skipped.
pub fn list_pids<F: SystemSource>(fs: &F, proc_path: &str) -> Result<Vec<u32>, CollectError> {
    let root = Path::new(proc_path);
    let entries = fs
        .read_dir(root)
        .map_err(|e| CollectError::unavailable(root, e))?;

    let mut pids: Vec<u32> = entries
        .iter()
        .filter_map(|entry| entry.file_name()?.to_str()?.parse::<u32>().ok())
        .collect();
    pids.sort_unstable();
    Ok(pids)
}

/// Collects process records from `/proc/[pid]/` files.
pub struct ProcessCollector<F: SystemSource> {
    fs: F,
    proc_path: String,
}

impl<F: SystemSource> ProcessCollector<F> {
    /// Creates a new process collector.
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

    fn pid_path(&self, pid: u32) -> PathBuf {
        PathBuf::from(format!("{}/{}", self.proc_path, pid))
    }

    /// Returns the identifiers of all live processes.
    pub fn list_pids(&self) -> Result<Vec<u32>, CollectError> {
        list_pids(&self.fs, &self.proc_path)
    }

    /// Reads the accounting record of `pid` from `/proc/[pid]/stat`.
    pub fn read_stat(&self, pid: u32) -> Result<ProcStat, CollectError> {
        let path = self.pid_path(pid).join("stat");
        let content = self
            .fs
            .read_to_string(&path)
            .map_err(|_| CollectError::ProcessGone(pid))?;
        parse_proc_stat(&content)
            .map_err(|e| CollectError::Parse(format!("pid {}: {}", pid, e.message)))
    }

    /// Returns the numeric owner of `/proc/[pid]`.
    pub fn read_owner(&self, pid: u32) -> Result<u32, CollectError> {
        self.fs
            .stat(&self.pid_path(pid))
            .map(|s| s.uid)
            .map_err(|_| CollectError::ProcessGone(pid))
    }

    /// Sums the proportional set size over all mappings, in MiB (truncated).
    pub fn read_memory_mib(&self, pid: u32) -> Result<u64, CollectError> {
        let path = self.pid_path(pid).join("smaps");
        let content = self
            .fs
            .read_to_string(&path)
            .map_err(|_| CollectError::ProcessGone(pid))?;
        let pss_kb = parse_smaps_pss(&content)
            .map_err(|e| CollectError::Parse(format!("pid {}: {}", pid, e.message)))?;
        Ok(pss_kb / 1024)
    }

    /// Reads the current time base using the given tick rate.
    pub fn time_base(&self, ticks_per_second: u64) -> Result<TimeBase, CollectError> {
        TimeBase::read(&self.fs, &self.proc_path, ticks_per_second)
    }

    /// Collects the record of a single process.
    ///
    /// An owner without a passwd entry is reported as the pid itself.
    /// Uptime is sampled right after the stat record so both come from
    /// (almost) the same instant.
    pub fn collect_process(
        &self,
        pid: u32,
        ticks_per_second: u64,
        users: &UserResolver,
    ) -> Result<ProcessRecord, CollectError> {
        let stat = self.read_stat(pid)?;
        let time_base = self.time_base(ticks_per_second)?;
        let uid = self.read_owner(pid)?;
        let memory_mib = self.read_memory_mib(pid)?;

        let cpu_percent = cpu_usage_percent(&stat, &time_base);
        let user = users
            .lookup(uid)
            .map_or_else(|| pid.to_string(), str::to_string);

        Ok(ProcessRecord {
            pid,
            name: stat.comm,
            user,
            cpu_percent,
            memory_mib,
        })
    }

    /// Collects records for all processes.
    ///
    /// The tick rate is queried once for the whole pass. Processes that
    /// disappear during collection are skipped; any other failure aborts.
    pub fn collect_all_processes(
        &self,
        users: &UserResolver,
    ) -> Result<Vec<ProcessRecord>, CollectError> {
        let ticks = self.fs.clock_ticks();
        let mut records = Vec::new();

        for pid in self.list_pids()? {
            match self.collect_process(pid, ticks, users) {
                Ok(record) => records.push(record),
                Err(CollectError::ProcessGone(_)) => {
                    debug!(pid, "process vanished during collection, skipping");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(records)
    }
}
