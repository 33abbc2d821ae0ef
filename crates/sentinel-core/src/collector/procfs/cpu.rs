//! CPU utilisation from per-process accounting.
//!
//! Usage is the average since process start, not a sampled rate:
//!
//! ```text
//! total   = (utime + stime + cutime + cstime) / HZ
//! elapsed = uptime - starttime / HZ
//! cpu%    = 100 * total / elapsed
//! ```

use std::path::Path;

use crate::collector::procfs::parser::{ProcStat, parse_uptime};
use crate::collector::procfs::process::CollectError;
use crate::collector::traits::SystemSource;

/// Clock tick rate plus uptime, sampled together for one computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeBase {
    pub ticks_per_second: u64,
    pub uptime_secs: f64,
}

impl TimeBase {
    /// Reads `/proc/uptime` and pairs it with `ticks_per_second`.
    pub fn read<F: SystemSource>(
        fs: &F,
        proc_path: &str,
        ticks_per_second: u64,
    ) -> Result<Self, CollectError> {
        let path = format!("{}/uptime", proc_path);
        let content = fs
            .read_to_string(Path::new(&path))
            .map_err(|e| CollectError::unavailable(Path::new(&path), e))?;
        let uptime_secs = parse_uptime(&content).map_err(|e| CollectError::Parse(e.message))?;

        Ok(Self {
            ticks_per_second,
            uptime_secs,
        })
    }
}

/// Average CPU usage of a process since it started, in percent.
///
/// Returns 0.0 when the elapsed time is not positive (the process appears
/// to start after the uptime sample) or the tick rate is zero.
pub fn cpu_usage_percent(stat: &ProcStat, time_base: &TimeBase) -> f64 {
    if time_base.ticks_per_second == 0 {
        return 0.0;
    }
    let hz = time_base.ticks_per_second as f64;

    let total_ticks =
        stat.utime as f64 + stat.stime as f64 + stat.cutime as f64 + stat.cstime as f64;
    let elapsed = time_base.uptime_secs - stat.starttime as f64 / hz;
    if elapsed <= 0.0 {
        return 0.0;
    }

    let percent = 100.0 * (total_ticks / hz) / elapsed;
    if percent.is_finite() { percent } else { 0.0 }
}
