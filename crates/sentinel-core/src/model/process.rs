use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One row of the process report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessRecord {
    pub pid: u32,
    /// Kernel-assigned name without the surrounding parentheses.
    pub name: String,
    /// Owner user name, or the pid when the owner has no passwd entry.
    pub user: String,
    /// Average CPU utilisation since process start, in percent.
    pub cpu_percent: f64,
    /// Proportional set size in MiB (truncated).
    pub memory_mib: u64,
}

impl ProcessRecord {
    /// CPU usage as shown in reports: three decimal places.
    pub fn cpu_usage(&self) -> String {
        format!("{:.3}", self.cpu_percent)
    }
}

/// Ordering applied to the process report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Ascending process id.
    #[default]
    Pid,
    /// Ascending name.
    Name,
    /// Ascending user name.
    User,
    /// Descending CPU usage, compared at the three decimals shown.
    Cpu,
    /// Descending memory usage.
    Memory,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        SortKey::Pid,
        SortKey::Name,
        SortKey::User,
        SortKey::Cpu,
        SortKey::Memory,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Pid => "pid",
            SortKey::Name => "name",
            SortKey::User => "user",
            SortKey::Cpu => "cpu",
            SortKey::Memory => "memory",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no [`SortKey`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSortKeyError(pub String);

impl fmt::Display for ParseSortKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid sort key '{}' (expected pid, name, user, cpu or memory)",
            self.0
        )
    }
}

impl std::error::Error for ParseSortKeyError {}

impl FromStr for SortKey {
    type Err = ParseSortKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ParseSortKeyError(s.to_string()))
    }
}
