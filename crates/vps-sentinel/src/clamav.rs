//! ClamAV scan runner.
//!
//! Blocks until `clamscan` finishes; there is no timeout.

use std::fmt;
use std::path::Path;
use std::process::Command;

use tracing::{debug, info};

const SYSTEMCTL: &str = "/bin/systemctl";
const FRESHCLAM: &str = "/usr/bin/freshclam";
const CLAMSCAN: &str = "/usr/bin/clamscan";

/// Error running one of the ClamAV tools.
#[derive(Debug)]
pub enum ScanError {
    Spawn(&'static str, std::io::Error),
    Update(String),
    Scan { path: String, stderr: String },
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::Spawn(tool, e) => write!(f, "failed to run {}: {}", tool, e),
            ScanError::Update(out) => write!(f, "freshclam failed: {}", out.trim()),
            ScanError::Scan { path, stderr } => {
                write!(f, "failed to scan {}: {}", path, stderr.trim())
            }
        }
    }
}

impl std::error::Error for ScanError {}

/// Outcome of scanning one path.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ScanReport {
    pub path: String,
    /// `clamscan -i` output: infected files plus the summary block.
    pub output: String,
    pub infected: bool,
}

/// Updates the signature database unless the freshclam daemon runs.
fn update_database() -> Result<(), ScanError> {
    let active = Command::new(SYSTEMCTL)
        .args(["-q", "is-active", "clamav-freshclam.service"])
        .status()
        .is_ok_and(|s| s.success());
    if active {
        debug!("freshclam service active, skipping manual update");
        return Ok(());
    }

    info!("updating ClamAV database");
    let out = Command::new(FRESHCLAM)
        .arg("--quiet")
        .output()
        .map_err(|e| ScanError::Spawn(FRESHCLAM, e))?;
    if !out.status.success() {
        let mut msg = String::from_utf8_lossy(&out.stdout).into_owned();
        msg.push_str(&String::from_utf8_lossy(&out.stderr));
        return Err(ScanError::Update(msg));
    }
    Ok(())
}

/// Maps a clamscan exit code: 0 clean, 1 infected, anything else failed.
fn classify_exit(code: Option<i32>) -> Option<bool> {
    match code {
        Some(0) => Some(false),
        Some(1) => Some(true),
        _ => None,
    }
}

/// Scans `path` recursively, reporting infected files only.
pub fn scan(path: &Path) -> Result<ScanReport, ScanError> {
    update_database()?;

    let out = Command::new(CLAMSCAN)
        .args(["-i", "-r"])
        .arg(path)
        .output()
        .map_err(|e| ScanError::Spawn(CLAMSCAN, e))?;

    let path = path.display().to_string();
    let infected = classify_exit(out.status.code()).ok_or_else(|| ScanError::Scan {
        path: path.clone(),
        stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
    })?;

    Ok(ScanReport {
        path,
        output: String::from_utf8_lossy(&out.stdout).into_owned(),
        infected,
    })
}
