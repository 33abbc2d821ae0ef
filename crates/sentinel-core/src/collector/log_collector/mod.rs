//! Collectors for service logs: sshd authentications and nginx errors.
//!
//! Each call reads the whole file; rotation is left to logrotate.

pub mod nginx;
pub mod ssh;

use std::path::Path;

use tracing::debug;

use crate::collector::procfs::CollectError;
use crate::collector::traits::SystemSource;
use crate::model::{NginxReport, SshReport};

/// Reads and parses log files through a [`SystemSource`].
pub struct LogCollector<F: SystemSource> {
    fs: F,
}

impl<F: SystemSource> LogCollector<F> {
    pub fn new(fs: F) -> Self {
        Self { fs }
    }

    fn read(&self, path: &Path) -> Result<String, CollectError> {
        self.fs
            .read_to_string(path)
            .map_err(|e| CollectError::unavailable(path, e))
    }

    /// Accepted logins, plus failed attempts per address when `failed` is set.
    pub fn ssh(&self, path: &Path, failed: bool, multiple: bool) -> Result<SshReport, CollectError> {
        let content = self.read(path)?;
        let report = SshReport {
            accepted: ssh::parse_accepted_logins(&content),
            failed: failed.then(|| ssh::parse_failed_logins(&content, multiple)),
        };
        debug!(
            path = %path.display(),
            accepted = report.accepted.len(),
            "ssh log parsed"
        );
        Ok(report)
    }

    /// Client and server error responses of an nginx access log.
    pub fn nginx(&self, path: &Path) -> Result<NginxReport, CollectError> {
        let content = self.read(path)?;
        let report =
            nginx::parse_access_log(&content).map_err(|e| CollectError::Parse(e.message))?;
        debug!(
            path = %path.display(),
            client = report.client_errors.len(),
            server = report.server_errors.len(),
            "nginx log parsed"
        );
        Ok(report)
    }
}
