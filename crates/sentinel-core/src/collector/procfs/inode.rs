//! Maps a socket inode back to the process holding it.
//!
//! The kernel has no reverse index from inode to owner, so every lookup
//! walks `/proc/[pid]/fd/*` of every live process. Nothing is cached
//! between lookups; descriptor tables change constantly.

use std::path::Path;

use tracing::trace;

use crate::collector::procfs::parser::parse_proc_stat;
use crate::collector::procfs::process::{CollectError, list_pids};
use crate::collector::traits::SystemSource;

/// Finds the owner of an open file or socket by inode.
pub struct InodeResolver<F: SystemSource> {
    fs: F,
    proc_path: String,
}

impl<F: SystemSource> InodeResolver<F> {
    pub fn new(fs: F, proc_path: impl Into<String>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
        }
    }

    /// Returns the name of the first process with a descriptor on `inode`.
    ///
    /// `Ok(None)` means no owner was found, typically because the socket
    /// closed or the owner exited after the table was read. Processes whose
    /// descriptors cannot be listed or stat'ed are passed over.
    pub fn resolve(&self, inode: u64) -> Result<Option<String>, CollectError> {
        for pid in list_pids(&self.fs, &self.proc_path)? {
            let fd_dir = format!("{}/{}/fd", self.proc_path, pid);
            let Ok(fds) = self.fs.read_dir(Path::new(&fd_dir)) else {
                continue;
            };

            let holds_inode = fds
                .iter()
                .any(|fd| self.fs.stat(fd).is_ok_and(|s| s.inode == inode));
            if !holds_inode {
                continue;
            }

            let stat_path = format!("{}/{}/stat", self.proc_path, pid);
            match self.fs.read_to_string(Path::new(&stat_path)) {
                Ok(content) => {
                    let stat = parse_proc_stat(&content)
                        .map_err(|e| CollectError::Parse(format!("pid {}: {}", pid, e.message)))?;
                    return Ok(Some(stat.comm));
                }
                Err(_) => {
                    trace!(pid, inode, "owner exited before its name was read");
                }
            }
        }

        Ok(None)
    }
}
