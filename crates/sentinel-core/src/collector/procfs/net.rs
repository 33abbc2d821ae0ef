//! Listening sockets from the `/proc/net/*` connection tables.

use std::path::Path;

use crate::collector::procfs::parser::parse_net_table;
use crate::collector::procfs::process::CollectError;
use crate::collector::traits::SystemSource;
use crate::model::{Protocol, SocketEntry};

/// Reads the per-protocol connection tables.
pub struct SocketTable<F: SystemSource> {
    fs: F,
    proc_path: String,
}

impl<F: SystemSource> SocketTable<F> {
    pub fn new(fs: F, proc_path: impl Into<String>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
        }
    }

    /// Returns the listening entries of `protocol`, in table order.
    ///
    /// A missing table or an unreadable row fails the whole scan.
    pub fn listening(&self, protocol: Protocol) -> Result<Vec<SocketEntry>, CollectError> {
        let path = format!("{}/net/{}", self.proc_path, protocol.table_name());
        let content = self
            .fs
            .read_to_string(Path::new(&path))
            .map_err(|e| CollectError::unavailable(Path::new(&path), e))?;
        parse_net_table(&content, protocol).map_err(|e| CollectError::Parse(e.message))
    }
}
