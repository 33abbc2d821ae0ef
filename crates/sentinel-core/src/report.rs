//! Report assembly: deduplication and ordering of collected records.
//!
//! No formatting happens here; renderers receive plain ordered records.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::model::{PortEntry, ProcessRecord, SocketEntry, SortKey, UNKNOWN_OWNER};

fn by_pid(a: &ProcessRecord, b: &ProcessRecord) -> Ordering {
    a.pid.cmp(&b.pid)
}

fn by_name(a: &ProcessRecord, b: &ProcessRecord) -> Ordering {
    a.name.cmp(&b.name)
}

fn by_user(a: &ProcessRecord, b: &ProcessRecord) -> Ordering {
    a.user.cmp(&b.user)
}

/// CPU usage at display precision, so equal rendered values tie.
fn cpu_millis(r: &ProcessRecord) -> f64 {
    (r.cpu_percent * 1000.0).round()
}

fn by_cpu_desc(a: &ProcessRecord, b: &ProcessRecord) -> Ordering {
    cpu_millis(b).total_cmp(&cpu_millis(a))
}

fn by_memory_desc(a: &ProcessRecord, b: &ProcessRecord) -> Ordering {
    b.memory_mib.cmp(&a.memory_mib)
}

/// Comparator for a sort key.
pub fn comparator(key: SortKey) -> fn(&ProcessRecord, &ProcessRecord) -> Ordering {
    match key {
        SortKey::Pid => by_pid,
        SortKey::Name => by_name,
        SortKey::User => by_user,
        SortKey::Cpu => by_cpu_desc,
        SortKey::Memory => by_memory_desc,
    }
}

/// Orders the process report by `key`.
///
/// Ties keep ascending pid order.
pub fn sort_processes(records: &mut [ProcessRecord], key: SortKey) {
    records.sort_by(by_pid);
    records.sort_by(comparator(key));
}

/// Keeps the first socket seen for each port.
pub fn dedup_sockets(sockets: impl IntoIterator<Item = SocketEntry>) -> Vec<SocketEntry> {
    let mut seen = HashSet::new();
    sockets
        .into_iter()
        .filter(|s| seen.insert(s.port))
        .collect()
}

/// Builds the port report for one protocol.
///
/// Sockets are deduplicated by port (first wins), each survivor's owner is
/// looked up through `resolve`, and the result is ordered by ascending port.
pub fn port_report<E>(
    sockets: impl IntoIterator<Item = SocketEntry>,
    mut resolve: impl FnMut(u64) -> Result<Option<String>, E>,
) -> Result<Vec<PortEntry>, E> {
    let mut entries = Vec::new();
    for socket in dedup_sockets(sockets) {
        let process = resolve(socket.inode)?.unwrap_or_else(|| UNKNOWN_OWNER.to_string());
        entries.push(PortEntry {
            port: socket.port,
            process,
        });
    }
    entries.sort_by_key(|e| e.port);
    Ok(entries)
}
