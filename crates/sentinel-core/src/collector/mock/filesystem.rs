//! In-memory mock filesystem for testing collectors without real `/proc`.
//!
//! `MockFs` simulates files, directories, file status and the clock tick
//! rate, so tests run on any host and in CI.

use crate::collector::traits::{DEFAULT_CLOCK_TICKS, FileStat, SystemSource};
use crate::model::InterfaceAddress;
use std::collections::{HashMap, HashSet};
use std::io;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

/// In-memory filesystem for testing.
#[derive(Debug, Clone)]
pub struct MockFs {
    /// Map from path to file contents.
    files: HashMap<PathBuf, String>,
    /// Set of directories (for read_dir support).
    directories: HashSet<PathBuf>,
    /// Explicit file status; existing paths without an entry stat as zero.
    stats: HashMap<PathBuf, FileStat>,
    clock_ticks: u64,
    interfaces: Vec<InterfaceAddress>,
}

impl Default for MockFs {
    fn default() -> Self {
        Self {
            files: HashMap::new(),
            directories: HashSet::new(),
            stats: HashMap::new(),
            clock_ticks: DEFAULT_CLOCK_TICKS,
            interfaces: Vec::new(),
        }
    }
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file with the given content.
    ///
    /// Parent directories are automatically created.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.files.insert(path, content.into());
    }

    /// Adds an empty directory.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.directories.insert(path);
    }

    /// Removes a file or a whole directory subtree.
    pub fn remove(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.files.retain(|p, _| !p.starts_with(path));
        self.directories.retain(|p| !p.starts_with(path));
        self.stats.retain(|p, _| !p.starts_with(path));
    }

    fn add_parents(&mut self, path: &Path) {
        let mut parent = path.parent();
        while let Some(p) = parent {
            if !p.as_os_str().is_empty() {
                self.directories.insert(p.to_path_buf());
            }
            parent = p.parent();
        }
    }

    /// Sets the status returned by `stat` for `path`.
    pub fn set_stat(&mut self, path: impl AsRef<Path>, stat: FileStat) {
        self.stats.insert(path.as_ref().to_path_buf(), stat);
    }

    /// Sets the clock tick rate reported by the fixture.
    pub fn set_clock_ticks(&mut self, ticks: u64) {
        self.clock_ticks = ticks;
    }

    /// Appends an interface address, e.g. `add_interface("eth0", [192, 0, 2, 10], 24)`.
    pub fn add_interface(&mut self, name: &str, address: impl Into<IpAddr>, prefix_len: u8) {
        self.interfaces.push(InterfaceAddress {
            name: name.to_string(),
            address: address.into(),
            prefix_len,
        });
    }

    /// Adds a process with its `/proc/[pid]/` files.
    ///
    /// # Arguments
    /// * `pid` - Process ID
    /// * `uid` - Owner of `/proc/[pid]`
    /// * `stat` - Content of `/proc/[pid]/stat`
    /// * `smaps` - Content of `/proc/[pid]/smaps`
    pub fn add_process(&mut self, pid: u32, uid: u32, stat: &str, smaps: &str) {
        let base = PathBuf::from(format!("/proc/{}", pid));
        self.add_dir(&base);
        self.add_dir(base.join("fd"));
        self.set_stat(&base, FileStat { inode: 0, uid });
        self.add_file(base.join("stat"), stat);
        self.add_file(base.join("smaps"), smaps);
    }

    /// Adds an open descriptor to `/proc/[pid]/fd` resolving to `inode`.
    pub fn add_fd(&mut self, pid: u32, fd: u32, inode: u64) {
        let path = PathBuf::from(format!("/proc/{}/fd/{}", pid, fd));
        self.add_file(&path, "");
        self.set_stat(&path, FileStat { inode, uid: 0 });
    }

    /// Writes a `/proc/net/<table>` file with the kernel header line.
    ///
    /// Each row is the tuple `(local_address, state, inode)`.
    pub fn add_net_table(&mut self, table: &str, rows: &[(&str, &str, u64)]) {
        let mut content = String::from(
            "  sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode\n",
        );
        for (i, (local, state, inode)) in rows.iter().enumerate() {
            let remote = if local.len() > 13 {
                "00000000000000000000000000000000:0000"
            } else {
                "00000000:0000"
            };
            content.push_str(&format!(
                "{:>4}: {} {} {} 00000000:00000000 00:00000000 00000000     0        0 {} 1 0000000000000000 100 0 0 10 0\n",
                i, local, remote, state, inode
            ));
        }
        self.add_file(format!("/proc/net/{}", table), content);
    }
}

impl SystemSource for MockFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {:?}", path),
            )
        })
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path) || self.directories.contains(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        if !self.directories.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("directory not found: {:?}", path),
            ));
        }

        let mut entries = HashSet::new();

        for file_path in self.files.keys() {
            if file_path.parent().is_some_and(|parent| parent == path) {
                entries.insert(file_path.clone());
            }
        }

        for dir_path in &self.directories {
            if dir_path.parent().is_some_and(|parent| parent == path) && dir_path != path {
                entries.insert(dir_path.clone());
            }
        }

        Ok(entries.into_iter().collect())
    }

    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        if let Some(stat) = self.stats.get(path) {
            return Ok(*stat);
        }
        if self.exists(path) {
            return Ok(FileStat::default());
        }
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no such file: {:?}", path),
        ))
    }

    fn clock_ticks(&self) -> u64 {
        self.clock_ticks
    }

    fn interface_addresses(&self) -> io::Result<Vec<InterfaceAddress>> {
        Ok(self.interfaces.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_fs_add_file() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/meminfo", "MemTotal: 16384 kB\n");

        assert!(fs.exists(Path::new("/proc/meminfo")));
        assert!(fs.exists(Path::new("/proc")));

        let content = fs.read_to_string(Path::new("/proc/meminfo")).unwrap();
        assert_eq!(content, "MemTotal: 16384 kB\n");
    }

    #[test]
    fn test_mock_fs_read_dir() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/1/stat", "stat content");
        fs.add_file("/proc/1/smaps", "smaps content");
        fs.add_file("/proc/2/stat", "stat content 2");

        let proc_entries = fs.read_dir(Path::new("/proc")).unwrap();
        assert_eq!(proc_entries.len(), 2);

        let proc1_entries = fs.read_dir(Path::new("/proc/1")).unwrap();
        assert_eq!(proc1_entries.len(), 2);
    }

    #[test]
    fn test_mock_fs_fd_stat() {
        let mut fs = MockFs::new();
        fs.add_process(42, 1000, "42 (sh) S", "");
        fs.add_fd(42, 3, 777);

        let fds = fs.read_dir(Path::new("/proc/42/fd")).unwrap();
        assert_eq!(fds, vec![PathBuf::from("/proc/42/fd/3")]);
        assert_eq!(fs.stat(Path::new("/proc/42/fd/3")).unwrap().inode, 777);
        assert_eq!(fs.stat(Path::new("/proc/42")).unwrap().uid, 1000);
    }

    #[test]
    fn test_mock_fs_remove_subtree() {
        let mut fs = MockFs::new();
        fs.add_process(42, 0, "42 (sh) S", "");
        fs.add_fd(42, 0, 1);
        fs.remove("/proc/42");

        assert!(!fs.exists(Path::new("/proc/42")));
        assert!(fs.stat(Path::new("/proc/42/fd/0")).is_err());
        assert!(fs.read_dir(Path::new("/proc")).unwrap().is_empty());
    }

    #[test]
    fn test_mock_fs_interfaces_keep_order() {
        let mut fs = MockFs::new();
        fs.add_interface("eth0", [192, 0, 2, 10], 24);
        fs.add_interface("eth0", [0x2001, 0xdb8, 0, 0, 0, 0, 0, 0x10], 64);

        let addrs = fs.interface_addresses().unwrap();
        assert_eq!(addrs.len(), 2);
        assert_eq!(addrs[1].cidr(), "2001:db8::10/64");
    }

    #[test]
    fn test_mock_fs_not_found() {
        let fs = MockFs::new();
        let result = fs.read_to_string(Path::new("/nonexistent"));
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
        assert!(fs.stat(Path::new("/nonexistent")).is_err());
    }
}
