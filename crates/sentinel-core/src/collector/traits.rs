//! Abstractions over kernel-exposed sources to enable testing and mocking.
//!
//! The `SystemSource` trait allows the collectors to work with both the real
//! `/proc` filesystem on Linux and in-memory fixtures in tests.

use std::io;
use std::path::{Path, PathBuf};

use crate::model::InterfaceAddress;

/// Subset of file status the collectors care about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileStat {
    /// Inode number of the object the path resolves to.
    pub inode: u64,
    /// Numeric owner id.
    pub uid: u32,
}

/// Narrow read-only capability over the host.
///
/// Every collector goes through this trait, so the same algorithms run
/// against a live kernel or against [`MockFs`](crate::collector::MockFs).
pub trait SystemSource: Send + Sync {
    /// Reads the entire contents of a file as a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Checks if a path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Lists entries in a directory.
    ///
    /// # Returns
    /// A vector of full paths to entries in the directory, or an I/O error.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Returns the status of the object `path` resolves to.
    ///
    /// Symlinks are followed, so `/proc/[pid]/fd/[n]` yields the inode of
    /// the open file or socket rather than of the link itself.
    fn stat(&self, path: &Path) -> io::Result<FileStat>;

    /// Kernel clock ticks per second (USER_HZ).
    fn clock_ticks(&self) -> u64;

    /// IPv4 and IPv6 addresses of every interface, in kernel order.
    fn interface_addresses(&self) -> io::Result<Vec<InterfaceAddress>>;
}

/// Fallback when the host does not report a tick rate.
pub const DEFAULT_CLOCK_TICKS: u64 = 100;

/// Real host implementation that delegates to `std::fs` and `libc`.
///
/// Use this in production to read from the actual `/proc` filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    /// Creates a new `RealFs` instance.
    pub fn new() -> Self {
        Self
    }
}

impl SystemSource for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(path)?;
        let mut paths = Vec::new();
        for entry in entries {
            paths.push(entry?.path());
        }
        Ok(paths)
    }

    #[cfg(unix)]
    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        use std::os::unix::fs::MetadataExt;

        let meta = std::fs::metadata(path)?;
        Ok(FileStat {
            inode: meta.ino(),
            uid: meta.uid(),
        })
    }

    #[cfg(not(unix))]
    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        std::fs::metadata(path)?;
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "inode and owner are only available on unix",
        ))
    }

    fn clock_ticks(&self) -> u64 {
        #[cfg(unix)]
        {
            // SAFETY: sysconf has no preconditions; -1 and 0 are handled below.
            let tck = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };
            if tck > 0 {
                return tck as u64;
            }
        }
        DEFAULT_CLOCK_TICKS
    }

    #[cfg(target_os = "linux")]
    fn interface_addresses(&self) -> io::Result<Vec<InterfaceAddress>> {
        ifaddrs::list()
    }

    #[cfg(not(target_os = "linux"))]
    fn interface_addresses(&self) -> io::Result<Vec<InterfaceAddress>> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "interface listing is only available on linux",
        ))
    }
}

#[cfg(target_os = "linux")]
mod ifaddrs {
    use std::ffi::CStr;
    use std::io;
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

    use crate::model::InterfaceAddress;

    /// Walks the `getifaddrs(3)` list, keeping inet and inet6 entries.
    pub(super) fn list() -> io::Result<Vec<InterfaceAddress>> {
        let mut head: *mut libc::ifaddrs = std::ptr::null_mut();
        // SAFETY: on success `head` owns a list released by freeifaddrs below.
        if unsafe { libc::getifaddrs(&mut head) } != 0 {
            return Err(io::Error::last_os_error());
        }

        let mut out = Vec::new();
        let mut cursor = head;
        while !cursor.is_null() {
            // SAFETY: `cursor` is a node of the live list returned above.
            let entry = unsafe { &*cursor };
            cursor = entry.ifa_next;

            if entry.ifa_name.is_null() {
                continue;
            }
            // SAFETY: address pointers are null or point at a sockaddr of the
            // family it announces.
            let Some(address) = (unsafe { to_ip(entry.ifa_addr) }) else {
                continue;
            };
            let prefix = unsafe { to_ip(entry.ifa_netmask) }.map_or(0, prefix_len);
            // SAFETY: ifa_name is a NUL-terminated string owned by the list.
            let name = unsafe { CStr::from_ptr(entry.ifa_name) }
                .to_string_lossy()
                .into_owned();

            out.push(InterfaceAddress {
                name,
                address,
                prefix_len: prefix,
            });
        }

        // SAFETY: `head` came from a successful getifaddrs and is freed once.
        unsafe { libc::freeifaddrs(head) };
        Ok(out)
    }

    /// # Safety
    /// `addr` must be null or point at a valid sockaddr of its declared family.
    unsafe fn to_ip(addr: *const libc::sockaddr) -> Option<IpAddr> {
        if addr.is_null() {
            return None;
        }
        // SAFETY: guaranteed by the caller.
        unsafe {
            match i32::from((*addr).sa_family) {
                libc::AF_INET => {
                    let sin = &*(addr as *const libc::sockaddr_in);
                    Some(IpAddr::V4(Ipv4Addr::from(u32::from_be(sin.sin_addr.s_addr))))
                }
                libc::AF_INET6 => {
                    let sin6 = &*(addr as *const libc::sockaddr_in6);
                    Some(IpAddr::V6(Ipv6Addr::from(sin6.sin6_addr.s6_addr)))
                }
                _ => None,
            }
        }
    }

    /// Number of leading one bits of a netmask.
    pub(super) fn prefix_len(mask: IpAddr) -> u8 {
        let ones = match mask {
            IpAddr::V4(m) => u32::from(m).count_ones(),
            IpAddr::V6(m) => u128::from(m).count_ones(),
        };
        ones as u8
    }
}
