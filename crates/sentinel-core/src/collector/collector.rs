//! Main collector that combines the process, socket and system collectors.
//!
//! Every call opens fresh handles to all sources; nothing is carried over
//! from one report to the next.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::collector::log_collector::LogCollector;
use crate::collector::procfs::{
    CollectError, InodeResolver, ProcessCollector, SocketTable, SystemCollector, UserResolver,
};
use crate::collector::traits::SystemSource;
use crate::model::{
    InterfaceAddress, LOOPBACK_INTERFACE, NginxReport, PortEntry, ProcessRecord, Protocol,
    SortKey, SshReport, SystemSummary,
};
use crate::report;

/// Facade over the individual collectors.
pub struct Collector<F: SystemSource + Clone> {
    fs: F,
    process_collector: ProcessCollector<F>,
    socket_table: SocketTable<F>,
    inode_resolver: InodeResolver<F>,
    system_collector: SystemCollector<F>,
    log_collector: LogCollector<F>,
    passwd_path: PathBuf,
}

impl<F: SystemSource + Clone> Collector<F> {
    /// Default location of the identity mapping.
    pub const DEFAULT_PASSWD_PATH: &'static str = "/etc/passwd";

    /// Creates a new collector.
    ///
    /// # Arguments
    /// * `fs` - System source implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: F, proc_path: impl Into<String>) -> Self {
        let proc_path = proc_path.into();
        Self {
            fs: fs.clone(),
            process_collector: ProcessCollector::new(fs.clone(), &proc_path),
            socket_table: SocketTable::new(fs.clone(), &proc_path),
            inode_resolver: InodeResolver::new(fs.clone(), &proc_path),
            system_collector: SystemCollector::new(fs.clone(), &proc_path),
            log_collector: LogCollector::new(fs),
            passwd_path: PathBuf::from(Self::DEFAULT_PASSWD_PATH),
        }
    }

    /// Overrides the passwd file used for user names.
    pub fn with_passwd_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.passwd_path = path.into();
        self
    }

    fn load_users(&self) -> UserResolver {
        let mut users = UserResolver::new();
        match self.fs.read_to_string(Path::new(&self.passwd_path)) {
            Ok(content) => users.load_from_content(&content),
            Err(e) => warn!(
                path = %self.passwd_path.display(),
                error = %e,
                "cannot read passwd, owners fall back to pids"
            ),
        }
        users
    }

    /// Lists all live processes ordered by `sort`.
    pub fn process_report(&self, sort: SortKey) -> Result<Vec<ProcessRecord>, CollectError> {
        let users = self.load_users();
        let mut records = self.process_collector.collect_all_processes(&users)?;
        report::sort_processes(&mut records, sort);
        debug!(count = records.len(), %sort, "process report assembled");
        Ok(records)
    }

    /// Lists the listening ports of `protocol` with their owners.
    pub fn port_report(&self, protocol: Protocol) -> Result<Vec<PortEntry>, CollectError> {
        let sockets = self.socket_table.listening(protocol)?;
        let entries = report::port_report(sockets, |inode| self.inode_resolver.resolve(inode))?;
        debug!(count = entries.len(), %protocol, "port report assembled");
        Ok(entries)
    }

    /// Kernel host name.
    pub fn hostname(&self) -> Result<String, CollectError> {
        self.system_collector.hostname()
    }

    /// Reads the host-wide summary.
    pub fn system_summary(&self) -> Result<SystemSummary, CollectError> {
        self.system_collector.summary()
    }

    /// Addresses of every interface except loopback, in kernel order.
    pub fn interface_report(&self) -> Result<Vec<InterfaceAddress>, CollectError> {
        let mut addrs = self
            .fs
            .interface_addresses()
            .map_err(|e| CollectError::unavailable(Path::new("getifaddrs"), e))?;
        addrs.retain(|a| a.name != LOOPBACK_INTERFACE);
        debug!(count = addrs.len(), "interface report assembled");
        Ok(addrs)
    }

    /// Accepted SSH logins from `path`, with failures per address if `failed`.
    pub fn ssh_report(
        &self,
        path: &Path,
        failed: bool,
        multiple: bool,
    ) -> Result<SshReport, CollectError> {
        self.log_collector.ssh(path, failed, multiple)
    }

    /// 4xx and 5xx responses from the nginx access log at `path`.
    pub fn nginx_report(&self, path: &Path) -> Result<NginxReport, CollectError> {
        self.log_collector.nginx(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;
    use crate::model::UNKNOWN_OWNER;

    #[test]
    fn test_two_process_scenario_ports() {
        let collector = Collector::new(MockFs::two_process_system(), "/proc");
        let ports = collector.port_report(Protocol::Tcp).unwrap();

        assert_eq!(
            ports,
            vec![PortEntry {
                port: 8080,
                process: "worker".into()
            }]
        );
    }

    #[test]
    fn test_two_process_scenario_cpu_order() {
        let collector = Collector::new(MockFs::two_process_system(), "/proc");
        let records = collector.process_report(SortKey::Cpu).unwrap();

        let pids: Vec<u32> = records.iter().map(|r| r.pid).collect();
        assert_eq!(pids, vec![200, 100]);
        assert_eq!(records[0].cpu_usage(), "62.500");
        assert_eq!(records[1].cpu_usage(), "0.000");
        assert_eq!(records[1].user, "root");
        assert_eq!(records[1].memory_mib, 3);
    }

    #[test]
    fn test_empty_udp_table() {
        let collector = Collector::new(MockFs::two_process_system(), "/proc");
        assert!(collector.port_report(Protocol::Udp).unwrap().is_empty());
    }

    #[test]
    fn test_unowned_sockets_reported_as_unknown() {
        let collector = Collector::new(MockFs::listening_sockets(), "/proc");
        let ports = collector.port_report(Protocol::Tcp6).unwrap();

        assert_eq!(ports.len(), 2);
        assert!(ports.iter().all(|p| p.process == UNKNOWN_OWNER));
    }

    #[test]
    fn test_dual_bound_port_listed_once() {
        let mut fs = MockFs::two_process_system();
        fs.add_net_table(
            "tcp",
            &[
                ("00000000:1F90", "0A", 5555),
                ("0100007F:1F90", "0A", 11),
                ("00000000:0016", "0A", 12),
            ],
        );
        let collector = Collector::new(fs, "/proc");
        let ports = collector.port_report(Protocol::Tcp).unwrap();

        assert_eq!(
            ports,
            vec![
                PortEntry {
                    port: 22,
                    process: "idle".into()
                },
                PortEntry {
                    port: 8080,
                    process: "worker".into()
                },
            ]
        );
    }

    #[test]
    fn test_missing_passwd_falls_back_to_pid() {
        let collector =
            Collector::new(MockFs::two_process_system(), "/proc").with_passwd_path("/nowhere");
        let records = collector.process_report(SortKey::Pid).unwrap();
        assert_eq!(records[0].user, "100");
        assert_eq!(records[1].user, "200");
    }

    #[test]
    fn test_interface_report_skips_loopback() {
        let collector = Collector::new(MockFs::two_process_system(), "/proc");
        let addrs = collector.interface_report().unwrap();

        let cidrs: Vec<String> = addrs.iter().map(|a| a.cidr()).collect();
        assert_eq!(cidrs, vec!["192.0.2.10/24", "2001:db8::10/64"]);
        assert!(addrs.iter().all(|a| a.name == "eth0"));
    }

    #[test]
    fn test_log_reports() {
        let collector = Collector::new(MockFs::two_process_system(), "/proc");

        let ssh = collector
            .ssh_report(Path::new("/var/log/auth.log"), true, true)
            .unwrap();
        assert_eq!(ssh.accepted[0].user, "alice");
        assert_eq!(ssh.failed.unwrap().len(), 1);

        let nginx = collector
            .nginx_report(Path::new("/var/log/nginx/access.log"))
            .unwrap();
        assert_eq!(nginx.client_errors.len(), 2);
        assert_eq!(nginx.server_errors[0].status, 502);
    }

    #[test]
    fn test_system_summary() {
        let collector = Collector::new(MockFs::two_process_system(), "/proc");
        assert_eq!(collector.system_summary().unwrap().hostname, "sentinel-test");
    }
}
