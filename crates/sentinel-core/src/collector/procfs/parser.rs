//! Parsers for `/proc` filesystem files.
//!
//! These are pure functions that parse the content of various `/proc` files
//! into structured data. They are designed to be easily testable with string inputs.

use std::collections::HashMap;

use crate::model::{Protocol, SocketEntry};

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// Accounting fields read from `/proc/[pid]/stat`.
///
/// Times are raw clock ticks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcStat {
    pub pid: u32,
    pub comm: String,
    pub utime: u64,
    pub stime: u64,
    pub cutime: i64,
    pub cstime: i64,
    pub starttime: u64,
}

// Offsets into the fields following the closing ')' of comm. That list
// starts at field 3 (state), so 1-indexed field N lives at N - 3.
const UTIME_IDX: usize = 11;
const STIME_IDX: usize = 12;
const CUTIME_IDX: usize = 13;
const CSTIME_IDX: usize = 14;
const STARTTIME_IDX: usize = 19;

/// Parses `/proc/[pid]/stat` content.
///
/// The comm field can contain spaces and parentheses, so it is taken as
/// everything between the first '(' and the last ')'.
/// Format: pid (comm) state ppid pgrp session tty_nr ...
pub fn parse_proc_stat(content: &str) -> Result<ProcStat, ParseError> {
    let content = content.trim();

    let open_paren = content
        .find('(')
        .ok_or_else(|| ParseError::new("missing '(' in stat"))?;
    let close_paren = content
        .rfind(')')
        .ok_or_else(|| ParseError::new("missing ')' in stat"))?;

    if close_paren <= open_paren {
        return Err(ParseError::new("invalid parentheses in stat"));
    }

    let pid: u32 = content[..open_paren]
        .trim()
        .parse()
        .map_err(|_| ParseError::new("invalid pid"))?;

    let comm = content[open_paren + 1..close_paren].to_string();

    let fields: Vec<&str> = content[close_paren + 1..].split_whitespace().collect();
    if fields.len() <= STARTTIME_IDX {
        return Err(ParseError::new(format!(
            "not enough fields in stat: expected {}+, got {}",
            STARTTIME_IDX + 1,
            fields.len()
        )));
    }

    fn field<T: std::str::FromStr>(
        fields: &[&str],
        idx: usize,
        name: &str,
    ) -> Result<T, ParseError> {
        fields[idx]
            .parse()
            .map_err(|_| ParseError::new(format!("invalid {}: '{}'", name, fields[idx])))
    }

    Ok(ProcStat {
        pid,
        comm,
        utime: field(&fields, UTIME_IDX, "utime")?,
        stime: field(&fields, STIME_IDX, "stime")?,
        cutime: field(&fields, CUTIME_IDX, "cutime")?,
        cstime: field(&fields, CSTIME_IDX, "cstime")?,
        starttime: field(&fields, STARTTIME_IDX, "starttime")?,
    })
}

/// Sums every `Pss:` line of `/proc/[pid]/smaps`.
///
/// Returns the total in kB. Regions without the line contribute nothing.
pub fn parse_smaps_pss(content: &str) -> Result<u64, ParseError> {
    let mut total_kb = 0u64;
    for line in content.lines() {
        if let Some(rest) = line.strip_prefix("Pss:") {
            let value = rest
                .split_whitespace()
                .next()
                .ok_or_else(|| ParseError::new("empty Pss value in smaps"))?;
            let kb: u64 = value
                .parse()
                .map_err(|_| ParseError::new(format!("invalid Pss value: '{}'", value)))?;
            total_kb += kb;
        }
    }
    Ok(total_kb)
}

/// Parses `/proc/uptime`; returns seconds since boot.
pub fn parse_uptime(content: &str) -> Result<f64, ParseError> {
    let first = content
        .split_whitespace()
        .next()
        .ok_or_else(|| ParseError::new("empty uptime"))?;
    first
        .parse()
        .map_err(|_| ParseError::new(format!("invalid uptime: '{}'", first)))
}

/// Parsed data from `/proc/meminfo`, in kB.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemInfo {
    pub mem_total: u64,
    pub mem_free: u64,
    pub swap_total: u64,
    pub swap_free: u64,
}

/// Parses `/proc/meminfo` content.
pub fn parse_meminfo(content: &str) -> Result<MemInfo, ParseError> {
    let mut info = MemInfo::default();
    let mut seen = 0;

    for line in content.lines() {
        let mut parts = line.split_whitespace();
        let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
            continue;
        };
        let slot = match key {
            "MemTotal:" => &mut info.mem_total,
            "MemFree:" => &mut info.mem_free,
            "SwapTotal:" => &mut info.swap_total,
            "SwapFree:" => &mut info.swap_free,
            _ => continue,
        };
        *slot = value
            .parse()
            .map_err(|_| ParseError::new(format!("invalid value for {} '{}'", key, value)))?;
        seen += 1;
    }

    if seen == 0 {
        return Err(ParseError::new("no memory fields in meminfo"));
    }
    Ok(info)
}

/// Parsed data from `/proc/loadavg`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadAvg {
    pub load1: f64,
    pub load5: f64,
    pub load15: f64,
}

/// Parses `/proc/loadavg` content.
///
/// Format: 0.15 0.10 0.05 1/150 1234
pub fn parse_loadavg(content: &str) -> Result<LoadAvg, ParseError> {
    let parts: Vec<&str> = content.split_whitespace().collect();
    if parts.len() < 3 {
        return Err(ParseError::new("not enough fields in loadavg"));
    }

    let parse = |s: &str| -> Result<f64, ParseError> {
        s.parse()
            .map_err(|_| ParseError::new(format!("invalid load average: '{}'", s)))
    };

    Ok(LoadAvg {
        load1: parse(parts[0])?,
        load5: parse(parts[1])?,
        load15: parse(parts[2])?,
    })
}

/// Parses a `/proc/net/{tcp,tcp6,udp,udp6}` table.
///
/// Returns the rows in the protocol's listening state, in file order.
/// The first line is the column header. Any row that cannot be read in
/// the fixed kernel layout fails the whole table.
pub fn parse_net_table(content: &str, protocol: Protocol) -> Result<Vec<SocketEntry>, ParseError> {
    let listen = protocol.listen_state();
    let mut entries = Vec::new();

    for (lineno, line) in content.lines().enumerate().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() < 10 {
            return Err(ParseError::new(format!(
                "{} line {}: expected 10+ fields, got {}",
                protocol,
                lineno + 1,
                fields.len()
            )));
        }
        if !fields[3].eq_ignore_ascii_case(listen) {
            continue;
        }

        let local = fields[1];
        let port_hex = local
            .rsplit_once(':')
            .map(|(_, port)| port)
            .ok_or_else(|| {
                ParseError::new(format!("{} line {}: bad local address '{}'", protocol, lineno + 1, local))
            })?;
        let port = u16::from_str_radix(port_hex, 16).map_err(|_| {
            ParseError::new(format!("{} line {}: bad port '{}'", protocol, lineno + 1, port_hex))
        })?;
        let inode: u64 = fields[9].parse().map_err(|_| {
            ParseError::new(format!("{} line {}: bad inode '{}'", protocol, lineno + 1, fields[9]))
        })?;

        entries.push(SocketEntry {
            port,
            inode,
            protocol,
        });
    }

    Ok(entries)
}

/// Parses `/etc/passwd` content and returns a map of UID -> username.
///
/// Format: username:password:uid:gid:gecos:home:shell
pub fn parse_passwd(content: &str) -> HashMap<u32, String> {
    let mut map = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parts: Vec<&str> = line.split(':').collect();
        if parts.len() >= 3
            && let Ok(uid) = parts[2].parse::<u32>()
        {
            // first entry wins, like getpwuid
            map.entry(uid).or_insert_with(|| parts[0].to_string());
        }
    }
    map
}

/// Resolver for UID -> username mapping.
#[derive(Debug, Clone, Default)]
pub struct UserResolver {
    uid_to_name: HashMap<u32, String>,
}

impl UserResolver {
    /// Creates a new empty resolver.
    pub fn new() -> Self {
        Self {
            uid_to_name: HashMap::new(),
        }
    }

    /// Loads user mappings from /etc/passwd content.
    pub fn load_from_content(&mut self, content: &str) {
        self.uid_to_name = parse_passwd(content);
    }

    /// Looks up the user name of `uid`.
    pub fn lookup(&self, uid: u32) -> Option<&str> {
        self.uid_to_name.get(&uid).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;
    use crate::collector::traits::SystemSource;
    use std::path::Path;

    #[test]
    fn test_parse_proc_stat_fields() {
        let line = MockFs::stat_line(1234, "bash", 10, 5, 3, 2, 12345);
        let stat = parse_proc_stat(&line).unwrap();

        assert_eq!(stat.pid, 1234);
        assert_eq!(stat.comm, "bash");
        assert_eq!(stat.utime, 10);
        assert_eq!(stat.stime, 5);
        assert_eq!(stat.cutime, 3);
        assert_eq!(stat.cstime, 2);
        assert_eq!(stat.starttime, 12345);
    }

    #[test]
    fn test_parse_proc_stat_child_times_are_distinct() {
        let line = MockFs::stat_line(1, "init", 100, 200, 300, 400, 1);
        let stat = parse_proc_stat(&line).unwrap();
        assert_ne!(stat.cstime as u64, stat.utime);
        assert_eq!(stat.cstime, 400);
    }

    #[test]
    fn test_parse_proc_stat_name_with_spaces() {
        let line = MockFs::stat_line(5000, "Web Content", 1, 2, 0, 0, 77);
        let stat = parse_proc_stat(&line).unwrap();
        assert_eq!(stat.comm, "Web Content");
        assert_eq!(stat.utime, 1);
        assert_eq!(stat.starttime, 77);
    }

    #[test]
    fn test_parse_proc_stat_name_with_parens() {
        let line = MockFs::stat_line(5001, "a) (b", 4, 0, 0, 0, 9);
        let stat = parse_proc_stat(&line).unwrap();
        assert_eq!(stat.comm, "a) (b");
        assert_eq!(stat.utime, 4);
    }

    #[test]
    fn test_parse_proc_stat_truncated() {
        assert!(parse_proc_stat("1234 (test) S 1 2 3").is_err());
        assert!(parse_proc_stat("").is_err());
        assert!(parse_proc_stat("1234 test S").is_err());
    }

    #[test]
    fn test_parse_proc_stat_non_numeric_time() {
        let line = "1 (x) S 1 1 1 0 -1 0 0 0 0 0 abc 0 0 0 20 0 1 0 5 0 0";
        let err = parse_proc_stat(line).unwrap_err();
        assert!(err.message.contains("utime"));
    }

    #[test]
    fn test_parse_smaps_pss_sum() {
        let values = [4, 120, 1, 0, 7000];
        let content = MockFs::smaps_with_pss(&values);
        assert_eq!(parse_smaps_pss(&content).unwrap(), values.iter().sum::<u64>());
    }

    #[test]
    fn test_parse_smaps_ignores_other_pss_labels() {
        let content = "Pss:  10 kB\nPss_Anon:  99 kB\nPss_File: 5 kB\nSwapPss: 3 kB\n";
        assert_eq!(parse_smaps_pss(content).unwrap(), 10);
    }

    #[test]
    fn test_parse_smaps_empty() {
        assert_eq!(parse_smaps_pss("").unwrap(), 0);
    }

    #[test]
    fn test_parse_smaps_bad_value() {
        assert!(parse_smaps_pss("Pss: lots kB\n").is_err());
    }

    #[test]
    fn test_parse_uptime() {
        assert_eq!(parse_uptime("12345.67 98765.43\n").unwrap(), 12345.67);
        assert!(parse_uptime("").is_err());
        assert!(parse_uptime("abc 1").is_err());
    }

    #[test]
    fn test_parse_meminfo() {
        let content = "MemTotal: 16384 kB\nMemFree: 8192 kB\nBuffers: 1 kB\nSwapTotal: 4096 kB\nSwapFree: 1024 kB\n";
        let info = parse_meminfo(content).unwrap();
        assert_eq!(info.mem_total, 16384);
        assert_eq!(info.mem_free, 8192);
        assert_eq!(info.swap_total, 4096);
        assert_eq!(info.swap_free, 1024);
        assert!(parse_meminfo("Foo: 1 kB\n").is_err());
    }

    #[test]
    fn test_parse_loadavg() {
        let avg = parse_loadavg("0.15 0.10 0.05 1/150 1234\n").unwrap();
        assert_eq!(avg.load1, 0.15);
        assert_eq!(avg.load5, 0.10);
        assert_eq!(avg.load15, 0.05);
        assert!(parse_loadavg("0.1 0.2").is_err());
    }

    #[test]
    fn test_parse_net_table_tcp_listening_only() {
        let mut fs = MockFs::new();
        fs.add_net_table(
            "tcp",
            &[
                ("00000000:0016", "0A", 100),
                ("0100007F:0050", "01", 200),
                ("00000000:1F90", "0A", 300),
            ],
        );
        let content = fs.read_to_string(Path::new("/proc/net/tcp")).unwrap();

        let entries = parse_net_table(&content, Protocol::Tcp).unwrap();
        assert_eq!(
            entries,
            vec![
                SocketEntry { port: 22, inode: 100, protocol: Protocol::Tcp },
                SocketEntry { port: 8080, inode: 300, protocol: Protocol::Tcp },
            ]
        );
    }

    #[test]
    fn test_parse_net_table_udp_uses_unconnected_state() {
        let content = "header\n   0: 00000000:0035 00000000:0000 07 00000000:00000000 00:00000000 00000000 0 0 42 2 0\n   1: 00000000:0050 00000000:0000 0A 00000000:00000000 00:00000000 00000000 0 0 43 2 0\n";
        let entries = parse_net_table(content, Protocol::Udp).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].port, 53);
        assert_eq!(entries[0].inode, 42);
    }

    #[test]
    fn test_parse_net_table_header_only() {
        assert!(parse_net_table("  sl  local_address ...\n", Protocol::Tcp6).unwrap().is_empty());
        assert!(parse_net_table("", Protocol::Tcp).unwrap().is_empty());
    }

    #[test]
    fn test_parse_net_table_bad_inode_is_fatal() {
        let content = "header\n   0: 00000000:0016 00000000:0000 0A 0:0 00:0 0 0 0 notanum 1\n";
        let err = parse_net_table(content, Protocol::Tcp).unwrap_err();
        assert!(err.message.contains("bad inode"));
    }

    #[test]
    fn test_parse_net_table_bad_port_is_fatal() {
        let content = "header\n   0: 00000000:ZZZZ 00000000:0000 0A 0:0 00:0 0 0 0 5 1\n";
        assert!(parse_net_table(content, Protocol::Tcp).is_err());
        let content = "header\n   0: 00000000 00000000:0000 0A 0:0 00:0 0 0 0 5 1\n";
        assert!(parse_net_table(content, Protocol::Tcp).is_err());
    }

    #[test]
    fn test_parse_net_table_short_row_is_fatal() {
        let content = "header\n   0: 00000000:0016 00000000:0000 0A\n";
        assert!(parse_net_table(content, Protocol::Tcp).is_err());
    }

    #[test]
    fn test_parse_passwd() {
        let content = "# comment\nroot:x:0:0:root:/root:/bin/bash\n\nalice:x:1000:1000::/home/alice:/bin/sh\ntoor:x:0:0::/root:/bin/sh\nbroken\n";
        let map = parse_passwd(content);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&0).map(String::as_str), Some("root"));
        assert_eq!(map.get(&1000).map(String::as_str), Some("alice"));
    }

    #[test]
    fn test_user_resolver_fallback() {
        let mut resolver = UserResolver::new();
        assert_eq!(resolver.lookup(0), None);
        resolver.load_from_content("root:x:0:0:root:/root:/bin/bash\n");
        assert_eq!(resolver.lookup(0), Some("root"));
        assert_eq!(resolver.lookup(4242), None);
    }
}
