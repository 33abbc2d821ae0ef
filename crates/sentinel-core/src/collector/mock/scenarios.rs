//! Pre-built mock filesystem scenarios for testing.
//!
//! These scenarios provide realistic `/proc` filesystem states
//! for testing various host conditions.

use super::filesystem::MockFs;

const PASSWD: &str = "\
root:x:0:0:root:/root:/bin/bash
daemon:x:1:1:daemon:/usr/sbin:/usr/sbin/nologin
nobody:x:65534:65534:nobody:/nonexistent:/usr/sbin/nologin
alice:x:1000:1000:Alice:/home/alice:/bin/bash
";

const MEMINFO: &str = "\
MemTotal:       16384000 kB
MemFree:         8192000 kB
MemAvailable:   12000000 kB
Buffers:          512000 kB
Cached:          2048000 kB
SwapCached:            0 kB
SwapTotal:       4096000 kB
SwapFree:        2048000 kB
";

/// Syslog excerpt with two accepted logins and repeated failures.
pub const AUTH_LOG: &str = "\
Oct 14 06:25:01 web01 CRON[2211]: pam_unix(cron:session): session opened for user root(uid=0) by (uid=0)
Oct 14 08:01:12 web01 sshd[3101]: Accepted publickey for alice from 198.51.100.7 port 50122 ssh2: ED25519 SHA256:abc
Oct 14 08:15:40 web01 sshd[3150]: Failed password for root from 203.0.113.5 port 41000 ssh2
Oct 14 08:15:44 web01 sshd[3150]: Failed password for root from 203.0.113.5 port 41000 ssh2
Oct 14 08:16:02 web01 sshd[3152]: Failed password for invalid user admin from 203.0.113.9 port 41822 ssh2
Oct 14 08:16:09 web01 sshd[3150]: Failed password for root from 203.0.113.5 port 41000 ssh2
Oct 14 09:30:00 web01 sshd[3300]: Accepted password for bob from 192.0.2.44 port 52000 ssh2
Oct 14 09:31:00 web01 sshd[3300]: pam_unix(sshd:session): session opened for user bob(uid=1001) by (uid=0)
";

/// nginx access log in the default `combined` format.
pub const ACCESS_LOG: &str = r#"198.51.100.7 - - [14/Oct/2026:08:00:01 +0000] "GET / HTTP/1.1" 200 612 "-" "curl/8.5.0"
203.0.113.5 - - [14/Oct/2026:08:00:02 +0000] "GET /wp-login.php HTTP/1.1" 404 153 "-" "Mozilla/5.0 (scanner)"
198.51.100.7 - - [14/Oct/2026:08:00:03 +0000] "POST /api/upload HTTP/1.1" 502 157 "https://example.com/" "Mozilla/5.0 (X11; Linux x86_64)"
203.0.113.9 - - [14/Oct/2026:08:00:04 +0000] "GET /admin HTTP/1.1" 403 153 "-" "python-requests/2.31"
"#;

impl MockFs {
    /// Builds a `/proc/[pid]/stat` line with the given accounting fields.
    ///
    /// Times are in clock ticks; all other fields carry plausible constants.
    pub fn stat_line(
        pid: u32,
        comm: &str,
        utime: u64,
        stime: u64,
        cutime: i64,
        cstime: i64,
        starttime: u64,
    ) -> String {
        format!(
            "{pid} ({comm}) S 1 {pid} {pid} 0 -1 4194560 1200 0 3 0 {utime} {stime} {cutime} {cstime} 20 0 1 0 {starttime} 12345678 1234 18446744073709551615 1 1 0 0 0 0 0 4096 0 0 0 0 17 0 0 0 0 0 0"
        )
    }

    /// Builds `/proc/[pid]/smaps` content with one region per PSS value (kB).
    pub fn smaps_with_pss(values_kb: &[u64]) -> String {
        let mut out = String::new();
        for (i, pss) in values_kb.iter().enumerate() {
            out.push_str(&format!(
                "{:08x}-{:08x} r-xp 00000000 08:01 1234 /usr/lib/libexample.so\n",
                i * 0x1000,
                (i + 1) * 0x1000
            ));
            out.push_str(&format!("Size:                  4 kB\nRss:                   4 kB\nPss:                {} kB\nPss_Anon:              0 kB\nShared_Clean:          0 kB\nPrivate_Dirty:         0 kB\n", pss));
        }
        out
    }

    /// Adds the host-wide files every scenario shares.
    fn add_host_files(&mut self, uptime: &str) {
        self.add_file("/etc/passwd", PASSWD);
        self.add_file("/proc/uptime", format!("{} 98765.43\n", uptime));
        self.add_file("/proc/loadavg", "0.15 0.10 0.05 1/150 1234\n");
        self.add_file("/proc/meminfo", MEMINFO);
        self.add_file("/proc/sys/kernel/hostname", "sentinel-test\n");
        self.add_file("/var/log/auth.log", AUTH_LOG);
        self.add_file("/var/log/nginx/access.log", ACCESS_LOG);

        self.add_interface("lo", [127, 0, 0, 1], 8);
        self.add_interface("eth0", [192, 0, 2, 10], 24);
        self.add_interface("lo", [0, 0, 0, 0, 0, 0, 0, 1], 128);
        self.add_interface("eth0", [0x2001, 0xdb8, 0, 0, 0, 0, 0, 0x10], 64);
    }

    /// Two processes at 100 Hz and 1000 s of uptime.
    ///
    /// - PID 100 `idle` (root): no CPU time, 3 MiB PSS.
    /// - PID 200 `worker` (alice): 250 s of CPU over 400 s alive (62.5%),
    ///   200 MiB PSS, owns the TCP listener on port 8080 (inode 5555).
    pub fn two_process_system() -> Self {
        let mut fs = Self::new();
        fs.set_clock_ticks(100);
        fs.add_host_files("1000.00");

        fs.add_process(
            100,
            0,
            &Self::stat_line(100, "idle", 0, 0, 0, 0, 50_000),
            &Self::smaps_with_pss(&[2048, 1024]),
        );
        fs.add_fd(100, 0, 11);
        fs.add_fd(100, 1, 12);

        fs.add_process(
            200,
            1000,
            &Self::stat_line(200, "worker", 20_000, 5_000, 0, 0, 60_000),
            &Self::smaps_with_pss(&[204_800, 1000]),
        );
        fs.add_fd(200, 0, 21);
        fs.add_fd(200, 3, 5555);

        fs.add_net_table(
            "tcp",
            &[
                ("00000000:1F90", "0A", 5555),
                ("0100007F:0050", "01", 6666),
            ],
        );
        fs.add_net_table("udp", &[]);
        fs
    }

    /// Connection tables for all four protocols mixing listening and
    /// non-listening rows. No process owns any of the inodes.
    ///
    /// Listening ports: tcp 22, 80; tcp6 22, 443; udp 53, 123; udp6 53.
    pub fn listening_sockets() -> Self {
        let mut fs = Self::new();
        fs.add_host_files("5000.00");
        fs.add_net_table(
            "tcp",
            &[
                ("00000000:0016", "0A", 1001),
                ("0100007F:0050", "0A", 1002),
                ("0A00000F:0016", "01", 1003),
                ("0A00000F:9C40", "06", 1004),
            ],
        );
        fs.add_net_table(
            "tcp6",
            &[
                ("00000000000000000000000000000000:0016", "0A", 2001),
                ("00000000000000000000000001000000:01BB", "0A", 2002),
                ("00000000000000000000000001000000:D431", "08", 2003),
            ],
        );
        fs.add_net_table(
            "udp",
            &[
                ("3500007F:0035", "07", 3001),
                ("00000000:007B", "07", 3002),
                ("0A00000F:A1B2", "01", 3003),
            ],
        );
        fs.add_net_table(
            "udp6",
            &[
                ("00000000000000000000000000000000:0035", "07", 4001),
                ("00000000000000000000000001000000:E0F1", "01", 4002),
            ],
        );
        fs
    }

    /// A small host where PID 300 exited after enumeration: its directory
    /// is still listed but every file inside is gone.
    pub fn with_vanished_process() -> Self {
        let mut fs = Self::new();
        fs.set_clock_ticks(100);
        fs.add_host_files("1000.00");

        fs.add_process(
            1,
            0,
            &Self::stat_line(1, "systemd", 500, 300, 1200, 800, 1),
            &Self::smaps_with_pss(&[10_240]),
        );
        fs.add_fd(1, 0, 31);
        fs.add_dir("/proc/300");
        fs
    }

    /// A process whose name contains spaces and parentheses.
    pub fn with_special_names() -> Self {
        let mut fs = Self::new();
        fs.set_clock_ticks(100);
        fs.add_host_files("1000.00");
        fs.add_process(
            5000,
            1000,
            &Self::stat_line(5000, "Web Content", 100, 100, 0, 0, 90_000),
            &Self::smaps_with_pss(&[4096]),
        );
        fs.add_process(
            5001,
            1000,
            &Self::stat_line(5001, "weird) (name", 0, 0, 0, 0, 90_000),
            &Self::smaps_with_pss(&[]),
        );
        fs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::traits::SystemSource;
    use std::path::Path;

    #[test]
    fn test_stat_line_field_positions() {
        let line = MockFs::stat_line(7, "sh", 11, 12, 13, 14, 99);
        let fields: Vec<&str> = line.split_whitespace().collect();
        assert_eq!(fields[1], "(sh)");
        assert_eq!(fields[13], "11");
        assert_eq!(fields[14], "12");
        assert_eq!(fields[15], "13");
        assert_eq!(fields[16], "14");
        assert_eq!(fields[21], "99");
    }

    #[test]
    fn test_two_process_system_layout() {
        let fs = MockFs::two_process_system();
        assert!(fs.exists(Path::new("/proc/100/stat")));
        assert!(fs.exists(Path::new("/proc/200/smaps")));
        assert!(fs.exists(Path::new("/proc/net/tcp")));
        assert_eq!(fs.stat(Path::new("/proc/200/fd/3")).unwrap().inode, 5555);
        assert_eq!(fs.clock_ticks(), 100);
        assert!(fs.exists(Path::new("/var/log/auth.log")));
        assert_eq!(fs.interface_addresses().unwrap().len(), 4);
    }
}
