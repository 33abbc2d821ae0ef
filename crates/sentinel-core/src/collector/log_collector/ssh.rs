//! sshd entries of a syslog-style authentication log.
//!
//! Both the classic `Oct 14 08:01:12 host sshd[1]:` prefix and the
//! single-token RFC 3339 timestamp written by newer rsyslog setups are
//! accepted. Lines from other programs are ignored.

use crate::model::{FailedLogin, SshLogin};

/// Program tag is searched for within this many leading fields.
const MAX_TAG_POSITION: usize = 5;

/// A line logged by sshd, split around the program tag.
struct SshdLine<'a> {
    time: String,
    message: Vec<&'a str>,
}

fn sshd_line(line: &str) -> Option<SshdLine<'_>> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let tag = fields
        .iter()
        .take(MAX_TAG_POSITION)
        .position(|f| f.starts_with("sshd") && f.ends_with(':'))?;
    // timestamp, then host, then tag
    if tag < 2 {
        return None;
    }
    Some(SshdLine {
        time: fields[..tag - 1].join(" "),
        message: fields[tag + 1..].to_vec(),
    })
}

/// Extracts `Accepted <method> for <user> from <ip> ...` entries, in log order.
pub fn parse_accepted_logins(content: &str) -> Vec<SshLogin> {
    content
        .lines()
        .filter_map(sshd_line)
        .filter_map(|line| match line.message.as_slice() {
            ["Accepted", method, _, user, _, ip, ..] => Some(SshLogin {
                time: line.time.clone(),
                user: user.to_string(),
                ip: ip.to_string(),
                auth_type: method.to_string(),
            }),
            _ => None,
        })
        .collect()
}

/// Remote address of a `Failed ...` message.
///
/// User names may contain spaces, so the address is taken as the token
/// right before `port` rather than at a fixed offset.
fn failed_ip<'a>(message: &[&'a str]) -> Option<&'a str> {
    let port = message.iter().skip(5).position(|f| *f == "port")? + 5;
    Some(message[port - 1])
}

/// Counts `Failed ...` entries per remote address.
///
/// The result is ordered by descending count, ties in first-seen order.
/// With `multiple`, addresses that failed only once are dropped.
pub fn parse_failed_logins(content: &str, multiple: bool) -> Vec<FailedLogin> {
    let mut failed: Vec<FailedLogin> = Vec::new();

    for line in content.lines().filter_map(sshd_line) {
        if line.message.first() != Some(&"Failed") {
            continue;
        }
        let Some(ip) = failed_ip(&line.message) else {
            continue;
        };
        match failed.iter_mut().find(|f| f.ip == ip) {
            Some(entry) => entry.count += 1,
            None => failed.push(FailedLogin {
                ip: ip.to_string(),
                count: 1,
            }),
        }
    }

    if multiple {
        failed.retain(|f| f.count > 1);
    }
    failed.sort_by(|a, b| b.count.cmp(&a.count));
    failed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::AUTH_LOG;

    #[test]
    fn test_accepted_logins() {
        let logins = parse_accepted_logins(AUTH_LOG);
        assert_eq!(
            logins,
            vec![
                SshLogin {
                    time: "Oct 14 08:01:12".into(),
                    user: "alice".into(),
                    ip: "198.51.100.7".into(),
                    auth_type: "publickey".into(),
                },
                SshLogin {
                    time: "Oct 14 09:30:00".into(),
                    user: "bob".into(),
                    ip: "192.0.2.44".into(),
                    auth_type: "password".into(),
                },
            ]
        );
    }

    #[test]
    fn test_accepted_login_rfc3339_timestamp() {
        let log = "2026-10-14T08:01:12.345678+00:00 web01 sshd-session[3101]: Accepted publickey for alice from 198.51.100.7 port 50122 ssh2\n";
        let logins = parse_accepted_logins(log);
        assert_eq!(logins.len(), 1);
        assert_eq!(logins[0].time, "2026-10-14T08:01:12.345678+00:00");
        assert_eq!(logins[0].user, "alice");
    }

    #[test]
    fn test_failed_logins_counted_per_ip() {
        let failed = parse_failed_logins(AUTH_LOG, false);
        assert_eq!(
            failed,
            vec![
                FailedLogin {
                    ip: "203.0.113.5".into(),
                    count: 3,
                },
                FailedLogin {
                    ip: "203.0.113.9".into(),
                    count: 1,
                },
            ]
        );
    }

    #[test]
    fn test_failed_logins_multiple_only() {
        let failed = parse_failed_logins(AUTH_LOG, true);
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].ip, "203.0.113.5");
    }

    #[test]
    fn test_failed_login_with_spaces_in_user() {
        let log = "Oct 14 10:00:00 web01 sshd[9]: Failed password for invalid user 1.2.3.4 - SSH-2.0-Go from 203.0.113.77 port 5000 ssh2\n";
        assert_eq!(parse_failed_logins(log, false)[0].ip, "203.0.113.77");
    }

    #[test]
    fn test_short_and_foreign_lines_ignored() {
        let log = "\nOct 14\nOct 14 10:00:00 web01 sudo: alice : TTY=pts/0\nOct 14 10:00:00 web01 sshd[9]: Accepted\n";
        assert!(parse_accepted_logins(log).is_empty());
        assert!(parse_failed_logins(log, false).is_empty());
    }
}
