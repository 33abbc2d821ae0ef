//! nginx access log in the `combined` format.
//!
//! ```text
//! 203.0.113.5 - - [14/Oct/2026:08:00:02 +0000] "GET /x HTTP/1.1" 404 153 "-" "curl/8.5.0"
//! ```

use crate::collector::procfs::parser::ParseError;
use crate::model::{HttpError, NginxReport};

/// Parses one log line, whatever its status.
fn parse_line(line: &str) -> Option<HttpError> {
    // remote, request, status+size, referer, separator, user agent
    let quoted: Vec<&str> = line.split('"').collect();
    if quoted.len() < 6 {
        return None;
    }
    let head: Vec<&str> = quoted[0].split_whitespace().collect();
    if head.len() < 4 {
        return None;
    }
    let status = quoted[2].split_whitespace().next()?.parse().ok()?;

    Some(HttpError {
        ip: head[0].to_string(),
        date: head[3].trim_start_matches('[').to_string(),
        request: quoted[1].to_string(),
        status,
        user_agent: quoted[5].to_string(),
    })
}

/// Collects the 4xx and 5xx responses of an access log, in log order.
///
/// A non-empty line that is not in the combined format fails the parse.
pub fn parse_access_log(content: &str) -> Result<NginxReport, ParseError> {
    let mut report = NginxReport::default();

    for (n, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let entry = parse_line(line).ok_or_else(|| {
            ParseError::new(format!("access log line {}: not in combined format", n + 1))
        })?;

        if entry.is_client_error() {
            report.client_errors.push(entry);
        } else if entry.is_server_error() {
            report.server_errors.push(entry);
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::ACCESS_LOG;

    #[test]
    fn test_split_by_status_class() {
        let report = parse_access_log(ACCESS_LOG).unwrap();

        let client: Vec<u16> = report.client_errors.iter().map(|e| e.status).collect();
        assert_eq!(client, vec![404, 403]);
        assert_eq!(report.server_errors.len(), 1);

        let err = &report.server_errors[0];
        assert_eq!(err.ip, "198.51.100.7");
        assert_eq!(err.date, "14/Oct/2026:08:00:03");
        assert_eq!(err.request, "POST /api/upload HTTP/1.1");
        assert_eq!(err.status, 502);
        assert_eq!(err.user_agent, "Mozilla/5.0 (X11; Linux x86_64)");
    }

    #[test]
    fn test_status_boundaries() {
        let line = |status: u16| {
            format!(
                "192.0.2.1 - - [14/Oct/2026:08:00:00 +0000] \"GET / HTTP/1.1\" {} 0 \"-\" \"ua\"\n",
                status
            )
        };
        let content: String = [399, 400, 499, 500, 599, 600].map(line).concat();
        let report = parse_access_log(&content).unwrap();

        let client: Vec<u16> = report.client_errors.iter().map(|e| e.status).collect();
        let server: Vec<u16> = report.server_errors.iter().map(|e| e.status).collect();
        assert_eq!(client, vec![400, 499]);
        assert_eq!(server, vec![500, 599]);
    }

    #[test]
    fn test_malformed_line_is_error() {
        let content = format!("{}garbage line\n", ACCESS_LOG);
        let err = parse_access_log(&content).unwrap_err();
        assert!(err.message.contains("line 5"));
    }

    #[test]
    fn test_blank_lines_skipped() {
        assert_eq!(parse_access_log("\n\n").unwrap(), NginxReport::default());
    }
}
