use serde::Serialize;

/// Successful SSH authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SshLogin {
    /// Timestamp exactly as written by syslog.
    pub time: String,
    pub user: String,
    pub ip: String,
    /// Method reported by sshd: `publickey`, `password`, ...
    pub auth_type: String,
}

/// Failed SSH authentications from one remote address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedLogin {
    pub ip: String,
    pub count: u32,
}

/// Accepted logins and, when requested, failed attempts per address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SshReport {
    pub accepted: Vec<SshLogin>,
    /// Ordered by descending count. `None` when failures were not requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed: Option<Vec<FailedLogin>>,
}

/// Request answered with a 4xx or 5xx status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HttpError {
    pub ip: String,
    pub date: String,
    pub request: String,
    pub status: u16,
    pub user_agent: String,
}

impl HttpError {
    /// 4xx status.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// 5xx status.
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }
}

/// Error responses found in an nginx access log, split by class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NginxReport {
    pub client_errors: Vec<HttpError>,
    pub server_errors: Vec<HttpError>,
}
