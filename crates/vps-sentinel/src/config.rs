//! Configuration file loading and validation.
//!
//! ```toml
//! [report]
//! structure = ["system", "ip", "port", "process", "clamav", "log.ssh", "log.nginx"]
//!
//! [port]
//! protocol = ["tcp", "udp"]
//!
//! [process]
//! sort = "cpu"
//!
//! [clamav]
//! path = ["/home", "/var/www"]
//!
//! [log.ssh]
//! path = "/var/log/auth.log"
//! failed = true
//! multiple = true
//!
//! [log.nginx]
//! path = "/var/log/nginx/access.log"
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use sentinel_core::model::{Protocol, SortKey};

/// Default configuration location.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/vps-sentinel.toml";

/// Characters rejected in scan paths; they end up on a command line.
const FORBIDDEN_PATH_CHARS: &[char] = &['$', '*', ';', '&', '|', '#'];

/// Report sections, rendered in the configured order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    System,
    Ip,
    Port,
    Process,
    Clamav,
    #[serde(rename = "log.ssh")]
    LogSsh,
    #[serde(rename = "log.nginx")]
    LogNginx,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    pub structure: Vec<Section>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PortConfig {
    #[serde(default)]
    pub protocol: Vec<Protocol>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProcessConfig {
    #[serde(default)]
    pub sort: SortKey,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClamavConfig {
    #[serde(default)]
    pub path: Vec<PathBuf>,
}

/// sshd authentication log.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SshLogConfig {
    pub path: PathBuf,
    /// Also count failed logins per address.
    #[serde(default)]
    pub failed: bool,
    /// Only list addresses that failed more than once.
    #[serde(default)]
    pub multiple: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NginxLogConfig {
    pub path: PathBuf,
}

/// The `[log.*]` tables.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    pub ssh: Option<SshLogConfig>,
    pub nginx: Option<NginxLogConfig>,
}

/// Parsed `vps-sentinel` configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub report: ReportConfig,
    #[serde(default)]
    pub port: PortConfig,
    #[serde(default)]
    pub process: ProcessConfig,
    #[serde(default)]
    pub clamav: ClamavConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Error loading or validating the configuration.
#[derive(Debug)]
pub enum ConfigError {
    Read(PathBuf, std::io::Error),
    Syntax(PathBuf, toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read(path, e) => write!(f, "failed to read {}: {}", path.display(), e),
            ConfigError::Syntax(path, e) => write!(f, "failed to parse {}: {}", path.display(), e),
            ConfigError::Invalid(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read(_, e) => Some(e),
            ConfigError::Syntax(_, e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl Config {
    /// Reads, parses and validates the file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::Syntax(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks constraints the deserializer cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.report.structure.is_empty() {
            return Err(ConfigError::Invalid("report.structure is empty".into()));
        }

        for path in &self.clamav.path {
            if !path.is_absolute() {
                return Err(ConfigError::Invalid(format!(
                    "clamav.path: not an absolute path: {}",
                    path.display()
                )));
            }
            let text = path.to_string_lossy();
            if let Some(c) = text.chars().find(|c| FORBIDDEN_PATH_CHARS.contains(c)) {
                return Err(ConfigError::Invalid(format!(
                    "clamav.path: invalid character '{}' in {}",
                    c, text
                )));
            }
        }

        if self.includes(Section::LogSsh) {
            let ssh = self.log.ssh.as_ref().ok_or_else(|| {
                ConfigError::Invalid(
                    "log.ssh is listed in report.structure but not configured".into(),
                )
            })?;
            check_log_path("log.ssh.path", &ssh.path)?;
        }
        if self.includes(Section::LogNginx) {
            let nginx = self.log.nginx.as_ref().ok_or_else(|| {
                ConfigError::Invalid(
                    "log.nginx is listed in report.structure but not configured".into(),
                )
            })?;
            check_log_path("log.nginx.path", &nginx.path)?;
        }

        Ok(())
    }

    pub fn includes(&self, section: Section) -> bool {
        self.report.structure.contains(&section)
    }
}

fn check_log_path(key: &str, path: &Path) -> Result<(), ConfigError> {
    if !path.is_absolute() {
        return Err(ConfigError::Invalid(format!(
            "{}: not an absolute path: {}",
            key,
            path.display()
        )));
    }
    Ok(())
}
