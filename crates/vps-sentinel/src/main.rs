//! vps-sentinel - daily host report.
//!
//! Collects the configured sections in one blocking pass and writes the
//! report to stdout or a file. Meant to run from cron.

mod clamav;
mod config;
mod render;

use std::error::Error;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use chrono::Local;
use clap::Parser;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

#[cfg(not(target_os = "linux"))]
use sentinel_core::collector::MockFs;
#[cfg(target_os = "linux")]
use sentinel_core::collector::RealFs;
use sentinel_core::collector::{Collector, SystemSource};
use sentinel_core::model::{Protocol, SortKey};

use crate::config::{Config, DEFAULT_CONFIG_PATH, Section};
use crate::render::{Report, SectionData};

/// Host introspection report: ports, processes, system load, logs, ClamAV.
#[derive(Parser)]
#[command(name = "vps-sentinel", about = "Daily host report", version)]
struct Args {
    /// Configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Path to /proc filesystem (for testing/mocking).
    #[arg(long, default_value = "/proc")]
    proc_path: String,

    /// File mapping numeric user ids to names.
    #[arg(long, default_value = "/etc/passwd")]
    passwd_path: PathBuf,

    /// Process sort key, overrides process.sort.
    #[arg(long, value_name = "KEY")]
    sort: Option<SortKey>,

    /// Protocol table to report, overrides port.protocol. Repeatable.
    #[arg(long = "protocol", value_name = "PROTO")]
    protocols: Vec<Protocol>,

    /// Emit JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Write the report to this file instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Skip sections that fail instead of aborting the whole report.
    #[arg(long)]
    keep_going: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Logs go to stderr so they never mix with the report on stdout.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    for target in ["vps_sentinel", "sentinel_core"] {
        if let Ok(directive) = format!("{}={}", target, level).parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Collects one section. A section may expand to several blocks
/// (one per protocol or scan path).
fn collect_section<F: SystemSource + Clone>(
    collector: &Collector<F>,
    config: &Config,
    section: Section,
) -> Result<Vec<SectionData>, Box<dyn Error>> {
    let mut out = Vec::new();
    match section {
        Section::System => {
            info!("Getting system information...");
            out.push(SectionData::System(collector.system_summary()?));
        }
        Section::Ip => {
            info!("Getting network interfaces...");
            out.push(SectionData::Ip {
                interfaces: collector.interface_report()?,
            });
        }
        Section::Port => {
            for &protocol in &config.port.protocol {
                info!("Getting open ports of {}...", protocol);
                let entries = collector.port_report(protocol)?;
                out.push(SectionData::Ports { protocol, entries });
            }
        }
        Section::Process => {
            let sort = config.process.sort;
            info!("Generating a list of processes (sort: {})...", sort);
            let records = collector.process_report(sort)?;
            out.push(SectionData::Processes { sort, records });
        }
        Section::Clamav => {
            for path in &config.clamav.path {
                info!("Running ClamAV on {}...", path.display());
                out.push(SectionData::Clamav(clamav::scan(path)?));
            }
        }
        Section::LogSsh => {
            let ssh = config.log.ssh.as_ref().ok_or("log.ssh is not configured")?;
            info!("Parsing SSH log {}...", ssh.path.display());
            out.push(SectionData::Ssh {
                path: ssh.path.display().to_string(),
                report: collector.ssh_report(&ssh.path, ssh.failed, ssh.multiple)?,
            });
        }
        Section::LogNginx => {
            let nginx = config.log.nginx.as_ref().ok_or("log.nginx is not configured")?;
            info!("Parsing nginx log {}...", nginx.path.display());
            out.push(SectionData::Nginx {
                path: nginx.path.display().to_string(),
                report: collector.nginx_report(&nginx.path)?,
            });
        }
    }
    Ok(out)
}

fn build_report<F: SystemSource + Clone>(
    collector: &Collector<F>,
    config: &Config,
    keep_going: bool,
) -> Result<Report, Box<dyn Error>> {
    let hostname = collector.hostname().unwrap_or_else(|e| {
        warn!("cannot read hostname: {}", e);
        "?".to_string()
    });

    let mut sections = Vec::new();
    for &section in &config.report.structure {
        match collect_section(collector, config, section) {
            Ok(blocks) => sections.extend(blocks),
            Err(e) if keep_going => error!("{:?} section skipped: {}", section, e),
            Err(e) => return Err(e),
        }
    }

    Ok(Report {
        hostname,
        generated_at: Local::now(),
        sections,
    })
}

fn write_report(
    report: &Report,
    json: bool,
    output: Option<&PathBuf>,
) -> Result<(), Box<dyn Error>> {
    let body = if json {
        render::to_json(report)?
    } else {
        render::to_text(report)
    };

    match output {
        Some(path) => {
            fs::write(path, body)?;
            info!("Report written to {}", path.display());
        }
        None => io::stdout().lock().write_all(body.as_bytes())?,
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    info!("vps-sentinel {} starting", env!("CARGO_PKG_VERSION"));

    let mut config = match Config::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    if let Some(sort) = args.sort {
        config.process.sort = sort;
    }
    if !args.protocols.is_empty() {
        config.port.protocol = args.protocols.clone();
    }

    #[cfg(target_os = "linux")]
    let fs = RealFs::new();
    #[cfg(not(target_os = "linux"))]
    let fs = {
        warn!("not running on Linux, using the built-in demo host");
        MockFs::two_process_system()
    };

    let collector =
        Collector::new(fs, args.proc_path.clone()).with_passwd_path(&args.passwd_path);

    let report = match build_report(&collector, &config, args.keep_going) {
        Ok(r) => r,
        Err(e) => {
            error!("Failed to build report: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = write_report(&report, args.json, args.output.as_ref()) {
        error!("Failed to write report: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        ClamavConfig, LogConfig, NginxLogConfig, PortConfig, ProcessConfig, ReportConfig,
        SshLogConfig,
    };
    use sentinel_core::collector::MockFs;

    fn config(structure: Vec<Section>) -> Config {
        Config {
            report: ReportConfig { structure },
            port: PortConfig {
                protocol: vec![Protocol::Tcp, Protocol::Udp],
            },
            process: ProcessConfig { sort: SortKey::Cpu },
            clamav: ClamavConfig::default(),
            log: LogConfig {
                ssh: Some(SshLogConfig {
                    path: PathBuf::from("/var/log/auth.log"),
                    failed: true,
                    multiple: false,
                }),
                nginx: Some(NginxLogConfig {
                    path: PathBuf::from("/var/log/nginx/access.log"),
                }),
            },
        }
    }

    #[test]
    fn test_args_parse_overrides() {
        let args = Args::try_parse_from([
            "vps-sentinel",
            "--sort",
            "memory",
            "--protocol",
            "tcp6",
            "--protocol",
            "udp",
            "-vv",
        ])
        .unwrap();
        assert_eq!(args.sort, Some(SortKey::Memory));
        assert_eq!(args.protocols, vec![Protocol::Tcp6, Protocol::Udp]);
        assert_eq!(args.verbose, 2);
        assert_eq!(args.config, PathBuf::from(DEFAULT_CONFIG_PATH));

        assert!(Args::try_parse_from(["vps-sentinel", "--sort", "size"]).is_err());
    }

    #[test]
    fn test_build_report_sections_in_config_order() {
        let collector = Collector::new(MockFs::two_process_system(), "/proc");
        let report = build_report(
            &collector,
            &config(vec![Section::Process, Section::Port, Section::System]),
            false,
        )
        .unwrap();

        assert_eq!(report.hostname, "sentinel-test");
        assert_eq!(report.sections.len(), 4);
        match &report.sections[0] {
            SectionData::Processes { records, .. } => assert_eq!(records[0].pid, 200),
            other => panic!("unexpected section {:?}", other),
        }
        match &report.sections[1] {
            SectionData::Ports { protocol, entries } => {
                assert_eq!(*protocol, Protocol::Tcp);
                assert_eq!(entries[0].port, 8080);
                assert_eq!(entries[0].process, "worker");
            }
            other => panic!("unexpected section {:?}", other),
        }
        assert!(matches!(report.sections[3], SectionData::System(_)));
    }

    #[test]
    fn test_build_report_aborts_on_missing_table() {
        let mut cfg = config(vec![Section::Port, Section::Process]);
        cfg.port.protocol = vec![Protocol::Tcp6];
        let collector = Collector::new(MockFs::two_process_system(), "/proc");

        assert!(build_report(&collector, &cfg, false).is_err());

        let report = build_report(&collector, &cfg, true).unwrap();
        assert_eq!(report.sections.len(), 1);
        assert!(matches!(report.sections[0], SectionData::Processes { .. }));
    }

    #[test]
    fn test_build_report_network_and_log_sections() {
        let collector = Collector::new(MockFs::two_process_system(), "/proc");
        let report = build_report(
            &collector,
            &config(vec![Section::Ip, Section::LogSsh, Section::LogNginx]),
            false,
        )
        .unwrap();

        assert_eq!(report.sections.len(), 3);
        match &report.sections[0] {
            SectionData::Ip { interfaces } => {
                assert_eq!(interfaces.len(), 2);
                assert!(interfaces.iter().all(|a| a.name != "lo"));
            }
            other => panic!("unexpected section {:?}", other),
        }
        match &report.sections[1] {
            SectionData::Ssh { path, report } => {
                assert_eq!(path, "/var/log/auth.log");
                assert_eq!(report.accepted.len(), 2);
                assert_eq!(report.failed.as_ref().unwrap()[0].count, 3);
            }
            other => panic!("unexpected section {:?}", other),
        }
        match &report.sections[2] {
            SectionData::Nginx { report, .. } => {
                assert_eq!(report.client_errors.len(), 2);
                assert_eq!(report.server_errors.len(), 1);
            }
            other => panic!("unexpected section {:?}", other),
        }
    }

    #[test]
    fn test_missing_log_file_aborts_or_skips() {
        let mut cfg = config(vec![Section::LogNginx, Section::System]);
        cfg.log.nginx = Some(NginxLogConfig {
            path: PathBuf::from("/var/log/nginx/missing.log"),
        });
        let collector = Collector::new(MockFs::two_process_system(), "/proc");

        assert!(build_report(&collector, &cfg, false).is_err());

        let report = build_report(&collector, &cfg, true).unwrap();
        assert_eq!(report.sections.len(), 1);
        assert!(matches!(report.sections[0], SectionData::System(_)));
    }
}
