//! Text and JSON rendering of a collected report.

use std::fmt::Write;

use chrono::{DateTime, Local};
use serde::Serialize;

use sentinel_core::model::{
    HttpError, InterfaceAddress, NginxReport, PortEntry, ProcessRecord, Protocol, SortKey,
    SshReport, SystemSummary,
};

use crate::clamav::ScanReport;

const MIB: f64 = 1024.0 * 1024.0;
const DAY_SECS: f64 = 86_400.0;

/// One rendered block of the report.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "section", rename_all = "lowercase")]
pub enum SectionData {
    System(SystemSummary),
    Ip {
        interfaces: Vec<InterfaceAddress>,
    },
    Ports {
        protocol: Protocol,
        entries: Vec<PortEntry>,
    },
    Processes {
        sort: SortKey,
        records: Vec<ProcessRecord>,
    },
    Clamav(ScanReport),
    Ssh {
        path: String,
        report: SshReport,
    },
    Nginx {
        path: String,
        report: NginxReport,
    },
}

/// Everything collected in one run, in output order.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub hostname: String,
    pub generated_at: DateTime<Local>,
    pub sections: Vec<SectionData>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

fn table_line<'a>(cells: impl Iterator<Item = (&'a str, Align)>, widths: &[usize]) -> String {
    let mut s = String::from("|");
    for ((cell, align), w) in cells.zip(widths) {
        let _ = match align {
            Align::Left => write!(s, " {:<w$} |", cell, w = *w),
            Align::Right => write!(s, " {:>w$} |", cell, w = *w),
        };
    }
    s.push('\n');
    s
}

/// Renders rows as a boxed ASCII table.
fn table(headers: &[(&str, Align)], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|(h, _)| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let rule = {
        let mut s = String::from("+");
        for w in &widths {
            s.push_str(&"-".repeat(w + 2));
            s.push('+');
        }
        s.push('\n');
        s
    };

    let mut out = rule.clone();
    out.push_str(&table_line(headers.iter().map(|(h, _)| (*h, Align::Left)), &widths));
    out.push_str(&rule);
    for row in rows {
        let cells = row.iter().map(String::as_str).zip(headers.iter().map(|(_, a)| *a));
        out.push_str(&table_line(cells, &widths));
    }
    if !rows.is_empty() {
        out.push_str(&rule);
    }
    out
}

fn render_system(out: &mut String, s: &SystemSummary) {
    out.push_str("System information:\n");
    let _ = writeln!(
        out,
        "- Average system load (1/5/15): {:.2}, {:.2}, {:.2}",
        s.load1, s.load5, s.load15
    );
    let _ = writeln!(
        out,
        "- Free memory: {:.2} MiB (total: {:.2} MiB)",
        s.mem_free as f64 / MIB,
        s.mem_total as f64 / MIB
    );
    let _ = writeln!(
        out,
        "- Free swap: {:.2} MiB (total: {:.2} MiB)",
        s.swap_free as f64 / MIB,
        s.swap_total as f64 / MIB
    );
    let _ = writeln!(out, "- Uptime: {:.3} day(s)", s.uptime_secs / DAY_SECS);
}

fn render_interfaces(out: &mut String, interfaces: &[InterfaceAddress]) {
    out.push_str("Network interfaces:\n");
    let rows: Vec<Vec<String>> = interfaces
        .iter()
        .map(|a| vec![a.name.clone(), a.cidr()])
        .collect();
    out.push_str(&table(&[("Interface", Align::Left), ("Address", Align::Left)], &rows));
}

fn render_ports(out: &mut String, protocol: Protocol, entries: &[PortEntry]) {
    let _ = writeln!(out, "Listening ports ({}):", protocol);
    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|e| vec![e.port.to_string(), e.process.clone()])
        .collect();
    out.push_str(&table(&[("Port", Align::Right), ("Process", Align::Left)], &rows));
}

fn render_processes(out: &mut String, sort: SortKey, records: &[ProcessRecord]) {
    let _ = writeln!(out, "List of processes (sorted by {}):", sort);
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            vec![
                r.pid.to_string(),
                r.name.clone(),
                r.user.clone(),
                r.cpu_usage(),
                r.memory_mib.to_string(),
            ]
        })
        .collect();
    out.push_str(&table(
        &[
            ("Pid", Align::Right),
            ("Name", Align::Left),
            ("User", Align::Left),
            ("CPU", Align::Right),
            ("Memory (MiB)", Align::Right),
        ],
        &rows,
    ));
}

fn render_scan(out: &mut String, scan: &ScanReport) {
    let _ = writeln!(out, "Report of scanning: {}", scan.path);
    out.push_str(scan.output.trim_end());
    out.push('\n');
}

fn render_ssh(out: &mut String, path: &str, report: &SshReport) {
    let _ = writeln!(out, "Accepted SSH logins ({}):", path);
    let rows: Vec<Vec<String>> = report
        .accepted
        .iter()
        .map(|l| vec![l.time.clone(), l.user.clone(), l.ip.clone(), l.auth_type.clone()])
        .collect();
    out.push_str(&table(
        &[
            ("Time", Align::Left),
            ("User", Align::Left),
            ("IP", Align::Left),
            ("Authentication type", Align::Left),
        ],
        &rows,
    ));

    if let Some(failed) = &report.failed {
        let _ = writeln!(out, "\nFailed SSH logins ({}):", path);
        let rows: Vec<Vec<String>> = failed
            .iter()
            .map(|f| vec![f.ip.clone(), f.count.to_string()])
            .collect();
        out.push_str(&table(&[("IP", Align::Left), ("Count", Align::Right)], &rows));
    }
}

fn http_error_table(errors: &[HttpError]) -> String {
    let rows: Vec<Vec<String>> = errors
        .iter()
        .map(|e| {
            vec![
                e.date.clone(),
                e.ip.clone(),
                e.status.to_string(),
                e.user_agent.clone(),
                e.request.clone(),
            ]
        })
        .collect();
    table(
        &[
            ("Date", Align::Left),
            ("IP", Align::Left),
            ("Status", Align::Right),
            ("User Agent", Align::Left),
            ("Request", Align::Left),
        ],
        &rows,
    )
}

fn render_nginx(out: &mut String, path: &str, report: &NginxReport) {
    let _ = writeln!(out, "Nginx client errors ({}):", path);
    out.push_str(&http_error_table(&report.client_errors));
    let _ = writeln!(out, "\nNginx server errors ({}):", path);
    out.push_str(&http_error_table(&report.server_errors));
}

/// Plain-text report, sections separated by a blank line.
pub fn to_text(report: &Report) -> String {
    let mut out = format!(
        "Daily report from {} ({})\n\n",
        report.hostname,
        report.generated_at.format("%Y-%m-%d %H:%M:%S %z")
    );
    for section in &report.sections {
        match section {
            SectionData::System(s) => render_system(&mut out, s),
            SectionData::Ip { interfaces } => render_interfaces(&mut out, interfaces),
            SectionData::Ports { protocol, entries } => render_ports(&mut out, *protocol, entries),
            SectionData::Processes { sort, records } => render_processes(&mut out, *sort, records),
            SectionData::Clamav(scan) => render_scan(&mut out, scan),
            SectionData::Ssh { path, report } => render_ssh(&mut out, path, report),
            SectionData::Nginx { path, report } => render_nginx(&mut out, path, report),
        }
        out.push('\n');
    }
    out
}

/// Pretty-printed JSON report.
pub fn to_json(report: &Report) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}
