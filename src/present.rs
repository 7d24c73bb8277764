//! Human-readable output for server lists and details

use crate::api::{ServerDetail, ServerSummary};
use chrono::{DateTime, Utc};

pub const DEFAULT_LIMIT: usize = 5;

const TERSE_HEADERS: [&str; 6] = ["ID", "HOSTNAME", "COUNTRY", "PING", "SESSIONS", "LAST UPDATED"];

const VERBOSE_HEADERS: [&str; 10] = [
    "ID",
    "HOSTNAME",
    "COUNTRY",
    "CODE",
    "SCORE",
    "PING",
    "SESSIONS",
    "TOTAL SESSIONS",
    "LAST UPDATED",
    "CREATED",
];

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn row(server: &ServerSummary, verbose: bool) -> Vec<String> {
    if verbose {
        vec![
            server.id.clone(),
            server.host_name.clone(),
            server.country.clone(),
            server.country_short.clone(),
            server.score.to_string(),
            server.ping.to_string(),
            server.active_sessions.to_string(),
            server.total_sessions.to_string(),
            format_timestamp(&server.last_updated),
            format_timestamp(&server.created),
        ]
    } else {
        vec![
            server.id.clone(),
            server.host_name.clone(),
            server.country.clone(),
            server.ping.to_string(),
            server.active_sessions.to_string(),
            format_timestamp(&server.last_updated),
        ]
    }
}

/// Render the first `min(limit, servers.len())` servers as a table.
///
/// One header line, then one line per server. Returns an empty string for
/// an empty selection.
pub fn render(servers: &[ServerSummary], verbose: bool, limit: usize) -> String {
    let shown = &servers[..limit.min(servers.len())];
    if shown.is_empty() {
        return String::new();
    }

    let headers: &[&str] = if verbose {
        &VERBOSE_HEADERS
    } else {
        &TERSE_HEADERS
    };
    let rows: Vec<Vec<String>> = shown.iter().map(|s| row(s, verbose)).collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for cells in &rows {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, headers.iter().copied(), &widths);
    for cells in &rows {
        push_line(&mut out, cells.iter().map(String::as_str), &widths);
    }
    out
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line = cells
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Render one server as `label: value` lines
pub fn render_detail(server: &ServerDetail) -> String {
    let s = &server.summary;
    let mut fields = vec![
        ("ID", s.id.clone()),
        ("Hostname", s.host_name.clone()),
    ];
    if let Some(ip) = &server.ip_address {
        fields.push(("IP address", ip.clone()));
    }
    fields.extend([
        ("Country", format!("{} ({})", s.country, s.country_short)),
        ("Score", s.score.to_string()),
        ("Ping", s.ping.to_string()),
        ("Sessions", s.active_sessions.to_string()),
        ("Total sessions", s.total_sessions.to_string()),
        ("Last updated", format_timestamp(&s.last_updated)),
        ("Created", format_timestamp(&s.created)),
        (
            "Configuration",
            format!("{} bytes", server.configuration().len()),
        ),
    ]);

    let width = fields.iter().map(|(label, _)| label.len()).max().unwrap_or(0) + 1;
    fields
        .into_iter()
        .map(|(label, value)| format!("{:<width$} {}\n", format!("{label}:"), value, width = width))
        .collect()
}
