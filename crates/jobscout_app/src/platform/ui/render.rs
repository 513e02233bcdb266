use chrono::{DateTime, Local};
use jobscout_core::{
    HistoryPage, JobFilter, JobRecord, Platform, ScrapeHistoryEntry, SessionSnapshot,
    SessionState,
};

const MISSING: &str = "-";

pub fn session_label(state: SessionState) -> &'static str {
    match state {
        SessionState::Idle => "Idle",
        SessionState::Starting => "Starting",
        SessionState::Streaming => "Streaming",
        SessionState::Stopping => "Stopping",
        SessionState::Errored => "Errored",
    }
}

pub fn status_line(snapshot: &SessionSnapshot) -> String {
    let mut line = format!(
        "Session: {} | Jobs: {}",
        session_label(snapshot.state),
        snapshot.record_count()
    );
    if let Some(session_id) = &snapshot.session_id {
        line.push_str(&format!(" | User: {session_id}"));
    }
    if snapshot.can_stop && !snapshot.stop_pending {
        line.push_str(" | Ctrl-C to stop");
    }
    line
}

pub fn record_line(record: &JobRecord) -> String {
    let mut line = format!(
        "{} | {} | {}",
        record.title,
        or_missing(&record.company),
        or_missing(&record.location)
    );
    if let Some(salary) = record.display_salary() {
        line.push_str(&format!(" | {salary}"));
    }
    if let Some(url) = record.url.as_deref().filter(|url| !url.is_empty()) {
        line.push_str(&format!("\n    {url}"));
    }
    line
}

/// The filtered listing shown when a session ends.
pub fn results_table(snapshot: &SessionSnapshot, filter: &JobFilter) -> String {
    let lines: Vec<String> = snapshot
        .filtered(filter)
        .map(|record| format!("  {}", record_line(record)))
        .collect();
    if lines.is_empty() {
        return if snapshot.records.is_empty() {
            "No jobs scraped yet.".to_string()
        } else {
            format!("No jobs match the filter ({} hidden).", snapshot.record_count())
        };
    }
    let mut out = format!(
        "Showing {} of {} jobs:\n",
        lines.len(),
        snapshot.record_count()
    );
    out.push_str(&lines.join("\n"));
    out
}

pub fn platform_list(platforms: &[Platform]) -> String {
    if platforms.is_empty() {
        return "No platforms available.".to_string();
    }
    platforms
        .iter()
        .map(|platform| format!("{:<12} {}", platform.public_id, platform.label()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn history_page(page: &HistoryPage<'_, ScrapeHistoryEntry>) -> String {
    if page.entries.is_empty() {
        return "No scraping history yet.".to_string();
    }
    let mut out = String::new();
    for entry in page.entries {
        out.push_str(&history_entry(entry));
        out.push('\n');
    }
    out.push_str(&format!("Page {} of {}", page.page, page.total_pages));
    if page.has_previous() {
        out.push_str(&format!(" | previous: --page {}", page.page - 1));
    }
    if page.has_next() {
        out.push_str(&format!(" | next: --page {}", page.page + 1));
    }
    out
}

fn history_entry(entry: &ScrapeHistoryEntry) -> String {
    let mut out = format!(
        "{} in {} ({} pages)\n",
        entry.query.as_deref().unwrap_or(MISSING),
        entry.location.as_deref().unwrap_or(MISSING),
        entry
            .max_pages
            .map(|pages| pages.to_string())
            .unwrap_or_else(|| MISSING.to_string())
    );
    let fields = [
        ("Profile Keywords", join_or_missing(&entry.profile_keywords)),
        ("Tags", join_or_missing(&entry.tags)),
        (
            "Custom Options",
            entry
                .custom_options_label()
                .unwrap_or_else(|| MISSING.to_string()),
        ),
        (
            "Auto Learning",
            (if entry.enable_auto_learning { "Yes" } else { "No" }).to_string(),
        ),
        ("Description", opt_or_missing(entry.description.as_deref())),
        ("Platform ID", opt_or_missing(entry.platform_id.as_deref())),
        ("Source", opt_or_missing(entry.source.as_deref())),
        ("URL", opt_or_missing(entry.url.as_deref())),
        ("Created At", format_created(entry.created.as_deref())),
    ];
    for (label, value) in fields {
        out.push_str(&format!("    {label}: {value}\n"));
    }
    out
}

/// RFC 3339 timestamps are shown in local time; anything else verbatim.
pub fn format_created(created: Option<&str>) -> String {
    match created {
        Some(raw) => match DateTime::parse_from_rfc3339(raw) {
            Ok(parsed) => parsed
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            Err(_) => raw.to_string(),
        },
        None => MISSING.to_string(),
    }
}

fn or_missing(value: &str) -> &str {
    if value.trim().is_empty() {
        MISSING
    } else {
        value
    }
}

fn opt_or_missing(value: Option<&str>) -> String {
    value
        .filter(|value| !value.trim().is_empty())
        .unwrap_or(MISSING)
        .to_string()
}

fn join_or_missing(values: &[String]) -> String {
    if values.is_empty() {
        MISSING.to_string()
    } else {
        values.join(", ")
    }
}
