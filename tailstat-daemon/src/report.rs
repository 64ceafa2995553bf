//! Console reporting sink.
//!
//! Renders every [`TickReport`] produced by the monitor loop, either as the
//! human-readable statistics block or as one JSON object per line.

use std::fmt::{self, Display};
use std::io::Write;
use std::str::FromStr;

use anyhow::Result;
use chrono::{DateTime, Local, TimeZone};
use tokio::sync::{broadcast, mpsc};

use tailstat_core::event::{AlertLifecycle, TickReport};

/// Timestamp layout used in reports and the banner.
pub const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const SEPARATOR: &str = "###############################################################";

/// Report output format (`general.report_format`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Statistics block for terminals.
    Text,
    /// One JSON object per tick.
    Json,
}

impl FromStr for ReportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(anyhow::anyhow!(
                "unknown report format '{}', expected 'text' or 'json'",
                other
            )),
        }
    }
}

/// Format a unix timestamp (seconds) in the given timezone.
pub fn format_timestamp<Tz>(ts: f64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    #[allow(clippy::cast_possible_truncation)]
    let secs = ts.floor() as i64;
    match DateTime::from_timestamp(secs, 0) {
        Some(utc) => utc
            .with_timezone(tz)
            .format(DISPLAY_TIME_FORMAT)
            .to_string(),
        None => format!("{ts}"),
    }
}

/// Render one report as text.
pub fn render_text<Tz>(report: &TickReport, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    TextReport { report, tz }.to_string()
}

struct TextReport<'a, Tz> {
    report: &'a TickReport,
    tz: &'a Tz,
}

impl<Tz> fmt::Display for TextReport<'_, Tz>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;
        let stats = &report.stats;
        let time = |ts: f64| format_timestamp(ts, self.tz);

        writeln!(f, "*************************************")?;
        writeln!(f, "HTTP LOGS STATISTICS - {}", time(report.timestamp))?;
        writeln!(
            f,
            "###  Statistics for the last {} seconds ###",
            stats.period_secs
        )?;
        writeln!(f, " - Number of hits : {}", stats.hits)?;
        writeln!(f, " - Number of GET : {}", stats.get)?;
        writeln!(f, " - Number of POST : {}", stats.post)?;
        writeln!(f, " - Number of 2XX : {}", stats.status_2xx)?;
        writeln!(f, " - Number of 3XX : {}", stats.status_3xx)?;
        writeln!(f, " - Number of 4XX : {}", stats.status_4xx)?;
        writeln!(f, " - Number of 5XX : {}", stats.status_5xx)?;
        writeln!(f, " - Total traffic : {}", stats.total_bytes)?;
        writeln!(f, " - Top 3 sections : ")?;
        for (rank, section) in stats.top_sections.iter().enumerate() {
            writeln!(
                f,
                "     {}. {}: {} hits",
                rank + 1,
                section.section,
                section.hits
            )?;
        }
        writeln!(f, "{SEPARATOR}")?;

        if report.alerts.is_empty() {
            return writeln!(f, "### No alert ###");
        }

        let mut new = report.alerts_in(AlertLifecycle::New).peekable();
        if new.peek().is_some() {
            writeln!(
                f,
                "### New alerts during the last {} seconds ###",
                stats.period_secs
            )?;
            for event in new {
                writeln!(
                    f,
                    " - {} generated an alert - hits = {:.2}, triggered at {}",
                    event.kind,
                    event.value_start,
                    time(event.started_at)
                )?;
            }
        }

        let mut recovered = report.alerts_in(AlertLifecycle::Recovered).peekable();
        if recovered.peek().is_some() {
            writeln!(
                f,
                "### Recovered alerts during the last {} seconds ###",
                stats.period_secs
            )?;
            for event in recovered {
                writeln!(
                    f,
                    " - {} triggered at {} recovered at {} - was {:.2}, now {:.2}",
                    event.kind,
                    time(event.started_at),
                    event.ended_at.map(time).unwrap_or_default(),
                    event.value_start,
                    event.value_end.unwrap_or_default()
                )?;
            }
        }

        let mut active = report.alerts_in(AlertLifecycle::Active).peekable();
        if active.peek().is_some() {
            writeln!(f, "### Active alerts ###")?;
            for event in active {
                writeln!(f, " - Since {} : {}", time(event.started_at), event.kind)?;
            }
        }

        let mut past = report.alerts_in(AlertLifecycle::Archived).peekable();
        if past.peek().is_some() {
            writeln!(f, "### Past alerts ###")?;
            for event in past {
                writeln!(
                    f,
                    " - {} to {} : {}",
                    time(event.started_at),
                    event.ended_at.map(time).unwrap_or_default(),
                    event.kind
                )?;
            }
        }

        Ok(())
    }
}

/// Render one report as a single JSON line (with trailing newline).
pub fn render_json(report: &TickReport) -> Result<String> {
    let mut line = serde_json::to_string(report)
        .map_err(|e| anyhow::anyhow!("failed to serialize tick report: {}", e))?;
    line.push('\n');
    Ok(line)
}

/// Render one report in the requested format using local time.
pub fn render(report: &TickReport, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(render_text(report, &Local)),
        ReportFormat::Json => render_json(report),
    }
}

/// Write reports to `out` until shutdown is signalled or the channel closes.
///
/// Reports already queued when shutdown arrives are still written.
/// Returns the writer so callers can inspect buffered output.
pub async fn run_report_sink<W: Write>(
    mut report_rx: mpsc::Receiver<TickReport>,
    format: ReportFormat,
    mut out: W,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> W {
    let mut write_failed = false;
    let mut emit = |report: &TickReport, out: &mut W| {
        let result = render(report, format).and_then(|text| {
            out.write_all(text.as_bytes())?;
            out.flush()?;
            Ok(())
        });
        if let Err(e) = result {
            if !write_failed {
                tracing::warn!(error = %e, "failed to write report");
            }
            write_failed = true;
        }
    };

    loop {
        tokio::select! {
            report = report_rx.recv() => {
                match report {
                    Some(report) => emit(&report, &mut out),
                    None => {
                        tracing::debug!("report channel closed, exiting sink");
                        break;
                    }
                }
            }
            _ = shutdown_rx.recv() => {
                while let Ok(report) = report_rx.try_recv() {
                    emit(&report, &mut out);
                }
                tracing::debug!("report sink shutting down");
                break;
            }
        }
    }

    out
}
