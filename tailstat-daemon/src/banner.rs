//! Startup banner printed before the monitor loop starts.

use std::fmt::{self, Display};

use chrono::{DateTime, TimeZone};

use tailstat_core::config::TailstatConfig;

use crate::report::DISPLAY_TIME_FORMAT;

/// Render the startup banner for the effective configuration.
pub fn render_banner<Tz>(config: &TailstatConfig, started_at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    Banner { config, started_at }.to_string()
}

struct Banner<'a, Tz: TimeZone> {
    config: &'a TailstatConfig,
    started_at: &'a DateTime<Tz>,
}

impl<Tz> fmt::Display for Banner<'_, Tz>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let monitor = &self.config.monitor;

        writeln!(f, "********************************")?;
        writeln!(f, "HTTP LOGS STATISTICS STARTING UP")?;
        writeln!(f, "********************************")?;
        writeln!(f, "Version : {}", env!("CARGO_PKG_VERSION"))?;
        writeln!(f, "{}", self.started_at.format(DISPLAY_TIME_FORMAT))?;
        writeln!(f)?;
        writeln!(f, "Loaded configuration:")?;
        writeln!(f, "  Log file analysed : {}", monitor.logfile)?;
        writeln!(
            f,
            "  Display statistics about the last {} seconds every {} seconds",
            monitor.stats_period, monitor.stats_refresh
        )?;
        writeln!(f)?;
        writeln!(f, "Enabled alerts")?;
        for (kind, rule) in self.config.alerts.iter() {
            match rule.limits().filter(|_| rule.enabled) {
                Some(limits) => writeln!(
                    f,
                    "  [X] {kind}: Traffic > {} request per sec over {} seconds",
                    limits.limit_value, limits.limit_period
                )?,
                None => writeln!(f, "  [ ] {kind}")?,
            }
        }
        writeln!(f)?;
        writeln!(f, "Starting analysing {}", monitor.logfile)?;
        writeln!(f, "--------------------------------------")
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn started_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2018, 5, 9, 16, 0, 39).unwrap()
    }

    #[test]
    fn banner_lists_enabled_rule() {
        let banner = render_banner(&TailstatConfig::default(), &started_at());
        assert!(banner.contains("2018-05-09 16:00:39"));
        assert!(banner.contains("  Log file analysed : /var/log/access.log"));
        assert!(banner.contains("about the last 10 seconds every 10 seconds"));
        assert!(banner.contains("  [X] High traffic: Traffic > 10 request per sec over 120 seconds"));
    }

    #[test]
    fn banner_marks_disabled_rule() {
        let mut config = TailstatConfig::default();
        config.alerts.high_traffic.enabled = false;
        let banner = render_banner(&config, &started_at());
        assert!(banner.contains("  [ ] High traffic\n"));
        assert!(!banner.contains("[X]"));
    }
}
