//! tailstat.toml 통합 설정 테스트
//!
//! - tailstat.toml.example 파싱 테스트
//! - 부분 설정 / 기본값 대체 테스트
//! - 환경변수 우선순위 테스트
//! - 잘못된 형식 에러 테스트

use tailstat_core::config::{RuleLimits, TailstatConfig};
use tailstat_core::error::{ConfigError, TailstatError};
use tailstat_core::event::AlertKind;

const EXAMPLE: &str = include_str!("../../../tailstat.toml.example");

/// 환경변수를 설정한 채로 `f`를 실행하고 원래 값을 복원합니다.
fn with_env<T>(vars: &[(&str, &str)], f: impl FnOnce() -> T) -> T {
    let originals: Vec<_> = vars
        .iter()
        .map(|(key, _)| (*key, std::env::var(key).ok()))
        .collect();
    // SAFETY: serial_test로 직렬화된 테스트에서만 호출됩니다.
    unsafe {
        for (key, value) in vars {
            std::env::set_var(key, value);
        }
    }

    let result = f();

    // SAFETY: 테스트 정리
    unsafe {
        for (key, original) in originals {
            match original {
                Some(val) => std::env::set_var(key, val),
                None => std::env::remove_var(key),
            }
        }
    }
    result
}

// =============================================================================
// tailstat.toml.example 파싱 테스트
// =============================================================================

#[test]
fn example_config_parses_and_validates() {
    let config = TailstatConfig::parse(EXAMPLE).expect("example config should parse");
    config
        .validate()
        .expect("example config should pass validation");

    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.general.report_format, "text");
    assert_eq!(config.monitor.logfile, "/var/log/access.log");
    assert!(config.monitor.from_start);
    assert!(!config.metrics.enabled);
}

#[test]
fn example_config_matches_code_defaults() {
    let example = TailstatConfig::parse(EXAMPLE).expect("should parse");
    let defaults = TailstatConfig::default();

    assert_eq!(example.monitor.stats_period, defaults.monitor.stats_period);
    assert_eq!(example.monitor.stats_refresh, defaults.monitor.stats_refresh);
    assert_eq!(
        example.monitor.poll_interval_ms,
        defaults.monitor.poll_interval_ms
    );
    assert_eq!(
        example.monitor.max_line_length,
        defaults.monitor.max_line_length
    );
    assert_eq!(example.alerts.high_traffic, defaults.alerts.high_traffic);
    assert_eq!(example.metrics.port, defaults.metrics.port);
}

#[test]
fn example_config_enables_high_traffic_rule() {
    let config = TailstatConfig::parse(EXAMPLE).expect("should parse");
    assert_eq!(
        config.enabled_rules(),
        vec![(
            AlertKind::HighTraffic,
            RuleLimits {
                limit_period: 120,
                limit_value: 10.0,
            }
        )]
    );
}

#[tokio::test]
async fn load_example_config_from_disk() {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let example_path = format!("{manifest_dir}/../../tailstat.toml.example");

    let config = TailstatConfig::from_file(&example_path)
        .await
        .expect("example file should load");
    config.validate().expect("loaded example should validate");
}

// =============================================================================
// 부분 설정 / 기본값 대체 테스트
// =============================================================================

#[test]
fn empty_string_parses_with_defaults() {
    let config = TailstatConfig::parse("").expect("empty config should parse");
    assert_eq!(config.monitor.stats_period, 10);
    assert_eq!(config.enabled_rules().len(), 1);
}

#[test]
fn partial_monitor_section_keeps_other_defaults() {
    let config = TailstatConfig::parse(
        r#"
[monitor]
logfile = "/srv/www/access.log"
stats_period = 30
"#,
    )
    .expect("should parse");

    assert_eq!(config.monitor.logfile, "/srv/www/access.log");
    assert_eq!(config.monitor.stats_period, 30);
    assert_eq!(config.monitor.stats_refresh, 10);
    assert_eq!(config.general.log_format, "pretty");
}

#[test]
fn non_numeric_period_falls_back_to_default() {
    let config = TailstatConfig::parse(
        r#"
[monitor]
stats_period = "ten"
stats_refresh = 0
"#,
    )
    .expect("invalid optional values should not fail parsing");

    assert_eq!(config.monitor.stats_period, 10);
    assert_eq!(config.monitor.stats_refresh, 10);
}

#[test]
fn incomplete_rule_is_disabled() {
    let config = TailstatConfig::parse(
        r#"
[alerts.high_traffic]
enabled = true
limit_period = 60
"#,
    )
    .expect("should parse");

    assert!(!config.alerts.high_traffic.enabled);
    assert!(config.enabled_rules().is_empty());
}

#[test]
fn explicitly_disabled_rule_is_skipped() {
    let config = TailstatConfig::parse(
        r#"
[alerts.high_traffic]
enabled = false
limit_period = 60
limit_value = 5
"#,
    )
    .expect("should parse");
    assert!(config.enabled_rules().is_empty());
}

#[test]
fn malformed_toml_returns_parse_error() {
    let result = TailstatConfig::parse("[monitor\nstats_period = 10");
    assert!(matches!(
        result,
        Err(TailstatError::Config(ConfigError::ParseFailed { .. }))
    ));
}

#[test]
fn invalid_report_format_fails_validation() {
    let config = TailstatConfig::parse(
        r#"
[general]
report_format = "xml"
"#,
    )
    .expect("should parse");
    assert!(config.validate().is_err());
}

#[tokio::test]
async fn from_file_nonexistent_returns_file_not_found() {
    let result = TailstatConfig::from_file("/tmp/tailstat_test_nonexistent_12345.toml").await;
    assert!(matches!(
        result,
        Err(TailstatError::Config(ConfigError::FileNotFound { .. }))
    ));
}

#[tokio::test]
async fn check_log_source_accepts_existing_file() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let mut config = TailstatConfig::default();
    config.monitor.logfile = file.path().display().to_string();
    config.monitor.check_log_source().await.unwrap();
}

#[tokio::test]
async fn check_log_source_rejects_missing_file_and_directory() {
    let mut config = TailstatConfig::default();
    config.monitor.logfile = "/tmp/tailstat_test_missing_access.log".to_owned();
    assert!(matches!(
        config.monitor.check_log_source().await,
        Err(ConfigError::LogSourceUnreadable { .. })
    ));

    let dir = tempfile::tempdir().unwrap();
    config.monitor.logfile = dir.path().display().to_string();
    assert!(matches!(
        config.monitor.check_log_source().await,
        Err(ConfigError::LogSourceUnreadable { .. })
    ));
}

// =============================================================================
// 환경변수 우선순위 테스트
// =============================================================================

#[test]
#[serial_test::serial]
fn env_override_takes_precedence_over_toml() {
    let mut config = TailstatConfig::parse(EXAMPLE).expect("should parse");
    with_env(
        &[
            ("TAILSTAT_MONITOR_LOGFILE", "/var/log/nginx/access.log"),
            ("TAILSTAT_MONITOR_STATS_PERIOD", "60"),
            ("TAILSTAT_MONITOR_FROM_START", "false"),
        ],
        || config.apply_env_overrides(),
    );

    assert_eq!(config.monitor.logfile, "/var/log/nginx/access.log");
    assert_eq!(config.monitor.stats_period, 60);
    assert!(!config.monitor.from_start);
}

#[test]
#[serial_test::serial]
fn env_override_alert_rule_limits() {
    let mut config = TailstatConfig::default();
    with_env(
        &[
            ("TAILSTAT_ALERTS_HIGH_TRAFFIC_LIMIT_PERIOD", "30"),
            ("TAILSTAT_ALERTS_HIGH_TRAFFIC_LIMIT_VALUE", "2.5"),
        ],
        || config.apply_env_overrides(),
    );

    assert_eq!(config.alerts.high_traffic.limit_period, Some(30));
    assert_eq!(config.alerts.high_traffic.limit_value, Some(2.5));
}

#[test]
#[serial_test::serial]
fn env_override_unparseable_value_is_ignored() {
    let mut config = TailstatConfig::default();
    with_env(&[("TAILSTAT_MONITOR_STATS_REFRESH", "soon")], || {
        config.apply_env_overrides()
    });
    assert_eq!(config.monitor.stats_refresh, 10);
}

#[test]
#[serial_test::serial]
fn env_override_zero_falls_back_after_load_order() {
    let mut config = TailstatConfig::default();
    with_env(&[("TAILSTAT_MONITOR_STATS_PERIOD", "0")], || {
        config.apply_env_overrides()
    });
    assert_eq!(config.monitor.stats_period, 0);

    config.apply_fallbacks();
    assert_eq!(config.monitor.stats_period, 10);
}
