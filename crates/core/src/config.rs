//! 설정 관리 -- tailstat.toml 파싱 및 런타임 설정
//!
//! [`TailstatConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`TAILSTAT_MONITOR_LOGFILE=/var/log/nginx/access.log` 형식)
//! 3. 설정 파일 (`tailstat.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 기본값 대체 정책
//! 선택적 숫자 설정(`stats_period`, `stats_refresh` 등)이 숫자가 아니거나 0이면
//! 시작을 실패시키지 않고 기본값으로 대체합니다. 알림 규칙의 필수 필드가
//! 빠졌거나 잘못된 경우 해당 규칙만 비활성화합니다.
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), tailstat_core::error::TailstatError> {
//! use tailstat_core::config::TailstatConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = TailstatConfig::load("tailstat.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = TailstatConfig::parse("[monitor]\nstats_period = 30")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::error::{ConfigError, TailstatError};
use crate::event::AlertKind;

/// 통계 윈도우 기본값 (초)
pub const DEFAULT_STATS_PERIOD: u64 = 10;
/// 평가 주기 기본값 (초)
pub const DEFAULT_STATS_REFRESH: u64 = 10;
/// 로그 소스 대기 주기 기본값 (밀리초)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;
/// 최대 라인 길이 기본값 (바이트)
pub const DEFAULT_MAX_LINE_LENGTH: usize = 64 * 1024;
/// HighTraffic 규칙 윈도우 기본값 (초)
pub const DEFAULT_HIGH_TRAFFIC_PERIOD: u64 = 120;
/// HighTraffic 규칙 임계값 기본값 (hits/sec)
pub const DEFAULT_HIGH_TRAFFIC_VALUE: f64 = 10.0;

/// tailstat 통합 설정
///
/// `tailstat.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TailstatConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 로그 모니터 설정
    #[serde(default)]
    pub monitor: MonitorConfig,
    /// 알림 규칙 설정 (유형별)
    #[serde(default)]
    pub alerts: AlertsConfig,
    /// 메트릭 설정
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl TailstatConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱 (기본값 대체 포함)
    /// 2. 환경변수 오버라이드 적용
    /// 3. 유효성 검증
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, TailstatError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.apply_fallbacks();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, TailstatError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TailstatError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                TailstatError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱하고 기본값 대체를 적용합니다.
    pub fn parse(toml_str: &str) -> Result<Self, TailstatError> {
        let mut config: Self = toml::from_str(toml_str).map_err(|e| {
            TailstatError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })?;
        config.apply_fallbacks();
        Ok(config)
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `TAILSTAT_{SECTION}_{FIELD}`
    /// 알림 규칙은 `TAILSTAT_ALERTS_{KIND}_{FIELD}` (예: `TAILSTAT_ALERTS_HIGH_TRAFFIC_LIMIT_VALUE`)
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "TAILSTAT_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "TAILSTAT_GENERAL_LOG_FORMAT");
        override_string(
            &mut self.general.report_format,
            "TAILSTAT_GENERAL_REPORT_FORMAT",
        );

        // Monitor
        override_string(&mut self.monitor.logfile, "TAILSTAT_MONITOR_LOGFILE");
        override_u64(
            &mut self.monitor.stats_period,
            "TAILSTAT_MONITOR_STATS_PERIOD",
        );
        override_u64(
            &mut self.monitor.stats_refresh,
            "TAILSTAT_MONITOR_STATS_REFRESH",
        );
        override_bool(&mut self.monitor.from_start, "TAILSTAT_MONITOR_FROM_START");
        override_u64(
            &mut self.monitor.poll_interval_ms,
            "TAILSTAT_MONITOR_POLL_INTERVAL_MS",
        );
        override_usize(
            &mut self.monitor.max_line_length,
            "TAILSTAT_MONITOR_MAX_LINE_LENGTH",
        );

        // Alerts
        for (kind, rule) in self.alerts.iter_mut() {
            let prefix = format!("TAILSTAT_ALERTS_{}", kind.as_str().to_uppercase());
            override_bool(&mut rule.enabled, &format!("{prefix}_ENABLED"));
            override_opt_u64(&mut rule.limit_period, &format!("{prefix}_LIMIT_PERIOD"));
            override_opt_f64(&mut rule.limit_value, &format!("{prefix}_LIMIT_VALUE"));
        }

        // Metrics
        override_bool(&mut self.metrics.enabled, "TAILSTAT_METRICS_ENABLED");
        override_string(&mut self.metrics.listen_addr, "TAILSTAT_METRICS_LISTEN_ADDR");
        override_u16(&mut self.metrics.port, "TAILSTAT_METRICS_PORT");
    }

    /// 잘못된 선택적 값을 기본값으로 대체하고, 불완전한 알림 규칙을 비활성화합니다.
    ///
    /// 여러 번 호출해도 결과가 같습니다.
    pub fn apply_fallbacks(&mut self) {
        fallback_u64(
            &mut self.monitor.stats_period,
            DEFAULT_STATS_PERIOD,
            "monitor.stats_period",
        );
        fallback_u64(
            &mut self.monitor.stats_refresh,
            DEFAULT_STATS_REFRESH,
            "monitor.stats_refresh",
        );
        fallback_u64(
            &mut self.monitor.poll_interval_ms,
            DEFAULT_POLL_INTERVAL_MS,
            "monitor.poll_interval_ms",
        );
        if self.monitor.max_line_length == 0 {
            warn!(
                field = "monitor.max_line_length",
                default = DEFAULT_MAX_LINE_LENGTH,
                "missing or invalid value, using default"
            );
            self.monitor.max_line_length = DEFAULT_MAX_LINE_LENGTH;
        }

        for (kind, rule) in self.alerts.iter_mut() {
            if rule.enabled && rule.limits().is_none() {
                warn!(
                    alert = kind.as_str(),
                    limit_period = ?rule.limit_period,
                    limit_value = ?rule.limit_value,
                    "alert rule is incomplete, disabling it"
                );
                rule.enabled = false;
            }
        }
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), TailstatError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        let valid_report_formats = ["text", "json"];
        if !valid_report_formats.contains(&self.general.report_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.report_format".to_owned(),
                reason: format!("must be one of: {}", valid_report_formats.join(", ")),
            }
            .into());
        }

        if self.monitor.logfile.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "monitor.logfile".to_owned(),
                reason: "log file path must not be empty".to_owned(),
            }
            .into());
        }

        if self.metrics.enabled && self.metrics.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "metrics.port".to_owned(),
                reason: "port must be non-zero when metrics are enabled".to_owned(),
            }
            .into());
        }

        Ok(())
    }

    /// 활성화된 알림 규칙과 임계값 목록을 반환합니다.
    pub fn enabled_rules(&self) -> Vec<(AlertKind, RuleLimits)> {
        self.alerts
            .iter()
            .filter(|(_, rule)| rule.enabled)
            .filter_map(|(kind, rule)| rule.limits().map(|limits| (kind, limits)))
            .collect()
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
    /// 리포트 출력 형식 (text, json)
    pub report_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
            report_format: "text".to_owned(),
        }
    }
}

/// 로그 모니터 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// 분석할 접근 로그 파일
    pub logfile: String,
    /// 통계 윈도우 (초)
    #[serde(deserialize_with = "lenient_count")]
    pub stats_period: u64,
    /// 평가 주기 (초)
    #[serde(deserialize_with = "lenient_count")]
    pub stats_refresh: u64,
    /// 기존 파일 내용부터 읽을지 여부 (false면 파일 끝에서 시작)
    pub from_start: bool,
    /// 새 데이터가 없을 때 대기 주기 (밀리초)
    #[serde(deserialize_with = "lenient_count")]
    pub poll_interval_ms: u64,
    /// 최대 라인 길이 (바이트)
    #[serde(deserialize_with = "lenient_count")]
    pub max_line_length: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            logfile: "/var/log/access.log".to_owned(),
            stats_period: DEFAULT_STATS_PERIOD,
            stats_refresh: DEFAULT_STATS_REFRESH,
            from_start: true,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

impl MonitorConfig {
    /// 로그 소스를 읽을 수 있는지 확인합니다.
    ///
    /// 수집 루프 진입 전에 호출되며, 실패는 치명적 설정 에러입니다.
    pub async fn check_log_source(&self) -> Result<(), ConfigError> {
        let unreadable = |reason: String| ConfigError::LogSourceUnreadable {
            path: self.logfile.clone(),
            reason,
        };

        let file = tokio::fs::File::open(&self.logfile)
            .await
            .map_err(|e| unreadable(e.to_string()))?;
        let metadata = file.metadata().await.map_err(|e| unreadable(e.to_string()))?;
        if !metadata.is_file() {
            return Err(unreadable("not a regular file".to_owned()));
        }
        Ok(())
    }
}

/// 알림 규칙 설정 묶음
///
/// 알림 유형마다 `[alerts.<kind>]` 테이블 하나를 가집니다.
/// 테이블이 없으면 해당 유형의 기본 규칙이 적용됩니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlertsConfig {
    /// 초당 요청 수 과다 알림
    #[serde(default)]
    pub high_traffic: AlertRuleConfig,
}

impl AlertsConfig {
    /// 유형별 규칙 설정을 반환합니다.
    pub fn get(&self, kind: AlertKind) -> &AlertRuleConfig {
        match kind {
            AlertKind::HighTraffic => &self.high_traffic,
        }
    }

    /// 유형별 규칙 설정을 가변 참조로 반환합니다.
    pub fn get_mut(&mut self, kind: AlertKind) -> &mut AlertRuleConfig {
        match kind {
            AlertKind::HighTraffic => &mut self.high_traffic,
        }
    }

    /// (유형, 규칙) 쌍을 순회합니다.
    pub fn iter(&self) -> impl Iterator<Item = (AlertKind, &AlertRuleConfig)> {
        AlertKind::ALL.into_iter().map(|kind| (kind, self.get(kind)))
    }

    /// (유형, 규칙) 쌍을 가변 참조로 순회합니다.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (AlertKind, &mut AlertRuleConfig)> {
        let Self { high_traffic } = self;
        [(AlertKind::HighTraffic, high_traffic)].into_iter()
    }
}

/// 알림 규칙 설정
///
/// 규칙 테이블이 존재하면 필드 기본값은 적용되지 않습니다.
/// `enabled = true`인데 `limit_period`/`limit_value`가 없거나 잘못되면 규칙이 비활성화됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRuleConfig {
    /// 활성화 여부
    #[serde(default)]
    pub enabled: bool,
    /// hit rate 계산 윈도우 (초)
    #[serde(
        default,
        deserialize_with = "lenient_opt_u64",
        skip_serializing_if = "Option::is_none"
    )]
    pub limit_period: Option<u64>,
    /// 임계값 (hits/sec)
    #[serde(
        default,
        deserialize_with = "lenient_opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub limit_value: Option<f64>,
}

impl Default for AlertRuleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            limit_period: Some(DEFAULT_HIGH_TRAFFIC_PERIOD),
            limit_value: Some(DEFAULT_HIGH_TRAFFIC_VALUE),
        }
    }
}

impl AlertRuleConfig {
    /// 유효한 임계값 쌍을 반환합니다. 하나라도 없거나 양수가 아니면 `None`.
    pub fn limits(&self) -> Option<RuleLimits> {
        let limit_period = self.limit_period.filter(|p| *p > 0)?;
        let limit_value = self.limit_value.filter(|v| v.is_finite() && *v > 0.0)?;
        Some(RuleLimits {
            limit_period,
            limit_value,
        })
    }
}

/// 검증된 알림 규칙 임계값
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleLimits {
    /// hit rate 계산 윈도우 (초)
    pub limit_period: u64,
    /// 임계값 (hits/sec)
    pub limit_value: f64,
}

/// 메트릭 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Prometheus 엔드포인트 활성화 여부
    pub enabled: bool,
    /// 바인드 주소
    pub listen_addr: String,
    /// 포트
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "127.0.0.1".to_owned(),
            port: 9464,
        }
    }
}

// --- 관대한 숫자 역직렬화 ---

/// 정수, 실수, 숫자 문자열을 모두 숫자로 해석합니다.
fn numeric(value: &toml::Value) -> Option<f64> {
    let parsed = match value {
        #[allow(clippy::cast_precision_loss)]
        toml::Value::Integer(n) => Some(*n as f64),
        toml::Value::Float(f) => Some(*f),
        toml::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite())
}

/// 양의 정수로 해석합니다. 해석할 수 없으면 0 (이후 기본값으로 대체).
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lenient_count<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64> + Default,
{
    let value = toml::Value::deserialize(deserializer)?;
    Ok(numeric(&value)
        .filter(|n| *n >= 1.0)
        .and_then(|n| T::try_from(n as u64).ok())
        .unwrap_or_default())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lenient_opt_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = toml::Value::deserialize(deserializer)?;
    Ok(numeric(&value).filter(|n| *n >= 1.0).map(|n| n as u64))
}

fn lenient_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = toml::Value::deserialize(deserializer)?;
    Ok(numeric(&value))
}

fn fallback_u64(target: &mut u64, default: u64, field: &'static str) {
    if *target == 0 {
        warn!(field, default, "missing or invalid value, using default");
        *target = default;
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u16(target: &mut u16, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u16>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u16 from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_opt_u64(target: &mut Option<u64>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = Some(parsed),
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_opt_f64(target: &mut Option<f64>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<f64>() {
            Ok(parsed) => *target = Some(parsed),
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse f64 from env var, ignoring"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_documented_values() {
        let config = TailstatConfig::default();
        assert_eq!(config.monitor.stats_period, 10);
        assert_eq!(config.monitor.stats_refresh, 10);
        let rule = config.alerts.get(AlertKind::HighTraffic);
        assert!(rule.enabled);
        assert_eq!(rule.limit_period, Some(120));
        assert_eq!(rule.limit_value, Some(10.0));
    }

    #[test]
    fn default_config_passes_validation() {
        TailstatConfig::default().validate().unwrap();
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config = TailstatConfig::parse("").unwrap();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.monitor.logfile, "/var/log/access.log");
        assert_eq!(config.enabled_rules().len(), 1);
    }

    #[test]
    fn partial_toml_merges_with_defaults() {
        let toml = r#"
[monitor]
logfile = "/tmp/access.log"
stats_period = 30
"#;
        let config = TailstatConfig::parse(toml).unwrap();
        assert_eq!(config.monitor.logfile, "/tmp/access.log");
        assert_eq!(config.monitor.stats_period, 30);
        // stats_refresh는 기본값 유지
        assert_eq!(config.monitor.stats_refresh, 10);
    }

    #[test]
    fn non_numeric_settings_fall_back_to_defaults() {
        let toml = r#"
[monitor]
stats_period = "often"
stats_refresh = 0
poll_interval_ms = "500"
"#;
        let config = TailstatConfig::parse(toml).unwrap();
        assert_eq!(config.monitor.stats_period, DEFAULT_STATS_PERIOD);
        assert_eq!(config.monitor.stats_refresh, DEFAULT_STATS_REFRESH);
        assert_eq!(config.monitor.poll_interval_ms, 500);
    }

    #[test]
    fn float_settings_are_truncated() {
        let config = TailstatConfig::parse("[monitor]\nstats_period = 15.7").unwrap();
        assert_eq!(config.monitor.stats_period, 15);
    }

    #[test]
    fn incomplete_rule_is_disabled() {
        let toml = r#"
[alerts.high_traffic]
enabled = true
limit_period = 60
"#;
        let config = TailstatConfig::parse(toml).unwrap();
        assert!(!config.alerts.get(AlertKind::HighTraffic).enabled);
        assert!(config.enabled_rules().is_empty());
    }

    #[test]
    fn non_numeric_rule_value_disables_rule() {
        let toml = r#"
[alerts.high_traffic]
enabled = true
limit_period = 60
limit_value = "lots"
"#;
        let config = TailstatConfig::parse(toml).unwrap();
        assert!(config.enabled_rules().is_empty());
    }

    #[test]
    fn rule_accepts_numeric_strings() {
        let toml = r#"
[alerts.high_traffic]
enabled = true
limit_period = "2"
limit_value = "1.5"
"#;
        let config = TailstatConfig::parse(toml).unwrap();
        let rules = config.enabled_rules();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].1.limit_period, 2);
        assert_eq!(rules[0].1.limit_value, 1.5);
    }

    #[test]
    fn explicitly_disabled_rule_is_skipped() {
        let toml = r#"
[alerts.high_traffic]
enabled = false
limit_period = 60
limit_value = 5
"#;
        let config = TailstatConfig::parse(toml).unwrap();
        assert!(config.enabled_rules().is_empty());
    }

    #[test]
    fn unknown_alert_kind_is_structural_error() {
        let toml = r#"
[alerts.disk_full]
enabled = true
"#;
        let err = TailstatConfig::parse(toml).unwrap_err();
        assert!(matches!(
            err,
            TailstatError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn invalid_toml_returns_parse_error() {
        let err = TailstatConfig::parse("invalid = [[[toml").unwrap_err();
        assert!(matches!(
            err,
            TailstatError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut config = TailstatConfig::default();
        config.general.log_level = "verbose".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    fn validate_rejects_invalid_report_format() {
        let mut config = TailstatConfig::default();
        config.general.report_format = "html".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("report_format"));
    }

    #[test]
    fn validate_rejects_empty_logfile() {
        let mut config = TailstatConfig::default();
        config.monitor.logfile = "  ".to_owned();
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn check_log_source_rejects_missing_file() {
        let config = MonitorConfig {
            logfile: "/nonexistent/tailstat/access.log".to_owned(),
            ..Default::default()
        };
        let err = config.check_log_source().await.unwrap_err();
        assert!(matches!(err, ConfigError::LogSourceUnreadable { .. }));
    }

    #[tokio::test]
    async fn check_log_source_rejects_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = MonitorConfig {
            logfile: dir.path().display().to_string(),
            ..Default::default()
        };
        assert!(config.check_log_source().await.is_err());
    }

    #[tokio::test]
    async fn check_log_source_accepts_regular_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = MonitorConfig {
            logfile: file.path().display().to_string(),
            ..Default::default()
        };
        config.check_log_source().await.unwrap();
    }
}
