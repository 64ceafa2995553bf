//! 모니터 설정
//!
//! [`MonitorSettings`]는 core의 [`TailstatConfig`]에서 수집 루프가 사용하는
//! 값만 추려낸 설정입니다. 기본값 대체와 규칙 비활성화는 core 설정 로딩 단계에서
//! 이미 끝났으므로, 여기서는 루프를 구동할 수 없는 값만 거부합니다.
//!
//! # 사용 예시
//! ```ignore
//! use tailstat_core::config::TailstatConfig;
//! use tailstat_log_pipeline::config::MonitorSettings;
//!
//! let core_config = TailstatConfig::default();
//! let settings = MonitorSettings::from_core(&core_config);
//! ```

use std::path::PathBuf;
use std::time::Duration;

use tailstat_core::config::{RuleLimits, TailstatConfig};
use tailstat_core::event::AlertKind;

use crate::collector::TailerConfig;
use crate::error::LogPipelineError;

/// 모니터 설정
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    /// 분석할 접근 로그 파일
    pub logfile: PathBuf,
    /// 통계 윈도우 (초)
    pub stats_period: u64,
    /// 평가 주기 (초)
    pub stats_refresh: u64,
    /// 기존 파일 내용부터 읽을지 여부
    pub from_start: bool,
    /// EOF 대기 주기 (밀리초)
    pub poll_interval_ms: u64,
    /// 최대 라인 길이 (바이트)
    pub max_line_length: usize,
    /// 활성화된 알림 규칙
    pub rules: Vec<(AlertKind, RuleLimits)>,

    // --- 확장 설정 (core에 없는 추가 필드) ---
    /// 수집기 -> 루프 라인 채널 용량
    pub line_channel_capacity: usize,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self::from_core(&TailstatConfig::default())
    }
}

impl MonitorSettings {
    /// core 설정에서 모니터 설정을 생성합니다.
    ///
    /// core 설정에 없는 확장 필드는 기본값이 적용됩니다.
    pub fn from_core(core: &TailstatConfig) -> Self {
        let monitor = &core.monitor;
        Self {
            logfile: PathBuf::from(&monitor.logfile),
            stats_period: monitor.stats_period,
            stats_refresh: monitor.stats_refresh,
            from_start: monitor.from_start,
            poll_interval_ms: monitor.poll_interval_ms,
            max_line_length: monitor.max_line_length,
            rules: core.enabled_rules(),
            line_channel_capacity: 10_000,
        }
    }

    /// 레코드 저장소가 보존해야 하는 최대 윈도우 (초)
    pub fn retention_secs(&self) -> u64 {
        self.rules
            .iter()
            .map(|(_, limits)| limits.limit_period)
            .fold(self.stats_period, u64::max)
    }

    /// 평가 주기
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.stats_refresh)
    }

    /// 수집기 설정
    pub fn tailer_config(&self) -> TailerConfig {
        TailerConfig {
            path: self.logfile.clone(),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            max_line_length: self.max_line_length,
            from_start: self.from_start,
        }
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LogPipelineError> {
        const MAX_CHANNEL_CAPACITY: usize = 1_000_000;

        let positive = [
            ("stats_period", self.stats_period),
            ("stats_refresh", self.stats_refresh),
            ("poll_interval_ms", self.poll_interval_ms),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(LogPipelineError::Config {
                    field: field.to_owned(),
                    reason: "must be greater than 0".to_owned(),
                });
            }
        }

        if self.max_line_length == 0 {
            return Err(LogPipelineError::Config {
                field: "max_line_length".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        if self.line_channel_capacity == 0 || self.line_channel_capacity > MAX_CHANNEL_CAPACITY {
            return Err(LogPipelineError::Config {
                field: "line_channel_capacity".to_owned(),
                reason: format!("must be 1-{MAX_CHANNEL_CAPACITY}"),
            });
        }

        if self.logfile.as_os_str().is_empty() {
            return Err(LogPipelineError::Config {
                field: "logfile".to_owned(),
                reason: "log file path must not be empty".to_owned(),
            });
        }

        for (kind, limits) in &self.rules {
            if limits.limit_period == 0 || limits.limit_value.is_nan() || limits.limit_value <= 0.0 {
                return Err(LogPipelineError::Config {
                    field: format!("alerts.{}", kind.as_str()),
                    reason: "limit_period and limit_value must be positive".to_owned(),
                });
            }
        }

        Ok(())
    }
}

/// 모니터 설정 빌더
///
/// 테스트와 임베딩 용도로 개별 값을 지정할 때 사용합니다.
#[derive(Default)]
pub struct MonitorSettingsBuilder {
    settings: MonitorSettings,
}

impl MonitorSettingsBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 분석할 파일을 설정합니다.
    pub fn logfile(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings.logfile = path.into();
        self
    }

    /// 통계 윈도우(초)를 설정합니다.
    pub fn stats_period(mut self, secs: u64) -> Self {
        self.settings.stats_period = secs;
        self
    }

    /// 평가 주기(초)를 설정합니다.
    pub fn stats_refresh(mut self, secs: u64) -> Self {
        self.settings.stats_refresh = secs;
        self
    }

    /// 기존 내용부터 읽을지 설정합니다.
    pub fn from_start(mut self, from_start: bool) -> Self {
        self.settings.from_start = from_start;
        self
    }

    /// EOF 대기 주기(밀리초)를 설정합니다.
    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.settings.poll_interval_ms = ms;
        self
    }

    /// 알림 규칙 목록을 교체합니다.
    pub fn rules(mut self, rules: Vec<(AlertKind, RuleLimits)>) -> Self {
        self.settings.rules = rules;
        self
    }

    /// 라인 채널 용량을 설정합니다.
    pub fn line_channel_capacity(mut self, capacity: usize) -> Self {
        self.settings.line_channel_capacity = capacity;
        self
    }

    /// 설정을 검증하고 `MonitorSettings`를 생성합니다.
    pub fn build(self) -> Result<MonitorSettings, LogPipelineError> {
        self.settings.validate()?;
        Ok(self.settings)
    }
}
