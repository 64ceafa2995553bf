//! 에러 타입 -- 도메인별 에러 정의

/// tailstat 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum TailstatError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 파이프라인 처리 에러
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
///
/// 모두 시작 시점에서만 발생하며, 발생 시 수집 루프 진입 전에 프로세스가 종료됩니다.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    /// 로그 소스를 열 수 없음
    #[error("log source '{path}' is not readable: {reason}")]
    LogSourceUnreadable { path: String, reason: String },
}

/// 파이프라인 처리 에러
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// 파이프라인 초기화 실패
    #[error("pipeline init failed: {0}")]
    InitFailed(String),

    /// 이미 실행 중
    #[error("pipeline is already running")]
    AlreadyRunning,

    /// 실행 중이 아님
    #[error("pipeline is not running")]
    NotRunning,
}

/// 파싱 에러
///
/// 라인 단위의 비치명적 실패입니다. 수집 루프는 경고만 남기고 계속 진행합니다.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// 접근 로그 문법과 일치하지 않음
    #[error("line does not match the access log grammar")]
    Unmatched,

    /// 타임스탬프 해석 실패
    #[error("invalid timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },

    /// 입력 데이터 초과
    #[error("input too large: {size} bytes (max: {max})")]
    TooLarge { size: usize, max: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_to_top_level() {
        let err: TailstatError = ConfigError::FileNotFound {
            path: "/etc/tailstat.toml".to_owned(),
        }
        .into();
        assert!(matches!(err, TailstatError::Config(_)));
        assert!(err.to_string().contains("/etc/tailstat.toml"));
    }

    #[test]
    fn log_source_unreadable_display() {
        let err = ConfigError::LogSourceUnreadable {
            path: "/var/log/access.log".to_owned(),
            reason: "permission denied".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/var/log/access.log"));
        assert!(msg.contains("permission denied"));
    }

    #[test]
    fn invalid_timestamp_display() {
        let err = ParseError::InvalidTimestamp {
            value: "32/Foo/2020".to_owned(),
            reason: "input is out of range".to_owned(),
        };
        assert!(err.to_string().contains("32/Foo/2020"));
    }
}
