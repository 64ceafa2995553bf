//! 파이프라인 trait -- 모듈 확장 포인트 정의

use std::fmt;
use std::future::Future;

use crate::error::TailstatError;
use crate::types::ParseOutcome;

/// 로그 라인 파서 trait
///
/// 새로운 로그 형식을 지원하려면 이 trait을 구현합니다.
/// 파싱은 저장소에 대해 부수 효과가 없어야 합니다.
pub trait LineParser: Send + Sync {
    /// 지원하는 로그 형식 이름
    fn format_name(&self) -> &str;

    /// 원시 라인 한 줄을 레코드 또는 파싱 실패로 변환
    fn parse_line(&self, line: &str) -> ParseOutcome;
}

/// 장기 실행 파이프라인의 생명주기 trait
///
/// 데몬은 이 trait을 통해 파이프라인을 시작/정지하고 상태를 확인합니다.
pub trait Pipeline: Send {
    /// 백그라운드 태스크를 시작합니다.
    fn start(&mut self) -> impl Future<Output = Result<(), TailstatError>> + Send;

    /// 백그라운드 태스크를 정지합니다.
    fn stop(&mut self) -> impl Future<Output = Result<(), TailstatError>> + Send;

    /// 현재 상태를 점검합니다.
    fn health_check(&self) -> impl Future<Output = HealthStatus> + Send;
}

/// 파이프라인 상태
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// 정상
    Healthy,
    /// 동작 중이나 품질 저하
    Degraded(String),
    /// 비정상
    Unhealthy(String),
}

impl HealthStatus {
    /// 정상 여부
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }

    /// 비정상 여부
    pub fn is_unhealthy(&self) -> bool {
        matches!(self, Self::Unhealthy(_))
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Healthy => f.write_str("healthy"),
            Self::Degraded(reason) => write!(f, "degraded: {reason}"),
            Self::Unhealthy(reason) => write!(f, "unhealthy: {reason}"),
        }
    }
}
