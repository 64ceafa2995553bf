//! 도메인 타입 -- 시스템 전역에서 사용되는 공통 타입
//!
//! 파서가 생성하고 레코드 저장소, 통계 집계기, 알림 엔진이 소비하는
//! 접근 로그 레코드와 파싱 결과를 정의합니다.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// 접근 로그 시각 형식 (`10/Oct/2000:13:55:36 -0700`)
pub const ACCESS_LOG_TIME_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// 현재 시각을 epoch 초(소수점 포함)로 반환합니다.
pub fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}

/// 파싱된 접근 로그 레코드
///
/// 생성 이후에는 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// 요청 시각 (로그에 기록된 오프셋 유지)
    pub time: DateTime<FixedOffset>,
    /// 원격 호스트
    pub host: String,
    /// 사용자 식별자
    pub user: String,
    /// HTTP 메서드
    pub method: String,
    /// 첫 번째 경로 세그먼트 (`/api`)
    pub section: String,
    /// 두 번째 경로 세그먼트 (`/user`), 없을 수 있음
    pub subsection: Option<String>,
    /// 프로토콜 (`HTTP/1.0`), 없을 수 있음
    pub protocol: Option<String>,
    /// 응답 상태 코드
    pub status: u16,
    /// 응답 크기
    pub size: ContentSize,
}

impl LogRecord {
    /// 요청 시각을 epoch 초로 반환합니다.
    #[allow(clippy::cast_precision_loss)]
    pub fn timestamp(&self) -> f64 {
        self.time.timestamp() as f64 + f64::from(self.time.timestamp_subsec_micros()) / 1_000_000.0
    }

    /// 상태 코드 분류 (2xx~5xx 외에는 `None`)
    pub fn status_class(&self) -> Option<StatusClass> {
        StatusClass::from_status(self.status)
    }
}

impl fmt::Display for LogRecord {
    /// 접근 로그 문법으로 레코드를 다시 직렬화합니다.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} [{}] \"{} {}{} {}\" {} {}",
            self.host,
            self.user,
            self.time.format(ACCESS_LOG_TIME_FORMAT),
            self.method,
            self.section,
            self.subsection.as_deref().unwrap_or_default(),
            self.protocol.as_deref().unwrap_or_default(),
            self.status,
            self.size,
        )
    }
}

/// 응답 크기
///
/// 숫자가 아닌 값(`-` 등)은 원문을 보존한 `Unknown`으로 표현되며 합계에서 제외됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentSize {
    /// 바이트 수
    Bytes(u64),
    /// 해석할 수 없는 값
    Unknown(String),
}

impl ContentSize {
    /// 로그 필드 원문에서 크기를 해석합니다.
    pub fn parse(raw: &str) -> Self {
        raw.parse::<u64>()
            .map(Self::Bytes)
            .unwrap_or_else(|_| Self::Unknown(raw.to_owned()))
    }

    /// 바이트 수를 반환합니다. `Unknown`이면 `None`.
    pub fn bytes(&self) -> Option<u64> {
        match self {
            Self::Bytes(n) => Some(*n),
            Self::Unknown(_) => None,
        }
    }
}

impl fmt::Display for ContentSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(n) => write!(f, "{n}"),
            Self::Unknown(raw) => f.write_str(raw),
        }
    }
}

/// 상태 코드 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusClass {
    /// 2xx
    Success,
    /// 3xx
    Redirection,
    /// 4xx
    ClientError,
    /// 5xx
    ServerError,
}

impl StatusClass {
    /// 상태 코드의 첫 자리로 분류합니다. 세 자리 2xx~5xx가 아니면 `None`.
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            200..=299 => Some(Self::Success),
            300..=399 => Some(Self::Redirection),
            400..=499 => Some(Self::ClientError),
            500..=599 => Some(Self::ServerError),
            _ => None,
        }
    }
}

/// 한 줄 파싱 실패 -- 원문 라인과 사유를 담습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    /// 원본 라인 (개행 제거)
    pub raw: String,
    /// 실패 사유
    pub reason: ParseError,
}

/// 한 줄 파싱 결과
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// 문법 일치
    Matched(LogRecord),
    /// 문법 불일치 -- 저장소에 넣지 않습니다
    Unmatched(ParseFailure),
}

impl ParseOutcome {
    /// 매칭된 레코드를 반환합니다.
    pub fn record(&self) -> Option<&LogRecord> {
        match self {
            Self::Matched(record) => Some(record),
            Self::Unmatched(_) => None,
        }
    }

    /// 매칭 여부
    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched(_))
    }
}
