//! 로그 수집 모듈 -- 로그 소스에서 원시 라인을 읽습니다.
//!
//! # 수집 소스
//! - [`FileTailer`]: 파일 감시 (`tail -f` 방식)
//!
//! # 아키텍처
//! 수집기는 자체 tokio 태스크에서 실행되며, 읽은 라인을
//! `tokio::mpsc::Sender<String>` 채널을 통해 수집 루프로 전달합니다.

pub mod file;

pub use file::{FileTailer, TailerConfig};

/// 수집기 상태
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectorStatus {
    /// 실행 대기 중
    Idle,
    /// 실행 중
    Running,
    /// 에러로 중단됨
    Error(String),
    /// 정상 종료됨
    Stopped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collector_status_variants() {
        assert_eq!(CollectorStatus::Idle, CollectorStatus::Idle);
        assert_ne!(CollectorStatus::Running, CollectorStatus::Stopped);
        assert_eq!(
            CollectorStatus::Error("x".to_owned()),
            CollectorStatus::Error("x".to_owned())
        );
    }
}
