//! # tailstat-log-pipeline
//!
//! 접근 로그를 실시간으로 수집하고, 최근 윈도우에 대한 통계와
//! hit rate 기반 알림을 평가 주기마다 계산하는 파이프라인입니다.
//!
//! # 모듈 구성
//!
//! - [`collector`]: 로그 파일 감시 (`tail -f` 방식, 로테이션 감지)
//! - [`parser`]: 접근 로그 파서
//! - [`store`]: 타임스탬프 순 레코드 저장소와 보존 기간 정리
//! - [`stats`]: 통계 스냅샷 계산
//! - [`alert`]: 규칙별 Normal/Alerting 상태 머신과 알림 이력
//! - [`monitor`]: 저장소와 알림 상태를 소유하는 단일 서비스 객체
//! - [`pipeline`]: 수집 루프 오케스트레이션 (Pipeline trait 구현)
//! - [`config`]: 모니터 설정 (core 설정에서 파생)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! FileTailer -> mpsc -> AccessLogParser -> RecordStore -> {StatsAggregator, AlertEngine} -> TickReport
//!     |                                        |
//!  rotation/truncation                   prune(retention)
//! ```

pub mod alert;
pub mod config;
pub mod error;
pub mod monitor;
pub mod pipeline;
pub mod stats;
pub mod store;

pub mod collector;
pub mod parser;

// --- 주요 타입 re-export ---

// 파이프라인
pub use pipeline::{LogMonitor, LogMonitorBuilder};

// 설정
pub use config::{MonitorSettings, MonitorSettingsBuilder};

// 에러
pub use error::LogPipelineError;

// 파서
pub use parser::AccessLogParser;

// 저장소 / 집계
pub use monitor::{MonitorCounters, MonitorState};
pub use stats::StatsAggregator;
pub use store::RecordStore;

// 알림
pub use alert::{AlertEngine, AlertRule, AlertTransition, RuleState};

// 수집기
pub use collector::{CollectorStatus, FileTailer, TailerConfig};
