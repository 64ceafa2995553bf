//! 로그 파싱 모듈
//!
//! 각 파서는 core의 [`LineParser`](tailstat_core::pipeline::LineParser) trait을 구현합니다.
//!
//! # 지원 형식
//! - 접근 로그 (Common/Combined Log Format) ([`AccessLogParser`])

pub mod access;

pub use access::AccessLogParser;
