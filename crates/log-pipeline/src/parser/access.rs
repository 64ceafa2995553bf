//! 접근 로그 파서 (Common Log Format 계열)
//!
//! # 라인 형식
//! ```text
//! host - user [dd/Mon/yyyy:HH:MM:SS ±hhmm] "METHOD /section[/subsection] [PROTOCOL]" status size
//! ```
//!
//! `size` 뒤의 필드(Combined Log Format의 referer, user-agent 등)는 무시합니다.
//! 경로는 최대 두 개의 단어 세그먼트(`/section/subsection`)까지만 문법에 일치합니다.
//!
//! # 사용 예시
//! ```ignore
//! use tailstat_core::pipeline::LineParser;
//! use tailstat_log_pipeline::parser::AccessLogParser;
//!
//! let parser = AccessLogParser::new()?;
//! let outcome = parser.parse_line(
//!     r#"127.0.0.1 - james [09/May/2018:16:00:39 +0000] "GET /report HTTP/1.0" 200 123"#,
//! );
//! assert!(outcome.is_matched());
//! ```

use chrono::DateTime;
use regex::Regex;
use tailstat_core::error::ParseError;
use tailstat_core::pipeline::LineParser;
use tailstat_core::types::{
    ACCESS_LOG_TIME_FORMAT, ContentSize, LogRecord, ParseFailure, ParseOutcome,
};

use crate::error::LogPipelineError;

const ACCESS_LOG_PATTERN: &str = r#"^(?P<host>.*?)\s\S+\s(?P<user>\S+)\s\[(?P<time>.*?)\]\s"(?P<method>\S+)\s(?P<section>/\w+)(?P<subsection>/\w+)?\s(?P<protocol>\S+)?"\s(?P<status>\d{3})\s(?P<size>\S+)"#;

/// 접근 로그 파서
///
/// core의 [`LineParser`] trait을 구현합니다. 파싱은 순수 함수이며
/// 불일치 라인은 [`ParseOutcome::Unmatched`]로 반환됩니다.
pub struct AccessLogParser {
    pattern: Regex,
    /// 최대 허용 라인 길이 (바이트)
    max_line_length: usize,
}

impl AccessLogParser {
    /// 기본 설정으로 새 파서를 생성합니다.
    pub fn new() -> Result<Self, LogPipelineError> {
        Ok(Self {
            pattern: Regex::new(ACCESS_LOG_PATTERN)?,
            max_line_length: 64 * 1024,
        })
    }

    /// 최대 라인 길이를 설정합니다.
    pub fn with_max_line_length(mut self, size: usize) -> Self {
        self.max_line_length = size;
        self
    }

    fn parse_record(&self, line: &str) -> Result<LogRecord, ParseError> {
        if line.len() > self.max_line_length {
            return Err(ParseError::TooLarge {
                size: line.len(),
                max: self.max_line_length,
            });
        }

        let caps = self.pattern.captures(line).ok_or(ParseError::Unmatched)?;
        let field = |name: &str| caps.name(name).map(|m| m.as_str());
        let required = |name: &str| field(name).ok_or(ParseError::Unmatched);

        let time_str = required("time")?;
        let time = DateTime::parse_from_str(time_str, ACCESS_LOG_TIME_FORMAT).map_err(|e| {
            ParseError::InvalidTimestamp {
                value: time_str.to_owned(),
                reason: e.to_string(),
            }
        })?;

        let status = required("status")?
            .parse::<u16>()
            .map_err(|_| ParseError::Unmatched)?;

        Ok(LogRecord {
            time,
            host: required("host")?.to_owned(),
            user: required("user")?.to_owned(),
            method: required("method")?.to_owned(),
            section: required("section")?.to_owned(),
            subsection: field("subsection").map(str::to_owned),
            protocol: field("protocol").map(str::to_owned),
            status,
            size: ContentSize::parse(required("size")?),
        })
    }
}

impl LineParser for AccessLogParser {
    fn format_name(&self) -> &str {
        "access"
    }

    fn parse_line(&self, line: &str) -> ParseOutcome {
        let line = line.trim_end_matches(['\r', '\n']);
        match self.parse_record(line) {
            Ok(record) => ParseOutcome::Matched(record),
            Err(reason) => ParseOutcome::Unmatched(ParseFailure {
                raw: line.to_owned(),
                reason,
            }),
        }
    }
}
