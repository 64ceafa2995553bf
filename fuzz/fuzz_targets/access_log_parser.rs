#![no_main]

use std::sync::LazyLock;

use libfuzzer_sys::fuzz_target;
use tailstat_core::pipeline::LineParser;
use tailstat_core::types::ParseOutcome;
use tailstat_log_pipeline::AccessLogParser;

static PARSER: LazyLock<AccessLogParser> =
    LazyLock::new(|| AccessLogParser::new().expect("access log grammar should compile"));

fuzz_target!(|data: &[u8]| {
    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };

    // 패닉 없이 Matched 또는 Unmatched를 반환해야 한다
    if let ParseOutcome::Matched(record) = PARSER.parse_line(line) {
        let _ = record.to_string();
        let _ = record.status_class();
    }
});
