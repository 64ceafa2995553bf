//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`
//! 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `tailstat_`
//! - 접미어: `_total` (counter), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(tailstat_core::metrics::LINES_READ_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 알림 유형 레이블 키 (high_traffic)
pub const LABEL_ALERT_KIND: &str = "kind";

// ─── 수집 메트릭 ────────────────────────────────────────────────────

/// 로그 소스에서 읽은 라인 수 (counter)
pub const LINES_READ_TOTAL: &str = "tailstat_lines_read_total";

/// 저장소에 추가된 레코드 수 (counter)
pub const RECORDS_INGESTED_TOTAL: &str = "tailstat_records_ingested_total";

/// 문법 불일치 라인 수 (counter)
pub const PARSE_FAILURES_TOTAL: &str = "tailstat_parse_failures_total";

/// 보존 기간 초과로 제거된 레코드 수 (counter)
pub const RECORDS_PRUNED_TOTAL: &str = "tailstat_records_pruned_total";

/// 저장소 내 레코드 수 (gauge)
pub const STORE_RECORDS: &str = "tailstat_store_records";

/// 수집 큐 포화로 지연된 라인 수 (counter)
pub const INGEST_LAG_EVENTS_TOTAL: &str = "tailstat_ingest_lag_events_total";

// ─── 알림/평가 메트릭 ───────────────────────────────────────────────

/// 평가 틱 수 (counter)
pub const EVALUATION_TICKS_TOTAL: &str = "tailstat_evaluation_ticks_total";

/// 발생한 알림 수 (counter, label: kind)
pub const ALERTS_TRIGGERED_TOTAL: &str = "tailstat_alerts_triggered_total";

/// 복구된 알림 수 (counter, label: kind)
pub const ALERTS_RECOVERED_TOTAL: &str = "tailstat_alerts_recovered_total";

/// 현재 활성 알림 수 (gauge)
pub const ALERTS_ACTIVE: &str = "tailstat_alerts_active";

/// 마지막 평가 시점의 hit rate (gauge, label: kind)
pub const HIT_RATE: &str = "tailstat_hit_rate";

// ─── 데몬 메트릭 ────────────────────────────────────────────────────

/// 빌드 정보 (gauge, 항상 1, label: version)
pub const DAEMON_BUILD_INFO: &str = "tailstat_daemon_build_info";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge};

    describe_counter!(LINES_READ_TOTAL, "Total number of raw lines read from the log source");
    describe_counter!(
        RECORDS_INGESTED_TOTAL,
        "Total number of parsed records appended to the record store"
    );
    describe_counter!(
        PARSE_FAILURES_TOTAL,
        "Total number of lines that did not match the access log grammar"
    );
    describe_counter!(
        RECORDS_PRUNED_TOTAL,
        "Total number of records pruned past the retention horizon"
    );
    describe_gauge!(STORE_RECORDS, "Number of records currently held in the store");
    describe_counter!(
        INGEST_LAG_EVENTS_TOTAL,
        "Number of lines that waited because the ingest queue was full"
    );
    describe_counter!(EVALUATION_TICKS_TOTAL, "Total number of evaluation ticks");
    describe_counter!(ALERTS_TRIGGERED_TOTAL, "Total number of Normal to Alerting transitions");
    describe_counter!(ALERTS_RECOVERED_TOTAL, "Total number of Alerting to Normal transitions");
    describe_gauge!(ALERTS_ACTIVE, "Number of currently active alerts");
    describe_gauge!(HIT_RATE, "Hit rate (hits/sec) measured at the last evaluation");
    describe_gauge!(DAEMON_BUILD_INFO, "Build information (always 1)");
}
