//! 모니터 상태 -- 레코드 저장소와 알림 상태를 소유하는 단일 서비스 객체
//!
//! [`MonitorState`]는 수집 루프 태스크가 단독으로 소유하며,
//! 라인 수집([`ingest_line`](MonitorState::ingest_line))과
//! 평가 틱([`tick`](MonitorState::tick))이 모두 같은 태스크에서 순차 실행됩니다.
//! 따라서 저장소와 알림 이벤트에 대한 접근은 자연스럽게 직렬화됩니다.
//!
//! 외부에서 관찰해야 하는 카운터만 [`MonitorCounters`]로 공유합니다.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tailstat_core::event::TickReport;
use tailstat_core::metrics as m;
use tailstat_core::pipeline::LineParser;
use tailstat_core::types::ParseOutcome;

use crate::alert::AlertEngine;
use crate::config::MonitorSettings;
use crate::stats::StatsAggregator;
use crate::store::RecordStore;

/// 공유 카운터
#[derive(Debug, Default)]
pub struct MonitorCounters {
    lines_received: AtomicU64,
    records_ingested: AtomicU64,
    parse_failures: AtomicU64,
    ticks: AtomicU64,
}

impl MonitorCounters {
    /// 수신한 라인 수
    pub fn lines_received(&self) -> u64 {
        self.lines_received.load(Ordering::Relaxed)
    }

    /// 저장소에 추가된 레코드 수
    pub fn records_ingested(&self) -> u64 {
        self.records_ingested.load(Ordering::Relaxed)
    }

    /// 파싱 실패 라인 수
    pub fn parse_failures(&self) -> u64 {
        self.parse_failures.load(Ordering::Relaxed)
    }

    /// 평가 틱 수
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// 파싱 실패 비율 (라인이 없으면 0)
    #[allow(clippy::cast_precision_loss)]
    pub fn failure_ratio(&self) -> f64 {
        let lines = self.lines_received();
        if lines == 0 {
            return 0.0;
        }
        self.parse_failures() as f64 / lines as f64
    }
}

/// 모니터 상태
pub struct MonitorState {
    parser: Box<dyn LineParser>,
    store: RecordStore,
    engine: AlertEngine,
    stats: StatsAggregator,
    counters: Arc<MonitorCounters>,
}

impl MonitorState {
    /// 설정과 파서로 모니터 상태를 생성합니다.
    pub fn new(settings: &MonitorSettings, parser: Box<dyn LineParser>) -> Self {
        Self {
            parser,
            store: RecordStore::new(settings.retention_secs()),
            engine: AlertEngine::new(settings.rules.iter().copied()),
            stats: StatsAggregator::new(settings.stats_period),
            counters: Arc::new(MonitorCounters::default()),
        }
    }

    /// 라인 하나를 파싱해 즉시 저장소에 추가합니다.
    ///
    /// 문법에 맞지 않는 라인은 저장소를 변경하지 않고 경고를 한 번 남깁니다.
    /// 레코드가 추가되었으면 `true`를 반환합니다.
    pub fn ingest_line(&mut self, line: &str) -> bool {
        self.counters.lines_received.fetch_add(1, Ordering::Relaxed);

        match self.parser.parse_line(line) {
            ParseOutcome::Matched(record) => {
                self.store.append(record);
                self.counters
                    .records_ingested
                    .fetch_add(1, Ordering::Relaxed);
                metrics::counter!(m::RECORDS_INGESTED_TOTAL).increment(1);
                true
            }
            ParseOutcome::Unmatched(failure) => {
                self.counters.parse_failures.fetch_add(1, Ordering::Relaxed);
                metrics::counter!(m::PARSE_FAILURES_TOTAL).increment(1);
                tracing::warn!(
                    format = self.parser.format_name(),
                    line = %failure.raw,
                    reason = %failure.reason,
                    "skipping unparseable log line"
                );
                false
            }
        }
    }

    /// 평가 틱을 실행합니다.
    ///
    /// 순서: 보존 기간 정리 → 알림 규칙 평가 → 통계 계산 → 생애주기 분류
    #[allow(clippy::cast_precision_loss)]
    pub fn tick(&mut self, now: f64) -> TickReport {
        let pruned = self.store.prune(now);
        if pruned > 0 {
            metrics::counter!(m::RECORDS_PRUNED_TOTAL).increment(pruned as u64);
        }
        metrics::gauge!(m::STORE_RECORDS).set(self.store.len() as f64);

        let transitions = self.engine.evaluate(&self.store, now);
        let stats = self.stats.compute(&self.store, now);
        let alerts = self.engine.lifecycle(&transitions);

        self.counters.ticks.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(m::EVALUATION_TICKS_TOTAL).increment(1);
        tracing::debug!(
            now,
            hits = stats.hits,
            store_len = self.store.len(),
            pruned,
            transitions = transitions.len(),
            "evaluation tick"
        );

        TickReport {
            timestamp: now,
            stats,
            alerts,
        }
    }

    /// 레코드 저장소
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// 알림 엔진
    pub fn engine(&self) -> &AlertEngine {
        &self.engine
    }

    /// 공유 카운터 핸들
    pub fn counters(&self) -> Arc<MonitorCounters> {
        Arc::clone(&self.counters)
    }
}
