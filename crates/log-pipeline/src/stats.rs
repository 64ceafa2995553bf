//! 통계 집계 -- 최근 윈도우의 요청 요약 스냅샷
//!
//! [`StatsAggregator`]는 `now - period` 이후의 레코드를 선택해
//! 요청 수, 메서드별/상태 코드 분류별 카운트, 응답 크기 합계,
//! 상위 3개 섹션을 계산합니다. 호출 간에 상태를 유지하지 않습니다.

use std::collections::HashMap;

use tailstat_core::event::{SectionHits, StatsSnapshot};
use tailstat_core::types::StatusClass;

use crate::store::RecordStore;

/// 스냅샷에 포함되는 상위 섹션 수
pub const TOP_SECTIONS: usize = 3;

/// 통계 집계기
#[derive(Debug, Clone, Copy)]
pub struct StatsAggregator {
    /// 윈도우 길이 (초)
    period_secs: u64,
}

impl StatsAggregator {
    /// 새 집계기를 생성합니다.
    pub fn new(period_secs: u64) -> Self {
        Self { period_secs }
    }

    /// 윈도우 길이 (초)
    pub fn period_secs(&self) -> u64 {
        self.period_secs
    }

    /// `now` 기준 윈도우의 통계 스냅샷을 계산합니다.
    #[allow(clippy::cast_precision_loss)]
    pub fn compute(&self, store: &RecordStore, now: f64) -> StatsSnapshot {
        let mut snapshot = StatsSnapshot {
            timestamp: now,
            period_secs: self.period_secs,
            ..StatsSnapshot::default()
        };

        // 섹션별 카운트 (윈도우 내 최초 등장 순)
        let mut sections: Vec<SectionHits> = Vec::new();
        let mut section_index: HashMap<&str, usize> = HashMap::new();

        for record in store.query(now - self.period_secs as f64) {
            snapshot.hits += 1;

            match record.method.as_str() {
                "GET" => snapshot.get += 1,
                "POST" => snapshot.post += 1,
                _ => {}
            }

            match record.status_class() {
                Some(StatusClass::Success) => snapshot.status_2xx += 1,
                Some(StatusClass::Redirection) => snapshot.status_3xx += 1,
                Some(StatusClass::ClientError) => snapshot.status_4xx += 1,
                Some(StatusClass::ServerError) => snapshot.status_5xx += 1,
                None => {}
            }

            if let Some(bytes) = record.size.bytes() {
                snapshot.total_bytes = snapshot.total_bytes.saturating_add(bytes);
            }

            let index = *section_index
                .entry(record.section.as_str())
                .or_insert_with(|| {
                    sections.push(SectionHits {
                        section: record.section.clone(),
                        hits: 0,
                    });
                    sections.len() - 1
                });
            sections[index].hits += 1;
        }

        // 안정 정렬이므로 동률은 최초 등장 순서를 유지
        sections.sort_by(|a, b| b.hits.cmp(&a.hits));
        sections.truncate(TOP_SECTIONS);
        snapshot.top_sections = sections;

        snapshot
    }
}
