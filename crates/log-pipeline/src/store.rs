//! 레코드 저장소 -- 타임스탬프 순으로 정렬된 인메모리 레코드 윈도우
//!
//! [`RecordStore`]는 파싱된 [`LogRecord`]를 도착 순서대로 보관하며,
//! "T 이후의 모든 레코드" 질의를 이진 탐색으로 처리합니다.
//!
//! # 정렬 유지
//! 로그 생성 측의 시계 차이로 이전보다 오래된 타임스탬프가 도착할 수 있습니다.
//! 이런 레코드는 같은 타임스탬프를 가진 레코드들 뒤의 정렬 위치에 삽입됩니다.
//!
//! # 보존 기간
//! 모든 소비자(통계 윈도우, 각 알림 규칙의 `limit_period`)가 필요로 하는
//! 최대 윈도우보다 오래된 레코드는 [`RecordStore::prune`]으로 제거됩니다.

use std::collections::VecDeque;

use tailstat_core::types::LogRecord;

/// 인메모리 레코드 저장소
pub struct RecordStore {
    /// 타임스탬프 오름차순 레코드
    records: VecDeque<LogRecord>,
    /// 보존 기간 (초)
    retention_secs: u64,
    /// 총 추가 레코드 수
    total_appended: u64,
    /// 순서가 어긋나 정렬 삽입된 레코드 수
    out_of_order: u64,
    /// 보존 기간 초과로 제거된 레코드 수
    total_pruned: u64,
}

impl RecordStore {
    /// 새 저장소를 생성합니다.
    pub fn new(retention_secs: u64) -> Self {
        Self {
            records: VecDeque::new(),
            retention_secs,
            total_appended: 0,
            out_of_order: 0,
            total_pruned: 0,
        }
    }

    /// 레코드를 추가합니다.
    ///
    /// 마지막 레코드보다 오래된 레코드는 정렬 위치에 삽입하고 `false`를 반환합니다.
    pub fn append(&mut self, record: LogRecord) -> bool {
        self.total_appended += 1;
        let ts = record.timestamp();

        let in_order = self.records.back().is_none_or(|last| last.timestamp() <= ts);
        if in_order {
            self.records.push_back(record);
            return true;
        }

        self.out_of_order += 1;
        let index = self.records.partition_point(|r| r.timestamp() <= ts);
        tracing::debug!(
            timestamp = ts,
            index,
            len = self.records.len(),
            "out-of-order record inserted"
        );
        self.records.insert(index, record);
        false
    }

    /// 타임스탬프가 `since`보다 큰 레코드를 시간순으로 반환합니다.
    pub fn query(&self, since: f64) -> impl Iterator<Item = &LogRecord> {
        let start = self.first_after(since);
        self.records.range(start..)
    }

    /// 타임스탬프가 `since`보다 큰 레코드 수를 반환합니다.
    pub fn count_since(&self, since: f64) -> usize {
        self.records.len() - self.first_after(since)
    }

    /// 보존 기간이 지난 레코드(`timestamp <= now - retention`)를 제거하고 제거 수를 반환합니다.
    #[allow(clippy::cast_precision_loss)]
    pub fn prune(&mut self, now: f64) -> usize {
        let horizon = now - self.retention_secs as f64;
        let expired = self.records.partition_point(|r| r.timestamp() <= horizon);
        self.records.drain(..expired);
        self.total_pruned += expired as u64;
        expired
    }

    fn first_after(&self, since: f64) -> usize {
        self.records.partition_point(|r| r.timestamp() <= since)
    }

    /// 보관 중인 레코드 수
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// 비어 있는지 여부
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 보존 기간 (초)
    pub fn retention_secs(&self) -> u64 {
        self.retention_secs
    }

    /// 총 추가 레코드 수
    pub fn total_appended(&self) -> u64 {
        self.total_appended
    }

    /// 순서가 어긋난 레코드 수
    pub fn out_of_order(&self) -> u64 {
        self.out_of_order
    }

    /// 총 제거 레코드 수
    pub fn total_pruned(&self) -> u64 {
        self.total_pruned
    }
}
