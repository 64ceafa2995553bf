//! 이벤트 시스템 -- 평가 틱마다 리포팅 싱크로 전달되는 출력 계약
//!
//! [`AlertEvent`]는 알림 규칙이 Normal → Alerting으로 전이할 때 생성되고,
//! Alerting → Normal로 전이할 때 종료 필드가 채워집니다. 이벤트는 삭제되지 않고
//! 이력으로 보존됩니다.
//!
//! [`TickReport`]는 한 번의 평가 틱 결과(통계 스냅샷 + 알림 생애주기 통지)를 묶습니다.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 알림 유형
///
/// 설정 파일의 `[alerts.<kind>]` 키와 같은 이름으로 직렬화됩니다.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// 초당 요청 수 과다
    HighTraffic,
}

impl AlertKind {
    /// 정의된 모든 알림 유형
    pub const ALL: [AlertKind; 1] = [AlertKind::HighTraffic];

    /// 설정 키 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HighTraffic => "high_traffic",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HighTraffic => f.write_str("High traffic"),
        }
    }
}

/// 알림 이벤트
///
/// 알림 유형마다 `ended_at == None`인 이벤트는 최대 하나입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    /// 이벤트 ID (UUID v4)
    pub id: String,
    /// 알림 유형
    pub kind: AlertKind,
    /// 발생 시각 (epoch 초)
    pub started_at: f64,
    /// 복구 시각 (활성 중이면 `None`)
    pub ended_at: Option<f64>,
    /// 발생 시점의 hit rate (hits/sec)
    pub value_start: f64,
    /// 복구 시점의 hit rate (활성 중이면 `None`)
    pub value_end: Option<f64>,
}

impl AlertEvent {
    /// 새 활성 이벤트를 생성합니다.
    pub fn open(kind: AlertKind, now: f64, hit_rate: f64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            started_at: now,
            ended_at: None,
            value_start: hit_rate,
            value_end: None,
        }
    }

    /// 이벤트를 복구 상태로 닫습니다. 이미 닫힌 이벤트는 변경하지 않습니다.
    pub fn recover(&mut self, now: f64, hit_rate: f64) {
        if self.ended_at.is_none() {
            self.ended_at = Some(now);
            self.value_end = Some(hit_rate);
        }
    }

    /// 활성(미복구) 여부
    pub fn is_active(&self) -> bool {
        self.ended_at.is_none()
    }
}

impl fmt::Display for AlertEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.ended_at, self.value_end) {
            (Some(end), Some(value_end)) => write!(
                f,
                "{} [{}] {:.3}..{:.3} hits={}/s -> {}/s",
                self.kind, self.id, self.started_at, end, self.value_start, value_end
            ),
            _ => write!(
                f,
                "{} [{}] since {:.3} hits={}/s",
                self.kind, self.id, self.started_at, self.value_start
            ),
        }
    }
}

/// 알림 생애주기 단계
///
/// New → Active (미해결 동안 반복) → Recovered (한 틱) → Archived (이후 모든 틱)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLifecycle {
    /// 이번 틱에 생성됨
    New,
    /// 이전 틱부터 활성 상태 유지
    Active,
    /// 이번 틱에 복구됨
    Recovered,
    /// 이전 틱에 복구됨 (이력 표시용)
    Archived,
}

/// 알림 생애주기 통지 -- 이벤트의 일관된 스냅샷을 담습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertNotification {
    /// 생애주기 단계
    pub lifecycle: AlertLifecycle,
    /// 이벤트 스냅샷
    pub event: AlertEvent,
}

/// 섹션별 요청 수
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionHits {
    /// 섹션 (`/api`)
    pub section: String,
    /// 윈도우 내 요청 수
    pub hits: u64,
}

/// 통계 스냅샷
///
/// 평가 시마다 새로 계산되며 보존되지 않습니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// 계산 기준 시각 (epoch 초)
    pub timestamp: f64,
    /// 윈도우 길이 (초)
    pub period_secs: u64,
    /// 전체 요청 수
    pub hits: u64,
    /// GET 요청 수
    pub get: u64,
    /// POST 요청 수
    pub post: u64,
    /// 2xx 응답 수
    pub status_2xx: u64,
    /// 3xx 응답 수
    pub status_3xx: u64,
    /// 4xx 응답 수
    pub status_4xx: u64,
    /// 5xx 응답 수
    pub status_5xx: u64,
    /// 응답 크기 합계 (바이트, 숫자가 아닌 크기 제외)
    pub total_bytes: u64,
    /// 요청 수 상위 3개 섹션 (내림차순, 동률이면 윈도우 내 최초 등장 순)
    pub top_sections: Vec<SectionHits>,
}

/// 한 번의 평가 틱 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// 평가 시각 (epoch 초)
    pub timestamp: f64,
    /// 통계 스냅샷
    pub stats: StatsSnapshot,
    /// 알림 생애주기 통지 (이력 순서)
    pub alerts: Vec<AlertNotification>,
}

impl TickReport {
    /// 특정 단계의 통지만 반환합니다.
    pub fn alerts_in(&self, lifecycle: AlertLifecycle) -> impl Iterator<Item = &AlertEvent> {
        self.alerts
            .iter()
            .filter(move |n| n.lifecycle == lifecycle)
            .map(|n| &n.event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_creates_active_event() {
        let event = AlertEvent::open(AlertKind::HighTraffic, 100.0, 12.5);
        assert!(event.is_active());
        assert_eq!(event.started_at, 100.0);
        assert_eq!(event.value_start, 12.5);
        assert!(event.value_end.is_none());
        assert!(!event.id.is_empty());
    }

    #[test]
    fn recover_sets_end_fields_once() {
        let mut event = AlertEvent::open(AlertKind::HighTraffic, 100.0, 12.5);
        event.recover(220.0, 3.0);
        assert!(!event.is_active());
        assert_eq!(event.ended_at, Some(220.0));
        assert_eq!(event.value_end, Some(3.0));

        // 두 번째 복구는 무시
        event.recover(300.0, 0.0);
        assert_eq!(event.ended_at, Some(220.0));
        assert_eq!(event.value_end, Some(3.0));
    }

    #[test]
    fn kind_names() {
        assert_eq!(AlertKind::HighTraffic.as_str(), "high_traffic");
        assert_eq!(AlertKind::HighTraffic.to_string(), "High traffic");
    }

    #[test]
    fn event_ids_are_unique() {
        let a = AlertEvent::open(AlertKind::HighTraffic, 1.0, 1.0);
        let b = AlertEvent::open(AlertKind::HighTraffic, 1.0, 1.0);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn report_filters_by_lifecycle() {
        let active = AlertEvent::open(AlertKind::HighTraffic, 1.0, 20.0);
        let mut archived = AlertEvent::open(AlertKind::HighTraffic, 0.0, 15.0);
        archived.recover(0.5, 1.0);

        let report = TickReport {
            timestamp: 2.0,
            stats: StatsSnapshot::default(),
            alerts: vec![
                AlertNotification {
                    lifecycle: AlertLifecycle::Archived,
                    event: archived,
                },
                AlertNotification {
                    lifecycle: AlertLifecycle::Active,
                    event: active.clone(),
                },
            ],
        };

        let actives: Vec<_> = report.alerts_in(AlertLifecycle::Active).collect();
        assert_eq!(actives, vec![&active]);
        assert_eq!(report.alerts_in(AlertLifecycle::New).count(), 0);
    }
}
