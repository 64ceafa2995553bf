//! 알림 엔진 -- 규칙별 Normal/Alerting 상태 머신
//!
//! [`AlertEngine`]은 활성화된 알림 규칙마다 하나의 [`AlertRule`]을 두고,
//! 평가 틱마다 규칙의 윈도우에서 hit rate를 계산해 상태를 전이합니다.
//!
//! # 상태 전이
//! ```text
//! Normal   --(hit_rate >  limit_value)--> Alerting   (새 AlertEvent 생성)
//! Alerting --(hit_rate <= limit_value)--> Normal     (활성 이벤트의 종료 필드 기록)
//! ```
//!
//! 엔진은 레코드마다가 아니라 평가 주기(`stats_refresh`)마다 실행됩니다.
//! 따라서 알림 발생/복구 지연은 평가 주기보다 짧을 수 없습니다.
//! 같은 틱 안에서 몇 개의 레코드가 임계값을 넘기든 전이는 한 번만 일어납니다.

use tailstat_core::config::RuleLimits;
use tailstat_core::event::{AlertEvent, AlertKind, AlertLifecycle, AlertNotification};
use tailstat_core::metrics as m;

use crate::store::RecordStore;

/// 규칙 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleState {
    /// 정상
    Normal,
    /// 알림 중 -- 이력 내 활성 이벤트 위치
    Alerting {
        /// [`AlertEngine::history`] 인덱스
        event: usize,
    },
}

/// 알림 규칙 인스턴스
#[derive(Debug, Clone)]
pub struct AlertRule {
    kind: AlertKind,
    limits: RuleLimits,
    state: RuleState,
}

impl AlertRule {
    /// Normal 상태의 규칙을 생성합니다.
    pub fn new(kind: AlertKind, limits: RuleLimits) -> Self {
        Self {
            kind,
            limits,
            state: RuleState::Normal,
        }
    }

    /// 알림 유형
    pub fn kind(&self) -> AlertKind {
        self.kind
    }

    /// 임계값 설정
    pub fn limits(&self) -> RuleLimits {
        self.limits
    }

    /// 현재 상태
    pub fn state(&self) -> RuleState {
        self.state
    }

    /// `now - limit_period` 이후의 요청 수를 `limit_period`로 나눈 값 (hits/sec)
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self, store: &RecordStore, now: f64) -> f64 {
        let period = self.limits.limit_period as f64;
        store.count_since(now - period) as f64 / period
    }
}

/// 한 틱에서 일어난 상태 전이 -- 전이 직후 이벤트 스냅샷을 담습니다.
#[derive(Debug, Clone, PartialEq)]
pub enum AlertTransition {
    /// Normal → Alerting
    Triggered(AlertEvent),
    /// Alerting → Normal
    Recovered(AlertEvent),
}

impl AlertTransition {
    /// 전이된 이벤트
    pub fn event(&self) -> &AlertEvent {
        match self {
            Self::Triggered(event) | Self::Recovered(event) => event,
        }
    }
}

/// 알림 엔진 -- 규칙 상태와 알림 이력을 소유합니다.
#[derive(Debug, Default)]
pub struct AlertEngine {
    rules: Vec<AlertRule>,
    /// 발생 순서대로 보존되는 알림 이력 (삭제되지 않음)
    history: Vec<AlertEvent>,
}

impl AlertEngine {
    /// 활성화된 규칙 목록으로 엔진을 생성합니다.
    ///
    /// 같은 유형이 여러 번 주어지면 첫 번째 규칙만 사용합니다.
    pub fn new(rules: impl IntoIterator<Item = (AlertKind, RuleLimits)>) -> Self {
        let mut engine = Self::default();
        for (kind, limits) in rules {
            if engine.rules.iter().any(|r| r.kind == kind) {
                tracing::warn!(alert = kind.as_str(), "duplicate alert rule ignored");
                continue;
            }
            engine.rules.push(AlertRule::new(kind, limits));
        }
        engine
    }

    /// 모든 규칙을 평가하고 이번 틱의 전이 목록을 반환합니다.
    #[allow(clippy::cast_precision_loss)]
    pub fn evaluate(&mut self, store: &RecordStore, now: f64) -> Vec<AlertTransition> {
        let mut transitions = Vec::new();

        for rule in &mut self.rules {
            let hit_rate = rule.hit_rate(store, now);
            let limit = rule.limits.limit_value;
            metrics::gauge!(m::HIT_RATE, m::LABEL_ALERT_KIND => rule.kind.as_str()).set(hit_rate);

            match rule.state {
                RuleState::Normal if hit_rate > limit => {
                    let event = AlertEvent::open(rule.kind, now, hit_rate);
                    tracing::warn!(
                        alert = rule.kind.as_str(),
                        event_id = %event.id,
                        hit_rate,
                        limit,
                        limit_period = rule.limits.limit_period,
                        "alert triggered"
                    );
                    metrics::counter!(
                        m::ALERTS_TRIGGERED_TOTAL,
                        m::LABEL_ALERT_KIND => rule.kind.as_str()
                    )
                    .increment(1);

                    rule.state = RuleState::Alerting {
                        event: self.history.len(),
                    };
                    transitions.push(AlertTransition::Triggered(event.clone()));
                    self.history.push(event);
                }
                RuleState::Alerting { event: index } if hit_rate <= limit => {
                    rule.state = RuleState::Normal;
                    let Some(event) = self.history.get_mut(index) else {
                        tracing::error!(
                            alert = rule.kind.as_str(),
                            index,
                            "active alert missing from history"
                        );
                        continue;
                    };
                    event.recover(now, hit_rate);
                    tracing::info!(
                        alert = rule.kind.as_str(),
                        event_id = %event.id,
                        hit_rate,
                        limit,
                        duration_secs = now - event.started_at,
                        "alert recovered"
                    );
                    metrics::counter!(
                        m::ALERTS_RECOVERED_TOTAL,
                        m::LABEL_ALERT_KIND => rule.kind.as_str()
                    )
                    .increment(1);
                    transitions.push(AlertTransition::Recovered(event.clone()));
                }
                _ => {
                    tracing::trace!(alert = rule.kind.as_str(), hit_rate, limit, "no transition");
                }
            }
        }

        metrics::gauge!(m::ALERTS_ACTIVE).set(self.active_count() as f64);

        transitions
    }

    /// 이력의 모든 이벤트를 생애주기 단계로 분류합니다.
    ///
    /// `transitions`는 같은 틱의 [`evaluate`](Self::evaluate) 결과여야 합니다.
    /// 각 이벤트는 정확히 한 번, 이력 순서대로 나타납니다.
    pub fn lifecycle(&self, transitions: &[AlertTransition]) -> Vec<AlertNotification> {
        self.history
            .iter()
            .map(|event| {
                let changed = transitions.iter().find(|t| t.event().id == event.id);
                let lifecycle = match changed {
                    Some(AlertTransition::Triggered(_)) => AlertLifecycle::New,
                    Some(AlertTransition::Recovered(_)) => AlertLifecycle::Recovered,
                    None if event.is_active() => AlertLifecycle::Active,
                    None => AlertLifecycle::Archived,
                };
                AlertNotification {
                    lifecycle,
                    event: event.clone(),
                }
            })
            .collect()
    }

    /// 평가 중인 규칙 목록
    pub fn rules(&self) -> &[AlertRule] {
        &self.rules
    }

    /// 전체 알림 이력
    pub fn history(&self) -> &[AlertEvent] {
        &self.history
    }

    /// 활성(미복구) 이벤트
    pub fn active_events(&self) -> impl Iterator<Item = &AlertEvent> {
        self.history.iter().filter(|e| e.is_active())
    }

    /// 활성 이벤트 수
    pub fn active_count(&self) -> usize {
        self.active_events().count()
    }
}
