//! 수집 루프 오케스트레이션 -- 파일 수집기와 평가 틱을 구동합니다.
//!
//! [`LogMonitor`]는 core의 [`Pipeline`](tailstat_core::pipeline::Pipeline) trait을 구현하여
//! `tailstat-daemon`에서 start/stop/health_check 생명주기로 관리됩니다.
//!
//! # 내부 아키텍처
//! ```text
//! FileTailer --mpsc<String>--> loop task (MonitorState) --mpsc<TickReport>--> Reporting Sink
//!                                  ^
//!                        interval(stats_refresh)
//! ```
//!
//! 루프 태스크는 새 라인이 도착하면 즉시 파싱해 저장소에 추가하고,
//! 벽시계 기준 `stats_refresh`마다 큐에 남은 라인을 먼저 처리한 뒤 평가 틱을 실행합니다.
//! 평가 주기는 유입 라인 수와 무관하며, 밀린 틱은 건너뜁니다.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use tailstat_core::error::{PipelineError, TailstatError};
use tailstat_core::event::TickReport;
use tailstat_core::pipeline::{HealthStatus, LineParser, Pipeline};
use tailstat_core::types::unix_now;

use crate::collector::FileTailer;
use crate::config::MonitorSettings;
use crate::error::LogPipelineError;
use crate::monitor::{MonitorCounters, MonitorState};
use crate::parser::AccessLogParser;

/// 품질 저하 판정 전 최소 수신 라인 수
const HEALTH_MIN_LINES: u64 = 100;
/// 품질 저하로 판정하는 파싱 실패 비율
const HEALTH_MAX_FAILURE_RATIO: f64 = 0.5;

/// 파이프라인 실행 상태
#[derive(Debug, Clone, PartialEq, Eq)]
enum PipelineState {
    /// 초기화됨, 아직 시작하지 않음
    Initialized,
    /// 실행 중
    Running,
    /// 정지됨
    Stopped,
}

/// 접근 로그 모니터
///
/// # 사용 예시
/// ```ignore
/// use tailstat_log_pipeline::{LogMonitor, LogMonitorBuilder, MonitorSettings};
///
/// let (mut monitor, report_rx) = LogMonitorBuilder::new()
///     .settings(MonitorSettings::from_core(&config))
///     .build()?;
///
/// // Pipeline trait으로 시작
/// monitor.start().await?;
/// ```
pub struct LogMonitor {
    settings: MonitorSettings,
    state: PipelineState,
    /// 정지 상태에서 보관되는 모니터 상태 (실행 중에는 루프 태스크가 소유)
    monitor: Option<MonitorState>,
    counters: Arc<MonitorCounters>,
    report_tx: mpsc::Sender<TickReport>,
    shutdown_tx: broadcast::Sender<()>,
    loop_task: Option<JoinHandle<MonitorState>>,
    tailer_task: Option<JoinHandle<()>>,
}

impl LogMonitor {
    /// 현재 상태를 반환합니다.
    pub fn state_name(&self) -> &str {
        match self.state {
            PipelineState::Initialized => "initialized",
            PipelineState::Running => "running",
            PipelineState::Stopped => "stopped",
        }
    }

    /// 모니터 설정
    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    /// 공유 카운터
    pub fn counters(&self) -> &MonitorCounters {
        &self.counters
    }

    /// 정지 상태의 모니터 상태 (실행 중에는 `None`)
    pub fn monitor_state(&self) -> Option<&MonitorState> {
        self.monitor.as_ref()
    }
}

impl Pipeline for LogMonitor {
    async fn start(&mut self) -> Result<(), TailstatError> {
        if self.state == PipelineState::Running {
            return Err(PipelineError::AlreadyRunning.into());
        }
        let Some(monitor) = self.monitor.take() else {
            return Err(PipelineError::InitFailed("monitor state unavailable".to_owned()).into());
        };

        tracing::info!(
            logfile = %self.settings.logfile.display(),
            stats_period = self.settings.stats_period,
            stats_refresh = self.settings.stats_refresh,
            rules = self.settings.rules.len(),
            "starting log monitor"
        );

        // 1. 수집기 태스크
        let (line_tx, line_rx) = mpsc::channel(self.settings.line_channel_capacity);
        let mut tailer = FileTailer::new(self.settings.tailer_config(), line_tx);
        self.tailer_task = Some(tokio::spawn(async move {
            // 실패는 run() 내부에서 기록됨
            let _ = tailer.run().await;
        }));

        // 2. 수집 루프 태스크
        self.loop_task = Some(tokio::spawn(run_loop(
            monitor,
            line_rx,
            self.report_tx.clone(),
            self.shutdown_tx.subscribe(),
            self.settings.refresh_interval(),
        )));

        self.state = PipelineState::Running;
        tracing::info!("log monitor started");
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), TailstatError> {
        if self.state != PipelineState::Running {
            return Err(PipelineError::NotRunning.into());
        }

        tracing::info!("stopping log monitor");

        // 1. 루프 태스크에 종료 신호 후 상태 회수
        let _ = self.shutdown_tx.send(());
        if let Some(task) = self.loop_task.take() {
            match task.await {
                Ok(monitor) => self.monitor = Some(monitor),
                Err(e) => tracing::error!(error = %e, "monitor loop task failed"),
            }
        }

        // 2. 수집기 중단
        if let Some(task) = self.tailer_task.take() {
            task.abort();
        }

        self.state = PipelineState::Stopped;
        tracing::info!(
            lines = self.counters.lines_received(),
            records = self.counters.records_ingested(),
            parse_failures = self.counters.parse_failures(),
            "log monitor stopped"
        );
        Ok(())
    }

    async fn health_check(&self) -> HealthStatus {
        match self.state {
            PipelineState::Running => {
                if self.loop_task.as_ref().is_none_or(JoinHandle::is_finished) {
                    return HealthStatus::Unhealthy("monitor loop exited".to_owned());
                }
                if self.tailer_task.as_ref().is_none_or(JoinHandle::is_finished) {
                    return HealthStatus::Degraded("log tailer stopped".to_owned());
                }
                let lines = self.counters.lines_received();
                let ratio = self.counters.failure_ratio();
                if lines >= HEALTH_MIN_LINES && ratio > HEALTH_MAX_FAILURE_RATIO {
                    HealthStatus::Degraded(format!(
                        "parse failure ratio high: {:.1}%",
                        ratio * 100.0
                    ))
                } else {
                    HealthStatus::Healthy
                }
            }
            PipelineState::Initialized => HealthStatus::Unhealthy("not started".to_owned()),
            PipelineState::Stopped => HealthStatus::Unhealthy("stopped".to_owned()),
        }
    }
}

/// 수집 루프
///
/// 종료 신호를 받으면 모니터 상태를 돌려줍니다.
async fn run_loop(
    mut monitor: MonitorState,
    mut line_rx: mpsc::Receiver<String>,
    report_tx: mpsc::Sender<TickReport>,
    mut shutdown_rx: broadcast::Receiver<()>,
    refresh: Duration,
) -> MonitorState {
    let mut ticker = tokio::time::interval_at(Instant::now() + refresh, refresh);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut source_open = true;
    let mut sink_open = true;

    loop {
        tokio::select! {
            biased;

            _ = shutdown_rx.recv() => {
                tracing::debug!("monitor loop received shutdown signal");
                break;
            }

            _ = ticker.tick() => {
                // 이미 큐에 들어온 라인을 먼저 반영
                for _ in 0..line_rx.len() {
                    match line_rx.try_recv() {
                        Ok(line) => {
                            monitor.ingest_line(&line);
                        }
                        Err(_) => break,
                    }
                }

                let report = monitor.tick(unix_now());
                if sink_open && report_tx.send(report).await.is_err() {
                    tracing::warn!("report receiver closed, tick reports will be discarded");
                    sink_open = false;
                }
            }

            line = line_rx.recv(), if source_open => match line {
                Some(line) => {
                    monitor.ingest_line(&line);
                }
                None => {
                    tracing::warn!("log source closed, continuing evaluation without new input");
                    source_open = false;
                }
            },
        }
    }

    monitor
}

/// 로그 모니터 빌더
///
/// 모니터를 구성하고 리포트 채널을 생성합니다.
pub struct LogMonitorBuilder {
    settings: MonitorSettings,
    parser: Option<Box<dyn LineParser>>,
    report_tx: Option<mpsc::Sender<TickReport>>,
    report_channel_capacity: usize,
}

impl LogMonitorBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            settings: MonitorSettings::default(),
            parser: None,
            report_tx: None,
            report_channel_capacity: 64,
        }
    }

    /// 모니터 설정을 지정합니다.
    pub fn settings(mut self, settings: MonitorSettings) -> Self {
        self.settings = settings;
        self
    }

    /// 라인 파서를 교체합니다. 지정하지 않으면 [`AccessLogParser`]를 사용합니다.
    pub fn parser(mut self, parser: Box<dyn LineParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    /// 외부 리포트 전송 채널을 설정합니다.
    ///
    /// 설정하지 않으면 빌더가 새 채널을 생성합니다.
    pub fn report_sender(mut self, tx: mpsc::Sender<TickReport>) -> Self {
        self.report_tx = Some(tx);
        self
    }

    /// 리포트 채널 용량을 설정합니다 (외부 채널 미사용 시).
    pub fn report_channel_capacity(mut self, capacity: usize) -> Self {
        self.report_channel_capacity = capacity;
        self
    }

    /// 모니터를 빌드합니다.
    ///
    /// # Returns
    /// - `LogMonitor`: 모니터 인스턴스
    /// - `Option<mpsc::Receiver<TickReport>>`: 리포트 수신 채널
    ///   (외부 report_sender를 설정한 경우 None)
    pub fn build(
        self,
    ) -> Result<(LogMonitor, Option<mpsc::Receiver<TickReport>>), LogPipelineError> {
        self.settings.validate()?;
        if self.report_channel_capacity == 0 {
            return Err(LogPipelineError::Config {
                field: "report_channel_capacity".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        let parser = match self.parser {
            Some(parser) => parser,
            None => Box::new(
                AccessLogParser::new()?.with_max_line_length(self.settings.max_line_length),
            ),
        };

        let (report_tx, report_rx) = if let Some(tx) = self.report_tx {
            (tx, None)
        } else {
            let (tx, rx) = mpsc::channel(self.report_channel_capacity);
            (tx, Some(rx))
        };

        let monitor = MonitorState::new(&self.settings, parser);
        let counters = monitor.counters();
        let (shutdown_tx, _) = broadcast::channel(1);

        let log_monitor = LogMonitor {
            settings: self.settings,
            state: PipelineState::Initialized,
            monitor: Some(monitor),
            counters,
            report_tx,
            shutdown_tx,
            loop_task: None,
            tailer_task: None,
        };

        Ok((log_monitor, report_rx))
    }
}

impl Default for LogMonitorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
