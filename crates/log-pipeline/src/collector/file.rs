//! 파일 기반 로그 수집기
//!
//! 로그 파일을 감시하며 새로운 라인이 추가되면 수집합니다.
//! `tail -f`와 유사한 동작을 비동기 방식으로 구현합니다.
//!
//! # 동작
//! - 개행으로 끝나지 않은 마지막 라인은 개행이 도착할 때까지 보류
//! - EOF에서는 `poll_interval` 동안 대기 (busy-spin 없음)
//! - `max_line_length`를 넘는 라인은 경고 후 버림
//!
//! # 로테이션 감지
//! - inode 변경 감지 (logrotate 등)
//! - 파일 크기 축소 감지 (truncation)
//! - 새 파일을 처음부터 다시 열기

use std::io::SeekFrom;
use std::path::PathBuf;
use std::time::Duration;

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use tailstat_core::metrics as m;

use super::CollectorStatus;
use crate::error::LogPipelineError;

/// 파일 수집기 설정
#[derive(Debug, Clone)]
pub struct TailerConfig {
    /// 감시할 파일 경로
    pub path: PathBuf,
    /// EOF 대기 주기
    pub poll_interval: Duration,
    /// 최대 라인 길이 (바이트, 개행 제외)
    pub max_line_length: usize,
    /// 기존 내용부터 읽을지 여부 (false면 파일 끝에서 시작)
    pub from_start: bool,
}

impl Default for TailerConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/var/log/access.log"),
            poll_interval: Duration::from_millis(250),
            max_line_length: 64 * 1024, // 64KB
            from_start: true,
        }
    }
}

/// 열린 파일의 읽기 위치
struct Cursor {
    reader: BufReader<File>,
    /// 읽은 바이트 오프셋
    offset: u64,
    /// 열었을 때의 inode (Unix 전용)
    inode: Option<u64>,
    /// 개행을 기다리는 미완성 라인
    pending: Vec<u8>,
    /// 길이 초과 라인의 나머지를 버리는 중
    discarding: bool,
}

/// 파일 기반 로그 수집기
///
/// 파일을 폴링하여 새 라인을 채널로 전달합니다.
/// 수신측이 닫히면 정상 종료합니다.
pub struct FileTailer {
    config: TailerConfig,
    tx: mpsc::Sender<String>,
    status: CollectorStatus,
    /// 읽은 라인 수
    lines_read: u64,
    /// 큐 포화로 대기한 횟수
    lag_events: u64,
    /// 현재 큐 포화 상태
    lagging: bool,
}

impl FileTailer {
    /// 새 파일 수집기를 생성합니다.
    pub fn new(config: TailerConfig, tx: mpsc::Sender<String>) -> Self {
        Self {
            config,
            tx,
            status: CollectorStatus::Idle,
            lines_read: 0,
            lag_events: 0,
            lagging: false,
        }
    }

    /// 수집기를 실행합니다.
    ///
    /// 수신측 채널이 닫히거나 복구할 수 없는 I/O 에러가 날 때까지 실행됩니다.
    /// `tokio::spawn`으로 별도 태스크에서 호출하세요.
    pub async fn run(&mut self) -> Result<(), LogPipelineError> {
        self.status = CollectorStatus::Running;
        let result = self.tail().await;
        self.status = match &result {
            Ok(()) => CollectorStatus::Stopped,
            Err(e) => {
                tracing::error!(path = %self.config.path.display(), error = %e, "log tailer failed");
                CollectorStatus::Error(e.to_string())
            }
        };
        result
    }

    async fn tail(&mut self) -> Result<(), LogPipelineError> {
        let mut cursor = self.open(!self.config.from_start).await?;
        tracing::info!(
            path = %self.config.path.display(),
            offset = cursor.offset,
            "tailing log file"
        );

        loop {
            if let Some(line) = self.next_line(&mut cursor).await? {
                if !self.forward(line).await {
                    return Ok(());
                }
                continue;
            }

            if self.tx.is_closed() {
                return Ok(());
            }

            if self.rotated(&cursor).await {
                match self.open(false).await {
                    Ok(reopened) => {
                        tracing::info!(
                            path = %self.config.path.display(),
                            previous_offset = cursor.offset,
                            "log file rotated or truncated, reopened from start"
                        );
                        cursor = reopened;
                        continue;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to reopen rotated log file, retrying");
                    }
                }
            }

            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    /// 파일을 엽니다. `at_end`이면 파일 끝에서 시작합니다.
    async fn open(&self, at_end: bool) -> Result<Cursor, LogPipelineError> {
        let collector_error = |e: std::io::Error| LogPipelineError::Collector {
            source_type: "file".to_owned(),
            reason: format!("{}: {e}", self.config.path.display()),
        };

        let mut file = File::open(&self.config.path)
            .await
            .map_err(collector_error)?;
        let metadata = file.metadata().await.map_err(collector_error)?;
        let offset = if at_end {
            file.seek(SeekFrom::End(0)).await.map_err(collector_error)?
        } else {
            0
        };

        Ok(Cursor {
            reader: BufReader::new(file),
            offset,
            inode: inode_of(&metadata),
            pending: Vec::new(),
            discarding: false,
        })
    }

    /// 완성된 다음 라인을 읽습니다. EOF이면 `None` (미완성 라인은 보류).
    async fn next_line(&self, cursor: &mut Cursor) -> Result<Option<String>, LogPipelineError> {
        let max = self.config.max_line_length;

        loop {
            let (used, newline) = {
                let available = cursor.reader.fill_buf().await?;
                if available.is_empty() {
                    return Ok(None);
                }
                let (chunk, newline) = match available.iter().position(|b| *b == b'\n') {
                    Some(i) => (&available[..=i], true),
                    None => (available, false),
                };
                if !cursor.discarding {
                    cursor.pending.extend_from_slice(chunk);
                }
                (chunk.len(), newline)
            };
            cursor.reader.consume(used);
            cursor.offset += used as u64;

            // 버리는 중이면 pending이 비어 있으므로 길이를 검사하지 않음
            if !cursor.discarding && cursor.pending.len() - usize::from(newline) > max {
                tracing::warn!(
                    path = %self.config.path.display(),
                    max_line_length = max,
                    "log line exceeds maximum length, dropping"
                );
                cursor.pending.clear();
                cursor.discarding = !newline;
                continue;
            }

            if newline {
                if cursor.discarding {
                    cursor.discarding = false;
                    continue;
                }
                let raw = std::mem::take(&mut cursor.pending);
                let line = String::from_utf8_lossy(&raw);
                return Ok(Some(line.trim_end_matches(['\r', '\n']).to_owned()));
            }
        }
    }

    /// 라인을 수집 루프로 전달합니다. 수신측이 닫혔으면 `false`.
    async fn forward(&mut self, line: String) -> bool {
        self.lines_read += 1;
        metrics::counter!(m::LINES_READ_TOTAL).increment(1);

        match self.tx.try_send(line) {
            Ok(()) => {
                if self.lagging {
                    self.lagging = false;
                    tracing::info!(lag_events = self.lag_events, "ingest queue caught up");
                }
                true
            }
            Err(TrySendError::Full(line)) => {
                self.lag_events += 1;
                metrics::counter!(m::INGEST_LAG_EVENTS_TOTAL).increment(1);
                if !self.lagging {
                    self.lagging = true;
                    tracing::warn!(
                        capacity = self.tx.max_capacity(),
                        lines_read = self.lines_read,
                        "ingest queue full, log source is ahead of processing"
                    );
                }
                self.tx.send(line).await.is_ok()
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    /// 파일이 교체(inode 변경)되었거나 잘렸는지 확인합니다.
    async fn rotated(&self, cursor: &Cursor) -> bool {
        // 로테이션 도중 파일이 잠시 없을 수 있으므로 에러는 무시
        let Ok(metadata) = tokio::fs::metadata(&self.config.path).await else {
            return false;
        };
        if metadata.len() < cursor.offset {
            return true;
        }
        matches!(
            (cursor.inode, inode_of(&metadata)),
            (Some(old), Some(new)) if old != new
        )
    }

    /// 현재 상태를 반환합니다.
    pub fn status(&self) -> &CollectorStatus {
        &self.status
    }

    /// 읽은 라인 수
    pub fn lines_read(&self) -> u64 {
        self.lines_read
    }

    /// 큐 포화로 대기한 횟수
    pub fn lag_events(&self) -> u64 {
        self.lag_events
    }
}

#[cfg(unix)]
fn inode_of(metadata: &std::fs::Metadata) -> Option<u64> {
    use std::os::unix::fs::MetadataExt;
    Some(metadata.ino())
}

#[cfg(not(unix))]
fn inode_of(_metadata: &std::fs::Metadata) -> Option<u64> {
    None
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const RECV_TIMEOUT: Duration = Duration::from_secs(5);

    fn config(path: &std::path::Path, from_start: bool) -> TailerConfig {
        TailerConfig {
            path: path.to_path_buf(),
            poll_interval: Duration::from_millis(10),
            max_line_length: 64,
            from_start,
        }
    }

    fn append(path: &std::path::Path, data: &str) {
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .open(path)
            .unwrap();
        file.write_all(data.as_bytes()).unwrap();
        file.flush().unwrap();
    }

    async fn recv(rx: &mut mpsc::Receiver<String>) -> String {
        tokio::time::timeout(RECV_TIMEOUT, rx.recv())
            .await
            .expect("timed out waiting for line")
            .expect("channel closed")
    }

    fn spawn(config: TailerConfig) -> (mpsc::Receiver<String>, tokio::task::JoinHandle<FileTailer>) {
        let (tx, rx) = mpsc::channel(16);
        let handle = tokio::spawn(async move {
            let mut tailer = FileTailer::new(config, tx);
            let _ = tailer.run().await;
            tailer
        });
        (rx, handle)
    }

    #[test]
    fn default_config() {
        let config = TailerConfig::default();
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.max_line_length, 64 * 1024);
        assert!(config.from_start);
    }

    #[test]
    fn tailer_starts_idle() {
        let (tx, _rx) = mpsc::channel(10);
        let tailer = FileTailer::new(TailerConfig::default(), tx);
        assert_eq!(*tailer.status(), CollectorStatus::Idle);
        assert_eq!(tailer.lines_read(), 0);
    }

    #[tokio::test]
    async fn reads_existing_lines_from_start() {
        let file = tempfile::NamedTempFile::new().unwrap();
        append(file.path(), "first\nsecond\r\n");

        let (mut rx, handle) = spawn(config(file.path(), true));
        assert_eq!(recv(&mut rx).await, "first");
        assert_eq!(recv(&mut rx).await, "second");
        handle.abort();
    }

    #[tokio::test]
    async fn from_end_skips_existing_content() {
        let file = tempfile::NamedTempFile::new().unwrap();
        append(file.path(), "old line\n");

        let (mut rx, handle) = spawn(config(file.path(), false));
        tokio::time::sleep(Duration::from_millis(50)).await;
        append(file.path(), "new line\n");

        assert_eq!(recv(&mut rx).await, "new line");
        handle.abort();
    }

    #[tokio::test]
    async fn partial_line_waits_for_newline() {
        let file = tempfile::NamedTempFile::new().unwrap();
        append(file.path(), "hel");

        let (mut rx, handle) = spawn(config(file.path(), true));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_err());

        append(file.path(), "lo\n");
        assert_eq!(recv(&mut rx).await, "hello");
        handle.abort();
    }

    #[tokio::test]
    async fn overlong_line_is_dropped() {
        let file = tempfile::NamedTempFile::new().unwrap();
        append(file.path(), &format!("{}\nshort\n", "x".repeat(200)));

        let (mut rx, handle) = spawn(config(file.path(), true));
        assert_eq!(recv(&mut rx).await, "short");
        handle.abort();
    }

    #[tokio::test]
    async fn overlong_line_spanning_buffer_chunks_is_dropped() {
        let file = tempfile::NamedTempFile::new().unwrap();
        // 읽기 버퍼(8KB)보다 긴 라인: 개행은 다음 청크에서 도착
        append(file.path(), &format!("{}\nshort\n", "x".repeat(10_000)));

        let (mut rx, handle) = spawn(config(file.path(), true));
        assert_eq!(recv(&mut rx).await, "short");
        handle.abort();
    }

    #[tokio::test]
    async fn overlong_partial_line_is_dropped_once_completed() {
        let file = tempfile::NamedTempFile::new().unwrap();
        append(file.path(), &"y".repeat(300));

        let (mut rx, handle) = spawn(config(file.path(), true));
        tokio::time::sleep(Duration::from_millis(50)).await;
        append(file.path(), "yyy\nnext\n");

        assert_eq!(recv(&mut rx).await, "next");
        handle.abort();
    }

    #[tokio::test]
    async fn truncation_restarts_from_beginning() {
        let file = tempfile::NamedTempFile::new().unwrap();
        append(file.path(), "a fairly long first line\n");

        let (mut rx, handle) = spawn(config(file.path(), true));
        assert_eq!(recv(&mut rx).await, "a fairly long first line");

        std::fs::write(file.path(), "after\n").unwrap();
        assert_eq!(recv(&mut rx).await, "after");
        handle.abort();
    }

    #[tokio::test]
    async fn stops_when_receiver_dropped() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let (rx, handle) = spawn(config(file.path(), true));
        drop(rx);

        let tailer = tokio::time::timeout(RECV_TIMEOUT, handle)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(*tailer.status(), CollectorStatus::Stopped);
    }

    #[tokio::test]
    async fn missing_file_is_collector_error() {
        let (tx, _rx) = mpsc::channel(1);
        let mut tailer = FileTailer::new(
            config(std::path::Path::new("/nonexistent/tailstat/access.log"), true),
            tx,
        );
        let err = tailer.run().await.unwrap_err();
        assert!(matches!(err, LogPipelineError::Collector { .. }));
        assert!(matches!(tailer.status(), CollectorStatus::Error(_)));
    }
}
