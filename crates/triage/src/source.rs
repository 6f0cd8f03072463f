//! 로그 소스 -- 외부 명령 실행으로 감사 로그 스냅샷 확보
//!
//! [`CommandLogSource`]는 설정된 명령(`wevtutil` 등)을 자식 프로세스로 실행하여
//! 표준 출력 전체를 원시 바이트로 반환합니다. 스트리밍은 하지 않습니다.
//! 한 번의 조회는 전체 스냅샷이거나 실패입니다.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use metrics::{counter, histogram};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use watchpost_core::config::SourceConfig;
use watchpost_core::error::SourceError;
use watchpost_core::metrics::{
    LABEL_RESULT, SOURCE_BYTES_TOTAL, SOURCE_FETCH_DURATION_SECONDS, SOURCE_FETCHES_TOTAL,
};
use watchpost_core::pipeline::LogSource;

/// 명령 기반 로그 소스
pub struct CommandLogSource {
    command: String,
    args: Vec<String>,
    timeout: Duration,
    cancel: CancellationToken,
}

impl CommandLogSource {
    /// 새 명령 소스를 생성합니다.
    pub fn new<I, S>(command: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
            timeout: Duration::from_secs(30),
            cancel: CancellationToken::new(),
        }
    }

    /// 설정에서 명령 소스를 생성합니다.
    pub fn from_config(config: &SourceConfig) -> Self {
        Self::new(config.command.clone(), config.args.clone())
            .with_timeout(Duration::from_secs(config.timeout_secs))
    }

    /// 명령 실행 타임아웃을 설정합니다.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// 취소 토큰을 연결합니다. 토큰이 취소되면 진행 중인 조회가 중단됩니다.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

#[async_trait]
impl LogSource for CommandLogSource {
    fn name(&self) -> &str {
        &self.command
    }

    async fn fetch(&self) -> Result<Bytes, SourceError> {
        let started = Instant::now();
        let result = self.fetch_inner().await;
        histogram!(SOURCE_FETCH_DURATION_SECONDS).record(started.elapsed().as_secs_f64());

        match &result {
            Ok(bytes) => {
                counter!(SOURCE_FETCHES_TOTAL, LABEL_RESULT => "success").increment(1);
                counter!(SOURCE_BYTES_TOTAL).increment(bytes.len() as u64);
            }
            Err(_) => {
                counter!(SOURCE_FETCHES_TOTAL, LABEL_RESULT => "failure").increment(1);
            }
        }
        result
    }
}

impl CommandLogSource {
    async fn fetch_inner(&self) -> Result<Bytes, SourceError> {
        debug!(command = self.command.as_str(), "fetching audit log snapshot");

        let output_fut = Command::new(&self.command)
            .args(&self.args)
            .kill_on_drop(true)
            .output();

        let output = tokio::select! {
            () = self.cancel.cancelled() => return Err(SourceError::Cancelled),
            result = tokio::time::timeout(self.timeout, output_fut) => match result {
                Err(_) => {
                    return Err(SourceError::TimedOut {
                        command: self.command.clone(),
                        secs: self.timeout.as_secs(),
                    });
                }
                Ok(Err(e)) => {
                    return Err(SourceError::SpawnFailed {
                        command: self.command.clone(),
                        reason: e.to_string(),
                    });
                }
                Ok(Ok(output)) => output,
            },
        };

        if !output.status.success() {
            return Err(SourceError::CommandFailed {
                command: self.command.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        Ok(Bytes::from(output.stdout))
    }
}
