//! 알림 싱크 -- 보강된 알림을 운영자에게 전달
//!
//! 전달은 fire-and-forget입니다. 싱크는 수신 확인을 보장하지 않으며,
//! 실패는 호출자가 로깅한 뒤 다음 알림으로 넘어갑니다.
//!
//! 구현체:
//! - [`ConsoleAlertSink`]: 표준 출력에 한 줄씩 기록 (기본값)
//! - [`CommandAlertSink`]: 외부 알림 명령(`notify-send` 등) 실행

use std::time::Duration;

use async_trait::async_trait;
use metrics::counter;
use tokio::process::Command;
use tracing::debug;

use watchpost_core::config::AlertConfig;
use watchpost_core::error::NotifyError;
use watchpost_core::metrics::{ALERT_DELIVERIES_TOTAL, LABEL_RESULT, LABEL_SINK};
use watchpost_core::pipeline::AlertSink;
use watchpost_core::types::EnrichedAlert;

/// 이상 징후 알림 제목
pub const ANOMALY_TITLE: &str = "Security Audit - Anomaly Detected";

/// 클린 실행 알림 제목
pub const CLEAN_TITLE: &str = "Security Audit";

/// 클린 실행 알림 본문
pub const CLEAN_MESSAGE: &str = "No anomalies detected. Your system is safe.";

fn record_delivery(sink: &'static str, ok: bool) {
    let result = if ok { "success" } else { "failure" };
    counter!(ALERT_DELIVERIES_TOTAL, LABEL_SINK => sink, LABEL_RESULT => result).increment(1);
}

/// 표준 출력 알림 싱크
#[derive(Debug, Default)]
pub struct ConsoleAlertSink;

#[async_trait]
impl AlertSink for ConsoleAlertSink {
    fn name(&self) -> &str {
        "console"
    }

    async fn notify(&self, alert: &EnrichedAlert) -> Result<(), NotifyError> {
        println!("[{ANOMALY_TITLE}] {alert}");
        record_delivery("console", true);
        Ok(())
    }

    async fn notify_clean(&self) -> Result<(), NotifyError> {
        println!("[{CLEAN_TITLE}] {CLEAN_MESSAGE}");
        record_delivery("console", true);
        Ok(())
    }
}

/// 외부 명령 알림 싱크
///
/// 설정된 명령에 제목과 본문을 마지막 두 인자로 붙여 실행합니다.
/// `notify-send "제목" "본문"` 형태의 데스크톱 알림 도구를 염두에 둔 구현입니다.
pub struct CommandAlertSink {
    command: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandAlertSink {
    /// 새 명령 싱크를 생성합니다.
    pub fn new<I, S>(command: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
            timeout: Duration::from_secs(5),
        }
    }

    /// 설정에서 명령 싱크를 생성합니다.
    pub fn from_config(config: &AlertConfig) -> Self {
        Self::new(config.command.clone(), config.args.clone())
            .with_timeout(Duration::from_secs(config.timeout_secs))
    }

    /// 알림 명령 타임아웃을 설정합니다.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn deliver(&self, title: &str, message: &str) -> Result<(), NotifyError> {
        debug!(command = self.command.as_str(), title, "delivering alert");

        let output_fut = Command::new(&self.command)
            .args(&self.args)
            .arg(title)
            .arg(message)
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, output_fut)
            .await
            .map_err(|_| NotifyError::DeliveryFailed {
                sink: self.command.clone(),
                reason: format!("timed out after {}s", self.timeout.as_secs()),
            })?
            .map_err(|e| NotifyError::DeliveryFailed {
                sink: self.command.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(NotifyError::DeliveryFailed {
                sink: self.command.clone(),
                reason: format!(
                    "{}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl AlertSink for CommandAlertSink {
    fn name(&self) -> &str {
        &self.command
    }

    async fn notify(&self, alert: &EnrichedAlert) -> Result<(), NotifyError> {
        let result = self.deliver(ANOMALY_TITLE, &alert.to_string()).await;
        record_delivery("command", result.is_ok());
        result
    }

    async fn notify_clean(&self) -> Result<(), NotifyError> {
        let result = self.deliver(CLEAN_TITLE, CLEAN_MESSAGE).await;
        record_delivery("command", result.is_ok());
        result
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use watchpost_core::types::Anomaly;

    use super::*;

    fn alert() -> EnrichedAlert {
        EnrichedAlert::enriched(
            Anomaly {
                log_id: "4625".to_owned(),
                description: "raw description".to_owned(),
            },
            "Likely brute force attempt",
        )
    }

    #[tokio::test]
    async fn console_sink_accepts_alert_and_clean() {
        let sink = ConsoleAlertSink;
        sink.notify(&alert()).await.unwrap();
        sink.notify_clean().await.unwrap();
    }

    #[tokio::test]
    async fn command_sink_passes_title_and_message_as_args() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let script = format!("printf '%s|%s' \"$0\" \"$1\" > {}", file.path().display());
        let sink = CommandAlertSink::new("sh", ["-c".to_owned(), script]);

        sink.notify(&alert()).await.unwrap();

        let mut written = String::new();
        file.read_to_string(&mut written).unwrap();
        assert!(written.starts_with(ANOMALY_TITLE));
        assert!(written.contains("Likely brute force attempt"));
    }

    #[tokio::test]
    async fn command_sink_clean_notification_uses_clean_text() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let script = format!("printf '%s|%s' \"$0\" \"$1\" > {}", file.path().display());
        let sink = CommandAlertSink::new("sh", ["-c".to_owned(), script]);

        sink.notify_clean().await.unwrap();

        let mut written = String::new();
        file.read_to_string(&mut written).unwrap();
        assert_eq!(written, format!("{CLEAN_TITLE}|{CLEAN_MESSAGE}"));
    }

    #[tokio::test]
    async fn command_sink_failure_is_delivery_failed() {
        let sink = CommandAlertSink::new("sh", ["-c".to_owned(), "exit 7".to_owned()]);
        let err = sink.notify_clean().await.unwrap_err();
        assert!(matches!(err, NotifyError::DeliveryFailed { .. }));
    }

    #[tokio::test]
    async fn command_sink_missing_command_is_delivery_failed() {
        let sink = CommandAlertSink::new("watchpost-no-such-notifier", Vec::<String>::new());
        let err = sink.notify_clean().await.unwrap_err();
        assert!(matches!(err, NotifyError::DeliveryFailed { .. }));
    }
}
