//! 파이프라인 오케스트레이션 -- 수집/파싱/분류/에스컬레이션/알림의 전체 흐름
//!
//! [`TriagePipeline`]은 한 번의 실행(run)을 처음부터 끝까지 수행합니다.
//! 데이터는 엄격히 전방향으로 흐르며, 실행 간에 공유되는 상태는 없습니다.
//!
//! # 에러 정책
//! - 소스 실패는 실행 전체를 에러로 종료시킵니다.
//! - 보강 실패는 해당 알림만 저하시킵니다 ([`EscalationCoordinator`] 내부 처리).
//! - 알림 실패는 로깅 후 다음 알림으로 계속 진행합니다.

use std::str;
use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use watchpost_core::config::{SourceConfig, WatchpostConfig};
use watchpost_core::error::SourceError;
use watchpost_core::metrics::{LABEL_RESULT, RUN_DURATION_SECONDS, RUNS_TOTAL};
use watchpost_core::pipeline::{AlertSink, Enricher, LogSource};
use watchpost_core::types::RunOutcome;

use crate::enrich::{DisabledEnricher, HttpEnricher};
use crate::error::TriageError;
use crate::escalate::EscalationCoordinator;
use crate::notify::{CommandAlertSink, ConsoleAlertSink};
use crate::parser::AuditLogParser;
use crate::rule::Classifier;
use crate::source::CommandLogSource;

/// 트리아지 파이프라인
pub struct TriagePipeline {
    source: Arc<dyn LogSource>,
    parser: AuditLogParser,
    classifier: Classifier,
    coordinator: EscalationCoordinator,
    sink: Arc<dyn AlertSink>,
}

impl TriagePipeline {
    /// 파이프라인을 한 번 실행합니다.
    ///
    /// 이상 징후가 없으면 클린 알림 한 건을 보내고 [`RunOutcome::Clean`]을,
    /// 있으면 징후마다 정확히 한 건의 알림을 보내고
    /// [`RunOutcome::AnomaliesHandled`]를 반환합니다.
    pub async fn run(&self) -> Result<RunOutcome, TriageError> {
        let started = Instant::now();
        let result = self.run_inner().await;
        histogram!(RUN_DURATION_SECONDS).record(started.elapsed().as_secs_f64());

        match &result {
            Ok(outcome) => {
                counter!(RUNS_TOTAL, LABEL_RESULT => "success").increment(1);
                info!(outcome = %outcome, "triage run completed");
            }
            Err(e) => {
                counter!(RUNS_TOTAL, LABEL_RESULT => "failure").increment(1);
                warn!(error = %e, "triage run failed");
            }
        }
        result
    }

    async fn run_inner(&self) -> Result<RunOutcome, TriageError> {
        info!(source = self.source.name(), "starting triage run");

        let raw = self.source.fetch().await?;
        let text = str::from_utf8(&raw).map_err(|e| SourceError::NonUtf8Output {
            reason: e.to_string(),
        })?;

        let report = self.parser.parse(text);
        info!(
            entries = report.entries.len(),
            suppressed = report.suppressed,
            "parsed audit log snapshot"
        );

        let anomalies = self.classifier.classify(&report.entries);
        if anomalies.is_empty() {
            if let Err(e) = self.sink.notify_clean().await {
                warn!(sink = self.sink.name(), error = %e, "clean alert delivery failed");
            }
            return Ok(RunOutcome::Clean);
        }

        info!(count = anomalies.len(), "anomalies detected, escalating");
        let alerts = self.coordinator.escalate(anomalies).await;
        let handled = alerts.len();

        for alert in &alerts {
            if let Err(e) = self.sink.notify(alert).await {
                warn!(
                    log_id = alert.anomaly.log_id.as_str(),
                    sink = self.sink.name(),
                    error = %e,
                    "alert delivery failed, continuing"
                );
            }
        }

        Ok(RunOutcome::AnomaliesHandled(handled))
    }
}

/// 트리아지 파이프라인 빌더
///
/// # 사용 예시
/// ```ignore
/// let pipeline = TriagePipelineBuilder::from_config(&config)?
///     .cancellation(cancel_token)
///     .build()?;
/// ```
pub struct TriagePipelineBuilder {
    source: Option<Arc<dyn LogSource>>,
    // 명령 소스는 취소 토큰이 확정되는 build() 시점에 생성
    source_config: Option<SourceConfig>,
    classifier: Option<Classifier>,
    enricher: Option<Arc<dyn Enricher>>,
    sink: Option<Arc<dyn AlertSink>>,
    max_concurrency: usize,
    cancel: CancellationToken,
}

impl TriagePipelineBuilder {
    /// 빈 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            source: None,
            source_config: None,
            classifier: None,
            enricher: None,
            sink: None,
            max_concurrency: 4,
            cancel: CancellationToken::new(),
        }
    }

    /// 설정에서 기본 협력자 세트를 구성합니다.
    ///
    /// - 소스: [`CommandLogSource`]
    /// - 보강기: 활성화 시 [`HttpEnricher`], 아니면 [`DisabledEnricher`]
    /// - 싱크: 설정에 따라 [`ConsoleAlertSink`] 또는 [`CommandAlertSink`]
    ///
    /// 보강이 활성화되어 있는데 API 키 환경변수가 없으면 실패합니다.
    pub fn from_config(config: &WatchpostConfig) -> Result<Self, TriageError> {
        let mut builder = Self::new().max_concurrency(config.escalation.max_concurrency);

        builder.source_config = Some(config.source.clone());
        builder.classifier = Some(Classifier::with_phrases(config.triage.phrases.clone()));

        builder.enricher = Some(if config.escalation.enabled {
            let enricher =
                HttpEnricher::from_config(&config.escalation).map_err(|e| TriageError::Build {
                    reason: e.to_string(),
                })?;
            Arc::new(enricher) as Arc<dyn Enricher>
        } else {
            Arc::new(DisabledEnricher)
        });

        builder.sink = Some(match config.alert.sink.as_str() {
            "command" => Arc::new(CommandAlertSink::from_config(&config.alert)) as Arc<dyn AlertSink>,
            _ => Arc::new(ConsoleAlertSink),
        });

        Ok(builder)
    }

    /// 로그 소스를 지정합니다.
    pub fn source(mut self, source: Arc<dyn LogSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// 분류기를 지정합니다. 미지정 시 기본 문구 규칙을 사용합니다.
    pub fn classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// 보강기를 지정합니다. 미지정 시 보강이 비활성화됩니다.
    pub fn enricher(mut self, enricher: Arc<dyn Enricher>) -> Self {
        self.enricher = Some(enricher);
        self
    }

    /// 알림 싱크를 지정합니다.
    pub fn sink(mut self, sink: Arc<dyn AlertSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// 동시 보강 요청 수 상한을 설정합니다.
    pub fn max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// 취소 토큰을 연결합니다.
    ///
    /// 취소 시 진행 중인 소스 조회는 에러로, 진행 중인 보강은
    /// 저하 알림으로 마무리됩니다.
    pub fn cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// 파이프라인을 빌드합니다.
    ///
    /// 소스와 싱크는 필수입니다. 설정 기반 명령 소스는 이 시점에
    /// 취소 토큰과 함께 생성되므로, 진행 중인 조회도 취소에 반응합니다.
    pub fn build(self) -> Result<TriagePipeline, TriageError> {
        let source = match (self.source, self.source_config) {
            (Some(source), _) => source,
            (None, Some(config)) => Arc::new(
                CommandLogSource::from_config(&config).with_cancellation(self.cancel.clone()),
            ) as Arc<dyn LogSource>,
            (None, None) => {
                return Err(TriageError::Build {
                    reason: "log source is required".to_owned(),
                });
            }
        };
        let sink = self.sink.ok_or_else(|| TriageError::Build {
            reason: "alert sink is required".to_owned(),
        })?;

        let enricher = self
            .enricher
            .unwrap_or_else(|| Arc::new(DisabledEnricher) as Arc<dyn Enricher>);

        let coordinator = EscalationCoordinator::new(enricher)
            .with_max_concurrency(self.max_concurrency)
            .with_cancellation(self.cancel);

        Ok(TriagePipeline {
            source,
            parser: AuditLogParser::new(),
            classifier: self.classifier.unwrap_or_default(),
            coordinator,
            sink,
        })
    }
}

impl Default for TriagePipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use bytes::Bytes;
    use watchpost_core::error::NotifyError;
    use watchpost_core::types::EnrichedAlert;

    use super::*;

    struct StaticLogSource(Bytes);

    #[async_trait]
    impl LogSource for StaticLogSource {
        fn name(&self) -> &str {
            "static"
        }
        async fn fetch(&self) -> Result<Bytes, SourceError> {
            Ok(self.0.clone())
        }
    }

    struct NullSink;

    #[async_trait]
    impl AlertSink for NullSink {
        fn name(&self) -> &str {
            "null"
        }
        async fn notify(&self, _alert: &EnrichedAlert) -> Result<(), NotifyError> {
            Ok(())
        }
        async fn notify_clean(&self) -> Result<(), NotifyError> {
            Ok(())
        }
    }

    #[test]
    fn build_without_source_fails() {
        let result = TriagePipelineBuilder::new().sink(Arc::new(NullSink)).build();
        assert!(matches!(result, Err(TriageError::Build { .. })));
    }

    #[test]
    fn build_without_sink_fails() {
        let result = TriagePipelineBuilder::new()
            .source(Arc::new(StaticLogSource(Bytes::new())))
            .build();
        assert!(matches!(result, Err(TriageError::Build { .. })));
    }

    #[test]
    fn from_config_with_escalation_disabled_builds() {
        let mut config = WatchpostConfig::default();
        config.escalation.enabled = false;
        let pipeline = TriagePipelineBuilder::from_config(&config).unwrap().build();
        assert!(pipeline.is_ok());
    }

    #[test]
    fn from_config_missing_api_key_fails() {
        let mut config = WatchpostConfig::default();
        config.escalation.api_key_env = "WATCHPOST_TEST_NO_SUCH_KEY_55555".to_owned();
        let result = TriagePipelineBuilder::from_config(&config);
        assert!(matches!(result, Err(TriageError::Build { .. })));
    }

    #[tokio::test]
    async fn empty_snapshot_is_clean_run() {
        let pipeline = TriagePipelineBuilder::new()
            .source(Arc::new(StaticLogSource(Bytes::new())))
            .sink(Arc::new(NullSink))
            .build()
            .unwrap();
        let outcome = pipeline.run().await.unwrap();
        assert_eq!(outcome, RunOutcome::Clean);
    }

    #[tokio::test]
    async fn cancelled_token_aborts_source_fetch() {
        let mut config = WatchpostConfig::default();
        config.source.command = "sleep".to_owned();
        config.source.args = vec!["2".to_owned()];
        config.escalation.enabled = false;

        let cancel = CancellationToken::new();
        cancel.cancel();

        let pipeline = TriagePipelineBuilder::from_config(&config)
            .unwrap()
            .sink(Arc::new(NullSink))
            .cancellation(cancel)
            .build()
            .unwrap();

        let err = pipeline.run().await.unwrap_err();
        assert!(matches!(err, TriageError::Source(SourceError::Cancelled)));
    }

    #[tokio::test]
    async fn non_utf8_snapshot_is_fatal() {
        let pipeline = TriagePipelineBuilder::new()
            .source(Arc::new(StaticLogSource(Bytes::from_static(&[0xff, 0xfe]))))
            .sink(Arc::new(NullSink))
            .build()
            .unwrap();
        let err = pipeline.run().await.unwrap_err();
        assert!(matches!(
            err,
            TriageError::Source(SourceError::NonUtf8Output { .. })
        ));
    }
}
