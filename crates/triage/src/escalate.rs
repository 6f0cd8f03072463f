//! 에스컬레이션 조율 -- 이상 징후별 보강을 병렬로 수행
//!
//! [`EscalationCoordinator`]는 탐지된 이상 징후마다 보강 태스크를 스폰하고,
//! 세마포어로 동시 요청 수를 제한합니다. 보장 사항:
//!
//! - 이상 징후 N건 입력이면 알림 N건 출력. 누락도 중복도 없습니다.
//! - 출력 순서는 탐지 순서와 동일합니다.
//! - 개별 보강 실패는 해당 알림만 저하시키고 다른 태스크에 영향을 주지 않습니다.
//! - 취소 시 미완료 태스크는 저하 알림으로 마무리됩니다.

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use watchpost_core::metrics::{
    ESCALATION_DEGRADED_TOTAL, ESCALATION_REQUEST_DURATION_SECONDS, ESCALATION_REQUESTS_TOTAL,
    LABEL_RESULT,
};
use watchpost_core::pipeline::Enricher;
use watchpost_core::types::{Anomaly, EnrichedAlert};

/// 에스컬레이션 조율자
pub struct EscalationCoordinator {
    enricher: Arc<dyn Enricher>,
    max_concurrency: usize,
    cancel: CancellationToken,
}

impl EscalationCoordinator {
    /// 새 조율자를 생성합니다.
    pub fn new(enricher: Arc<dyn Enricher>) -> Self {
        Self {
            enricher,
            max_concurrency: 4,
            cancel: CancellationToken::new(),
        }
    }

    /// 동시 보강 요청 수 상한을 설정합니다 (최소 1).
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// 취소 토큰을 연결합니다.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// 이상 징후 목록을 보강하여 알림 목록으로 변환합니다.
    ///
    /// 입력 순서가 그대로 유지되며, 입력 건수와 출력 건수가 항상 같습니다.
    pub async fn escalate(&self, anomalies: Vec<Anomaly>) -> Vec<EnrichedAlert> {
        if anomalies.is_empty() {
            return Vec::new();
        }

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut join_set = JoinSet::new();

        for (idx, anomaly) in anomalies.iter().cloned().enumerate() {
            let enricher = Arc::clone(&self.enricher);
            let semaphore = Arc::clone(&semaphore);
            let cancel = self.cancel.clone();

            join_set.spawn(async move {
                // 세마포어는 escalate() 안에서만 살아있으므로 close되지 않음
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (idx, degraded(anomaly));
                };

                let started = Instant::now();
                let alert = tokio::select! {
                    () = cancel.cancelled() => {
                        warn!(log_id = anomaly.log_id.as_str(), "enrichment cancelled");
                        counter!(ESCALATION_REQUESTS_TOTAL, LABEL_RESULT => "cancelled")
                            .increment(1);
                        degraded(anomaly)
                    }
                    result = enricher.enrich(&anomaly) => match result {
                        Ok(summary) => {
                            counter!(ESCALATION_REQUESTS_TOTAL, LABEL_RESULT => "success")
                                .increment(1);
                            EnrichedAlert::enriched(anomaly, summary)
                        }
                        Err(e) => {
                            warn!(
                                log_id = anomaly.log_id.as_str(),
                                error = %e,
                                "enrichment failed, falling back to raw description"
                            );
                            counter!(ESCALATION_REQUESTS_TOTAL, LABEL_RESULT => "failure")
                                .increment(1);
                            degraded(anomaly)
                        }
                    }
                };
                histogram!(ESCALATION_REQUEST_DURATION_SECONDS)
                    .record(started.elapsed().as_secs_f64());
                (idx, alert)
            });
        }

        let mut slots: Vec<Option<EnrichedAlert>> = vec![None; anomalies.len()];
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((idx, alert)) => slots[idx] = Some(alert),
                Err(e) => warn!(error = %e, "escalation task failed to join"),
            }
        }

        // join 실패로 비어있는 슬롯도 저하 알림으로 채워 건수를 보존
        slots
            .into_iter()
            .zip(anomalies)
            .map(|(slot, anomaly)| slot.unwrap_or_else(|| degraded(anomaly)))
            .collect()
    }
}

fn degraded(anomaly: Anomaly) -> EnrichedAlert {
    counter!(ESCALATION_DEGRADED_TOTAL).increment(1);
    EnrichedAlert::degraded(anomaly)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use watchpost_core::error::EnrichmentError;

    use super::*;

    /// 테스트용 보강기. 지정된 ID는 실패시키고, 동시 실행 수의 최대치를 기록합니다.
    struct ScriptedEnricher {
        fail_ids: HashSet<String>,
        delay: Duration,
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    impl ScriptedEnricher {
        fn new() -> Self {
            Self {
                fail_ids: HashSet::new(),
                delay: Duration::ZERO,
                active: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }

        fn failing_on<I: IntoIterator<Item = &'static str>>(ids: I) -> Self {
            let mut enricher = Self::new();
            enricher.fail_ids = ids.into_iter().map(str::to_owned).collect();
            enricher
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    #[async_trait]
    impl Enricher for ScriptedEnricher {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn enrich(&self, anomaly: &Anomaly) -> Result<String, EnrichmentError> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.active.fetch_sub(1, Ordering::SeqCst);

            if self.fail_ids.contains(&anomaly.log_id) {
                Err(EnrichmentError::Request("scripted failure".to_owned()))
            } else {
                Ok(format!("summary for {}", anomaly.log_id))
            }
        }
    }

    fn anomalies(ids: &[&str]) -> Vec<Anomaly> {
        ids.iter()
            .map(|id| Anomaly {
                log_id: (*id).to_owned(),
                description: format!("anomaly {id}"),
            })
            .collect()
    }

    #[tokio::test]
    async fn empty_input_yields_empty_output() {
        let coordinator = EscalationCoordinator::new(Arc::new(ScriptedEnricher::new()));
        assert!(coordinator.escalate(Vec::new()).await.is_empty());
    }

    #[tokio::test]
    async fn alerts_preserve_detection_order() {
        let coordinator = EscalationCoordinator::new(Arc::new(ScriptedEnricher::new()));
        let alerts = coordinator.escalate(anomalies(&["1", "2", "3", "4"])).await;
        let ids: Vec<_> = alerts.iter().map(|a| a.anomaly.log_id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3", "4"]);
        assert!(alerts.iter().all(|a| !a.enrichment_failed));
        assert_eq!(alerts[2].summary, "summary for 3");
    }

    #[tokio::test]
    async fn failure_degrades_only_affected_alert() {
        let enricher = ScriptedEnricher::failing_on(["2"]);
        let coordinator = EscalationCoordinator::new(Arc::new(enricher));
        let alerts = coordinator.escalate(anomalies(&["1", "2", "3"])).await;

        assert_eq!(alerts.len(), 3);
        assert!(!alerts[0].enrichment_failed);
        assert!(alerts[1].enrichment_failed);
        assert_eq!(alerts[1].summary, "anomaly 2");
        assert!(!alerts[2].enrichment_failed);
    }

    #[tokio::test]
    async fn every_anomaly_yields_exactly_one_alert() {
        let enricher = ScriptedEnricher::failing_on(["1", "3", "5"]);
        let coordinator = EscalationCoordinator::new(Arc::new(enricher));
        let input = anomalies(&["1", "2", "3", "4", "5", "6"]);
        let alerts = coordinator.escalate(input).await;
        assert_eq!(alerts.len(), 6);
    }

    #[tokio::test]
    async fn concurrency_stays_within_limit() {
        let enricher = Arc::new(ScriptedEnricher::new().with_delay(Duration::from_millis(20)));
        let coordinator =
            EscalationCoordinator::new(Arc::clone(&enricher) as Arc<dyn Enricher>)
                .with_max_concurrency(2);
        coordinator
            .escalate(anomalies(&["1", "2", "3", "4", "5", "6", "7", "8"]))
            .await;
        assert!(enricher.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn cancelled_token_degrades_pending_alerts() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let enricher = ScriptedEnricher::new().with_delay(Duration::from_secs(5));
        let coordinator = EscalationCoordinator::new(Arc::new(enricher)).with_cancellation(cancel);

        let alerts = coordinator.escalate(anomalies(&["1", "2"])).await;
        assert_eq!(alerts.len(), 2);
        assert!(alerts.iter().all(|a| a.enrichment_failed));
    }
}
