//! 위험 규칙 -- 로그 엔트리를 이상 징후로 분류
//!
//! [`Classifier`]는 등록된 [`RiskRule`] 목록을 등록 순서대로 평가합니다.
//! 엔트리 하나에 대해 첫 번째로 매칭된 규칙만 이상 징후를 생성하므로,
//! 엔트리 하나가 중복 알림을 만들지 않습니다.
//!
//! 기본 규칙인 [`PhraseRule`]은 메시지 본문에 대한
//! 대소문자 무시 부분 문자열 매칭입니다.

use metrics::counter;
use tracing::debug;

use watchpost_core::metrics::{LABEL_RULE, TRIAGE_ANOMALIES_TOTAL, TRIAGE_ENTRIES_EVALUATED_TOTAL};
use watchpost_core::pipeline::RiskRule;
use watchpost_core::types::{Anomaly, LogEntry};

/// 문구 매칭 규칙
///
/// 메시지 본문에 지정된 문구가 포함되면 (대소문자 무시) 매칭됩니다.
pub struct PhraseRule {
    name: String,
    phrase_lower: String,
}

impl PhraseRule {
    /// 새 문구 규칙을 생성합니다.
    ///
    /// 규칙 이름은 문구에서 파생됩니다 (공백은 하이픈으로 치환).
    pub fn new(phrase: impl Into<String>) -> Self {
        let phrase = phrase.into();
        let name = format!("phrase:{}", phrase.to_lowercase().replace(' ', "-"));
        Self {
            name,
            phrase_lower: phrase.to_lowercase(),
        }
    }

    /// 매칭 대상 문구를 반환합니다 (소문자 정규화).
    pub fn phrase(&self) -> &str {
        &self.phrase_lower
    }
}

impl RiskRule for PhraseRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, entry: &LogEntry) -> Option<Anomaly> {
        if entry.details.to_lowercase().contains(&self.phrase_lower) {
            Some(Anomaly {
                log_id: entry.id.clone(),
                description: format!(
                    "Potential anomaly detected in log with ID {}: {}",
                    entry.id, entry.details,
                ),
            })
        } else {
            None
        }
    }
}

/// 분류기 -- 규칙 목록을 순서대로 평가하여 이상 징후를 수집합니다.
pub struct Classifier {
    /// 등록된 규칙 (등록 순서대로 평가, 첫 매칭에서 중단)
    rules: Vec<Box<dyn RiskRule>>,
}

impl Classifier {
    /// 빈 분류기를 생성합니다.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// 문구 목록으로 분류기를 생성합니다.
    pub fn with_phrases<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut classifier = Self::new();
        for phrase in phrases {
            classifier.rules.push(Box::new(PhraseRule::new(phrase)));
        }
        classifier
    }

    /// 규칙을 등록합니다. 등록 순서대로 평가됩니다.
    pub fn register(mut self, rule: Box<dyn RiskRule>) -> Self {
        self.rules.push(rule);
        self
    }

    /// 등록된 규칙 수를 반환합니다.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// 엔트리 목록을 분류하여 이상 징후를 반환합니다.
    ///
    /// 결과는 엔트리 입력 순서(탐지 순서)를 그대로 유지합니다.
    pub fn classify(&self, entries: &[LogEntry]) -> Vec<Anomaly> {
        let mut anomalies = Vec::new();

        for entry in entries {
            for rule in &self.rules {
                if let Some(anomaly) = rule.evaluate(entry) {
                    debug!(
                        log_id = entry.id.as_str(),
                        rule = rule.name(),
                        "anomaly detected"
                    );
                    counter!(TRIAGE_ANOMALIES_TOTAL, LABEL_RULE => rule.name().to_owned())
                        .increment(1);
                    anomalies.push(anomaly);
                    break; // 엔트리당 최대 한 건
                }
            }
        }

        counter!(TRIAGE_ENTRIES_EVALUATED_TOTAL).increment(entries.len() as u64);
        anomalies
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::with_phrases(["failed login", "account locked"])
    }
}
