//! 이상 징후 보강 -- Chat Completions API 호출
//!
//! [`HttpEnricher`]는 이상 징후 설명을 LLM에 보내 운영자용 한 줄 요약을 받습니다.
//! 보강은 항상 best-effort입니다. 어떤 실패도 호출자에게 에러로 반환될 뿐
//! 실행 전체를 중단시키지 않습니다.
//!
//! 보강이 설정에서 꺼져 있으면 [`DisabledEnricher`]가 대신 사용되어
//! 모든 알림이 원본 설명으로 저하 처리됩니다.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use watchpost_core::config::EscalationConfig;
use watchpost_core::error::EnrichmentError;
use watchpost_core::pipeline::Enricher;
use watchpost_core::types::Anomaly;

/// 요약 요청 프롬프트 접두어
const PROMPT_PREFIX: &str = "Provide a concise explanation for the following anomaly:";

/// Chat Completions 기반 보강기
#[derive(Debug)]
pub struct HttpEnricher {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    max_tokens: u32,
    api_key: String,
}

impl HttpEnricher {
    /// 설정에서 보강기를 생성합니다.
    ///
    /// API 키는 `api_key_env`가 가리키는 환경변수에서 읽습니다.
    /// 키가 없으면 생성 자체가 실패합니다.
    pub fn from_config(config: &EscalationConfig) -> Result<Self, EnrichmentError> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            EnrichmentError::MissingApiKey {
                env: config.api_key_env.clone(),
            }
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| EnrichmentError::Request(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            api_key,
        })
    }

    /// 이상 징후 설명으로 프롬프트를 구성합니다.
    fn build_prompt(anomaly: &Anomaly) -> String {
        format!("{PROMPT_PREFIX}\n{}", anomaly.description)
    }

    /// 응답 본문에서 요약 텍스트를 추출합니다.
    fn parse_completion(body: &str) -> Result<String, EnrichmentError> {
        let response: ChatResponse = serde_json::from_str(body)
            .map_err(|e| EnrichmentError::InvalidResponse(e.to_string()))?;

        let summary = response
            .choices
            .into_iter()
            .next()
            .ok_or(EnrichmentError::EmptyCompletion)?
            .message
            .content
            .trim()
            .to_owned();

        if summary.is_empty() {
            return Err(EnrichmentError::EmptyCompletion);
        }
        Ok(summary)
    }
}

#[async_trait]
impl Enricher for HttpEnricher {
    fn name(&self) -> &str {
        &self.model
    }

    async fn enrich(&self, anomaly: &Anomaly) -> Result<String, EnrichmentError> {
        debug!(log_id = anomaly.log_id.as_str(), "requesting enrichment");

        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: Self::build_prompt(anomaly),
            }],
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| EnrichmentError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichmentError::Request(format!(
                "unexpected status {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| EnrichmentError::Request(e.to_string()))?;

        Self::parse_completion(&body)
    }
}

/// 보강 비활성화 스텁
///
/// 모든 호출이 [`EnrichmentError::Disabled`]로 실패하므로,
/// 에스컬레이션 단계는 전 알림을 저하 처리합니다.
#[derive(Debug, Default)]
pub struct DisabledEnricher;

#[async_trait]
impl Enricher for DisabledEnricher {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn enrich(&self, _anomaly: &Anomaly) -> Result<String, EnrichmentError> {
        Err(EnrichmentError::Disabled)
    }
}

// --- Chat Completions 요청/응답 ---

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anomaly() -> Anomaly {
        Anomaly {
            log_id: "4625".to_owned(),
            description: "Potential anomaly detected in log with ID 4625: failed login".to_owned(),
        }
    }

    #[test]
    fn prompt_embeds_description_on_new_line() {
        let prompt = HttpEnricher::build_prompt(&anomaly());
        assert!(prompt.starts_with(PROMPT_PREFIX));
        assert!(prompt.ends_with("failed login"));
        assert!(prompt.contains('\n'));
    }

    #[test]
    fn parse_completion_extracts_first_choice() {
        let body = r#"{
            "choices": [
                {"message": {"role": "assistant", "content": "  Brute force attempt.  "}},
                {"message": {"role": "assistant", "content": "second"}}
            ]
        }"#;
        let summary = HttpEnricher::parse_completion(body).unwrap();
        assert_eq!(summary, "Brute force attempt.");
    }

    #[test]
    fn parse_completion_empty_choices_fails() {
        let body = r#"{"choices": []}"#;
        let err = HttpEnricher::parse_completion(body).unwrap_err();
        assert!(matches!(err, EnrichmentError::EmptyCompletion));
    }

    #[test]
    fn parse_completion_blank_content_fails() {
        let body = r#"{"choices": [{"message": {"content": "   "}}]}"#;
        let err = HttpEnricher::parse_completion(body).unwrap_err();
        assert!(matches!(err, EnrichmentError::EmptyCompletion));
    }

    #[test]
    fn parse_completion_malformed_body_fails() {
        let err = HttpEnricher::parse_completion("not json").unwrap_err();
        assert!(matches!(err, EnrichmentError::InvalidResponse(_)));
    }

    #[test]
    fn from_config_without_api_key_fails() {
        let config = EscalationConfig {
            api_key_env: "WATCHPOST_TEST_MISSING_KEY_98765".to_owned(),
            ..EscalationConfig::default()
        };
        let err = HttpEnricher::from_config(&config).unwrap_err();
        assert!(matches!(err, EnrichmentError::MissingApiKey { .. }));
    }

    #[tokio::test]
    async fn disabled_enricher_always_fails() {
        let err = DisabledEnricher.enrich(&anomaly()).await.unwrap_err();
        assert!(matches!(err, EnrichmentError::Disabled));
    }

    #[test]
    fn request_serializes_expected_shape() {
        let request = ChatRequest {
            model: "gpt-4",
            messages: vec![ChatMessage {
                role: "user",
                content: "prompt".to_owned(),
            }],
            max_tokens: 50,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4");
        assert_eq!(json["max_tokens"], 50);
        assert_eq!(json["messages"][0]["role"], "user");
    }
}
