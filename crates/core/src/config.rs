//! 설정 관리 — watchpost.toml 파싱 및 런타임 설정
//!
//! [`WatchpostConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`WATCHPOST_SOURCE_COMMAND=wevtutil` 형식)
//! 3. 설정 파일 (`watchpost.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), watchpost_core::error::WatchpostError> {
//! use watchpost_core::config::WatchpostConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = WatchpostConfig::load("watchpost.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = WatchpostConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, WatchpostError};

/// Watchpost 통합 설정
///
/// `watchpost.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 모듈은 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WatchpostConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 로그 소스 설정
    #[serde(default)]
    pub source: SourceConfig,
    /// 분류 규칙 설정
    #[serde(default)]
    pub triage: TriageConfig,
    /// 보강(에스컬레이션) 설정
    #[serde(default)]
    pub escalation: EscalationConfig,
    /// 알림 전달 설정
    #[serde(default)]
    pub alert: AlertConfig,
}

impl WatchpostConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, WatchpostError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, WatchpostError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                WatchpostError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                WatchpostError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, WatchpostError> {
        toml::from_str(toml_str).map_err(|e| {
            WatchpostError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `WATCHPOST_{SECTION}_{FIELD}`
    /// 예: `WATCHPOST_ESCALATION_MODEL=gpt-4o`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "WATCHPOST_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "WATCHPOST_GENERAL_LOG_FORMAT");

        // Source
        override_string(&mut self.source.command, "WATCHPOST_SOURCE_COMMAND");
        override_csv(&mut self.source.args, "WATCHPOST_SOURCE_ARGS");
        override_u64(&mut self.source.timeout_secs, "WATCHPOST_SOURCE_TIMEOUT_SECS");

        // Triage
        override_csv(&mut self.triage.phrases, "WATCHPOST_TRIAGE_PHRASES");

        // Escalation
        override_bool(&mut self.escalation.enabled, "WATCHPOST_ESCALATION_ENABLED");
        override_string(
            &mut self.escalation.endpoint,
            "WATCHPOST_ESCALATION_ENDPOINT",
        );
        override_string(&mut self.escalation.model, "WATCHPOST_ESCALATION_MODEL");
        override_u32(
            &mut self.escalation.max_tokens,
            "WATCHPOST_ESCALATION_MAX_TOKENS",
        );
        override_string(
            &mut self.escalation.api_key_env,
            "WATCHPOST_ESCALATION_API_KEY_ENV",
        );
        override_usize(
            &mut self.escalation.max_concurrency,
            "WATCHPOST_ESCALATION_MAX_CONCURRENCY",
        );
        override_u64(
            &mut self.escalation.request_timeout_secs,
            "WATCHPOST_ESCALATION_REQUEST_TIMEOUT_SECS",
        );

        // Alert
        override_string(&mut self.alert.sink, "WATCHPOST_ALERT_SINK");
        override_string(&mut self.alert.command, "WATCHPOST_ALERT_COMMAND");
        override_csv(&mut self.alert.args, "WATCHPOST_ALERT_ARGS");
        override_u64(&mut self.alert.timeout_secs, "WATCHPOST_ALERT_TIMEOUT_SECS");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), WatchpostError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        // 소스 명령 검증
        if self.source.command.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "source.command".to_owned(),
                reason: "command must not be empty".to_owned(),
            }
            .into());
        }

        // 분류 문구 검증
        if self.triage.phrases.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "triage.phrases".to_owned(),
                reason: "at least one risk phrase is required".to_owned(),
            }
            .into());
        }
        if self.triage.phrases.iter().any(|p| p.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "triage.phrases".to_owned(),
                reason: "risk phrases must not be blank".to_owned(),
            }
            .into());
        }

        // 보강 설정 검증 (비활성화 시 건너뜀)
        if self.escalation.enabled {
            if self.escalation.endpoint.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "escalation.endpoint".to_owned(),
                    reason: "endpoint must not be empty when escalation is enabled".to_owned(),
                }
                .into());
            }
            if self.escalation.max_tokens == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "escalation.max_tokens".to_owned(),
                    reason: "max_tokens must be at least 1".to_owned(),
                }
                .into());
            }
            if self.escalation.max_concurrency == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "escalation.max_concurrency".to_owned(),
                    reason: "max_concurrency must be at least 1".to_owned(),
                }
                .into());
            }
        }

        // 알림 싱크 검증
        let valid_sinks = ["console", "command"];
        if !valid_sinks.contains(&self.alert.sink.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "alert.sink".to_owned(),
                reason: format!("must be one of: {}", valid_sinks.join(", ")),
            }
            .into());
        }
        if self.alert.sink == "command" && self.alert.command.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "alert.command".to_owned(),
                reason: "command must not be empty when sink is 'command'".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

// Default는 derive 매크로로 자동 생성 (각 필드가 Default를 구현하므로)

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// 로그 소스 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// 감사 로그 조회 명령
    pub command: String,
    /// 명령 인자
    pub args: Vec<String>,
    /// 명령 실행 타임아웃 (초)
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            command: "wevtutil".to_owned(),
            args: vec![
                "qe".to_owned(),
                "Security".to_owned(),
                "/q:*[System[(EventID=4625)]]".to_owned(),
                "/f:Text".to_owned(),
            ],
            timeout_secs: 30,
        }
    }
}

/// 분류 규칙 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    /// 위험 문구 목록 (대소문자 무시 부분 일치)
    pub phrases: Vec<String>,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            phrases: vec!["failed login".to_owned(), "account locked".to_owned()],
        }
    }
}

/// 보강(에스컬레이션) 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EscalationConfig {
    /// 활성화 여부 (비활성화 시 모든 알림이 저하 처리됨)
    pub enabled: bool,
    /// Chat Completions API 엔드포인트
    pub endpoint: String,
    /// 사용할 모델
    pub model: String,
    /// 응답 최대 토큰 수
    pub max_tokens: u32,
    /// API 키를 읽을 환경변수 이름
    pub api_key_env: String,
    /// 동시 보강 요청 수 상한
    pub max_concurrency: usize,
    /// 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://api.openai.com/v1/chat/completions".to_owned(),
            model: "gpt-4".to_owned(),
            max_tokens: 50,
            api_key_env: "WATCHPOST_API_KEY".to_owned(),
            max_concurrency: 4,
            request_timeout_secs: 15,
        }
    }
}

/// 알림 전달 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// 싱크 종류 (console, command)
    pub sink: String,
    /// 외부 알림 명령 (sink = "command"일 때 사용)
    pub command: String,
    /// 알림 명령의 고정 인자 (제목과 본문은 뒤에 덧붙여짐)
    pub args: Vec<String>,
    /// 알림 명령 타임아웃 (초)
    pub timeout_secs: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            sink: "console".to_owned(),
            command: "notify-send".to_owned(),
            args: Vec::new(),
            timeout_secs: 5,
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u32(target: &mut u32, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u32>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u32 from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val.split(',').map(|s| s.trim().to_owned()).collect();
    }
}
