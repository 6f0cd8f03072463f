//! Watchpost 공통 크레이트 — 도메인 타입, 확장 trait, 에러, 설정, 메트릭
//!
//! # 모듈 구성
//!
//! - [`types`]: 파이프라인 전역 도메인 타입 ([`LogEntry`], [`Anomaly`] 등)
//! - [`pipeline`]: 외부 협력자 trait ([`LogSource`], [`Enricher`], [`AlertSink`], [`RiskRule`])
//! - [`error`]: 도메인별 에러 타입과 최상위 [`WatchpostError`]
//! - [`config`]: `watchpost.toml` 파싱 및 환경변수 오버라이드
//! - [`metrics`]: Prometheus 메트릭 이름 상수
//!
//! # 아키텍처
//!
//! ```text
//! LogSource -> AuditLogParser -> Classifier -> EscalationCoordinator -> AlertSink
//!   (bytes)      (LogEntry)      (Anomaly)      (EnrichedAlert)
//! ```
//!
//! 데이터는 엄격히 전방향으로 흐릅니다. 어떤 컴포넌트도 자신의
//! 다운스트림이 생성한 상태를 읽지 않습니다.

pub mod config;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod types;

// --- 주요 타입 re-export ---
// 각 모듈의 핵심 타입을 크레이트 루트에서 바로 사용할 수 있도록 합니다.

// 에러
pub use error::{ConfigError, EnrichmentError, NotifyError, SourceError, WatchpostError};

// 설정
pub use config::WatchpostConfig;

// 파이프라인 trait
pub use pipeline::{AlertSink, Enricher, LogSource, RiskRule};

// 도메인 타입
pub use types::{Anomaly, EnrichedAlert, LogEntry, RunOutcome};
