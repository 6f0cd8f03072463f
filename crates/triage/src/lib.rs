//! Watchpost 트리아지 파이프라인 -- 감사 로그 수집부터 알림 전달까지
//!
//! 한 번의 실행(run)은 다음 단계를 순서대로 거칩니다:
//!
//! ```text
//! CommandLogSource -> AuditLogParser -> Classifier -> EscalationCoordinator -> AlertSink
//!     (bytes)           (LogEntry)       (Anomaly)       (EnrichedAlert)
//! ```
//!
//! # 에러 정책
//! - 소스 실패: 치명적. 실행 전체가 에러로 종료됩니다.
//! - 보강 실패: 해당 이상 징후만 저하 처리되고 원본 설명으로 알림이 나갑니다.
//! - 알림 실패: 로깅 후 다음 알림으로 계속 진행합니다.
//!
//! # 사용 예시
//! ```ignore
//! use watchpost_triage::TriagePipelineBuilder;
//!
//! let pipeline = TriagePipelineBuilder::from_config(&config)?.build()?;
//! let outcome = pipeline.run().await?;
//! ```

pub mod enrich;
pub mod error;
pub mod escalate;
pub mod notify;
pub mod parser;
pub mod pipeline;
pub mod rule;
pub mod source;

pub use enrich::{DisabledEnricher, HttpEnricher};
pub use error::TriageError;
pub use escalate::EscalationCoordinator;
pub use notify::{CommandAlertSink, ConsoleAlertSink};
pub use parser::AuditLogParser;
pub use pipeline::{TriagePipeline, TriagePipelineBuilder};
pub use rule::{Classifier, PhraseRule};
pub use source::CommandLogSource;
