//! 트리아지 파이프라인 에러 타입
//!
//! [`TriageError`]는 파이프라인 내부에서 발생하는 모든 에러를 표현합니다.
//! `From<TriageError> for WatchpostError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use watchpost_core::error::{
    ConfigError, EnrichmentError, NotifyError, SourceError, WatchpostError,
};

/// 트리아지 파이프라인 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    /// 파이프라인 구성 실패 (필수 협력자 누락, 잘못된 설정값)
    #[error("pipeline build error: {reason}")]
    Build {
        /// 실패 사유
        reason: String,
    },

    /// 로그 소스 에러 -- 치명적
    #[error(transparent)]
    Source(#[from] SourceError),

    /// 보강 에러 -- 개별 항목 저하
    #[error(transparent)]
    Enrichment(#[from] EnrichmentError),

    /// 알림 전달 에러 -- best-effort
    #[error(transparent)]
    Notify(#[from] NotifyError),
}

impl From<TriageError> for WatchpostError {
    fn from(err: TriageError) -> Self {
        match err {
            TriageError::Build { reason } => WatchpostError::Config(ConfigError::InvalidValue {
                field: "pipeline".to_owned(),
                reason,
            }),
            TriageError::Source(e) => WatchpostError::Source(e),
            TriageError::Enrichment(e) => WatchpostError::Enrichment(e),
            TriageError::Notify(e) => WatchpostError::Notify(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_error_display() {
        let err = TriageError::Build {
            reason: "log source is required".to_owned(),
        };
        assert!(err.to_string().contains("log source is required"));
    }

    #[test]
    fn source_error_converts_to_fatal_top_level() {
        let err = TriageError::Source(SourceError::Cancelled);
        let top: WatchpostError = err.into();
        assert!(top.is_fatal());
    }

    #[test]
    fn enrichment_error_converts_to_recoverable_top_level() {
        let err = TriageError::Enrichment(EnrichmentError::EmptyCompletion);
        let top: WatchpostError = err.into();
        assert!(!top.is_fatal());
    }

    #[test]
    fn build_error_converts_to_config_error() {
        let err = TriageError::Build {
            reason: "missing sink".to_owned(),
        };
        let top: WatchpostError = err.into();
        assert!(matches!(top, WatchpostError::Config(_)));
    }
}
