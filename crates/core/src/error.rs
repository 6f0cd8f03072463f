//! 에러 타입 — 도메인별 에러 정의
//!
//! 에러 분류는 전파 정책을 결정합니다: [`SourceError`]는 치명적(실행 전체 중단),
//! [`EnrichmentError`]와 [`NotifyError`]는 복구 가능(해당 항목만 건너뜀)입니다.

/// Watchpost 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum WatchpostError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 로그 소스 에러 — 치명적, 실행 전체를 중단합니다
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// 보강 호출 에러 — 복구 가능, 해당 이상 징후만 저하 처리됩니다
    #[error("enrichment error: {0}")]
    Enrichment(#[from] EnrichmentError),

    /// 알림 전달 에러 — 복구 가능, 로깅 후 계속 진행합니다
    #[error("notify error: {0}")]
    Notify(#[from] NotifyError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl WatchpostError {
    /// 이 에러가 실행 전체를 중단시켜야 하는지 여부를 반환합니다.
    ///
    /// 업스트림 데이터 부재(소스 실패)는 실행 전체를 오염시키지만,
    /// 다운스트림 보강/알림 실패는 개별 항목만 저하시킵니다.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Source(_) | Self::Config(_) | Self::Io(_))
    }
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 로그 소스 에러
///
/// 감사 로그 명령 실행이 실패하면 분류할 대상 자체가 없으므로
/// 모든 변형이 치명적으로 취급됩니다.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// 소스 명령을 실행할 수 없음
    #[error("failed to spawn '{command}': {reason}")]
    SpawnFailed { command: String, reason: String },

    /// 소스 명령이 비정상 종료됨
    #[error("'{command}' exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    /// 소스 명령이 제한 시간 안에 끝나지 않음
    #[error("'{command}' timed out after {secs}s")]
    TimedOut { command: String, secs: u64 },

    /// 소스 출력이 UTF-8로 디코딩되지 않음
    #[error("source output is not valid utf-8: {reason}")]
    NonUtf8Output { reason: String },

    /// 소스 조회가 취소됨 (실행 타임아웃 또는 종료 요청)
    #[error("source fetch cancelled")]
    Cancelled,
}

/// 보강 호출 에러
#[derive(Debug, thiserror::Error)]
pub enum EnrichmentError {
    /// HTTP 요청 실패 (연결, 타임아웃, 비정상 상태 코드)
    #[error("enrichment request failed: {0}")]
    Request(String),

    /// 응답 본문을 해석할 수 없음
    #[error("malformed enrichment response: {0}")]
    InvalidResponse(String),

    /// 응답의 choice 목록이 비어있음
    #[error("enrichment response contained no completion")]
    EmptyCompletion,

    /// API 키 환경변수가 설정되지 않음
    #[error("api key environment variable '{env}' is not set")]
    MissingApiKey { env: String },

    /// 설정에서 보강이 비활성화됨
    #[error("enrichment is disabled")]
    Disabled,
}

/// 알림 전달 에러
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// 알림 전달 실패 (best-effort, 로깅 후 계속 진행)
    #[error("alert delivery via '{sink}' failed: {reason}")]
    DeliveryFailed { sink: String, reason: String },
}
