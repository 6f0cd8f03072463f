//! 파이프라인 trait — 외부 협력자 확장 포인트 정의
//!
//! 파이프라인이 프로세스 경계를 넘는 지점(로그 수집, LLM 호출, 알림 전달)은
//! 모두 trait 뒤에 숨겨져 있어 테스트에서 가짜 구현으로 대체할 수 있습니다.
//! 비동기 trait은 `Arc<dyn ...>` 형태로 태스크에 공유되므로
//! [`async_trait`]을 사용합니다.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::{EnrichmentError, NotifyError, SourceError};
use crate::types::{Anomaly, EnrichedAlert, LogEntry};

/// 감사 로그 소스 trait
///
/// 새로운 로그 소스(다른 명령, 파일, 원격 수집기)를 지원하려면
/// 이 trait을 구현합니다. 한 번의 호출은 전체 스냅샷 바이트를
/// 반환하거나 실패합니다. 부분 결과는 없습니다.
#[async_trait]
pub trait LogSource: Send + Sync {
    /// 소스 이름
    fn name(&self) -> &str;

    /// 감사 로그 스냅샷을 원시 바이트로 조회
    async fn fetch(&self) -> Result<Bytes, SourceError>;
}

/// 위험 규칙 trait
///
/// 로그 엔트리 하나를 검사하여 이상 징후 여부를 판정합니다.
/// 규칙 평가는 순수 계산이므로 동기 trait입니다.
pub trait RiskRule: Send + Sync {
    /// 규칙 이름
    fn name(&self) -> &str;

    /// 엔트리를 평가하여 매칭 시 이상 징후를 생성
    fn evaluate(&self, entry: &LogEntry) -> Option<Anomaly>;
}

/// 이상 징후 보강 trait
///
/// 이상 징후 설명을 외부 서비스(LLM 등)에 보내 운영자용 요약을 받습니다.
/// 실패는 해당 징후만 저하시키며 실행 전체에 전파되지 않습니다.
#[async_trait]
pub trait Enricher: Send + Sync {
    /// 보강기 이름
    fn name(&self) -> &str;

    /// 이상 징후에 대한 요약 텍스트를 생성
    async fn enrich(&self, anomaly: &Anomaly) -> Result<String, EnrichmentError>;
}

/// 알림 전달 trait
///
/// 전달은 best-effort입니다. 구현체는 전달 성공 확인을 보장할 필요가 없고,
/// 호출자는 실패를 로깅한 뒤 계속 진행합니다.
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// 싱크 이름
    fn name(&self) -> &str;

    /// 이상 징후 알림 전달
    async fn notify(&self, alert: &EnrichedAlert) -> Result<(), NotifyError>;

    /// 이상 징후가 없었음을 알리는 "클린" 알림 전달
    async fn notify_clean(&self) -> Result<(), NotifyError>;
}
