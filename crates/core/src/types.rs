//! 도메인 타입 — 시스템 전역에서 사용되는 공통 타입
//!
//! 파이프라인의 각 단계가 주고받는 데이터 구조를 정의합니다.
//! 모든 타입은 생성 후 불변으로 취급되며, 한 번의 실행(run) 안에서만 살아있습니다.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 감사 로그 엔트리
///
/// 원시 감사 로그 텍스트의 레이블 블록 하나에서 추출한 구조화 레코드입니다.
/// 파서가 생성한 엔트리는 `id`가 비어있지 않음이 보장됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// 이벤트 식별자 (파서가 방출한 엔트리는 항상 비어있지 않음)
    pub id: String,
    /// 원본 로그의 생성 시각 문자열 (소스 형식 그대로 보존)
    pub timestamp: String,
    /// 이벤트 분류 (소스의 Task 필드)
    pub event_type: String,
    /// 메시지 본문
    pub details: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}: {}",
            self.id, self.timestamp, self.event_type, self.details,
        )
    }
}

/// 이상 징후
///
/// 위험 규칙에 매칭된 로그 엔트리를 나타냅니다.
/// `log_id`는 같은 실행에서 파싱된 엔트리를 참조합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anomaly {
    /// 원본 로그 엔트리의 ID
    pub log_id: String,
    /// 사람이 읽을 수 있는 이상 징후 설명
    pub description: String,
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "anomaly in log {}: {}", self.log_id, self.description)
    }
}

/// 보강된 알림
///
/// 이상 징후에 요약 텍스트를 덧붙인, 전달 준비가 끝난 알림입니다.
/// 보강 호출이 실패한 경우 `summary`는 원본 설명으로 대체되고
/// `enrichment_failed`가 표시됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedAlert {
    /// 원본 이상 징후
    pub anomaly: Anomaly,
    /// 요약 텍스트 (보강 실패 시 원본 설명)
    pub summary: String,
    /// 보강 호출 실패 여부
    pub enrichment_failed: bool,
}

impl EnrichedAlert {
    /// 보강 성공 알림을 생성합니다.
    pub fn enriched(anomaly: Anomaly, summary: impl Into<String>) -> Self {
        Self {
            anomaly,
            summary: summary.into(),
            enrichment_failed: false,
        }
    }

    /// 보강 실패 시의 대체 알림을 생성합니다.
    ///
    /// 요약 자리에 원본 이상 징후 설명을 그대로 사용합니다.
    pub fn degraded(anomaly: Anomaly) -> Self {
        let summary = anomaly.description.clone();
        Self {
            anomaly,
            summary,
            enrichment_failed: true,
        }
    }
}

impl fmt::Display for EnrichedAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.enrichment_failed {
            write!(f, "[log {}] (unenriched) {}", self.anomaly.log_id, self.summary)
        } else {
            write!(f, "[log {}] {}", self.anomaly.log_id, self.summary)
        }
    }
}

/// 파이프라인 실행 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    /// 이상 징후 없음 — "clean" 알림 1건 전송 후 정상 종료
    Clean,
    /// 탐지된 이상 징후 수만큼 알림 전송 완료
    AnomaliesHandled(usize),
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clean => write!(f, "clean"),
            Self::AnomaliesHandled(count) => write!(f, "{count} anomalies handled"),
        }
    }
}
