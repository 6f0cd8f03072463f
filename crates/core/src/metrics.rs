//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`,
//! `metrics::histogram!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `watchpost_`
//! - 단계명: `source_`, `parser_`, `triage_`, `escalation_`, `alert_`
//! - 접미어: `_total` (counter), `_seconds` (histogram/latency), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(watchpost_core::metrics::TRIAGE_ANOMALIES_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 규칙 이름 레이블 키
pub const LABEL_RULE: &str = "rule";

/// 싱크 이름 레이블 키 (console, command)
pub const LABEL_SINK: &str = "sink";

/// 결과 레이블 키 (success, failure)
pub const LABEL_RESULT: &str = "result";

// ─── Source 메트릭 ──────────────────────────────────────────────────

/// Source: 소스 조회 실행 수 (counter, label: result)
pub const SOURCE_FETCHES_TOTAL: &str = "watchpost_source_fetches_total";

/// Source: 소스 조회 소요 시간 (histogram, 초)
pub const SOURCE_FETCH_DURATION_SECONDS: &str = "watchpost_source_fetch_duration_seconds";

/// Source: 조회된 원시 바이트 수 (counter)
pub const SOURCE_BYTES_TOTAL: &str = "watchpost_source_bytes_total";

// ─── Parser 메트릭 ──────────────────────────────────────────────────

/// Parser: 파싱된 로그 엔트리 수 (counter)
pub const PARSER_ENTRIES_TOTAL: &str = "watchpost_parser_entries_total";

/// Parser: ID 없이 버려진 불완전 레코드 수 (counter)
pub const PARSER_SUPPRESSED_TOTAL: &str = "watchpost_parser_suppressed_total";

// ─── Triage 메트릭 ──────────────────────────────────────────────────

/// Triage: 평가된 로그 엔트리 수 (counter)
pub const TRIAGE_ENTRIES_EVALUATED_TOTAL: &str = "watchpost_triage_entries_evaluated_total";

/// Triage: 탐지된 이상 징후 수 (counter, label: rule)
pub const TRIAGE_ANOMALIES_TOTAL: &str = "watchpost_triage_anomalies_total";

// ─── Escalation 메트릭 ──────────────────────────────────────────────

/// Escalation: 보강 요청 수 (counter, label: result)
pub const ESCALATION_REQUESTS_TOTAL: &str = "watchpost_escalation_requests_total";

/// Escalation: 저하 처리된(보강 실패) 알림 수 (counter)
pub const ESCALATION_DEGRADED_TOTAL: &str = "watchpost_escalation_degraded_total";

/// Escalation: 보강 요청 소요 시간 (histogram, 초)
pub const ESCALATION_REQUEST_DURATION_SECONDS: &str =
    "watchpost_escalation_request_duration_seconds";

// ─── Alert 메트릭 ───────────────────────────────────────────────────

/// Alert: 전달된 알림 수 (counter, labels: sink, result)
pub const ALERT_DELIVERIES_TOTAL: &str = "watchpost_alert_deliveries_total";

// ─── Run 메트릭 ─────────────────────────────────────────────────────

/// Run: 완료된 파이프라인 실행 수 (counter, label: result)
pub const RUNS_TOTAL: &str = "watchpost_runs_total";

/// Run: 실행 전체 소요 시간 (histogram, 초)
pub const RUN_DURATION_SECONDS: &str = "watchpost_run_duration_seconds";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// `metrics::describe_counter!()`, `describe_histogram!()`을 호출하여
/// Prometheus HELP 텍스트를 설정합니다.
///
/// 이 함수는 전역 레코더 설치 후 한 번만 호출해야 합니다.
/// 일반적으로 CLI의 시작 시점에서 호출합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_histogram};

    // Source
    describe_counter!(
        SOURCE_FETCHES_TOTAL,
        "Total number of audit log source fetches, by result"
    );
    describe_histogram!(
        SOURCE_FETCH_DURATION_SECONDS,
        "Audit log source fetch latency in seconds"
    );
    describe_counter!(
        SOURCE_BYTES_TOTAL,
        "Total raw bytes fetched from the audit log source"
    );

    // Parser
    describe_counter!(
        PARSER_ENTRIES_TOTAL,
        "Total number of structured log entries parsed"
    );
    describe_counter!(
        PARSER_SUPPRESSED_TOTAL,
        "Total number of incomplete records discarded by the parser"
    );

    // Triage
    describe_counter!(
        TRIAGE_ENTRIES_EVALUATED_TOTAL,
        "Total number of log entries evaluated against risk rules"
    );
    describe_counter!(
        TRIAGE_ANOMALIES_TOTAL,
        "Total number of anomalies detected, by rule"
    );

    // Escalation
    describe_counter!(
        ESCALATION_REQUESTS_TOTAL,
        "Total number of enrichment requests, by result"
    );
    describe_counter!(
        ESCALATION_DEGRADED_TOTAL,
        "Total number of alerts degraded to raw descriptions after enrichment failure"
    );
    describe_histogram!(
        ESCALATION_REQUEST_DURATION_SECONDS,
        "Enrichment request latency in seconds"
    );

    // Alert
    describe_counter!(
        ALERT_DELIVERIES_TOTAL,
        "Total number of alert delivery attempts, by sink and result"
    );

    // Run
    describe_counter!(RUNS_TOTAL, "Total number of completed triage runs, by result");
    describe_histogram!(
        RUN_DURATION_SECONDS,
        "End-to-end triage run duration in seconds"
    );
}
