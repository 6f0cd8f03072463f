//! 감사 로그 파서 -- 레이블 기반 텍스트 덤프를 구조화 엔트리로 변환
//!
//! Windows `wevtutil /f:Text` 형식의 감사 로그 덤프는 레코드마다
//! `Event ID:`, `Time Created:`, `Task:`, `Message:` 레이블 줄을 갖습니다.
//! [`AuditLogParser`]는 줄 단위 상태 기계로 이 블록을 순회합니다:
//!
//! - `Event ID:` 줄이 새 레코드를 시작합니다 (미완성 레코드는 폐기).
//! - `Time Created:`, `Task:` 줄은 진행 중인 레코드의 필드를 채웁니다.
//! - `Message:` 줄이 레코드를 완성합니다. ID가 없으면 레코드는 억제됩니다.
//!
//! 인식되지 않는 줄은 무시합니다. 파싱 자체는 실패하지 않으며,
//! 불완전한 레코드 수는 [`ParseReport::suppressed`]로 보고됩니다.

use metrics::counter;
use tracing::warn;

use watchpost_core::metrics::{PARSER_ENTRIES_TOTAL, PARSER_SUPPRESSED_TOTAL};
use watchpost_core::types::LogEntry;

/// 파싱 결과
///
/// 완성된 엔트리와 함께 억제된(불완전) 레코드 수를 담습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseReport {
    /// 입력 순서대로 완성된 로그 엔트리
    pub entries: Vec<LogEntry>,
    /// ID 누락 또는 미완성으로 폐기된 레코드 수
    pub suppressed: usize,
}

/// 진행 중인 레코드
#[derive(Debug, Default)]
struct Draft {
    id: String,
    timestamp: String,
    event_type: String,
}

impl Draft {
    fn is_empty(&self) -> bool {
        self.id.is_empty() && self.timestamp.is_empty() && self.event_type.is_empty()
    }
}

/// 감사 로그 파서
#[derive(Debug, Default)]
pub struct AuditLogParser;

impl AuditLogParser {
    /// 새 파서를 생성합니다.
    pub fn new() -> Self {
        Self
    }

    /// 원시 텍스트 덤프를 파싱합니다.
    ///
    /// 엔트리는 입력에 나타난 순서 그대로 반환됩니다.
    pub fn parse(&self, raw: &str) -> ParseReport {
        let mut entries = Vec::new();
        let mut suppressed = 0usize;
        let mut current = Draft::default();

        for line in raw.lines() {
            if let Some(value) = value_after(line, "Event ID:") {
                if !current.is_empty() {
                    // 이전 레코드가 Message 없이 끝남
                    warn!(log_id = current.id.as_str(), "discarding unfinished record");
                    suppressed += 1;
                }
                current = Draft {
                    id: value.to_owned(),
                    ..Draft::default()
                };
            } else if let Some(value) = value_after(line, "Time Created:") {
                current.timestamp = value.to_owned();
            } else if let Some(value) = value_after(line, "Task:") {
                current.event_type = value.to_owned();
            } else if let Some(value) = value_after(line, "Message:") {
                let draft = std::mem::take(&mut current);
                if draft.id.is_empty() {
                    warn!("suppressing record without an event id");
                    suppressed += 1;
                } else {
                    entries.push(LogEntry {
                        id: draft.id,
                        timestamp: draft.timestamp,
                        event_type: draft.event_type,
                        details: value.to_owned(),
                    });
                }
            }
            // 인식되지 않는 줄은 무시
        }

        if !current.is_empty() {
            warn!(log_id = current.id.as_str(), "discarding trailing unfinished record");
            suppressed += 1;
        }

        counter!(PARSER_ENTRIES_TOTAL).increment(entries.len() as u64);
        counter!(PARSER_SUPPRESSED_TOTAL).increment(suppressed as u64);

        ParseReport {
            entries,
            suppressed,
        }
    }
}

/// 줄에서 레이블 뒤의 값을 추출합니다.
///
/// 레이블은 줄의 시작(앞쪽 공백 무시)에서만 인식됩니다. 줄 중간에
/// 나타나는 동일한 텍스트는 레이블이 아닙니다. 레이블 자체의 콜론까지만
/// 구분자로 취급하므로 타임스탬프처럼 콜론을 포함한 값도 온전히 보존됩니다.
fn value_after<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    line.trim_start().strip_prefix(label).map(str::trim)
}
