//! 감사 로그 파서 벤치마크
//!
//! 단일 레코드와 대량 스냅샷 입력의 파싱 처리량을 측정합니다.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use watchpost_triage::AuditLogParser;

/// 완전한 단일 레코드
const SINGLE_RECORD: &str = "\
Event ID: 4625
Time Created: 2024-01-15T12:00:05.000Z
Task: Logon
Message: An account failed to log on from 10.0.0.8
";

/// 인식되지 않는 줄이 섞인 레코드
const NOISY_RECORD: &str = "\
Log Name: Security
Source: Microsoft-Windows-Security-Auditing
Event ID: 4625
Level: Information
Time Created: 2024-01-15T12:00:05.000Z
Keywords: Audit Failure
Task: Logon
Computer: WORKSTATION-07
Message: An account failed to log on from 10.0.0.8
";

fn snapshot(records: usize) -> String {
    let mut raw = String::with_capacity(records * NOISY_RECORD.len());
    for i in 0..records {
        raw.push_str(&NOISY_RECORD.replace("4625", &format!("{}", 4600 + (i % 50))));
    }
    raw
}

fn bench_single_record(c: &mut Criterion) {
    let parser = AuditLogParser::new();

    let mut group = c.benchmark_group("audit_parser");

    group.throughput(Throughput::Elements(1));
    group.bench_function("single_record", |b| {
        b.iter(|| parser.parse(black_box(SINGLE_RECORD)))
    });

    group.bench_function("noisy_record", |b| {
        b.iter(|| parser.parse(black_box(NOISY_RECORD)))
    });

    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let parser = AuditLogParser::new();
    let small = snapshot(100);
    let large = snapshot(10_000);

    let mut group = c.benchmark_group("audit_parser_snapshot");

    group.throughput(Throughput::Elements(100));
    group.bench_function("records_100", |b| {
        b.iter(|| parser.parse(black_box(&small)))
    });

    group.throughput(Throughput::Elements(10_000));
    group.bench_function("records_10000", |b| {
        b.iter(|| parser.parse(black_box(&large)))
    });

    group.finish();
}

criterion_group!(benches, bench_single_record, bench_snapshot);
criterion_main!(benches);
