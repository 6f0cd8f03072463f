//! 위험 규칙 벤치마크
//!
//! 문구 매칭 분류기의 엔트리 처리량을 측정합니다.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use watchpost_core::types::LogEntry;
use watchpost_triage::Classifier;

fn entries(count: usize, risky_every: usize) -> Vec<LogEntry> {
    (0..count)
        .map(|i| LogEntry {
            id: format!("{}", 4600 + i),
            timestamp: "2024-01-15T12:00:00Z".to_owned(),
            event_type: "Logon".to_owned(),
            details: if i % risky_every == 0 {
                format!("Failed login for user u{i} from 10.0.0.{}", i % 255)
            } else {
                format!("Successful logon for user u{i}")
            },
        })
        .collect()
}

fn bench_classify(c: &mut Criterion) {
    let classifier = Classifier::default();
    let mostly_clean = entries(1000, 100);
    let mostly_risky = entries(1000, 2);

    let mut group = c.benchmark_group("classifier");
    group.throughput(Throughput::Elements(1000));

    group.bench_function("mostly_clean_1000", |b| {
        b.iter(|| classifier.classify(black_box(&mostly_clean)))
    });

    group.bench_function("mostly_risky_1000", |b| {
        b.iter(|| classifier.classify(black_box(&mostly_risky)))
    });

    group.finish();
}

fn bench_many_rules(c: &mut Criterion) {
    // 규칙 수가 늘어날 때의 비매칭 비용
    let phrases: Vec<String> = (0..32).map(|i| format!("phrase number {i}")).collect();
    let classifier = Classifier::with_phrases(phrases);
    let clean = entries(1000, usize::MAX);

    let mut group = c.benchmark_group("classifier_many_rules");
    group.throughput(Throughput::Elements(1000));
    group.bench_function("rules_32_no_match", |b| {
        b.iter(|| classifier.classify(black_box(&clean)))
    });
    group.finish();
}

criterion_group!(benches, bench_classify, bench_many_rules);
criterion_main!(benches);
