//! 윈도우 집계 벤치마크
//!
//! 저장소 크기에 따른 통계 스냅샷 계산과 hit rate 평가 비용을 측정합니다.

use chrono::{TimeZone, Utc};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use tailstat_core::config::RuleLimits;
use tailstat_core::event::AlertKind;
use tailstat_core::types::{ContentSize, LogRecord};
use tailstat_log_pipeline::{AlertEngine, RecordStore, StatsAggregator};

const SECTIONS: [&str; 8] = [
    "/api", "/report", "/static", "/user", "/admin", "/login", "/search", "/health",
];
const START: i64 = 1_700_000_000;

/// 1초에 `per_sec`건씩 `secs`초 동안의 레코드로 채운 저장소
fn populated_store(secs: i64, per_sec: i64) -> RecordStore {
    let mut store = RecordStore::new(u64::MAX / 2);
    for s in 0..secs {
        for i in 0..per_sec {
            let Some(time) = Utc.timestamp_opt(START + s, 0).single() else {
                continue;
            };
            let n = (s * per_sec + i) as usize;
            store.append(LogRecord {
                time: time.fixed_offset(),
                host: "10.0.0.1".to_owned(),
                user: "-".to_owned(),
                method: if n % 5 == 0 { "POST" } else { "GET" }.to_owned(),
                section: SECTIONS[n % SECTIONS.len()].to_owned(),
                subsection: None,
                protocol: Some("HTTP/1.1".to_owned()),
                status: [200, 200, 301, 404, 500][n % 5],
                size: ContentSize::Bytes(512),
            });
        }
    }
    store
}

fn bench_stats_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("stats_snapshot");

    for per_sec in [10, 100, 1000] {
        let store = populated_store(120, per_sec);
        let now = (START + 120) as f64;
        let aggregator = StatsAggregator::new(10);

        group.throughput(Throughput::Elements((10 * per_sec) as u64));
        group.bench_with_input(BenchmarkId::new("per_sec", per_sec), &store, |b, store| {
            b.iter(|| aggregator.compute(black_box(store), black_box(now)))
        });
    }

    group.finish();
}

fn bench_alert_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("alert_evaluation");

    for per_sec in [10, 100, 1000] {
        let store = populated_store(120, per_sec);
        let now = (START + 120) as f64;

        group.bench_with_input(BenchmarkId::new("per_sec", per_sec), &store, |b, store| {
            let mut engine = AlertEngine::new([(
                AlertKind::HighTraffic,
                RuleLimits {
                    limit_period: 120,
                    limit_value: 10.0,
                },
            )]);
            b.iter(|| engine.evaluate(black_box(store), black_box(now)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_stats_snapshot, bench_alert_evaluation);
criterion_main!(benches);
