//! Performance benchmarks for rating inference and matchup prediction

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use scorecast::config::Hyperparameters;
use scorecast::rating::ranking::ranked_records;
use scorecast::rating::{predict, RatingEngine};
use scorecast::schedule::{ScheduleBuilder, ScheduleGraph};

/// Deterministic single round robin between `teams` teams
fn round_robin(teams: usize) -> ScheduleGraph {
    let mut builder = ScheduleBuilder::new();
    for i in 0..teams {
        for j in (i + 1)..teams {
            let home = 60 + ((i * 7) % 23) as u32 + ((j * 11) % 17) as u32 / 2;
            let away = 60 + ((j * 7) % 23) as u32 + ((i * 11) % 17) as u32 / 2;
            builder.add_game(&format!("Team {}", i), &format!("Team {}", j), home, away);
        }
    }
    builder.build()
}

fn bench_inference(c: &mut Criterion) {
    let engine = RatingEngine::new(Hyperparameters::default()).unwrap();
    let mut group = c.benchmark_group("infer_round_robin");
    group.sample_size(20);

    for teams in [10, 50, 200] {
        let graph = round_robin(teams);
        group.bench_with_input(BenchmarkId::from_parameter(teams), &graph, |b, graph| {
            b.iter(|| {
                let mut graph = graph.clone();
                engine.infer(black_box(&mut graph)).unwrap();
                graph
            })
        });
    }
    group.finish();
}

fn bench_ranking(c: &mut Criterion) {
    let engine = RatingEngine::new(Hyperparameters::default()).unwrap();
    let mut graph = round_robin(200);
    engine.infer(&mut graph).unwrap();

    c.bench_function("ranked_records_200_teams", |b| {
        b.iter(|| ranked_records(black_box(graph.teams())).unwrap())
    });
}

fn bench_prediction(c: &mut Criterion) {
    let engine = RatingEngine::new(Hyperparameters::default()).unwrap();
    let mut graph = round_robin(10);
    engine.infer(&mut graph).unwrap();
    let records = ranked_records(graph.teams()).unwrap();

    c.bench_function("matchup_prediction", |b| {
        b.iter(|| predict(black_box(&records[0]), black_box(&records[9])))
    });
}

criterion_group!(benches, bench_inference, bench_ranking, bench_prediction);
criterion_main!(benches);
