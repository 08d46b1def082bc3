//! AI benchmarks for hex_core.
//!
//! Run with: `cargo bench -p hex_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hex_core::config::{AiConfig, RulesConfig};
use hex_core::hex::HexCoord;
use hex_core::influence::InfluenceMap;
use hex_core::map_generation::{generate, MapConfig};
use hex_core::pathfinding::Pathfinder;
use hex_core::session::Session;
use hex_core::unit::{PlayerId, UnitStats};

fn pathfinding_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("pathfinding");
    for size in [10u32, 20, 40] {
        let world = generate(MapConfig::new(size, size).with_seed(11), RulesConfig::default());
        let start = world.base_of(PlayerId::ONE).unwrap_or(HexCoord::from_offset(0, 0));
        let goal = world
            .base_of(PlayerId::TWO)
            .unwrap_or(HexCoord::from_offset(size as i32 - 1, size as i32 - 1));
        let profile = UnitStats::infantry().movement_profile();
        let threats = world.threats_against(PlayerId::ONE);

        group.bench_with_input(BenchmarkId::new("a_star", size), &size, |b, _| {
            let finder = Pathfinder::new(world.grid());
            b.iter(|| black_box(finder.find_path(start, goal, &profile)));
        });
        group.bench_with_input(BenchmarkId::new("dijkstra", size), &size, |b, _| {
            let finder = Pathfinder::new(world.grid());
            b.iter(|| black_box(finder.find_cheapest_path(start, goal, PlayerId::ONE, &profile)));
        });
        group.bench_with_input(BenchmarkId::new("tactical", size), &size, |b, _| {
            let finder = Pathfinder::new(world.grid());
            b.iter(|| black_box(finder.find_tactical_path(start, goal, &profile, &threats)));
        });
    }
    group.finish();
}

fn influence_benchmark(c: &mut Criterion) {
    let world = generate(MapConfig::new(20, 20).with_seed(5), RulesConfig::default());
    c.bench_function("influence_update_20x20", |b| {
        let mut map = InfluenceMap::default();
        b.iter(|| {
            map.update(&world, PlayerId::ONE);
            black_box(map.net(HexCoord::from_offset(10, 10)))
        });
    });
}

fn session_benchmark(c: &mut Criterion) {
    c.bench_function("session_10_turns", |b| {
        b.iter(|| {
            let world = generate(MapConfig::default().with_seed(42), RulesConfig::default());
            let mut session = Session::new(world, AiConfig::default());
            black_box(session.run_to_completion(10))
        });
    });
}

criterion_group!(benches, pathfinding_benchmark, influence_benchmark, session_benchmark);
criterion_main!(benches);
