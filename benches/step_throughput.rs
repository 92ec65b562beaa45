//! Benchmarks for environment stepping
//!
//! Measures single-environment step throughput for each action on generated tables of
//! increasing size, and the parallel batch runner against a sequential loop.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use lgo::env::batch::{run_batch, run_episode};
use lgo::env::policy::{ConstantPolicy, Policy, RandomPolicy};
use lgo::env::{EnvConfig, NetlistEnv, ResetMode};
use lgo::netlist::{Instance, NetlistState};
use lgo::Action;

/// Table sizes used by every benchmark
const TABLE_SIZES: &[usize] = &[100, 1_000, 10_000];

const LIBCELLS: &[&str] = &["INV_X1", "BUF_X2", "NAND2_X1", "NOR2_X2", "AOI21_X1", "DFF_X1"];

/// Build a table with `rows` instances spread over a few libcells, nets and cells
fn generate_table(rows: usize) -> NetlistState {
    let instances = (0..rows)
        .map(|i| {
            Instance::new(
                LIBCELLS[i % LIBCELLS.len()],
                1.0 + (i % 7) as f64 * 0.25,
                &format!("n{}", i % (rows / 4 + 1)),
                &format!("u{}", i / 3),
                (i % 97) as f64,
                (i % 89) as f64,
            )
        })
        .collect();
    NetlistState::new(instances).expect("Generated table is never empty")
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("step");

    for &rows in TABLE_SIZES {
        let table = generate_table(rows);
        group.throughput(Throughput::Elements(1));

        for action in Action::ALL {
            group.bench_with_input(
                BenchmarkId::new(action.to_string(), rows),
                &table,
                |b, table| {
                    let config = EnvConfig {
                        reset_mode: ResetMode::Restore,
                        ..EnvConfig::default()
                    };
                    let mut env = NetlistEnv::new(table, config);
                    b.iter(|| black_box(env.step_action(black_box(action))));
                },
            );
        }
    }

    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("episodes");
    group.sample_size(10);

    let episodes = 8;
    let table = generate_table(1_000);
    let config = EnvConfig::default();
    group.throughput(Throughput::Elements(episodes as u64));

    group.bench_function("parallel", |b| {
        b.iter(|| {
            run_batch(&table, &config, episodes, |seed| -> Box<dyn Policy> {
                Box::new(RandomPolicy::new(seed))
            })
        })
    });

    group.bench_function("sequential", |b| {
        b.iter(|| {
            (0..episodes)
                .map(|i| {
                    let mut env = NetlistEnv::new(
                        &table,
                        EnvConfig {
                            seed: i as u64,
                            ..config.clone()
                        },
                    );
                    run_episode(&mut env, &mut ConstantPolicy(Action::ResizeGate))
                })
                .collect::<Vec<_>>()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_step, bench_batch);
criterion_main!(benches);
