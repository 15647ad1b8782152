use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use sweeper_core::*;

fn play_game(config: GameConfig, seed: u64) -> GameReport {
    let Ok(mut board) = Board::new(config, seed) else {
        return GameReport::default();
    };
    Autoplay::new(seed).play(&mut board)
}

fn bench_solver_games(c: &mut Criterion) {
    let mut group = c.benchmark_group("autoplay");
    group.sample_size(20);

    for difficulty in Difficulty::ALL {
        group.bench_with_input(
            BenchmarkId::new("full_game", format!("{difficulty:?}")),
            &difficulty.config(),
            |b, &config| {
                let mut seed = 0;
                b.iter(|| {
                    seed += 1;
                    black_box(play_game(config, seed))
                })
            },
        );
    }

    group.finish();
}

fn bench_propose(c: &mut Criterion) {
    let mut board = Board::new(Difficulty::Hard.config(), 7).unwrap();
    board.reveal((8, 15));

    c.bench_function("propose/hard_after_opening", |b| {
        let mut solver = Solver::new(7);
        b.iter(|| black_box(solver.propose_move(black_box(&board))))
    });
}

criterion_group!(benches, bench_solver_games, bench_propose);
criterion_main!(benches);
