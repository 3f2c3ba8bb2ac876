use ai_2048_core::engine::{Board, Move};
use ai_2048_core::expectimax::evaluate;
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use rand::{rngs::StdRng, SeedableRng};
use std::hint::black_box;

fn corpus() -> Vec<Board> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut boards = Vec::new();
    // Empty and two-tile starts
    boards.push(Board::EMPTY);
    let mut b = Board::new_game(&mut rng);
    boards.push(b);
    // Derive a variety of densities deterministically
    for i in 0..40 {
        let dir = Move::ALL[i % Move::ALL.len()];
        let (nb, moved) = b.make_move(dir, &mut rng);
        if moved {
            b = nb;
        }
        boards.push(b);
    }
    boards
}

fn bench_shift(c: &mut Criterion) {
    let boards = corpus();
    for dir in Move::ALL {
        c.bench_function(&format!("shift/{dir}"), |bch| {
            bch.iter(|| {
                let mut acc = 0u64;
                for &bd in &boards {
                    acc ^= bd.shift(dir).tile_sum();
                }
                black_box(acc)
            })
        });
    }
}

fn bench_queries(c: &mut Criterion) {
    let boards = corpus();
    c.bench_function("can_move", |bch| {
        bch.iter(|| boards.iter().filter(|bd| bd.can_move()).count())
    });
    c.bench_function("empty_cells", |bch| {
        bch.iter(|| boards.iter().map(|bd| bd.empty_cells().len()).sum::<usize>())
    });
    c.bench_function("evaluate", |bch| {
        bch.iter(|| boards.iter().map(evaluate).sum::<f64>())
    });
}

fn bench_make_move(c: &mut Criterion) {
    let boards = corpus();
    c.bench_function("make_move/left", |bch| {
        bch.iter_batched(
            || StdRng::seed_from_u64(7),
            |mut rng| {
                let mut acc = 0u64;
                for &bd in &boards {
                    acc ^= bd.make_move(Move::Left, &mut rng).0.score();
                }
                black_box(acc)
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(engine_ops, bench_shift, bench_queries, bench_make_move);
criterion_main!(engine_ops);
