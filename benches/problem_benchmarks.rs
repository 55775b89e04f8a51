use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use numberline::engine::board::Board;
use numberline::engine::hint::{HintPlan, LineGeometry, build_arcs};
use numberline::engine::operator::{ALL_OPERATORS, Operator};
use numberline::engine::problem::{Problem, ProblemGenerator};

fn bench_generation(c: &mut Criterion) {
    let mut line = ProblemGenerator::new(Board::Line20, SmallRng::seed_from_u64(1));
    c.bench_function("generate line20 (all operators)", |b| {
        b.iter(|| line.generate(black_box(&ALL_OPERATORS)))
    });

    let mut grid = ProblemGenerator::new(Board::Grid100, SmallRng::seed_from_u64(1));
    c.bench_function("generate grid100 (all operators)", |b| {
        b.iter(|| grid.generate(black_box(&ALL_OPERATORS)))
    });
}

fn bench_hint_planning(c: &mut Criterion) {
    let problems = [
        Problem::new(37, Operator::Add, 48),
        Problem::new(92, Operator::Sub, 45),
        Problem::new(9, Operator::Mul, 11),
        Problem::new(96, Operator::Div, 8),
    ];

    c.bench_function("hint plan grid100 (4 problems)", |b| {
        b.iter(|| {
            problems
                .iter()
                .map(|p| HintPlan::for_problem(black_box(p), Board::Grid100).steps.len())
                .sum::<usize>()
        })
    });

    let geometry = LineGeometry::fit(Board::Line20, 140, 8);
    let problem = Problem::new(4, Operator::Mul, 5);
    c.bench_function("arcs line20 (4 x 5)", |b| {
        b.iter(|| {
            geometry
                .as_ref()
                .map(|g| build_arcs(black_box(&problem), Board::Line20, g).len())
        })
    });
}

criterion_group!(benches, bench_generation, bench_hint_planning);
criterion_main!(benches);
