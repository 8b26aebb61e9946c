//! Benchmarks for move generation, search and event dispatch.

use std::sync::Arc;
use std::thread;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use toy_chess::board::{Board, Position};
use toy_chess::config::EngineConfig;
use toy_chess::search::{self, evaluate, SearchLimits};
use toy_chess::sync::StopFlag;
use toy_chess::uci::{Event, EventQueue};

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

fn bench_perft(c: &mut Criterion) {
    let mut group = c.benchmark_group("perft");

    let board = Board::new();
    for depth in 1..=3 {
        group.bench_with_input(BenchmarkId::new("startpos", depth), &depth, |b, &depth| {
            b.iter(|| board.perft(black_box(depth)))
        });
    }

    let kiwipete = Board::try_from_fen(KIWIPETE).unwrap();
    for depth in 1..=2 {
        group.bench_with_input(BenchmarkId::new("kiwipete", depth), &depth, |b, &depth| {
            b.iter(|| kiwipete.perft(black_box(depth)))
        });
    }

    group.finish();
}

fn bench_movegen(c: &mut Criterion) {
    let mut group = c.benchmark_group("movegen");

    let positions = [
        ("startpos", toy_chess::board::START_FEN),
        (
            "middlegame",
            "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4",
        ),
        ("kiwipete", KIWIPETE),
    ];
    for (name, fen) in positions {
        let board = Board::try_from_fen(fen).unwrap();
        group.bench_function(name, |b| b.iter(|| black_box(board.legal_moves())));
        group.bench_function(format!("{name}/eval"), |b| {
            b.iter(|| black_box(evaluate(&board)))
        });
    }

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    group.sample_size(10); // Fewer samples for slower benchmarks

    let config = EngineConfig::default();
    let stop = StopFlag::new();
    let tactical =
        Position::from_fen("r1bqkb1r/pppp1Qpp/2n2n2/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 4")
            .unwrap();

    for (name, position) in [("startpos", Position::startpos()), ("tactical", tactical)] {
        for depth in [2, 3] {
            let limits = SearchLimits {
                depth: Some(depth),
                ..SearchLimits::default()
            };
            group.bench_with_input(BenchmarkId::new(name, depth), &limits, |b, limits| {
                b.iter(|| search::search(&position, limits, &config, &stop))
            });
        }
    }

    group.finish();
}

fn bench_event_queue(c: &mut Criterion) {
    let mut group = c.benchmark_group("event_queue");

    group.bench_function("put_take", |b| {
        let queue = EventQueue::new();
        b.iter(|| {
            queue.put(Event::Command("isready".to_string()));
            black_box(queue.take())
        })
    });

    group.bench_function("two_producers_1000", |b| {
        b.iter(|| {
            let queue = Arc::new(EventQueue::new());
            let producers: Vec<_> = (0..2)
                .map(|_| {
                    let queue = Arc::clone(&queue);
                    thread::spawn(move || {
                        for _ in 0..500 {
                            queue.put(Event::Command("go".to_string()));
                        }
                    })
                })
                .collect();
            for _ in 0..1000 {
                black_box(queue.take());
            }
            for producer in producers {
                producer.join().unwrap();
            }
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_perft,
    bench_movegen,
    bench_search,
    bench_event_queue
);
criterion_main!(benches);
