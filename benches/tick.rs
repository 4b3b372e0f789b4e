//! Tick benchmarks for the Dash game loop
//!
//! Measures one tick against fields holding a growing number of items.
//!
//! Run with: cargo bench --bench tick

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use marbnb_server::config::DashConfig;
use marbnb_server::game::game_loop::GameLoop;
use marbnb_server::game::random::RngSource;
use marbnb_server::game::state::{ItemKind, Session};
use rand::Rng;

/// Running session with `count` rewards spread above the catch zone
fn session_with_items(count: usize) -> Session {
    let mut session = Session::running(Duration::ZERO, Duration::from_secs(15));
    let mut rng = rand::thread_rng();

    for _ in 0..count {
        let id = session.add_item(rng.gen_range(5.0..95.0), ItemKind::Reward, rng.gen_range(0.5..1.0));
        if let Some(item) = session.items.iter_mut().find(|i| i.id == id) {
            item.y = rng.gen_range(-5.0..70.0);
        }
    }
    // Keep the spawner quiet so the item count stays fixed
    session.last_spawn_at = Duration::from_millis(1000);
    session
}

fn bench_tick(c: &mut Criterion) {
    let game_loop = GameLoop::new(DashConfig::default());
    let mut group = c.benchmark_group("tick");
    group.sample_size(50);

    for count in [0, 10, 100, 1000] {
        let session = session_with_items(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("items", count), &session, |b, session| {
            let mut rng = RngSource::seeded(42);
            b.iter(|| {
                let result = game_loop.tick(black_box(session.clone()), Duration::from_millis(1016), &mut rng);
                black_box(result.session.score)
            })
        });
    }

    group.finish();
}

fn bench_full_session(c: &mut Criterion) {
    let game_loop = GameLoop::new(DashConfig::default());

    c.bench_function("full_session_60hz", |b| {
        b.iter(|| {
            let mut rng = RngSource::seeded(7);
            let mut session = game_loop.start(Duration::ZERO);
            let mut frame = 0u64;
            while session.is_running() {
                frame += 1;
                let now = Duration::from_micros(frame * 16_667);
                session = game_loop.on_pointer_move(session, (frame % 90) as f32 + 5.0);
                session = game_loop.tick(session, now, &mut rng).session;
            }
            black_box(session.score)
        })
    });
}

criterion_group!(benches, bench_tick, bench_full_session);
criterion_main!(benches);
