//! Item spawning system
//! Drops one reward or hazard from the top of the field whenever the
//! difficulty-scaled spawn interval has passed.

use std::time::Duration;

use crate::game::constants::{field, spawn};
use crate::game::game_loop::{DashEvent, TickEvents};
use crate::game::random::RandomSource;
use crate::game::state::{ItemKind, Session};

/// Spawn interval at the given difficulty
///
/// Computed in whole nanoseconds so difficulty 1.0 yields the base interval
/// exactly.
#[inline]
pub fn interval_at(base_interval: Duration, difficulty: f32) -> Duration {
    let nanos = base_interval.as_nanos() as f64 / f64::from(difficulty.max(1.0));
    Duration::from_nanos(nanos.round() as u64)
}

/// Whether enough time has passed since the last spawn
pub fn spawn_due(session: &Session, now: Duration, base_interval: Duration, difficulty: f32) -> bool {
    now.saturating_sub(session.last_spawn_at) > interval_at(base_interval, difficulty)
}

/// Roll a new item and add it to the session
///
/// Draw order is fixed (position, kind, speed) so scripted sources can
/// reproduce a spawn exactly.
pub fn spawn_item<R: RandomSource + ?Sized>(
    session: &mut Session,
    rng: &mut R,
    difficulty: f32,
) -> (u64, ItemKind, f32) {
    let x = field::MIN_X + rng.next_unit() * field::SPAWN_WIDTH;
    let kind = if rng.next_unit() > spawn::HAZARD_CHANCE {
        ItemKind::Reward
    } else {
        ItemKind::Hazard
    };
    let speed = (spawn::MIN_SPEED + rng.next_unit() * spawn::SPEED_SPREAD) * difficulty;

    let id = session.add_item(x, kind, speed);
    (id, kind, x)
}

/// Spawn an item if one is due
pub fn update<R: RandomSource + ?Sized>(
    session: &mut Session,
    now: Duration,
    base_interval: Duration,
    difficulty: f32,
    rng: &mut R,
    events: &mut TickEvents,
) {
    if !spawn_due(session, now, base_interval, difficulty) {
        return;
    }

    let (id, kind, x) = spawn_item(session, rng, difficulty);
    session.last_spawn_at = now;
    events.push(DashEvent::ItemSpawned { id, kind, x });

    tracing::trace!(item = id, ?kind, x, "spawned item");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::random::ScriptedSource;

    const BASE: Duration = Duration::from_millis(600);

    #[test]
    fn test_interval_shrinks_with_difficulty() {
        assert_eq!(interval_at(BASE, 1.0), BASE);
        assert_eq!(interval_at(BASE, 2.0), Duration::from_millis(300));
    }

    #[test]
    fn test_spawn_due_is_strictly_greater() {
        let session = Session::running(Duration::ZERO, Duration::from_secs(15));
        assert!(!spawn_due(&session, Duration::from_millis(600), BASE, 1.0));
        assert!(spawn_due(&session, Duration::from_millis(601), BASE, 1.0));
    }

    #[test]
    fn test_spawn_due_just_past_interval() {
        let session = Session::running(Duration::ZERO, Duration::from_secs(15));
        let just_after = BASE + Duration::from_nanos(10);
        assert!(spawn_due(&session, just_after, BASE, 1.0));
        assert_eq!(interval_at(BASE, 1.0), BASE);
        assert_eq!(interval_at(BASE, 0.5), BASE);
        assert_eq!(interval_at(BASE, 1.5), Duration::from_millis(400));
    }

    #[test]
    fn test_spawn_item_uses_draws_in_order() {
        let mut session = Session::running(Duration::ZERO, Duration::from_secs(15));
        let mut rng = ScriptedSource::new([0.5, 0.9, 1.0]);

        let (_, kind, x) = spawn_item(&mut session, &mut rng, 2.0);

        assert_eq!(kind, ItemKind::Reward);
        assert!((x - 50.0).abs() < 1e-4);
        let item = &session.items[0];
        assert_eq!(item.y, field::SPAWN_Y);
        assert!((item.speed - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_spawn_item_hazard_threshold() {
        let mut session = Session::running(Duration::ZERO, Duration::from_secs(15));
        let mut rng = ScriptedSource::new([0.0, 0.25, 0.0]);

        let (_, kind, x) = spawn_item(&mut session, &mut rng, 1.0);

        assert_eq!(kind, ItemKind::Hazard);
        assert_eq!(x, field::MIN_X);
        assert_eq!(session.items[0].speed, spawn::MIN_SPEED);
    }

    #[test]
    fn test_update_records_spawn_time() {
        let mut session = Session::running(Duration::ZERO, Duration::from_secs(15));
        let mut rng = ScriptedSource::new(Vec::new());
        let mut events = TickEvents::new();

        update(&mut session, Duration::from_millis(700), BASE, 1.0, &mut rng, &mut events);
        assert_eq!(session.items.len(), 1);
        assert_eq!(session.last_spawn_at, Duration::from_millis(700));
        assert!(matches!(events[0], DashEvent::ItemSpawned { .. }));

        // Too soon for another
        update(&mut session, Duration::from_millis(900), BASE, 1.0, &mut rng, &mut events);
        assert_eq!(session.items.len(), 1);
    }

    #[test]
    fn test_spawn_positions_within_field() {
        use crate::game::random::RngSource;

        let mut session = Session::running(Duration::ZERO, Duration::from_secs(15));
        let mut rng = RngSource::seeded(99);
        for _ in 0..500 {
            spawn_item(&mut session, &mut rng, 1.0);
        }

        for item in &session.items {
            assert!(item.x >= field::MIN_X && item.x <= field::MAX_X);
            assert!(item.speed >= spawn::MIN_SPEED && item.speed <= spawn::MIN_SPEED + spawn::SPEED_SPREAD);
        }
        let hazards = session.items.iter().filter(|i| i.kind == ItemKind::Hazard).count();
        assert!(hazards > 75 && hazards < 175, "hazard share off: {}", hazards);
    }
}
