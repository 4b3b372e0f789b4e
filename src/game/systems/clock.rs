//! Session clock
//!
//! Time accounting and the difficulty ramp, evaluated first on every tick.

use std::time::Duration;

use crate::game::constants::difficulty_at;
use crate::game::state::Session;

/// Result of advancing the clock for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClockStatus {
    /// Time is up; nothing else should run this tick
    Expired,
    /// Session continues at this difficulty multiplier
    Running { difficulty: f32 },
}

/// Update elapsed/remaining time from the host timestamp `now`
pub fn update(session: &mut Session, now: Duration, duration: Duration) -> ClockStatus {
    // Timestamps from before the start count as zero elapsed time
    let elapsed = now.saturating_sub(session.started_at);
    let remaining = duration.saturating_sub(elapsed);

    session.elapsed = elapsed.min(duration);
    session.remaining = remaining.as_secs_f32();

    if remaining.is_zero() {
        session.remaining = 0.0;
        return ClockStatus::Expired;
    }

    let difficulty = difficulty_at(elapsed.as_secs_f32());
    session.difficulty = difficulty;
    ClockStatus::Running { difficulty }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DURATION: Duration = Duration::from_secs(15);

    #[test]
    fn test_clock_running_mid_session() {
        let mut session = Session::running(Duration::from_secs(100), DURATION);
        let status = update(&mut session, Duration::from_secs(105), DURATION);

        match status {
            ClockStatus::Running { difficulty } => assert!((difficulty - 1.5).abs() < 1e-6),
            ClockStatus::Expired => panic!("clock should still be running"),
        }
        assert_eq!(session.elapsed, Duration::from_secs(5));
        assert!((session.remaining - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_clock_expires_exactly_at_duration() {
        let mut session = Session::running(Duration::ZERO, DURATION);
        let status = update(&mut session, DURATION, DURATION);

        assert_eq!(status, ClockStatus::Expired);
        assert_eq!(session.remaining, 0.0);
        assert_eq!(session.elapsed, DURATION);
    }

    #[test]
    fn test_clock_elapsed_bounded_by_duration() {
        let mut session = Session::running(Duration::ZERO, DURATION);
        let status = update(&mut session, Duration::from_secs(40), DURATION);

        assert_eq!(status, ClockStatus::Expired);
        assert_eq!(session.elapsed, DURATION);
        assert_eq!(session.remaining, 0.0);
    }

    #[test]
    fn test_clock_before_start_is_zero_elapsed() {
        let mut session = Session::running(Duration::from_secs(10), DURATION);
        let status = update(&mut session, Duration::from_secs(3), DURATION);

        assert_eq!(status, ClockStatus::Running { difficulty: 1.0 });
        assert_eq!(session.elapsed, Duration::ZERO);
        assert_eq!(session.remaining, 15.0);
    }
}
