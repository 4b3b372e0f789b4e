//! Dash game loop
//!
//! Pure session transitions: `start`, `tick` and `on_pointer_move` take a
//! [`Session`] by value and hand back the next one. Scheduling and ownership of
//! the live session belong to [`crate::game::controller`].

use std::time::Duration;

use smallvec::SmallVec;

use crate::config::DashConfig;
use crate::game::constants::clamp_x;
use crate::game::random::RandomSource;
use crate::game::state::{EndReason, ItemId, ItemKind, Phase, Session, SessionId};
use crate::game::systems::catch::{self, Collision};
use crate::game::systems::clock::{self, ClockStatus};
use crate::game::systems::spawner;

/// Something that happened during a tick
#[derive(Debug, Clone, PartialEq)]
pub enum DashEvent {
    SessionStarted { session_id: SessionId },
    ItemSpawned { id: ItemId, kind: ItemKind, x: f32 },
    RewardCaught { id: ItemId, points: u32 },
    ItemMissed { id: ItemId },
    SessionEnded { reason: EndReason, score: u32 },
}

/// Events produced by one tick (usually zero to two)
pub type TickEvents = SmallVec<[DashEvent; 4]>;

/// Session after a tick plus what happened during it
#[derive(Debug, Clone)]
pub struct TickResult {
    pub session: Session,
    pub events: TickEvents,
}

impl TickResult {
    /// Reason the session ended on this tick, if it did
    pub fn ended(&self) -> Option<EndReason> {
        self.events.iter().find_map(|event| match event {
            DashEvent::SessionEnded { reason, .. } => Some(*reason),
            _ => None,
        })
    }
}

/// Stateless driver for session transitions
#[derive(Debug, Clone, Default)]
pub struct GameLoop {
    config: DashConfig,
}

impl GameLoop {
    pub fn new(config: DashConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DashConfig {
        &self.config
    }

    /// Session shown before the first start
    pub fn idle(&self) -> Session {
        Session::idle(self.config.session_duration)
    }

    /// Fresh running session; any previous session is simply dropped
    pub fn start(&self, now: Duration) -> Session {
        Session::running(now, self.config.session_duration)
    }

    /// Store a new basket position, clamped into the field
    ///
    /// Accepted in every phase. NaN cannot be clamped and leaves the basket
    /// where it was.
    pub fn on_pointer_move(&self, mut session: Session, x: f32) -> Session {
        if !x.is_nan() {
            session.basket_x = clamp_x(x);
        }
        session
    }

    /// Advance a running session to host timestamp `now`
    ///
    /// Order: clock, difficulty, spawn, advance, collide. Ticks on a session
    /// that is not running return it untouched.
    pub fn tick<R: RandomSource + ?Sized>(
        &self,
        mut session: Session,
        now: Duration,
        rng: &mut R,
    ) -> TickResult {
        let mut events = TickEvents::new();

        if !session.is_running() {
            return TickResult { session, events };
        }

        session.tick += 1;

        let difficulty = match clock::update(&mut session, now, self.config.session_duration) {
            ClockStatus::Expired => {
                end_session(&mut session, EndReason::TimeExpired, &mut events);
                return TickResult { session, events };
            }
            ClockStatus::Running { difficulty } => difficulty,
        };

        spawner::update(
            &mut session,
            now,
            self.config.base_spawn_interval,
            difficulty,
            rng,
            &mut events,
        );

        catch::advance(&mut session);

        if let Collision::BombHit(id) = catch::resolve(&mut session, self.config.reward_points, &mut events) {
            tracing::debug!(session = %session.id, item = id, "hazard caught");
            end_session(&mut session, EndReason::BombHit, &mut events);
        }

        TickResult { session, events }
    }
}

fn end_session(session: &mut Session, reason: EndReason, events: &mut TickEvents) {
    session.phase = Phase::Ended(reason);
    events.push(DashEvent::SessionEnded {
        reason,
        score: session.score,
    });
}

/// Convert a client pixel coordinate into a field percentage
///
/// Returns `None` for an empty or invalid field rectangle. The result is not
/// clamped; [`GameLoop::on_pointer_move`] does that.
pub fn normalize_pointer(client_x: f32, field_left: f32, field_width: f32) -> Option<f32> {
    if !(field_width.is_finite() && field_width > 0.0) || !client_x.is_finite() {
        return None;
    }
    Some((client_x - field_left) / field_width * 100.0)
}
