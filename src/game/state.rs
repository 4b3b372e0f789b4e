//! Dash session state
//!
//! A [`Session`] is one play-through: score, phase, timing, basket position and
//! the falling items currently on the field.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::constants::{catch, field};

/// Unique session identifier
pub type SessionId = Uuid;

/// Item identifier, unique within a session
pub type ItemId = u64;

/// Why a session ended
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The session timer ran out
    TimeExpired,
    /// A hazard landed in the basket
    BombHit,
}

/// Session phase
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "phase", content = "reason", rename_all = "snake_case")]
pub enum Phase {
    /// No session started yet
    #[default]
    Idle,
    /// Session in progress
    Running,
    /// Session finished
    Ended(EndReason),
}

impl Phase {
    pub fn is_running(&self) -> bool {
        matches!(self, Phase::Running)
    }

    pub fn is_ended(&self) -> bool {
        matches!(self, Phase::Ended(_))
    }

    /// Reason the session ended, if it has
    pub fn end_reason(&self) -> Option<EndReason> {
        match self {
            Phase::Ended(reason) => Some(*reason),
            _ => None,
        }
    }
}

/// Falling item kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Gift: scores points when caught
    Reward,
    /// Bomb: ends the session when caught
    Hazard,
}

/// An item falling down the play field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FallingItem {
    pub id: ItemId,
    /// Horizontal position, fixed at spawn
    pub x: f32,
    /// Vertical position, grows every tick
    pub y: f32,
    pub kind: ItemKind,
    /// Distance fallen per tick
    pub speed: f32,
}

impl FallingItem {
    pub fn new(id: ItemId, x: f32, kind: ItemKind, speed: f32) -> Self {
        Self {
            id,
            x,
            y: field::SPAWN_Y,
            kind,
            speed,
        }
    }

    /// Whether this item is inside the catch zone of a basket at `basket_x`
    #[inline]
    pub fn in_catch_zone(&self, basket_x: f32) -> bool {
        self.y > catch::ZONE_TOP
            && self.y < catch::ZONE_BOTTOM
            && (self.x - basket_x).abs() < catch::RADIUS
    }

    /// Whether the item has dropped past the bottom of the field
    #[inline]
    pub fn is_below_field(&self) -> bool {
        self.y >= field::BOTTOM_Y
    }
}

/// One play-through of the mini-game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub phase: Phase,
    pub score: u32,
    /// Horizontal basket position, always within `[MIN_X, MAX_X]`
    pub basket_x: f32,
    /// Active items in spawn order
    pub items: Vec<FallingItem>,
    /// Host timestamp the session started at
    pub started_at: Duration,
    /// Host timestamp of the most recent spawn
    pub last_spawn_at: Duration,
    /// Time played, bounded by the session duration
    pub elapsed: Duration,
    /// Seconds left on the clock
    pub remaining: f32,
    /// Difficulty multiplier from the last tick
    pub difficulty: f32,
    /// Ticks processed in this session
    pub tick: u64,
    next_item_id: ItemId,
}

impl Session {
    /// A session that has not started yet
    pub fn idle(duration: Duration) -> Self {
        Self {
            id: Uuid::nil(),
            phase: Phase::Idle,
            score: 0,
            basket_x: field::BASKET_START_X,
            items: Vec::new(),
            started_at: Duration::ZERO,
            last_spawn_at: Duration::ZERO,
            elapsed: Duration::ZERO,
            remaining: duration.as_secs_f32(),
            difficulty: 1.0,
            tick: 0,
            next_item_id: 0,
        }
    }

    /// A fresh running session started at `now`
    pub fn running(now: Duration, duration: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            phase: Phase::Running,
            started_at: now,
            last_spawn_at: now,
            ..Self::idle(duration)
        }
    }

    /// Generate a new item ID
    pub fn next_item_id(&mut self) -> ItemId {
        let id = self.next_item_id;
        self.next_item_id += 1;
        id
    }

    /// Add an item at the top of the field
    pub fn add_item(&mut self, x: f32, kind: ItemKind, speed: f32) -> ItemId {
        let id = self.next_item_id();
        self.items.push(FallingItem::new(id, x, kind, speed));
        id
    }

    pub fn is_running(&self) -> bool {
        self.phase.is_running()
    }

    pub fn is_ended(&self) -> bool {
        self.phase.is_ended()
    }

    /// Renderable view of the session
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            phase: self.phase,
            score: self.score,
            remaining_secs: self.remaining,
            basket_x: self.basket_x,
            items: self.items.clone(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::idle(Duration::from_secs_f32(crate::game::constants::session::DURATION_SECS))
    }
}

/// Per-frame output for a renderer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub phase: Phase,
    pub score: u32,
    pub remaining_secs: f32,
    pub basket_x: f32,
    pub items: Vec<FallingItem>,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Session::default().snapshot()
    }
}
