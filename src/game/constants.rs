//! Dash tuning constants
//!
//! All positions are percentages of the play field (0 = left/top, 100 = right/bottom).

/// Play field geometry
pub mod field {
    /// Leftmost basket/spawn position
    pub const MIN_X: f32 = 5.0;
    /// Rightmost basket/spawn position
    pub const MAX_X: f32 = 95.0;
    /// Width of the spawn band (MAX_X - MIN_X)
    pub const SPAWN_WIDTH: f32 = MAX_X - MIN_X;
    /// Vertical position new items appear at (just above the visible field)
    pub const SPAWN_Y: f32 = -5.0;
    /// Items at or below this line are discarded as missed
    pub const BOTTOM_Y: f32 = 105.0;
    /// Basket position before any pointer input
    pub const BASKET_START_X: f32 = 50.0;
}

/// Catch zone around the basket
pub mod catch {
    /// Upper edge of the catch band (exclusive)
    pub const ZONE_TOP: f32 = 80.0;
    /// Lower edge of the catch band (exclusive)
    pub const ZONE_BOTTOM: f32 = 88.0;
    /// Maximum horizontal distance from the basket centre (exclusive)
    pub const RADIUS: f32 = 8.0;
}

/// Item spawning
pub mod spawn {
    /// Spawn interval at difficulty 1.0, in milliseconds
    pub const BASE_INTERVAL_MS: u64 = 600;
    /// A kind draw at or below this value produces a hazard (25%)
    pub const HAZARD_CHANCE: f32 = 0.25;
    /// Slowest fall speed at difficulty 1.0 (percent per tick)
    pub const MIN_SPEED: f32 = 0.5;
    /// Random spread added on top of MIN_SPEED
    pub const SPEED_SPREAD: f32 = 0.5;
}

/// Difficulty ramp
pub mod difficulty {
    /// Added to the multiplier for every elapsed second (linear, uncapped)
    pub const RAMP_PER_SECOND: f32 = 0.1;
}

/// Session timing and scoring
pub mod session {
    /// Length of one play-through in seconds
    pub const DURATION_SECS: f32 = 15.0;
    /// Points awarded per caught reward
    pub const REWARD_POINTS: u32 = 10;
    /// Host display refresh rate the loop is tuned for
    pub const FRAME_RATE: u32 = 60;
}

/// End-of-session outcome
pub mod outcome {
    /// Minimum score (with time expiry) that earns the discount code
    pub const DISCOUNT_THRESHOLD: u32 = 50;
    /// Code shown to players who reach the threshold
    pub const DISCOUNT_CODE: &str = "DASH50";
}

/// Difficulty multiplier after `elapsed_secs` of play
#[inline]
pub fn difficulty_at(elapsed_secs: f32) -> f32 {
    1.0 + elapsed_secs.max(0.0) * difficulty::RAMP_PER_SECOND
}

/// Clamp a horizontal coordinate into the basket range
#[inline]
pub fn clamp_x(x: f32) -> f32 {
    x.clamp(field::MIN_X, field::MAX_X)
}
