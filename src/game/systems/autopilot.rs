//! Autopilot steering
//! Chooses a basket position from a snapshot: chase the lowest reward that is
//! not shadowed by a hazard, and step aside when a hazard is about to land.

use crate::game::constants::{catch, clamp_x, field};
use crate::game::state::{FallingItem, ItemKind, SessionSnapshot};

/// Maximum basket travel per frame (percent of field width)
pub const MAX_STEP: f32 = 3.0;

/// Hazards this far above the catch band are treated as threats
const THREAT_LOOKAHEAD: f32 = 25.0;

/// Horizontal clearance kept between a target and a threatening hazard
const HAZARD_CLEARANCE: f32 = catch::RADIUS * 2.0;

fn is_threat(item: &FallingItem) -> bool {
    item.kind == ItemKind::Hazard
        && item.y > catch::ZONE_TOP - THREAT_LOOKAHEAD
        && item.y < catch::ZONE_BOTTOM
}

/// Where the basket would like to be
pub fn target_x(snapshot: &SessionSnapshot) -> f32 {
    let threats: Vec<&FallingItem> = snapshot.items.iter().filter(|i| is_threat(i)).collect();

    let reward = snapshot
        .items
        .iter()
        .filter(|i| i.kind == ItemKind::Reward && i.y < catch::ZONE_BOTTOM)
        .filter(|i| threats.iter().all(|h| (h.x - i.x).abs() >= HAZARD_CLEARANCE))
        .max_by(|a, b| a.y.total_cmp(&b.y));

    if let Some(reward) = reward {
        return reward.x;
    }

    // Nothing worth chasing: dodge the nearest threat, otherwise stay put
    let nearest = threats
        .iter()
        .min_by(|a, b| {
            (a.x - snapshot.basket_x)
                .abs()
                .total_cmp(&(b.x - snapshot.basket_x).abs())
        });

    match nearest {
        Some(hazard) if (hazard.x - snapshot.basket_x).abs() < HAZARD_CLEARANCE => {
            if hazard.x > (field::MIN_X + field::MAX_X) / 2.0 {
                field::MIN_X
            } else {
                field::MAX_X
            }
        }
        _ => snapshot.basket_x,
    }
}

/// Next basket position, moving at most [`MAX_STEP`] toward the target
pub fn steer(snapshot: &SessionSnapshot) -> f32 {
    let delta = (target_x(snapshot) - snapshot.basket_x).clamp(-MAX_STEP, MAX_STEP);
    clamp_x(snapshot.basket_x + delta)
}
