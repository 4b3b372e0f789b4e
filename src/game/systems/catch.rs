//! Movement and catch detection
//!
//! Items fall by their own speed each tick. A hazard in the catch zone ends
//! the session before any reward on the same tick is scored.

use crate::game::game_loop::{DashEvent, TickEvents};
use crate::game::state::{ItemId, ItemKind, Session};

/// Collision result for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    /// No hazard caught; rewards (if any) were scored
    Clear,
    /// This hazard landed in the basket
    BombHit(ItemId),
}

/// Move every item down by its fall speed
pub fn advance(session: &mut Session) {
    for item in &mut session.items {
        item.y += item.speed;
    }
}

/// Resolve catches and misses against the current basket position
pub fn resolve(session: &mut Session, reward_points: u32, events: &mut TickEvents) -> Collision {
    let basket_x = session.basket_x;

    // First hazard in spawn order wins; nothing is scored on this tick
    let hazard = session
        .items
        .iter()
        .find(|item| item.kind == ItemKind::Hazard && item.in_catch_zone(basket_x))
        .map(|item| item.id);

    if let Some(id) = hazard {
        drop_missed(session, events);
        return Collision::BombHit(id);
    }

    let mut kept = Vec::with_capacity(session.items.len());
    let mut caught: u32 = 0;

    for item in std::mem::take(&mut session.items) {
        if item.kind == ItemKind::Reward && item.in_catch_zone(basket_x) {
            caught += 1;
            events.push(DashEvent::RewardCaught {
                id: item.id,
                points: reward_points,
            });
            continue;
        }
        if item.is_below_field() {
            events.push(DashEvent::ItemMissed { id: item.id });
            continue;
        }
        kept.push(item);
    }

    session.items = kept;
    session.score = session
        .score
        .saturating_add(caught.saturating_mul(reward_points));

    Collision::Clear
}

/// Discard items that fell past the bottom of the field
fn drop_missed(session: &mut Session, events: &mut TickEvents) {
    session.items.retain(|item| {
        if item.is_below_field() {
            events.push(DashEvent::ItemMissed { id: item.id });
            false
        } else {
            true
        }
    });
}
