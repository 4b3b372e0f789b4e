//! Session outcome
//!
//! Computes the final result shown once a session ends, including whether the
//! player earned the marketplace discount code.

use std::time::Duration;

use serde::Serialize;

use crate::game::constants::outcome::{DISCOUNT_CODE, DISCOUNT_THRESHOLD};
use crate::game::state::{EndReason, Session, SessionId};

/// Final result of a finished session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashResult {
    pub session_id: SessionId,
    pub reason: EndReason,
    pub score: u32,
    /// Time played
    pub duration: Duration,
    /// Present only when the player qualified for the discount
    pub discount_code: Option<&'static str>,
}

impl DashResult {
    pub fn earned_discount(&self) -> bool {
        self.discount_code.is_some()
    }
}

/// Whether this outcome earns the discount code
///
/// Only a session that survives until the timer runs out qualifies.
pub fn qualifies_for_discount(reason: EndReason, score: u32) -> bool {
    reason == EndReason::TimeExpired && score >= DISCOUNT_THRESHOLD
}

/// Determine the result of a session; `None` while it has not ended
pub fn determine_result(session: &Session) -> Option<DashResult> {
    let reason = session.phase.end_reason()?;

    let discount_code = qualifies_for_discount(reason, session.score).then_some(DISCOUNT_CODE);

    Some(DashResult {
        session_id: session.id,
        reason,
        score: session.score,
        duration: session.elapsed,
        discount_code,
    })
}
