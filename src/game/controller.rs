//! Dash controller - owns the single live session and its frame chain
//!
//! The controller requests a frame after `start` and after every tick that
//! leaves the session running. Frames carrying any handle other than the one
//! currently pending (stale or cancelled) are ignored without touching state.

use std::time::Duration;

use tracing::{debug, info};

use crate::game::game_loop::{DashEvent, GameLoop, TickEvents};
use crate::game::random::RandomSource;
use crate::game::scheduler::{FrameHandle, FrameScheduler, ManualScheduler};
use crate::game::state::{Phase, Session};

pub struct DashController<S, R> {
    game_loop: GameLoop,
    session: Session,
    scheduler: S,
    rng: R,
    pending_frame: Option<FrameHandle>,
}

impl<S: FrameScheduler, R: RandomSource> DashController<S, R> {
    pub fn new(game_loop: GameLoop, scheduler: S, rng: R) -> Self {
        let session = game_loop.idle();
        Self {
            game_loop,
            session,
            scheduler,
            rng,
            pending_frame: None,
        }
    }

    /// Current session (read-only)
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn game_loop(&self) -> &GameLoop {
        &self.game_loop
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Handle of the frame the controller is waiting for
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending_frame
    }

    /// Replace whatever session exists with a fresh running one
    pub fn start(&mut self, now: Duration) -> DashEvent {
        self.cancel_pending();

        self.session = self.game_loop.start(now);
        self.pending_frame = Some(self.scheduler.request_frame());

        info!(session = %self.session.id, "Dash session started");
        DashEvent::SessionStarted {
            session_id: self.session.id,
        }
    }

    /// Apply a pointer sample (any phase)
    pub fn pointer_moved(&mut self, x: f32) {
        let session = std::mem::take(&mut self.session);
        self.session = self.game_loop.on_pointer_move(session, x);
    }

    /// Host callback for a fired frame
    pub fn on_frame(&mut self, handle: FrameHandle, now: Duration) -> TickEvents {
        if self.pending_frame != Some(handle) {
            debug!(frame = handle.raw(), "ignoring stale frame");
            return TickEvents::new();
        }
        self.pending_frame = None;

        if !self.session.is_running() {
            return TickEvents::new();
        }

        let session = std::mem::take(&mut self.session);
        let result = self.game_loop.tick(session, now, &mut self.rng);
        self.session = result.session;

        if self.session.is_running() {
            self.pending_frame = Some(self.scheduler.request_frame());
        } else if let Phase::Ended(reason) = self.session.phase {
            info!(
                session = %self.session.id,
                ?reason,
                score = self.session.score,
                ticks = self.session.tick,
                "Dash session ended"
            );
        }

        result.events
    }

    /// Cancel any pending frame and drop the session
    pub fn stop(&mut self) {
        self.cancel_pending();
        self.session = self.game_loop.idle();
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending_frame.take() {
            self.scheduler.cancel_frame(handle);
            debug!(frame = handle.raw(), "cancelled pending frame");
        }
    }
}

impl<R: RandomSource> DashController<ManualScheduler, R> {
    /// Fire the next queued frame at `now`; `None` when nothing is queued
    pub fn advance_frame(&mut self, now: Duration) -> Option<TickEvents> {
        let handle = self.scheduler.next_frame()?;
        Some(self.on_frame(handle, now))
    }
}
