//! Tokio frame runner
//!
//! Drives one [`DashController`] from a tokio interval. Each interval tick
//! fires the frame the controller last requested, so the frame chain ends on
//! its own once the session stops asking for frames.

use std::sync::atomic::Ordering;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::config::DashConfig;
use crate::game::controller::DashController;
use crate::game::game_loop::{DashEvent, GameLoop};
use crate::game::input_buffer::InputBuffer;
use crate::game::match_result::{determine_result, DashResult};
use crate::game::random::RandomSource;
use crate::game::scheduler::{FrameHandle, FrameScheduler, HandleAllocator};
use crate::game::state::SessionSnapshot;
use crate::metrics::Metrics;

/// Scheduler whose single pending frame fires on the next interval tick
#[derive(Debug, Default)]
pub struct IntervalScheduler {
    handles: HandleAllocator,
    pending: Option<FrameHandle>,
}

impl IntervalScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the frame due on this tick, if one was requested
    pub fn take_due(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl FrameScheduler for IntervalScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        let handle = self.handles.next_handle();
        self.pending = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }
}

/// Play one session to completion in real time
///
/// Pointer samples are read from `pointer` before every frame and the session
/// snapshot is published on `snapshots` after it. Returns `None` only if the
/// frame chain stopped without the session reaching a terminal phase.
pub async fn run_session<R: RandomSource>(
    config: &DashConfig,
    rng: R,
    pointer: &InputBuffer,
    snapshots: &watch::Sender<SessionSnapshot>,
    metrics: &Metrics,
) -> Option<DashResult> {
    let origin = Instant::now();
    let mut controller = DashController::new(GameLoop::new(config.clone()), IntervalScheduler::new(), rng);

    controller.start(Duration::ZERO);
    metrics.dash_sessions_started.fetch_add(1, Ordering::Relaxed);
    snapshots.send_replace(controller.session().snapshot());

    let mut interval = tokio::time::interval(config.frame_interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // First tick completes immediately
    interval.tick().await;

    loop {
        interval.tick().await;

        if let Some(sample) = pointer.latest() {
            controller.pointer_moved(sample.x);
        }

        let Some(handle) = controller.scheduler_mut().take_due() else {
            break;
        };

        let tick_start = std::time::Instant::now();
        let events = controller.on_frame(handle, origin.elapsed());
        metrics.record_tick_time(tick_start.elapsed());

        for event in &events {
            if let DashEvent::RewardCaught { .. } = event {
                metrics.dash_rewards_caught.fetch_add(1, Ordering::Relaxed);
            }
        }

        snapshots.send_replace(controller.session().snapshot());
    }

    let result = determine_result(controller.session());
    match &result {
        Some(result) => {
            metrics.record_session_end(result.reason, result.earned_discount());
            info!(
                session = %result.session_id,
                reason = ?result.reason,
                score = result.score,
                discount = result.discount_code.unwrap_or("-"),
                "Dash run finished"
            );
        }
        None => debug!("frame chain stopped before the session ended"),
    }
    result
}
