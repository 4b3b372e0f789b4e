//! Frame scheduling
//!
//! Replaces the "request next animation frame" chain with an injected
//! scheduler. A requested frame is identified by a [`FrameHandle`]; the host
//! later delivers that handle back to the controller, which only honours the
//! handle it is currently waiting on.

use std::collections::VecDeque;

/// Token for one requested frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(u64);

impl FrameHandle {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Host primitive for per-refresh callbacks
pub trait FrameScheduler {
    /// Ask for one more frame
    fn request_frame(&mut self) -> FrameHandle;

    /// Withdraw a previously requested frame
    fn cancel_frame(&mut self, handle: FrameHandle);
}

impl<S: FrameScheduler + ?Sized> FrameScheduler for &mut S {
    fn request_frame(&mut self) -> FrameHandle {
        (**self).request_frame()
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        (**self).cancel_frame(handle)
    }
}

/// Allocates increasing frame handles
#[derive(Debug, Clone, Default)]
pub struct HandleAllocator {
    next: u64,
}

impl HandleAllocator {
    pub fn next_handle(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.next);
        self.next += 1;
        handle
    }
}

/// Deterministic scheduler: frames fire only when the caller pops them
#[derive(Debug, Default)]
pub struct ManualScheduler {
    handles: HandleAllocator,
    queued: VecDeque<FrameHandle>,
    requested: u64,
    cancelled: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pop the oldest requested frame
    pub fn next_frame(&mut self) -> Option<FrameHandle> {
        self.queued.pop_front()
    }

    /// Frames requested but not yet fired or cancelled
    pub fn pending(&self) -> usize {
        self.queued.len()
    }

    /// Total frames ever requested
    pub fn requested(&self) -> u64 {
        self.requested
    }

    /// Total frames withdrawn before firing
    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        let handle = self.handles.next_handle();
        self.queued.push_back(handle);
        self.requested += 1;
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let before = self.queued.len();
        self.queued.retain(|queued| *queued != handle);
        if self.queued.len() != before {
            self.cancelled += 1;
        }
    }
}
