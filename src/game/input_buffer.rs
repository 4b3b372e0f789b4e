//! Lock-free pointer input buffer
//!
//! Uses crossbeam-channel so pointer handlers can submit samples without
//! blocking the frame loop. The loop drains everything pending before a frame
//! and keeps only the newest sample (last writer wins).

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

/// Horizontal pointer position, already normalized to field percent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    /// Submission order, assigned by the producer
    pub sequence: u64,
    pub x: f32,
}

/// Bounded pointer sample queue
pub struct InputBuffer {
    /// Sender side - cloned to each producer
    sender: Sender<PointerSample>,
    /// Receiver side - used by the frame loop
    receiver: Receiver<PointerSample>,
    capacity: usize,
}

impl InputBuffer {
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Create a new sender handle for a producer
    pub fn sender(&self) -> InputSender {
        InputSender {
            sender: self.sender.clone(),
            sequence: 0,
        }
    }

    /// Try to submit a sample (non-blocking)
    ///
    /// Returns false if the buffer is full
    #[inline]
    pub fn try_submit(&self, sample: PointerSample) -> bool {
        self.sender.try_send(sample).is_ok()
    }

    /// Drain all pending samples in submission order
    pub fn drain(&self) -> Vec<PointerSample> {
        self.receiver.try_iter().collect()
    }

    /// Drain all pending samples and return only the newest
    pub fn latest(&self) -> Option<PointerSample> {
        self.receiver.try_iter().last()
    }

    #[inline]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InputBuffer {
    fn default() -> Self {
        // Several seconds of 60 Hz pointer events between drains
        Self::new(256)
    }
}

/// Clonable sender handle for pointer producers
#[derive(Clone)]
pub struct InputSender {
    sender: Sender<PointerSample>,
    sequence: u64,
}

impl InputSender {
    /// Submit a pointer position (non-blocking)
    ///
    /// The sequence only advances when the sample is accepted.
    pub fn send_x(&mut self, x: f32) -> Result<(), InputBufferError> {
        let sequence = self.sequence + 1;
        self.sender
            .try_send(PointerSample { sequence, x })
            .map_err(|e| match e {
                TrySendError::Full(_) => InputBufferError::Full,
                TrySendError::Disconnected(_) => InputBufferError::Disconnected,
            })?;
        self.sequence = sequence;
        Ok(())
    }
}

/// Input buffer errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InputBufferError {
    /// Buffer is full (backpressure)
    #[error("pointer buffer is full")]
    Full,
    /// Channel disconnected (frame loop stopped)
    #[error("pointer buffer disconnected")]
    Disconnected,
}
