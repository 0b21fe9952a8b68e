//! Future/polling primitive bridging worker threads to the interactive
//! session.
//!
//! The interactive rendering loop may never block, so a job's outcome
//! travels through a bounded(1) channel whose receiving half is the
//! future. Polling is a `try_recv`: cheap enough to run every render
//! cycle.

use crossbeam_channel::{Receiver, TryRecvError};

/// Result of polling a [`JobFuture`].
pub enum FuturePoll<T> {
    /// The computation has not finished yet.
    Pending,
    /// The computation finished; the outcome is yielded exactly once.
    Ready(T),
    /// The producing worker went away without sending an outcome.
    Lost,
}

pub struct JobFuture<T> {
    rx: Receiver<T>,
}

impl<T> JobFuture<T> {
    pub(crate) fn new(rx: Receiver<T>) -> Self {
        Self { rx }
    }

    /// Non-blocking check without consuming the outcome.
    pub fn is_ready(&self) -> bool {
        !self.rx.is_empty()
    }

    /// Non-blocking poll. `Ready` is yielded at most once; the caller
    /// owns the outcome afterwards and must not poll again.
    pub fn poll(&mut self) -> FuturePoll<T> {
        match self.rx.try_recv() {
            Ok(value) => FuturePoll::Ready(value),
            Err(TryRecvError::Empty) => FuturePoll::Pending,
            Err(TryRecvError::Disconnected) => FuturePoll::Lost,
        }
    }
}

impl<T> std::fmt::Debug for JobFuture<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobFuture")
            .field("ready", &self.is_ready())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    #[test]
    fn test_pending_until_sent() {
        let (tx, rx) = bounded::<u32>(1);
        let mut future = JobFuture::new(rx);

        assert!(!future.is_ready());
        assert!(matches!(future.poll(), FuturePoll::Pending));

        tx.send(7).unwrap();
        assert!(future.is_ready());
        match future.poll() {
            FuturePoll::Ready(v) => assert_eq!(v, 7),
            _ => panic!("expected Ready"),
        }
    }

    #[test]
    fn test_lost_when_sender_dropped_without_value() {
        let (tx, rx) = bounded::<u32>(1);
        let mut future = JobFuture::new(rx);
        drop(tx);
        assert!(matches!(future.poll(), FuturePoll::Lost));
    }
}
