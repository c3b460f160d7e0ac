use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Elapsed,
    Cancelled,
}

/// Interval timer whose waits can be cut short from another thread.
///
/// Waiting parks on a channel receive with a timeout, so cancellation is
/// delivered immediately rather than at the next tick boundary. Dropping
/// every [`CancelHandle`] also cancels, which ties the timer's lifetime to
/// whoever owns the handle.
pub struct CountdownTimer {
    interval: Duration,
    cancel_rx: Receiver<()>,
}

#[derive(Clone)]
pub struct CancelHandle {
    tx: Sender<()>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.try_send(());
    }
}

impl CountdownTimer {
    pub fn new(interval: Duration) -> (Self, CancelHandle) {
        let (tx, cancel_rx) = crossbeam_channel::bounded(1);
        (
            Self {
                interval,
                cancel_rx,
            },
            CancelHandle { tx },
        )
    }

    /// Blocks for one interval unless cancelled first.
    pub fn wait(&self) -> TimerEvent {
        match self.cancel_rx.recv_timeout(self.interval) {
            Err(RecvTimeoutError::Timeout) => TimerEvent::Elapsed,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => TimerEvent::Cancelled,
        }
    }

    /// Discards a cancellation that arrived after the last wait, so a new
    /// countdown starts clean.
    pub fn reset(&self) {
        while self.cancel_rx.try_recv().is_ok() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_wait_elapses_after_interval() {
        let (timer, _handle) = CountdownTimer::new(Duration::from_millis(30));
        let started = Instant::now();
        assert_eq!(timer.wait(), TimerEvent::Elapsed);
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_cancel_interrupts_wait() {
        let (timer, handle) = CountdownTimer::new(Duration::from_secs(10));
        let canceller = handle.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            canceller.cancel();
        });

        let started = Instant::now();
        assert_eq!(timer.wait(), TimerEvent::Cancelled);
        assert!(started.elapsed() < Duration::from_secs(5));
        drop(handle);
    }

    #[test]
    fn test_dropping_handle_cancels() {
        let (timer, handle) = CountdownTimer::new(Duration::from_secs(10));
        drop(handle);
        assert_eq!(timer.wait(), TimerEvent::Cancelled);
    }

    #[test]
    fn test_reset_discards_stale_cancel() {
        let (timer, handle) = CountdownTimer::new(Duration::from_millis(10));
        handle.cancel();
        timer.reset();
        assert_eq!(timer.wait(), TimerEvent::Elapsed);
    }
}
