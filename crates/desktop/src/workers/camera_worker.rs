use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, TrySendError};

use smilebooth_core::capture::domain::frame_source::FrameSource;
use smilebooth_core::shared::frame::Frame;

/// Frames queued ahead of the UI. Older frames are dropped, never buffered.
const PREVIEW_BACKLOG: usize = 2;
/// Preview intervals to wait before reopening a camera that failed.
const RETRY_INTERVALS: u32 = 30;

pub enum CameraMessage {
    Frame(Frame),
    Error(String),
}

/// Runs the frame source on its own thread, pushing preview frames every
/// `interval` until the flag is raised or the receiver goes away.
///
/// A failed capture is reported once per outage. The source is then closed
/// and retried after a back-off, so a replugged camera comes back on its own.
pub fn spawn(
    source: Box<dyn FrameSource>,
    interval: Duration,
) -> (Receiver<CameraMessage>, Arc<AtomicBool>) {
    let (tx, rx) = crossbeam_channel::bounded::<CameraMessage>(PREVIEW_BACKLOG);
    let cancelled = Arc::new(AtomicBool::new(false));
    let cancelled_clone = cancelled.clone();

    thread::spawn(move || {
        let mut source = source;
        run_preview(source.as_mut(), &tx, &cancelled_clone, interval);
        source.close();
        log::debug!("Camera worker stopped");
    });

    (rx, cancelled)
}

fn run_preview(
    source: &mut dyn FrameSource,
    tx: &Sender<CameraMessage>,
    cancelled: &AtomicBool,
    interval: Duration,
) {
    let mut failing = false;
    while !cancelled.load(Ordering::Relaxed) {
        match source.capture() {
            Ok(frame) => {
                if failing {
                    log::info!("Camera recovered");
                    failing = false;
                }
                match tx.try_send(CameraMessage::Frame(frame)) {
                    Ok(()) | Err(TrySendError::Full(_)) => {}
                    Err(TrySendError::Disconnected(_)) => return,
                }
                thread::sleep(interval);
            }
            Err(e) => {
                if !failing {
                    log::warn!("Camera capture failed, retrying: {e}");
                    // Blocking send: the error must not be dropped behind
                    // queued frames.
                    if tx.send(CameraMessage::Error(e.to_string())).is_err() {
                        return;
                    }
                    failing = true;
                } else {
                    log::debug!("Camera still unavailable: {e}");
                }
                source.close();
                thread::sleep(interval * RETRY_INTERVALS);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    /// Fails every capture numbered in `failing`, counting from zero.
    struct CountingSource {
        captures: Arc<AtomicUsize>,
        closed: Arc<AtomicBool>,
        failing: std::ops::Range<usize>,
    }

    impl FrameSource for CountingSource {
        fn capture(&mut self) -> Result<Frame, Box<dyn std::error::Error>> {
            let n = self.captures.fetch_add(1, Ordering::SeqCst);
            if self.failing.contains(&n) {
                return Err("device unplugged".into());
            }
            Ok(Frame::new(vec![0u8; 2 * 2 * 3], 2, 2))
        }

        fn close(&mut self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    fn source(failing: std::ops::Range<usize>) -> (CountingSource, Arc<AtomicBool>) {
        let closed = Arc::new(AtomicBool::new(false));
        (
            CountingSource {
                captures: Arc::new(AtomicUsize::new(0)),
                closed: closed.clone(),
                failing,
            },
            closed,
        )
    }

    #[test]
    fn test_streams_frames_until_cancelled() {
        let (source, closed) = source(0..0);
        let (rx, cancelled) = spawn(Box::new(source), Duration::from_millis(5));

        let first = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(first, CameraMessage::Frame(f) if f.width() == 2));

        cancelled.store(true, Ordering::Relaxed);
        // Drain until the worker hangs up.
        while rx.recv_timeout(Duration::from_secs(5)).is_ok() {}
        assert!(closed.load(Ordering::SeqCst));
    }

    fn next(rx: &Receiver<CameraMessage>) -> CameraMessage {
        rx.recv_timeout(Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_capture_error_is_reported_then_camera_recovers() {
        let (source, closed) = source(1..2);
        let (rx, cancelled) = spawn(Box::new(source), Duration::from_millis(2));

        assert!(matches!(next(&rx), CameraMessage::Frame(_)));
        // Frames already queued ahead of the error still arrive first.
        let error = loop {
            match next(&rx) {
                CameraMessage::Frame(_) => continue,
                CameraMessage::Error(message) => break message,
            }
        };
        assert!(error.contains("unplugged"));

        assert!(matches!(next(&rx), CameraMessage::Frame(f) if f.width() == 2));
        // The failed session was closed before the retry.
        assert!(closed.load(Ordering::SeqCst));
        cancelled.store(true, Ordering::Relaxed);
    }

    #[test]
    fn test_lasting_outage_is_reported_once() {
        let (source, _closed) = source(0..4);
        let (rx, cancelled) = spawn(Box::new(source), Duration::from_millis(1));

        assert!(matches!(next(&rx), CameraMessage::Error(_)));
        // The fifth capture succeeds; no further errors come before it.
        assert!(matches!(next(&rx), CameraMessage::Frame(_)));
        cancelled.store(true, Ordering::Relaxed);
    }
}
