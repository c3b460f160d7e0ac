use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender};

use smilebooth_core::scoring::domain::leaderboard::LeaderboardEntry;
use smilebooth_core::scoring::domain::score_result::ScoreResult;
use smilebooth_core::scoring::domain::scoring_service::{ScoringError, ScoringService};
use smilebooth_core::scoring::domain::submission_request::SubmissionRequest;

pub enum ServiceMessage {
    Uploaded(Result<ScoreResult, ScoringError>),
    /// `seq` is the value `refresh_scoreboard` returned for this request.
    Scoreboard {
        seq: u64,
        outcome: Result<Vec<LeaderboardEntry>, ScoringError>,
    },
    Image {
        url: String,
        bytes: Result<Vec<u8>, ScoringError>,
    },
}

/// Runs each blocking scoring-service call on its own thread and reports
/// the outcome on a shared channel. Requests are never cancelled once sent.
pub struct ServiceWorker {
    service: Arc<dyn ScoringService>,
    tx: Sender<ServiceMessage>,
    rx: Receiver<ServiceMessage>,
    scoreboard_seq: AtomicU64,
}

impl ServiceWorker {
    pub fn new(service: Arc<dyn ScoringService>) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            service,
            tx,
            rx,
            scoreboard_seq: AtomicU64::new(0),
        }
    }

    pub fn receiver(&self) -> &Receiver<ServiceMessage> {
        &self.rx
    }

    pub fn upload(&self, request: SubmissionRequest) {
        self.run(move |service| ServiceMessage::Uploaded(service.upload(&request)));
    }

    /// Starts a fetch and returns its sequence number. Numbers increase
    /// with every call, starting at 1.
    pub fn refresh_scoreboard(&self) -> u64 {
        let seq = self.scoreboard_seq.fetch_add(1, Ordering::Relaxed) + 1;
        self.run(move |service| ServiceMessage::Scoreboard {
            seq,
            outcome: service.scoreboard(),
        });
        seq
    }

    pub fn fetch_image(&self, url: String) {
        self.run(move |service| {
            let bytes = service.fetch_image(&url);
            ServiceMessage::Image { url, bytes }
        });
    }

    fn run<F>(&self, call: F)
    where
        F: FnOnce(&dyn ScoringService) -> ServiceMessage + Send + 'static,
    {
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let _ = tx.send(call(service.as_ref()));
        });
    }
}

/// Admits only scoreboard responses newer than the last one admitted.
///
/// Each refresh runs on its own thread, so a slow early fetch can land
/// after a later one.
#[derive(Debug, Default)]
pub struct LatestScoreboard {
    applied: u64,
}

impl LatestScoreboard {
    pub fn accept(&mut self, seq: u64) -> bool {
        if seq <= self.applied {
            return false;
        }
        self.applied = seq;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smilebooth_core::workflow::domain::display_name::DisplayName;
    use std::time::Duration;

    struct FixedService;

    impl ScoringService for FixedService {
        fn upload(&self, request: &SubmissionRequest) -> Result<ScoreResult, ScoringError> {
            Ok(ScoreResult {
                name: request.display_name.as_str().to_string(),
                score: 42.0,
                smile_percentage: 64.5,
                image_url: "faces/1.jpg".into(),
            })
        }

        fn scoreboard(&self) -> Result<Vec<LeaderboardEntry>, ScoringError> {
            Err(ScoringError::InvalidResponse("board offline".into()))
        }

        fn fetch_image(&self, url: &str) -> Result<Vec<u8>, ScoringError> {
            Ok(url.as_bytes().to_vec())
        }
    }

    fn next(worker: &ServiceWorker) -> ServiceMessage {
        worker
            .receiver()
            .recv_timeout(Duration::from_secs(5))
            .unwrap()
    }

    #[test]
    fn test_upload_reports_result() {
        let worker = ServiceWorker::new(Arc::new(FixedService));
        let name = DisplayName::parse("Alice").unwrap();
        worker.upload(SubmissionRequest::new(name, vec![0xFF, 0xD8]));

        match next(&worker) {
            ServiceMessage::Uploaded(Ok(result)) => {
                assert_eq!(result.name, "Alice");
                assert_eq!(result.score, 42.0);
            }
            _ => panic!("expected an upload result"),
        }
    }

    #[test]
    fn test_scoreboard_failure_is_forwarded() {
        let worker = ServiceWorker::new(Arc::new(FixedService));
        let seq = worker.refresh_scoreboard();
        assert!(matches!(
            next(&worker),
            ServiceMessage::Scoreboard {
                seq: got,
                outcome: Err(ScoringError::InvalidResponse(_)),
            } if got == seq
        ));
    }

    #[test]
    fn test_refreshes_are_numbered_in_request_order() {
        let worker = ServiceWorker::new(Arc::new(FixedService));
        let issued: Vec<u64> = (0..3).map(|_| worker.refresh_scoreboard()).collect();
        assert_eq!(issued, [1, 2, 3]);

        let mut carried: Vec<u64> = (0..3)
            .map(|_| match next(&worker) {
                ServiceMessage::Scoreboard { seq, .. } => seq,
                _ => panic!("expected a scoreboard"),
            })
            .collect();
        carried.sort_unstable();
        assert_eq!(carried, issued);
    }

    #[test]
    fn test_late_response_from_older_refresh_is_dropped() {
        let mut latest = LatestScoreboard::default();
        // Refresh 2 answered before refresh 1.
        assert!(latest.accept(2));
        assert!(!latest.accept(1));
        assert!(!latest.accept(2));
        assert!(latest.accept(3));
    }

    #[test]
    fn test_image_fetch_carries_its_url() {
        let worker = ServiceWorker::new(Arc::new(FixedService));
        worker.fetch_image("faces/7.jpg".into());
        match next(&worker) {
            ServiceMessage::Image { url, bytes } => {
                assert_eq!(url, "faces/7.jpg");
                assert_eq!(bytes.unwrap(), b"faces/7.jpg");
            }
            _ => panic!("expected an image"),
        }
    }
}
