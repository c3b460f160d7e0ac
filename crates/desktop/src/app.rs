use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use iced::widget::{button, column, container, image, row, stack, text, text_input, Space};
use iced::{Alignment, Color, Element, Length, Subscription, Task, Theme};

use smilebooth_core::capture::domain::frame_source::FrameSource;
use smilebooth_core::capture::infrastructure::frame_source_factory::create_frame_source;
use smilebooth_core::scoring::domain::leaderboard::Leaderboard;
use smilebooth_core::scoring::domain::score_result::ScoreResult;
use smilebooth_core::scoring::domain::scoring_service::ScoringService;
use smilebooth_core::scoring::infrastructure::http_scoring_service::HttpScoringService;
use smilebooth_core::shared::config::KioskConfig;
use smilebooth_core::shared::frame::Frame;
use smilebooth_core::workflow::domain::capture_workflow::{
    CaptureWorkflow, TickOutcome, WorkflowError,
};
use smilebooth_core::workflow::domain::workflow_observer::{
    LogWorkflowObserver, WorkflowObserver,
};
use smilebooth_core::workflow::domain::workflow_state::WorkflowState;
use smilebooth_core::workflow::leaderboard_poller::LeaderboardPoller;

use crate::theme;
use crate::widgets::primary_button::primary_button_fill_maybe;
use crate::widgets::leaderboard_panel::leaderboard_panel;
use crate::widgets::result_card::result_card;
use crate::workers::camera_worker::{self, CameraMessage};
use crate::workers::service_worker::{LatestScoreboard, ServiceMessage, ServiceWorker};

const POLL_INTERVAL: Duration = Duration::from_millis(33);
const PREVIEW_INTERVAL: Duration = Duration::from_millis(33);
const EMPTY_NAME_NOTICE: &str = "Please enter a name first.";

#[derive(Debug, Clone)]
pub enum Message {
    NameChanged(String),
    Submit,
    CancelCountdown,
    CaptureHover(bool),
    Tick,
    Poll,
}

pub struct App {
    config: KioskConfig,
    workflow: CaptureWorkflow,
    poller: LeaderboardPoller,
    service: ServiceWorker,
    latest_board: LatestScoreboard,
    camera_rx: Receiver<CameraMessage>,
    camera_cancel: Arc<AtomicBool>,
    flash_rx: Receiver<()>,
    feed: CameraFeed,
    /// Photos for the leaderboard and result card, keyed by service URL.
    images: HashMap<String, image::Handle>,
    pending_images: HashSet<String>,
    name: String,
    notice: Option<String>,
    flash_until: Option<Instant>,
    capture_hovered: bool,
}

impl App {
    pub fn new(config: KioskConfig, service: HttpScoringService) -> (Self, Task<Message>) {
        let source = create_frame_source(&config.camera);
        (Self::with_parts(config, Arc::new(service), source), Task::none())
    }

    fn with_parts(
        config: KioskConfig,
        service: Arc<dyn ScoringService>,
        source: Box<dyn FrameSource>,
    ) -> Self {
        let (flash_tx, flash_rx) = crossbeam_channel::unbounded();
        let workflow = CaptureWorkflow::from_config(&config)
            .with_observer(Box::new(KioskObserver { flash_tx }));
        let (camera_rx, camera_cancel) = camera_worker::spawn(source, PREVIEW_INTERVAL);

        let app = Self {
            poller: LeaderboardPoller::new(Arc::clone(&service)),
            service: ServiceWorker::new(service),
            latest_board: LatestScoreboard::default(),
            config,
            workflow,
            camera_rx,
            camera_cancel,
            flash_rx,
            feed: CameraFeed::default(),
            images: HashMap::new(),
            pending_images: HashSet::new(),
            name: String::new(),
            notice: None,
            flash_until: None,
            capture_hovered: false,
        };
        app.service.refresh_scoreboard();
        app
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::NameChanged(name) => {
                self.name = name;
                if self.notice.as_deref() == Some(EMPTY_NAME_NOTICE) {
                    self.notice = None;
                }
            }
            Message::Submit => match self.workflow.start(&self.name) {
                Ok(()) => {
                    self.notice = None;
                    if self.workflow.state() == &WorkflowState::Capturing {
                        self.capture();
                    }
                }
                Err(WorkflowError::EmptyName) => {
                    self.notice = Some(EMPTY_NAME_NOTICE.to_string());
                }
                Err(e) => log::debug!("Ignoring submit: {e}"),
            },
            Message::CancelCountdown => {
                self.workflow.cancel();
            }
            Message::CaptureHover(hovered) => {
                self.capture_hovered = hovered;
            }
            Message::Tick => match self.workflow.tick() {
                Ok(TickOutcome::ReadyToCapture) => self.capture(),
                Ok(TickOutcome::Counting(_)) => {}
                // A tick queued before a cancel can land after it.
                Err(e) => log::debug!("Ignoring tick: {e}"),
            },
            Message::Poll => self.poll(),
        }
        Task::none()
    }

    pub fn view(&self) -> Element<'_, Message> {
        let theme = self.theme();

        let left = column![
            self.camera_view(&theme),
            Space::new().height(16),
            self.controls(),
        ]
        .width(Length::Fill)
        .height(Length::Fill);

        let mut main = row![left].spacing(24).height(Length::Fill);
        if let Some(result) = self.workflow.last_result() {
            let photo = self.images.get(&result.image_url);
            main = main.push(
                container(result_card(result, photo, &theme))
                    .height(Length::Fill)
                    .center_y(Length::Fill),
            );
        }
        main = main.push(leaderboard_panel(
            self.poller.leaderboard(),
            &self.images,
            &theme,
        ));

        container(main)
            .padding(24)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    pub fn theme(&self) -> Theme {
        theme::kiosk_theme()
    }

    pub fn subscription(&self) -> Subscription<Message> {
        let poll = iced::time::every(POLL_INTERVAL).map(|_| Message::Poll);
        if matches!(self.workflow.state(), WorkflowState::Countdown(_)) {
            let tick = iced::time::every(self.config.tick_interval()).map(|_| Message::Tick);
            Subscription::batch([poll, tick])
        } else {
            poll
        }
    }

    /// Encodes the most recent preview frame and hands it to the uploader.
    fn capture(&mut self) {
        let mut snapshot = self.feed.snapshot();
        match self.workflow.capture(&mut snapshot) {
            Ok(request) => self.service.upload(request),
            Err(e) => self.notice = Some(e.to_string()),
        }
    }

    fn poll(&mut self) {
        while let Ok(message) = self.camera_rx.try_recv() {
            self.feed.apply(message);
        }

        while let Ok(message) = self.service.receiver().try_recv() {
            self.apply_service_message(message);
        }

        if self.flash_rx.try_iter().count() > 0 {
            self.flash_until = Some(Instant::now() + self.config.flash_duration());
        }
        if self.flash_until.is_some_and(|until| Instant::now() >= until) {
            self.flash_until = None;
        }
    }

    fn apply_service_message(&mut self, message: ServiceMessage) {
        match message {
            ServiceMessage::Uploaded(outcome) => {
                // The field is cleared whatever the outcome.
                self.name.clear();
                match self.workflow.finish_upload(outcome) {
                    Ok(result) => {
                        self.request_image(&result.image_url);
                        // Refresh only once the upload response has been applied.
                        self.service.refresh_scoreboard();
                    }
                    Err(e) => self.notice = Some(e.to_string()),
                }
            }
            ServiceMessage::Scoreboard { seq, outcome } => {
                if !self.latest_board.accept(seq) {
                    log::debug!("Dropping stale scoreboard response #{seq}");
                    return;
                }
                if self.poller.apply(outcome).is_ok() {
                    retain_listed(
                        &mut self.images,
                        &listed_urls(self.poller.leaderboard(), self.workflow.last_result()),
                    );
                    let urls: Vec<String> = self
                        .poller
                        .leaderboard()
                        .entries()
                        .iter()
                        .map(|entry| entry.image_url.clone())
                        .collect();
                    for url in &urls {
                        self.request_image(url);
                    }
                }
            }
            ServiceMessage::Image { url, bytes } => {
                self.pending_images.remove(&url);
                let listed =
                    listed_urls(self.poller.leaderboard(), self.workflow.last_result());
                match bytes {
                    Ok(bytes) if listed.contains(url.as_str()) => {
                        self.images.insert(url, image::Handle::from_bytes(bytes));
                    }
                    Ok(_) => log::debug!("Discarding photo {url}, no longer shown"),
                    Err(e) => log::warn!("Could not load photo {url}: {e}"),
                }
            }
        }
    }

    fn request_image(&mut self, url: &str) {
        if url.is_empty() || self.images.contains_key(url) || self.pending_images.contains(url) {
            return;
        }
        self.pending_images.insert(url.to_string());
        self.service.fetch_image(url.to_string());
    }

    fn camera_view(&self, theme: &Theme) -> Element<'_, Message> {
        let feed: Element<'_, Message> = match (&self.feed.error, &self.feed.preview) {
            (Some(e), _) => centered(text(format!("Camera unavailable: {e}")).size(18.0)),
            (None, Some(handle)) => image(handle.clone())
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
            (None, None) => centered(text("Starting camera\u{2026}").size(18.0)),
        };

        let mut layers = stack![feed].width(Length::Fill).height(Length::Fill);

        if let Some(status) = self.workflow.status_text() {
            let size = if matches!(self.workflow.state(), WorkflowState::Countdown(_)) {
                160.0
            } else {
                32.0
            };
            layers = layers.push(centered(
                text(status).size(size).color(theme.palette().text),
            ));
        }

        if self.flash_until.is_some() {
            layers = layers.push(
                container(Space::new())
                    .width(Length::Fill)
                    .height(Length::Fill)
                    .style(|_theme: &Theme| container::Style {
                        background: Some(Color::WHITE.into()),
                        ..container::Style::default()
                    }),
            );
        }

        container(layers)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(container::rounded_box)
            .into()
    }

    fn controls(&self) -> Element<'_, Message> {
        let busy = self.workflow.is_busy();

        let mut input = text_input("Enter your name", &self.name)
            .padding(14)
            .size(20.0);
        if !busy {
            input = input
                .on_input(Message::NameChanged)
                .on_submit(Message::Submit);
        }

        let action: Element<'_, Message> = match self.workflow.state() {
            WorkflowState::Countdown(_) => button(text("Cancel").size(18.0))
                .on_press(Message::CancelCountdown)
                .padding([16, 40])
                .width(Length::Fill)
                .style(button::secondary)
                .into(),
            _ => primary_button_fill_maybe(
                || text("Take Photo").size(22.0).color(Color::WHITE).into(),
                (!busy).then_some(Message::Submit),
                self.capture_hovered,
                Message::CaptureHover,
                [16, 40],
            ),
        };

        let mut col = column![row![input, container(action).width(220)]
            .spacing(12)
            .align_y(Alignment::Center)]
        .spacing(8);

        if let Some(notice) = self.notice.as_deref().or(self.workflow.last_error()) {
            col = col.push(text(notice.to_owned()).size(15.0).color(theme::muted_color(
                &self.theme(),
            )));
        }

        col.into()
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.camera_cancel.store(true, Ordering::Relaxed);
    }
}

/// Logs like [`LogWorkflowObserver`] and forwards flashes to the UI.
struct KioskObserver {
    flash_tx: Sender<()>,
}

impl WorkflowObserver for KioskObserver {
    fn transition(&mut self, from: &WorkflowState, to: &WorkflowState) {
        LogWorkflowObserver.transition(from, to);
    }

    fn flash(&mut self) {
        let _ = self.flash_tx.send(());
    }

    fn error(&mut self, message: &str) {
        LogWorkflowObserver.error(message);
    }
}

/// Preview pane state fed by the camera worker.
#[derive(Default)]
struct CameraFeed {
    preview: Option<image::Handle>,
    latest_frame: Option<Frame>,
    error: Option<String>,
}

impl CameraFeed {
    fn apply(&mut self, message: CameraMessage) {
        match message {
            CameraMessage::Frame(frame) => {
                self.preview = Some(image::Handle::from_rgba(
                    frame.width(),
                    frame.height(),
                    frame.to_rgba(),
                ));
                self.latest_frame = Some(frame);
                self.error = None;
            }
            // Nothing from before the failure may be captured.
            CameraMessage::Error(e) => {
                self.preview = None;
                self.latest_frame = None;
                self.error = Some(e);
            }
        }
    }

    fn snapshot(&self) -> PreviewSnapshot {
        PreviewSnapshot(self.latest_frame.clone())
    }
}

/// Serves the frame last shown in the preview as the captured photo.
struct PreviewSnapshot(Option<Frame>);

impl FrameSource for PreviewSnapshot {
    fn capture(&mut self) -> Result<Frame, Box<dyn std::error::Error>> {
        self.0
            .take()
            .ok_or_else(|| "the camera has not produced a frame yet".into())
    }
}

fn centered<'a>(content: impl Into<Element<'a, Message>>) -> Element<'a, Message> {
    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}

/// Photo URLs currently on screen: the leaderboard and the result card.
fn listed_urls<'a>(board: &'a Leaderboard, result: Option<&'a ScoreResult>) -> HashSet<&'a str> {
    board
        .entries()
        .iter()
        .map(|entry| entry.image_url.as_str())
        .chain(result.map(|r| r.image_url.as_str()))
        .collect()
}

fn retain_listed<V>(cache: &mut HashMap<String, V>, listed: &HashSet<&str>) {
    cache.retain(|url, _| listed.contains(url.as_str()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use smilebooth_core::scoring::domain::leaderboard::LeaderboardEntry;
    use smilebooth_core::scoring::domain::scoring_service::ScoringError;
    use smilebooth_core::scoring::domain::submission_request::SubmissionRequest;
    use std::thread;

    /// Rejects every upload; the board is always empty.
    struct RejectingService;

    impl ScoringService for RejectingService {
        fn upload(&self, _request: &SubmissionRequest) -> Result<ScoreResult, ScoringError> {
            Err(ScoringError::Status {
                url: "http://svc/upload-image/".into(),
                status: 503,
            })
        }

        fn scoreboard(&self) -> Result<Vec<LeaderboardEntry>, ScoringError> {
            Ok(Vec::new())
        }

        fn fetch_image(&self, _url: &str) -> Result<Vec<u8>, ScoringError> {
            Ok(Vec::new())
        }
    }

    struct SteadyCamera;

    impl FrameSource for SteadyCamera {
        fn capture(&mut self) -> Result<Frame, Box<dyn std::error::Error>> {
            Ok(frame())
        }
    }

    fn kiosk() -> App {
        let config = KioskConfig {
            countdown_start: 0,
            ..KioskConfig::default()
        };
        App::with_parts(config, Arc::new(RejectingService), Box::new(SteadyCamera))
    }

    /// Polls until the workflow leaves the busy states.
    fn settle(app: &mut App) {
        for _ in 0..500 {
            app.update(Message::Poll);
            if !app.workflow.is_busy() {
                return;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("workflow stayed busy");
    }

    fn frame() -> Frame {
        Frame::new(vec![200u8; 4 * 4 * 3], 4, 4)
    }

    fn entry(name: &str) -> LeaderboardEntry {
        LeaderboardEntry {
            name: name.into(),
            score: 50.0,
            image_url: format!("faces/{name}.jpg"),
        }
    }

    #[test]
    fn test_camera_error_discards_last_frame() {
        let mut feed = CameraFeed::default();
        feed.apply(CameraMessage::Frame(frame()));
        feed.apply(CameraMessage::Error("device unplugged".into()));
        assert!(feed.preview.is_none());

        let mut workflow = CaptureWorkflow::new(0, 85);
        workflow.start("Alice").unwrap();
        assert_eq!(workflow.state(), &WorkflowState::Capturing);

        assert!(workflow.capture(&mut feed.snapshot()).is_err());
        assert_eq!(workflow.state(), &WorkflowState::Idle);
    }

    #[test]
    fn test_frame_after_error_clears_it() {
        let mut feed = CameraFeed::default();
        feed.apply(CameraMessage::Error("device unplugged".into()));
        feed.apply(CameraMessage::Frame(frame()));
        assert!(feed.error.is_none());

        let mut workflow = CaptureWorkflow::new(0, 85);
        workflow.start("Alice").unwrap();
        assert!(workflow.capture(&mut feed.snapshot()).is_ok());
        assert_eq!(workflow.state(), &WorkflowState::Uploading);
    }

    #[test]
    fn test_photos_off_screen_are_evicted() {
        let board = Leaderboard::new(vec![entry("Al"), entry("Bo")]);
        let result = ScoreResult {
            name: "Zed".into(),
            score: 10.0,
            smile_percentage: 20.0,
            image_url: "faces/Zed.jpg".into(),
        };
        let mut cache: HashMap<String, ()> = ["Al", "Bo", "Cy", "Zed", "Old"]
            .iter()
            .map(|name| (format!("faces/{name}.jpg"), ()))
            .collect();

        retain_listed(&mut cache, &listed_urls(&board, Some(&result)));

        let mut kept: Vec<&str> = cache.keys().map(String::as_str).collect();
        kept.sort_unstable();
        assert_eq!(kept, ["faces/Al.jpg", "faces/Bo.jpg", "faces/Zed.jpg"]);
    }

    #[test]
    fn test_empty_board_without_result_clears_cache() {
        let mut cache: HashMap<String, ()> = HashMap::from([("faces/Al.jpg".to_string(), ())]);
        retain_listed(&mut cache, &listed_urls(&Leaderboard::default(), None));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_failed_upload_clears_name_field() {
        let mut app = kiosk();
        app.feed.apply(CameraMessage::Frame(frame()));
        app.update(Message::NameChanged("Alice".into()));
        app.update(Message::Submit);
        assert_eq!(app.workflow.state(), &WorkflowState::Uploading);

        settle(&mut app);

        assert_eq!(app.workflow.state(), &WorkflowState::Idle);
        assert!(app.name.is_empty());
        assert!(app.notice.is_some());
        assert!(app.workflow.last_result().is_none());
    }
}
