use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;

use smilebooth_core::capture::infrastructure::frame_source_factory::create_frame_source;
use smilebooth_core::scoring::domain::leaderboard::Leaderboard;
use smilebooth_core::scoring::domain::score_result::{bar_fill, ScoreResult};
use smilebooth_core::scoring::domain::scoring_service::ScoringService;
use smilebooth_core::scoring::infrastructure::http_scoring_service::HttpScoringService;
use smilebooth_core::shared::config::KioskConfig;
use smilebooth_core::shared::constants::{IMAGE_EXTENSIONS, PROCESSING_TEXT};
use smilebooth_core::workflow::domain::capture_workflow::{CaptureWorkflow, WorkflowError};
use smilebooth_core::workflow::domain::workflow_observer::WorkflowObserver;
use smilebooth_core::workflow::domain::workflow_state::WorkflowState;
use smilebooth_core::workflow::infrastructure::countdown_timer::CountdownTimer;
use smilebooth_core::workflow::leaderboard_poller::LeaderboardPoller;
use smilebooth_core::workflow::submit_photo_use_case::SubmitPhotoUseCase;

const BAR_WIDTH: usize = 30;
const QUIT_COMMAND: &str = ":q";

/// Smile-scoring photo kiosk for the terminal.
#[derive(Parser)]
#[command(name = "smilebooth")]
struct Cli {
    /// Scoring service root URL (overrides the config file and SMILEBOOTH_BASE_URL).
    #[arg(long)]
    base_url: Option<String>,

    /// Config file (defaults to the platform config directory).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Submit this image instead of capturing from a camera.
    #[arg(long)]
    still: Option<PathBuf>,

    /// Camera device, e.g. /dev/video0.
    #[arg(long)]
    device: Option<String>,

    /// libavdevice input format, e.g. v4l2, avfoundation, dshow.
    #[arg(long)]
    input_format: Option<String>,

    /// Countdown start value in seconds.
    #[arg(long)]
    countdown: Option<u32>,

    /// HTTP request timeout in seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Submit once for this name and exit.
    #[arg(long)]
    name: Option<String>,

    /// Print the leaderboard and exit.
    #[arg(long)]
    leaderboard: bool,

    /// Save the effective settings (file, environment and flags merged) to
    /// this path and exit.
    #[arg(long, value_name = "PATH")]
    write_config: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(&cli)?;
    validate(&cli)?;

    if let Some(path) = &cli.write_config {
        config.save_to(path)?;
        log::info!("Wrote config to {}", path.display());
        return Ok(());
    }

    let service: Arc<dyn ScoringService> = Arc::new(HttpScoringService::from_config(&config)?);
    log::info!("Scoring service: {}", config.base_url);

    if cli.leaderboard {
        let mut poller = LeaderboardPoller::new(service);
        poller.fetch()?;
        print_leaderboard(poller.leaderboard());
        return Ok(());
    }

    let source = create_frame_source(&config.camera);
    let workflow = CaptureWorkflow::from_config(&config).with_observer(Box::new(TerminalObserver));
    // The handle must outlive the session: dropping it cancels every wait.
    let (timer, _cancel) = CountdownTimer::new(config.tick_interval());
    let mut use_case = SubmitPhotoUseCase::new(workflow, source, service, timer);

    use_case.mount();
    print_leaderboard(use_case.poller().leaderboard());

    if let Some(name) = cli.name {
        let result = use_case.execute(&name)?;
        print_result(&result);
        print_leaderboard(use_case.poller().leaderboard());
        return Ok(());
    }

    let stdin = io::stdin();
    loop {
        let Some(line) = prompt(&stdin)? else {
            break;
        };
        if line.trim() == QUIT_COMMAND {
            break;
        }
        match use_case.execute(&line) {
            Ok(result) => {
                print_result(&result);
                print_leaderboard(use_case.poller().leaderboard());
            }
            Err(WorkflowError::EmptyName) => eprintln!("Please enter a name first."),
            Err(e) => eprintln!("Submission failed: {e}"),
        }
    }
    Ok(())
}

fn build_config(cli: &Cli) -> Result<KioskConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => KioskConfig::load_from(path)?,
        None => KioskConfig::load(),
    };
    config.apply_env();

    if let Some(url) = &cli.base_url {
        config.base_url = url.clone();
    }
    if let Some(device) = &cli.device {
        config.camera.device = device.clone();
    }
    if let Some(path) = &cli.still {
        config.camera.still_image = Some(path.clone());
    }
    if let Some(format) = &cli.input_format {
        config.camera.input_format = Some(format.clone());
    }
    if let Some(countdown) = cli.countdown {
        config.countdown_start = countdown;
    }
    if let Some(timeout) = cli.timeout {
        config.request_timeout_secs = timeout;
    }
    config.validate()?;
    Ok(config)
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = &cli.still {
        if !path.exists() {
            return Err(format!("Still image not found: {}", path.display()).into());
        }
        let supported = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false);
        if !supported {
            return Err(format!("Unsupported image type: {}", path.display()).into());
        }
    }
    if cli.leaderboard && cli.name.is_some() {
        return Err("--leaderboard and --name are mutually exclusive".into());
    }
    Ok(())
}

/// Reads one name from stdin; `None` on end of input.
fn prompt(stdin: &io::Stdin) -> Result<Option<String>, io::Error> {
    eprint!("\nName ({QUIT_COMMAND} to quit): ");
    io::stderr().flush()?;
    let mut line = String::new();
    if stdin.lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

fn print_result(result: &ScoreResult) {
    let filled = (bar_fill(result.smile_percentage) * BAR_WIDTH as f32).round() as usize;
    println!();
    println!("{}", result.name);
    println!("Score: {}", result.score_label());
    println!("Smile Percentage: {}", result.smile_label());
    println!(
        "[{}{}] {}",
        "#".repeat(filled),
        " ".repeat(BAR_WIDTH - filled),
        result.band()
    );
    println!("Photo: {}", result.image_url);
}

fn print_leaderboard(board: &Leaderboard) {
    println!();
    println!("Leaderboard");
    if board.is_empty() {
        println!("  (no entries yet)");
    }
    for (rank, entry) in board.ranked() {
        println!(
            "  {:<24} {}",
            Leaderboard::heading(rank, entry),
            entry.score_label()
        );
    }
}

/// Renders the countdown and capture feedback on stderr.
struct TerminalObserver;

impl WorkflowObserver for TerminalObserver {
    fn transition(&mut self, _from: &WorkflowState, to: &WorkflowState) {
        match to {
            WorkflowState::Countdown(n) if *n > 0 => eprint!("{n}... "),
            WorkflowState::Uploading => eprintln!("\n{PROCESSING_TEXT}"),
            _ => {}
        }
    }

    fn flash(&mut self) {
        eprint!("*click*");
    }

    fn error(&mut self, message: &str) {
        log::warn!("{message}");
    }
}
