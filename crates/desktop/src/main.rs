mod app;
mod theme;
mod widgets;
mod workers;

use std::process;

use smilebooth_core::scoring::infrastructure::http_scoring_service::HttpScoringService;
use smilebooth_core::shared::config::KioskConfig;

use app::App;

fn main() -> iced::Result {
    env_logger::init();

    let (config, service) = match setup() {
        Ok(parts) => parts,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };
    log::info!("Scoring service: {}", config.base_url);

    iced::application(
        move || App::new(config.clone(), service.clone()),
        App::update,
        App::view,
    )
    .title("SmileBooth")
    .theme(App::theme)
    .subscription(App::subscription)
    .window(iced::window::Settings {
        size: iced::Size::new(1280.0, 800.0),
        ..Default::default()
    })
    .run()
}

fn setup() -> Result<(KioskConfig, HttpScoringService), Box<dyn std::error::Error>> {
    let mut config = KioskConfig::load();
    config.apply_env();
    config.validate()?;
    let service = HttpScoringService::from_config(&config)?;
    Ok((config, service))
}
