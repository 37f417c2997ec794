//! Binary entry point: read settings, start logging, connect to the backend and
//! drive the Ratatui event loop until the user exits.
use log::info;
use venue_manager::{init_logger, run_app, App, AppConfig, QueryClient};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_logger(&config.log_path()?, config.log_level())?;
    info!("starting venue-manager");

    let gateway = config.connect()?;
    let mut app = App::new(QueryClient::new(gateway), config.toast_duration());
    run_app(&mut app)
}
