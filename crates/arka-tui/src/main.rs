use anyhow::Result;
use arka_core::{logging, Config};
use tracing::{info, warn};

mod app;
mod handler;
mod markdown;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[tokio::main]
async fn main() -> Result<()> {
    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(err) => (Config::new(), Some(err)),
    };

    let _log_guard = logging::init_logging(&config.log_level)?;
    if let Some(err) = config_error {
        warn!(error = %err, "could not read config, using defaults");
    }
    info!(endpoint = %config.endpoint, "starting chat widget");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let result = match App::new(&config, events.sender()) {
        Ok(mut app) => run(&mut terminal, &mut app, &mut events).await,
        Err(err) => Err(err),
    };

    tui::restore()?;
    result
}

async fn run(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }
    }

    info!("shutting down");
    Ok(())
}
