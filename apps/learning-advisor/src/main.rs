mod app;
mod components;
mod config;
mod form;
mod logging;
mod remote;
mod task;
mod ui;

#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

use advisor_api::AdvisorClient;
use app::App;
use config::Config;
use task::Dispatcher;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    logging::init(&Config::log_path()?, &config.log.level)?;
    info!(base_url = %config.api.base_url, "starting learning advisor");

    let client = AdvisorClient::new(&config.api.base_url).context("building HTTP client")?;
    let mut dispatcher = Dispatcher::new(Arc::new(client));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config);
    let result = run_app(&mut terminal, &mut app, &mut dispatcher);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("exiting");
    result
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    dispatcher: &mut Dispatcher,
) -> Result<()> {
    let tick_rate = Duration::from_millis(100);

    loop {
        app.tick(Instant::now());
        for outgoing in app.take_outbox() {
            dispatcher.dispatch(outgoing);
        }

        terminal.draw(|frame| ui::render(frame, app))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_key(key) {
                    break;
                }
            }
        }

        while let Some(delivery) = dispatcher.try_next() {
            app.deliver(delivery);
        }
    }

    Ok(())
}
