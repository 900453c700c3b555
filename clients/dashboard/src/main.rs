use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};
use std::{io, time::Duration};
use tracing::{error, info};

use dashboard::{
    ApiClient, ClientConfig, SessionContext, SessionStorage, app::App, logging::init_file_logging,
    ui,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ClientConfig::from_env();

    if let Some(path) = &config.log_file {
        init_file_logging(path)?;
    }

    info!("Starting dashboard against {}", config.api_url);

    let client = ApiClient::new(&config.api_url)?;
    let session = SessionContext::hydrate(client, SessionStorage::new(config.session_file.clone()));
    let mut app = App::new(session);

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        error!("Dashboard exited with error: {:?}", e);
    }
    result
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let mut pending = app.startup_command();

    loop {
        while let Some(command) = pending.take() {
            app.mark_pending(&command);
            terminal.draw(|frame| ui::draw(frame, app))?;
            pending = app.run(command).await;
        }

        app.notifications.prune();
        terminal.draw(|frame| ui::draw(frame, app))?;

        if app.should_quit {
            return Ok(());
        }

        // Poll so toasts expire without a key press
        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    pending = app.handle_key(key);
                }
            }
        }
    }
}
