//! TUI entry point and terminal setup.

use std::io;
use std::sync::Arc;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::CrosstermBackend, Terminal};
use tokio::runtime::Handle;
use tracing::info;

use crate::gateway::TaskGateway;
use crate::tui::app::App;

/// Initialise and run the terminal user interface until the user quits.
///
/// Gateway calls run on the runtime behind `handle`; the UI loop stays on
/// the calling thread.
pub fn run_tui(handle: Handle, gateway: Arc<dyn TaskGateway>) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(handle, gateway);
    app.start();
    let result = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("interactive screen closed");
    result
}
