use std::io::{self, Stderr};

use anyhow::Result;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

/// Raw-mode alternate screen on stderr, so stdout stays free for the picked entry
pub struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stderr>>,
    active: bool,
}

impl TerminalSession {
    pub fn enter() -> Result<Self> {
        enable_raw_mode()?;
        let mut stderr = io::stderr();
        if let Err(e) = execute!(stderr, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e.into());
        }
        let terminal = Terminal::new(CrosstermBackend::new(stderr))?;
        Ok(Self { terminal, active: true })
    }

    pub fn terminal_mut(&mut self) -> &mut Terminal<CrosstermBackend<Stderr>> {
        &mut self.terminal
    }

    /// Restore the terminal, reporting failures
    pub fn leave(mut self) -> Result<()> {
        self.active = false;
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

// Restores the terminal on early return or panic
impl Drop for TerminalSession {
    fn drop(&mut self) {
        if self.active {
            let _ = disable_raw_mode();
            let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
            let _ = self.terminal.show_cursor();
        }
    }
}
