use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

/// Raw-mode, alternate-screen terminal that is restored on drop and on panic.
pub struct TuiTerminal {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    restored: bool,
}

impl TuiTerminal {
    /// Switch the terminal into raw mode on the alternate screen.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the terminal cannot be set up.
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        rollback_on_err(execute!(stdout, EnterAlternateScreen), || {
            let _ = disable_raw_mode();
        })?;
        let terminal =
            rollback_on_err(Terminal::new(CrosstermBackend::new(stdout)), leave_terminal)?;

        // Leave raw mode before the panic message is printed.
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            leave_terminal();
            original_hook(panic_info);
        }));

        Ok(Self {
            terminal,
            restored: false,
        })
    }

    pub fn terminal(&mut self) -> &mut Terminal<CrosstermBackend<Stdout>> {
        &mut self.terminal
    }

    /// Restore the terminal to normal state. Safe to call more than once.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the terminal cannot be restored.
    pub fn restore(&mut self) -> io::Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for TuiTerminal {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

/// Undo a partial setup when a later step fails.
fn rollback_on_err<T>(result: io::Result<T>, rollback: impl FnOnce()) -> io::Result<T> {
    result.inspect_err(|_| rollback())
}

fn leave_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

/// Wait up to `timeout` for the next terminal event.
///
/// # Errors
///
/// Returns the underlying I/O error if polling or reading fails.
pub fn poll_event(timeout: Duration) -> io::Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}
