use std::io;

use tracing::debug;

use super::{
    App,
    event_loop::{EventLoop, TuiEvent},
};

/// Terminal application runtime.
///
/// Owns the event loop and drives an [`App`] until it asks to exit.
#[derive(Default, Debug)]
pub(crate) struct Runtime {
    events: EventLoop,
}

impl Runtime {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Runs the application.
    ///
    /// The terminal is put into raw mode on the alternate screen for the
    /// duration of the call and restored afterwards, even on error.
    ///
    /// - `TuiEvent::Render`: calls `app.draw()`
    /// - `TuiEvent::Crossterm`: calls `app.handle_event()`
    pub(crate) fn run<A>(mut self, app: &mut A) -> io::Result<()>
    where
        A: App,
    {
        ratatui::run(|terminal| {
            while !app.should_exit() {
                match self.events.next()? {
                    TuiEvent::Render => {
                        terminal.draw(|f| app.draw(f))?;
                    }
                    TuiEvent::Crossterm(event) => {
                        app.handle_event(&event);
                    }
                }
            }
            debug!("terminal application exited");
            Ok(())
        })
    }
}
