use std::io;

use crossterm::event::{self, Event};

/// Events processed by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum TuiEvent {
    /// The screen is out of date and must be drawn.
    Render,
    /// Terminal events such as key input, mouse, and resize.
    Crossterm(Event),
}

/// Render-on-dirty event loop.
///
/// A render is requested once at startup and after every terminal event.
/// Between events the loop blocks; nothing is redrawn while idle.
#[derive(Debug)]
pub(super) struct EventLoop {
    dirty: bool,
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLoop {
    pub(super) fn new() -> Self {
        // Initial render is required on startup
        Self { dirty: true }
    }

    /// Returns the next event, blocking on the terminal if nothing is pending.
    pub(super) fn next(&mut self) -> io::Result<TuiEvent> {
        self.next_with(event::read)
    }

    fn next_with<F>(&mut self, read: F) -> io::Result<TuiEvent>
    where
        F: FnOnce() -> io::Result<Event>,
    {
        if self.dirty {
            self.dirty = false;
            return Ok(TuiEvent::Render);
        }
        let event = read()?;
        self.dirty = true;
        Ok(TuiEvent::Crossterm(event))
    }
}
