use crossterm::event::Event;
use ratatui::Frame;

/// Trait for applications driven by [`Runtime`](super::Runtime).
pub(crate) trait App {
    /// Returns whether the application should exit.
    fn should_exit(&self) -> bool;

    /// Handles terminal events (key input, mouse, resize, etc.).
    fn handle_event(&mut self, event: &Event);

    /// Draws the screen from the current state.
    ///
    /// Must not change state; everything drawn is derived in `handle_event`.
    fn draw(&self, frame: &mut Frame);
}
