use thiserror::Error;

use crate::geometry::{Direction, Rectangle, ScreenPoint, ScreenSize};

/// The display connection stopped being usable. Fatal for the run.
#[derive(Debug, Clone, Error)]
#[error("connection to X display lost: {reason}")]
pub struct ConnectionLost {
    pub reason: String,
}

impl ConnectionLost {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Input delivered while the grabs are held, already translated out of the
/// wire protocol. Closed on purpose: a new kind must be handled by every match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Motion(ScreenPoint),
    ButtonDown(ScreenPoint),
    ButtonUp(ScreenPoint),
    KeyDown,
    KeyRelease,
    Other,
}

/// Everything the selection core needs from the display server.
///
/// Grab requests answer `Ok(false)` when the server refuses the grab and
/// reserve `Err` for a broken connection. Drawing and cursor changes are
/// queued until [`DisplayServer::flush`].
pub trait DisplayServer {
    fn screen_size(&mut self) -> Result<ScreenSize, ConnectionLost>;

    fn grab_pointer(&mut self) -> Result<bool, ConnectionLost>;
    fn grab_keyboard(&mut self) -> Result<bool, ConnectionLost>;
    fn grab_server(&mut self) -> Result<bool, ConnectionLost>;

    fn ungrab_pointer(&mut self) -> Result<(), ConnectionLost>;
    fn ungrab_keyboard(&mut self) -> Result<(), ConnectionLost>;
    fn ungrab_server(&mut self) -> Result<(), ConnectionLost>;
    fn release_resources(&mut self) -> Result<(), ConnectionLost>;
    /// Round-trip so that every queued request has been processed.
    fn sync(&mut self) -> Result<(), ConnectionLost>;

    fn draw_outline(&mut self, rect: Rectangle) -> Result<(), ConnectionLost>;
    /// Swap the cursor of the active pointer grab without re-grabbing.
    fn set_active_cursor(&mut self, direction: Direction) -> Result<(), ConnectionLost>;
    fn flush(&mut self) -> Result<(), ConnectionLost>;

    fn poll_event(&mut self) -> Result<Option<InputEvent>, ConnectionLost>;
    /// Block until the connection has something to read.
    fn wait_for_input(&mut self) -> Result<(), ConnectionLost>;
}
