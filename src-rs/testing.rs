//! Scripted [`DisplayServer`] for unit tests.

use std::collections::VecDeque;
use std::io;

use crate::geometry::{Direction, Rectangle, ScreenSize};
use crate::server::{ConnectionLost, DisplayServer, InputEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    GrabPointer,
    GrabKeyboard,
    GrabServer,
    UngrabPointer,
    UngrabKeyboard,
    UngrabServer,
    ReleaseResources,
    Sync,
    Draw(Rectangle),
    Cursor(Direction),
    Flush,
}

/// Replays event batches: each batch is what one wake-up delivers. When the
/// batches run out, waiting reports a lost connection so a test cannot hang.
pub struct MockServer {
    pub calls: Vec<Call>,
    pub screen: ScreenSize,
    pub pointer_ok: bool,
    pub keyboard_ok: bool,
    pub server_ok: bool,
    pub broken: bool,
    pending: VecDeque<InputEvent>,
    batches: VecDeque<Vec<InputEvent>>,
}

impl MockServer {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            screen: ScreenSize {
                width: 1000,
                height: 800,
            },
            pointer_ok: true,
            keyboard_ok: true,
            server_ok: true,
            broken: false,
            pending: VecDeque::new(),
            batches: VecDeque::new(),
        }
    }

    pub fn with_batches(batches: Vec<Vec<InputEvent>>) -> Self {
        let mut server = Self::new();
        server.batches = batches.into();
        server
    }

    pub fn draws(&self) -> Vec<Rectangle> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Draw(rect) => Some(*rect),
                _ => None,
            })
            .collect()
    }

    pub fn cursors(&self) -> Vec<Direction> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Cursor(dir) => Some(*dir),
                _ => None,
            })
            .collect()
    }

    pub fn releases(&self) -> Vec<Call> {
        self.calls
            .iter()
            .copied()
            .filter(|call| {
                matches!(
                    call,
                    Call::UngrabPointer
                        | Call::UngrabKeyboard
                        | Call::UngrabServer
                        | Call::ReleaseResources
                )
            })
            .collect()
    }

    fn record(&mut self, call: Call) -> Result<(), ConnectionLost> {
        self.calls.push(call);
        if self.broken {
            return Err(ConnectionLost::new("mock connection broken"));
        }
        Ok(())
    }
}

impl DisplayServer for MockServer {
    fn screen_size(&mut self) -> Result<ScreenSize, ConnectionLost> {
        Ok(self.screen)
    }

    fn grab_pointer(&mut self) -> Result<bool, ConnectionLost> {
        self.record(Call::GrabPointer)?;
        Ok(self.pointer_ok)
    }

    fn grab_keyboard(&mut self) -> Result<bool, ConnectionLost> {
        self.record(Call::GrabKeyboard)?;
        Ok(self.keyboard_ok)
    }

    fn grab_server(&mut self) -> Result<bool, ConnectionLost> {
        self.record(Call::GrabServer)?;
        Ok(self.server_ok)
    }

    fn ungrab_pointer(&mut self) -> Result<(), ConnectionLost> {
        self.record(Call::UngrabPointer)
    }

    fn ungrab_keyboard(&mut self) -> Result<(), ConnectionLost> {
        self.record(Call::UngrabKeyboard)
    }

    fn ungrab_server(&mut self) -> Result<(), ConnectionLost> {
        self.record(Call::UngrabServer)
    }

    fn release_resources(&mut self) -> Result<(), ConnectionLost> {
        self.record(Call::ReleaseResources)
    }

    fn sync(&mut self) -> Result<(), ConnectionLost> {
        self.record(Call::Sync)
    }

    fn draw_outline(&mut self, rect: Rectangle) -> Result<(), ConnectionLost> {
        self.record(Call::Draw(rect))
    }

    fn set_active_cursor(&mut self, direction: Direction) -> Result<(), ConnectionLost> {
        self.record(Call::Cursor(direction))
    }

    fn flush(&mut self) -> Result<(), ConnectionLost> {
        self.record(Call::Flush)
    }

    fn poll_event(&mut self) -> Result<Option<InputEvent>, ConnectionLost> {
        if self.broken {
            return Err(ConnectionLost::new("mock connection broken"));
        }
        Ok(self.pending.pop_front())
    }

    fn wait_for_input(&mut self) -> Result<(), ConnectionLost> {
        match self.batches.pop_front() {
            Some(batch) => {
                self.pending.extend(batch);
                Ok(())
            }
            None => {
                self.broken = true;
                Err(ConnectionLost::new("mock ran out of input"))
            }
        }
    }
}

/// Counts the `write` calls that reach the underlying sink.
#[derive(Debug, Default)]
pub struct CountingWriter {
    pub writes: usize,
    pub bytes: Vec<u8>,
}

impl io::Write for CountingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writes += 1;
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
