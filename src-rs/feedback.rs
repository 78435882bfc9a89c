use crate::geometry::{Direction, Rectangle};
use crate::server::{ConnectionLost, DisplayServer};

// Outlines are XOR-painted: painting `previous` again erases it. Empty
// rectangles are never painted, so erases and draws stay paired.
pub fn update<S: DisplayServer>(
    server: &mut S,
    previous: Rectangle,
    next: Rectangle,
    direction: Direction,
) -> Result<(), ConnectionLost> {
    if !previous.is_empty() {
        server.draw_outline(previous)?;
    }
    if direction != Direction::Neutral {
        server.set_active_cursor(direction)?;
    }
    if !next.is_empty() {
        server.draw_outline(next)?;
    }
    server.flush()
}

pub fn clear<S: DisplayServer>(server: &mut S, last: Rectangle) -> Result<(), ConnectionLost> {
    if last.is_empty() {
        return Ok(());
    }
    server.draw_outline(last)?;
    server.flush()
}
