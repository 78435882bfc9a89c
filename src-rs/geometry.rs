/// A pointer coordinate in root-window space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl ScreenPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Size of the root window in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

/// Canonical selection rectangle. Only ever produced by [`DragVector::normalize`]
/// (or [`Rectangle::empty_at`] for the press location), so `w`/`h` are extents
/// from a top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rectangle {
    pub fn empty_at(point: ScreenPoint) -> Self {
        Self {
            x: point.x,
            y: point.y,
            w: 0,
            h: 0,
        }
    }

    /// True when nothing was (or would be) drawn for this rectangle.
    pub fn is_empty(&self) -> bool {
        self.w == 0 && self.h == 0
    }
}

/// Which corner the pointer is dragging towards. Only picks a cursor icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragVector {
    pub origin: ScreenPoint,
    pub current: ScreenPoint,
}

impl DragVector {
    pub fn starting_at(origin: ScreenPoint) -> Self {
        Self {
            origin,
            current: origin,
        }
    }

    pub fn direction(&self) -> Direction {
        let (dw, dh) = self.deltas();
        match (dw.signum(), dh.signum()) {
            (-1, -1) => Direction::NorthWest,
            (-1, 1) => Direction::SouthWest,
            (1, -1) => Direction::NorthEast,
            (1, 1) => Direction::SouthEast,
            _ => Direction::Neutral,
        }
    }

    pub fn normalize(&self) -> (Rectangle, Direction) {
        let (dw, dh) = self.deltas();
        let rect = Rectangle {
            // origin + min(delta, 0) is the smaller of the two coordinates
            x: self.origin.x.min(self.current.x),
            y: self.origin.y.min(self.current.y),
            w: dw.unsigned_abs() as u32,
            h: dh.unsigned_abs() as u32,
        };
        (rect, self.direction())
    }

    // i64 so that deltas between extreme i32 coordinates cannot overflow.
    fn deltas(&self) -> (i64, i64) {
        (
            i64::from(self.current.x) - i64::from(self.origin.x),
            i64::from(self.current.y) - i64::from(self.origin.y),
        )
    }
}
