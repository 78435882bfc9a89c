use thiserror::Error;
use x11rb::connection::Connection;
use x11rb::errors::{ConnectError, ConnectionError, ReplyError, ReplyOrIdError};
use x11rb::protocol::xproto::{
    self, CapStyle, ChangeGCAux, Colormap, ConnectionExt as _, CreateGCAux, Cursor, EventMask,
    Gcontext, GrabMode, GrabStatus, JoinStyle, GX, SubwindowMode, Window,
};
use x11rb::protocol::Event;
use x11rb::rust_connection::{PollMode, RustConnection, Stream as _};
use x11rb::CURRENT_TIME;

use crate::geometry::{Direction, Rectangle, ScreenPoint, ScreenSize};
use crate::server::{ConnectionLost, DisplayServer, InputEvent};
use crate::style::{BorderStyle, LineStyle, Rgb16, StyleError};

// Glyph indices in the standard "cursor" font.
const XC_CROSSHAIR: u16 = 34;
const XC_LL_ANGLE: u16 = 76;
const XC_LR_ANGLE: u16 = 78;
const XC_UL_ANGLE: u16 = 144;
const XC_UR_ANGLE: u16 = 148;

#[derive(Debug, Error)]
pub enum X11Error {
    #[error("failed to open X display: {0}")]
    Connect(#[from] ConnectError),
    #[error(transparent)]
    Lost(#[from] ConnectionLost),
    #[error(transparent)]
    Style(#[from] StyleError),
}

impl From<ConnectionError> for ConnectionLost {
    fn from(err: ConnectionError) -> Self {
        ConnectionLost::new(err.to_string())
    }
}

impl From<ReplyError> for ConnectionLost {
    fn from(err: ReplyError) -> Self {
        ConnectionLost::new(err.to_string())
    }
}

impl From<ReplyOrIdError> for ConnectionLost {
    fn from(err: ReplyOrIdError) -> Self {
        ConnectionLost::new(err.to_string())
    }
}

impl From<ConnectionError> for X11Error {
    fn from(err: ConnectionError) -> Self {
        X11Error::Lost(err.into())
    }
}

impl From<ReplyError> for X11Error {
    fn from(err: ReplyError) -> Self {
        X11Error::Lost(err.into())
    }
}

impl From<ReplyOrIdError> for X11Error {
    fn from(err: ReplyOrIdError) -> Self {
        X11Error::Lost(err.into())
    }
}

struct Cursors {
    neutral: Cursor,
    north_west: Cursor,
    north_east: Cursor,
    south_west: Cursor,
    south_east: Cursor,
}

impl Cursors {
    fn load(conn: &RustConnection) -> Result<Self, ReplyOrIdError> {
        let font = conn.generate_id()?;
        conn.open_font(font, b"cursor")?;
        let glyph_cursor = |glyph: u16| -> Result<Cursor, ReplyOrIdError> {
            let cursor = conn.generate_id()?;
            // black on white, the mask glyph follows its source glyph
            conn.create_glyph_cursor(
                cursor,
                font,
                font,
                glyph,
                glyph + 1,
                0,
                0,
                0,
                0xffff,
                0xffff,
                0xffff,
            )?;
            Ok(cursor)
        };
        let cursors = Self {
            neutral: glyph_cursor(XC_CROSSHAIR)?,
            north_west: glyph_cursor(XC_UL_ANGLE)?,
            north_east: glyph_cursor(XC_UR_ANGLE)?,
            south_west: glyph_cursor(XC_LL_ANGLE)?,
            south_east: glyph_cursor(XC_LR_ANGLE)?,
        };
        conn.close_font(font)?;
        Ok(cursors)
    }

    fn for_direction(&self, direction: Direction) -> Cursor {
        match direction {
            Direction::NorthWest => self.north_west,
            Direction::NorthEast => self.north_east,
            Direction::SouthWest => self.south_west,
            Direction::SouthEast => self.south_east,
            Direction::Neutral => self.neutral,
        }
    }

    fn all(&self) -> [Cursor; 5] {
        [
            self.neutral,
            self.north_west,
            self.north_east,
            self.south_west,
            self.south_east,
        ]
    }
}

/// [`DisplayServer`] over a live X11 connection, drawing on the root window
/// of the default screen.
pub struct X11Server {
    conn: RustConnection,
    root: Window,
    colormap: Colormap,
    gc: Gcontext,
    cursors: Cursors,
    released: bool,
}

impl X11Server {
    /// The outline is white until [`Self::set_border`].
    pub fn open(display: Option<&str>) -> Result<Self, X11Error> {
        let (conn, screen_num) = x11rb::connect(display)?;
        let (root, colormap, white, black) = {
            let screen = &conn.setup().roots[screen_num];
            (
                screen.root,
                screen.default_colormap,
                screen.white_pixel,
                screen.black_pixel,
            )
        };
        log::debug!("connected to X screen {screen_num}, root window {root:#x}");

        let cursors = Cursors::load(&conn)?;
        let gc = conn.generate_id()?;
        conn.create_gc(
            gc,
            root,
            &CreateGCAux::new()
                .function(GX::XOR)
                .foreground(white)
                .background(black)
                .subwindow_mode(SubwindowMode::INCLUDE_INFERIORS),
        )?;

        Ok(Self {
            conn,
            root,
            colormap,
            gc,
            cursors,
            released: false,
        })
    }

    /// Resolve a color name through the server's color database.
    pub fn lookup_color(&self, name: &str) -> Result<Rgb16, X11Error> {
        match self.conn.lookup_color(self.colormap, name.as_bytes())?.reply() {
            Ok(reply) => Ok(Rgb16 {
                red: reply.exact_red,
                green: reply.exact_green,
                blue: reply.exact_blue,
            }),
            Err(ReplyError::X11Error(_)) => Err(StyleError::UnknownColor(name.to_string()).into()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn set_border(&mut self, style: BorderStyle) -> Result<(), X11Error> {
        let Rgb16 { red, green, blue } = style.color;
        let pixel = self
            .conn
            .alloc_color(self.colormap, red, green, blue)?
            .reply()?
            .pixel;
        self.conn.change_gc(
            self.gc,
            &ChangeGCAux::new()
                .foreground(pixel)
                .line_width(u32::from(style.width))
                .line_style(wire_line_style(style.line))
                .cap_style(CapStyle::BUTT)
                .join_style(JoinStyle::MITER),
        )?;
        Ok(())
    }
}

impl DisplayServer for X11Server {
    fn screen_size(&mut self) -> Result<ScreenSize, ConnectionLost> {
        let geometry = self.conn.get_geometry(self.root)?.reply()?;
        Ok(ScreenSize {
            width: u32::from(geometry.width),
            height: u32::from(geometry.height),
        })
    }

    fn grab_pointer(&mut self) -> Result<bool, ConnectionLost> {
        let reply = self
            .conn
            .grab_pointer(
                false,
                self.root,
                EventMask::BUTTON_MOTION | EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
                self.root,
                self.cursors.neutral,
                CURRENT_TIME,
            )?
            .reply()
            .map(|reply| reply.status);
        granted(reply)
    }

    fn grab_keyboard(&mut self) -> Result<bool, ConnectionLost> {
        let reply = self
            .conn
            .grab_keyboard(false, self.root, CURRENT_TIME, GrabMode::ASYNC, GrabMode::ASYNC)?
            .reply()
            .map(|reply| reply.status);
        granted(reply)
    }

    fn grab_server(&mut self) -> Result<bool, ConnectionLost> {
        let checked = self
            .conn
            .grab_server()?
            .check()
            .map(|()| GrabStatus::SUCCESS);
        granted(checked)
    }

    fn ungrab_pointer(&mut self) -> Result<(), ConnectionLost> {
        self.conn.ungrab_pointer(CURRENT_TIME)?;
        Ok(())
    }

    fn ungrab_keyboard(&mut self) -> Result<(), ConnectionLost> {
        self.conn.ungrab_keyboard(CURRENT_TIME)?;
        Ok(())
    }

    fn ungrab_server(&mut self) -> Result<(), ConnectionLost> {
        self.conn.ungrab_server()?;
        Ok(())
    }

    fn release_resources(&mut self) -> Result<(), ConnectionLost> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        for cursor in self.cursors.all() {
            self.conn.free_cursor(cursor)?;
        }
        self.conn.free_gc(self.gc)?;
        Ok(())
    }

    fn sync(&mut self) -> Result<(), ConnectionLost> {
        self.conn.get_input_focus()?.reply()?;
        Ok(())
    }

    fn draw_outline(&mut self, rect: Rectangle) -> Result<(), ConnectionLost> {
        self.conn.poly_rectangle(self.root, self.gc, &[wire_rectangle(rect)])?;
        Ok(())
    }

    fn set_active_cursor(&mut self, direction: Direction) -> Result<(), ConnectionLost> {
        self.conn.change_active_pointer_grab(
            self.cursors.for_direction(direction),
            CURRENT_TIME,
            EventMask::BUTTON_MOTION | EventMask::BUTTON_RELEASE,
        )?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ConnectionLost> {
        self.conn.flush()?;
        Ok(())
    }

    fn poll_event(&mut self) -> Result<Option<InputEvent>, ConnectionLost> {
        Ok(self.conn.poll_for_event()?.map(translate))
    }

    fn wait_for_input(&mut self) -> Result<(), ConnectionLost> {
        self.conn
            .stream()
            .poll(PollMode::Readable)
            .map_err(|err| ConnectionLost::new(err.to_string()))
    }
}

fn granted(reply: Result<GrabStatus, ReplyError>) -> Result<bool, ConnectionLost> {
    match reply {
        Ok(status) => {
            if status != GrabStatus::SUCCESS {
                log::debug!("grab refused: {status:?}");
            }
            Ok(status == GrabStatus::SUCCESS)
        }
        Err(ReplyError::X11Error(err)) => {
            log::warn!("grab rejected by server: {err:?}");
            Ok(false)
        }
        Err(ReplyError::ConnectionError(err)) => Err(err.into()),
    }
}

fn translate(event: Event) -> InputEvent {
    match event {
        Event::MotionNotify(e) => InputEvent::Motion(root_point(e.root_x, e.root_y)),
        Event::ButtonPress(e) => InputEvent::ButtonDown(root_point(e.root_x, e.root_y)),
        Event::ButtonRelease(e) => InputEvent::ButtonUp(root_point(e.root_x, e.root_y)),
        Event::KeyPress(_) => InputEvent::KeyDown,
        Event::KeyRelease(_) => InputEvent::KeyRelease,
        Event::Error(err) => {
            log::warn!("X protocol error: {err:?}");
            InputEvent::Other
        }
        _ => InputEvent::Other,
    }
}

fn root_point(x: i16, y: i16) -> ScreenPoint {
    ScreenPoint::new(i32::from(x), i32::from(y))
}

fn wire_rectangle(rect: Rectangle) -> xproto::Rectangle {
    let clamp_pos = |v: i32| v.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16;
    xproto::Rectangle {
        x: clamp_pos(rect.x),
        y: clamp_pos(rect.y),
        width: u16::try_from(rect.w).unwrap_or(u16::MAX),
        height: u16::try_from(rect.h).unwrap_or(u16::MAX),
    }
}

fn wire_line_style(line: LineStyle) -> xproto::LineStyle {
    match line {
        LineStyle::Solid => xproto::LineStyle::SOLID,
        LineStyle::Dash => xproto::LineStyle::ON_OFF_DASH,
        LineStyle::DoubleDash => xproto::LineStyle::DOUBLE_DASH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use x11rb::protocol::ErrorKind;
    use x11rb::x11_utils::X11Error as X11ProtocolError;

    #[test]
    fn pointer_events_use_root_coordinates() {
        let motion = xproto::MotionNotifyEvent {
            root_x: 300,
            root_y: -2,
            event_x: 7,
            event_y: 9,
            ..Default::default()
        };
        assert_eq!(
            translate(Event::MotionNotify(motion)),
            InputEvent::Motion(ScreenPoint::new(300, -2))
        );

        let button = xproto::ButtonPressEvent {
            root_x: 10,
            root_y: 20,
            event_x: 1,
            event_y: 2,
            ..Default::default()
        };
        assert_eq!(
            translate(Event::ButtonPress(button)),
            InputEvent::ButtonDown(ScreenPoint::new(10, 20))
        );
        assert_eq!(
            translate(Event::ButtonRelease(button)),
            InputEvent::ButtonUp(ScreenPoint::new(10, 20))
        );
    }

    #[test]
    fn key_press_and_release_stay_distinct() {
        let key = xproto::KeyPressEvent {
            detail: 38,
            ..Default::default()
        };
        assert_eq!(translate(Event::KeyPress(key)), InputEvent::KeyDown);
        assert_eq!(translate(Event::KeyRelease(key)), InputEvent::KeyRelease);
    }

    #[test]
    fn protocol_errors_and_unrelated_events_are_other() {
        let error = X11ProtocolError {
            error_kind: ErrorKind::Match,
            error_code: 8,
            sequence: 12,
            bad_value: 0,
            minor_opcode: 0,
            major_opcode: 67,
            extension_name: None,
            request_name: Some("PolyRectangle"),
        };
        assert_eq!(translate(Event::Error(error)), InputEvent::Other);
        assert_eq!(
            translate(Event::Expose(xproto::ExposeEvent::default())),
            InputEvent::Other
        );
    }

    #[test]
    fn wire_rectangle_clamps_to_protocol_range() {
        let wire = wire_rectangle(Rectangle {
            x: -40_000,
            y: 12,
            w: 70_000,
            h: 5,
        });
        assert_eq!(wire.x, i16::MIN);
        assert_eq!(wire.y, 12);
        assert_eq!(wire.width, u16::MAX);
        assert_eq!(wire.height, 5);
    }

    #[test]
    fn refused_grab_is_not_a_lost_connection() {
        assert!(!granted(Ok(GrabStatus::ALREADY_GRABBED)).unwrap());
        assert!(!granted(Ok(GrabStatus::FROZEN)).unwrap());
        assert!(granted(Ok(GrabStatus::SUCCESS)).unwrap());
    }

    #[test]
    fn line_styles_map_to_protocol_values() {
        assert_eq!(wire_line_style(LineStyle::Dash), xproto::LineStyle::ON_OFF_DASH);
        assert_eq!(
            wire_line_style(LineStyle::DoubleDash),
            xproto::LineStyle::DOUBLE_DASH
        );
    }
}
