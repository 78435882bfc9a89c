use crate::feedback;
use crate::geometry::{DragVector, Rectangle};
use crate::grab::{Grab, GrabError, GrabOptions};
use crate::server::{ConnectionLost, DisplayServer, InputEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    Committed(Rectangle),
    Aborted,
    ConnectionLost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    /// `shown` is the outline currently on screen (empty when none is).
    Dragging { drag: DragVector, shown: Rectangle },
}

pub struct SelectionSession<'a, S: DisplayServer> {
    grab: Grab<'a, S>,
    state: State,
}

impl<'a, S: DisplayServer> SelectionSession<'a, S> {
    pub fn start(server: &'a mut S, options: GrabOptions) -> Result<Self, GrabError> {
        let grab = Grab::acquire(server, options)?;
        Ok(Self {
            grab,
            state: State::Idle,
        })
    }

    pub fn run(mut self) -> SelectionOutcome {
        let outcome = match self.event_loop() {
            Ok(outcome) => outcome,
            Err(err) => {
                log::debug!("selection ended: {err}");
                SelectionOutcome::ConnectionLost
            }
        };
        self.grab.release();
        outcome
    }

    fn event_loop(&mut self) -> Result<SelectionOutcome, ConnectionLost> {
        loop {
            // Drain everything already queued before blocking again.
            while let Some(event) = self.grab.poll_event()? {
                if let Some(outcome) = self.handle(event)? {
                    return Ok(outcome);
                }
            }
            self.grab.wait_for_input()?;
        }
    }

    fn handle(&mut self, event: InputEvent) -> Result<Option<SelectionOutcome>, ConnectionLost> {
        match (self.state, event) {
            (State::Idle, InputEvent::ButtonDown(origin)) => {
                log::debug!("drag started at {},{}", origin.x, origin.y);
                self.state = State::Dragging {
                    drag: DragVector::starting_at(origin),
                    shown: Rectangle::empty_at(origin),
                };
                Ok(None)
            }
            (State::Idle, _) => Ok(None),

            (State::Dragging { mut drag, shown }, InputEvent::Motion(point)) => {
                drag.current = point;
                let (next, direction) = drag.normalize();
                feedback::update(&mut *self.grab, shown, next, direction)?;
                self.state = State::Dragging { drag, shown: next };
                Ok(None)
            }
            (State::Dragging { shown, .. }, InputEvent::ButtonUp(_)) => {
                feedback::clear(&mut *self.grab, shown)?;
                log::debug!("selection committed: {shown:?}");
                Ok(Some(SelectionOutcome::Committed(shown)))
            }
            (State::Dragging { shown, .. }, InputEvent::KeyDown) => {
                log::info!("key pressed, aborting selection");
                feedback::clear(&mut *self.grab, shown)?;
                Ok(Some(SelectionOutcome::Aborted))
            }
            (
                State::Dragging { .. },
                InputEvent::ButtonDown(_) | InputEvent::KeyRelease | InputEvent::Other,
            ) => Ok(None),
        }
    }
}

pub fn select<S: DisplayServer>(
    server: &mut S,
    options: GrabOptions,
) -> Result<SelectionOutcome, GrabError> {
    Ok(SelectionSession::start(server, options)?.run())
}
