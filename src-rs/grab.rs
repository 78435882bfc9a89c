use std::ops::{Deref, DerefMut};

use thiserror::Error;

use crate::server::{ConnectionLost, DisplayServer};

#[derive(Debug, Error)]
pub enum GrabError {
    #[error("couldn't grab pointer")]
    PointerGrabFailed,
    #[error("couldn't grab keyboard")]
    KeyboardGrabFailed,
    #[error("couldn't grab server")]
    ServerFreezeFailed,
    #[error(transparent)]
    Connection(#[from] ConnectionLost),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GrabOptions {
    /// Also freeze the whole server while selecting (avoids tearing).
    pub freeze_server: bool,
}

/// Pointer and keyboard grab, released on drop (including a failed `acquire`).
pub struct Grab<'a, S: DisplayServer> {
    server: &'a mut S,
    pointer: bool,
    keyboard: bool,
    frozen: bool,
}

impl<'a, S: DisplayServer> Grab<'a, S> {
    pub fn acquire(server: &'a mut S, options: GrabOptions) -> Result<Self, GrabError> {
        let mut grab = Self {
            server,
            pointer: false,
            keyboard: false,
            frozen: false,
        };

        if !grab.server.grab_pointer()? {
            return Err(GrabError::PointerGrabFailed);
        }
        grab.pointer = true;
        log::debug!("pointer grabbed");

        if options.freeze_server {
            if !grab.server.grab_server()? {
                return Err(GrabError::ServerFreezeFailed);
            }
            grab.frozen = true;
            log::debug!("server frozen");
        }

        if !grab.server.grab_keyboard()? {
            return Err(GrabError::KeyboardGrabFailed);
        }
        grab.keyboard = true;
        log::debug!("keyboard grabbed");

        Ok(grab)
    }

    pub fn release(self) {
        drop(self);
    }
}

impl<S: DisplayServer> Deref for Grab<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.server
    }
}

impl<S: DisplayServer> DerefMut for Grab<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.server
    }
}

impl<S: DisplayServer> Drop for Grab<'_, S> {
    fn drop(&mut self) {
        // Each step is attempted even if an earlier one failed: on a dead
        // connection all of them fail, which is fine.
        if self.pointer {
            best_effort("ungrab pointer", self.server.ungrab_pointer());
        }
        if self.keyboard {
            best_effort("ungrab keyboard", self.server.ungrab_keyboard());
        }
        if self.frozen {
            best_effort("ungrab server", self.server.ungrab_server());
        }
        best_effort("free cursors", self.server.release_resources());
        best_effort("sync", self.server.sync());
        log::debug!("input released");
    }
}

fn best_effort(step: &str, result: Result<(), ConnectionLost>) {
    if let Err(err) = result {
        log::warn!("{step} failed: {err}");
    }
}
