//! Module `session`
//!
//! Defines the `Session` struct: the server-side state tied to one browser
//! cookie, covering authentication status and pending flash messages. It is
//! stored as a single value inside the cookie session record.

use serde::{Deserialize, Serialize};

/// Who is logged in on a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    pub is_admin: bool,
}

/// Authentication state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

/// Category of a flash message, used for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlashKind {
    Success,
    Error,
}

impl FlashKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashKind::Success => "success",
            FlashKind::Error => "error",
        }
    }
}

/// A one-shot message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

/// Server-side state of one browser session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    identity: Option<Identity>,
    flashes: Vec<Flash>,
}

impl Session {
    /// Moves the session to the authenticated state.
    pub fn login(&mut self, username: impl Into<String>, is_admin: bool) {
        self.identity = Some(Identity {
            username: username.into(),
            is_admin,
        });
    }

    /// Resets the session, dropping the identity and any pending flashes.
    pub fn logout(&mut self) {
        self.identity = None;
        self.flashes.clear();
    }

    // --------------------
    // Getter methods
    // --------------------

    pub fn state(&self) -> SessionState {
        if self.identity.is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        }
    }

    /// Nothing worth keeping: no identity and no pending flashes.
    pub fn is_empty(&self) -> bool {
        self.identity.is_none() && self.flashes.is_empty()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Returns the username of the logged-in user if any.
    pub fn username(&self) -> Option<&str> {
        self.identity.as_ref().map(|i| i.username.as_str())
    }

    pub fn is_admin(&self) -> bool {
        self.identity.as_ref().is_some_and(|i| i.is_admin)
    }

    /// Pending flashes, without consuming them.
    pub fn flashes(&self) -> &[Flash] {
        &self.flashes
    }

    // --------------------
    // Flash messages
    // --------------------

    pub fn flash(&mut self, kind: FlashKind, message: impl Into<String>) {
        self.flashes.push(Flash {
            kind,
            message: message.into(),
        });
    }

    /// Removes and returns all pending flashes.
    pub fn take_flashes(&mut self) -> Vec<Flash> {
        std::mem::take(&mut self.flashes)
    }
}
