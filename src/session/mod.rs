//! Session management
//!
//! Server-side browser sessions: the per-visitor `Session` value and the
//! in-memory store that backs the session cookie.

pub mod registry;
pub mod state;

pub use registry::SessionRegistry;
pub use state::{Flash, FlashKind, Identity, Session, SessionState};
