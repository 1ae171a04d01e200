//! Request flow
//!
//! The browser-facing state machine: registration, login, prediction and
//! logout, independent of the HTTP transport.

pub mod forms;
pub mod handlers;
pub mod results;

pub use forms::{LoginForm, PredictionForm, RegistrationForm};
pub use results::{Outcome, Route, View};
