//! Authentication system
//!
//! Handles password hashing, the file-backed credential store, and
//! registration input validation.

pub mod credentials;
pub mod hashing;
pub mod validator;

pub use credentials::{CredentialRecord, CredentialStore};
pub use hashing::CredentialHasher;
pub use validator::validate_registration;
