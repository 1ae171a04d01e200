//! Registration input validation
//!
//! Form-level checks that run before the credential store is touched. The
//! store itself accepts any strings; these rules belong to the browser flow.

use crate::error::FlowError;

/// Rejects an empty (or whitespace-only) required field.
pub fn require(field: &'static str, value: &str) -> Result<(), FlowError> {
    if value.trim().is_empty() {
        Err(FlowError::MissingField(field))
    } else {
        Ok(())
    }
}

/// Validates a registration submission: every field present and the
/// confirmation identical to the password.
pub fn validate_registration(
    username: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), FlowError> {
    require("Username", username)?;
    require("Password", password)?;
    require("Confirm Password", confirm_password)?;

    if password != confirm_password {
        return Err(FlowError::PasswordMismatch);
    }

    Ok(())
}
