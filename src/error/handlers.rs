//! Error handlers
//!
//! Converts request-flow errors into the messages shown to the browser.

use crate::error::types::{CredentialError, FlowError};
use log::{error, warn};

/// Log a request-flow error at a level matching its severity
pub fn handle_error(err: &FlowError) {
    match err {
        FlowError::Credential(CredentialError::PersistenceFailure { .. })
        | FlowError::Credential(CredentialError::Hashing(_))
        | FlowError::Model(_) => error!("Request failed: {}", err),
        _ => warn!("Request rejected: {}", err),
    }
}

/// Convert error to the user-visible flash text
///
/// Login failures collapse to one generic message so the response never
/// reveals whether a username exists.
pub fn user_message(err: &FlowError) -> String {
    match err {
        FlowError::InvalidPassword(_) | FlowError::Credential(CredentialError::UsernameNotFound(_)) => {
            "Invalid username or password".to_string()
        }
        FlowError::Credential(CredentialError::DuplicateUsername(_)) => {
            "Username already exists".to_string()
        }
        FlowError::Credential(CredentialError::PersistenceFailure { .. }) => {
            "Registration failed: the user database could not be saved".to_string()
        }
        FlowError::Credential(_) => "Internal error, please try again".to_string(),
        FlowError::PasswordMismatch => "Passwords must match".to_string(),
        FlowError::MissingField(field) => format!("{field} is required"),
        FlowError::MalformedFeatureInput { field, value } => {
            format!("Invalid value for {field}: {value:?} is not a number")
        }
        FlowError::Model(_) => "Prediction failed, please try again".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_failures_share_one_message() {
        let not_found = FlowError::Credential(CredentialError::UsernameNotFound("bob".into()));
        let mismatch = FlowError::InvalidPassword("bob".into());
        assert_eq!(user_message(&not_found), user_message(&mismatch));
        assert!(!user_message(&not_found).contains("bob"));
    }

    #[test]
    fn malformed_feature_names_the_field() {
        let err = FlowError::MalformedFeatureInput {
            field: "N",
            value: "abc".into(),
        };
        let msg = user_message(&err);
        assert!(msg.contains("N"));
        assert!(msg.contains("abc"));
    }
}
