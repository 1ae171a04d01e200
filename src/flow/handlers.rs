//! Request flow handlers
//!
//! One function per browser action. Each takes the session as an explicit
//! value, performs the action against the store or the classifier, and
//! returns an [`Outcome`]. Errors never escape: they are logged, turned into
//! an error flash, and mapped to a redirect.

use log::{debug, info, warn};

use crate::auth::{CredentialStore, validate_registration};
use crate::error::FlowError;
use crate::error::handlers::{handle_error, user_message};
use crate::flow::forms::{LoginForm, PredictionForm, RegistrationForm};
use crate::flow::results::{Outcome, Route, View};
use crate::model::RecommendationService;
use crate::session::{FlashKind, Session};

/// Logs `err`, flashes its user message, and redirects to `route`.
fn fail(session: &mut Session, err: FlowError, route: Route) -> Outcome {
    handle_error(&err);
    session.flash(FlashKind::Error, user_message(&err));
    Outcome::Redirect(route)
}

/// Home view for an authenticated session, with an optional prediction.
fn home_view(session: &Session, prediction: Option<String>) -> Option<View> {
    let identity = session.identity()?;
    let username = identity.username.clone();
    Some(if identity.is_admin {
        View::AdminHome {
            username,
            prediction,
        }
    } else {
        View::UserHome {
            username,
            prediction,
        }
    })
}

/// `GET /`
pub fn home(session: &Session) -> Outcome {
    match home_view(session, None) {
        Some(view) => Outcome::Render(view),
        None => Outcome::Redirect(Route::Login),
    }
}

/// `GET /login`
pub fn show_login() -> Outcome {
    Outcome::Render(View::Login)
}

/// `GET /register`
pub fn show_register() -> Outcome {
    Outcome::Render(View::Register)
}

/// `POST /register`
pub fn register(store: &CredentialStore, session: &mut Session, form: &RegistrationForm) -> Outcome {
    match try_register(store, form) {
        Ok(()) => {
            session.flash(FlashKind::Success, "Registration successful!");
            Outcome::Redirect(Route::Login)
        }
        Err(err) => fail(session, err, Route::Register),
    }
}

fn try_register(store: &CredentialStore, form: &RegistrationForm) -> Result<(), FlowError> {
    validate_registration(&form.username, &form.password, &form.confirm_password)?;
    store.add(&form.username, &form.password)?;
    Ok(())
}

/// `POST /login`
///
/// Unknown usernames and wrong passwords produce the same flash.
pub fn login(
    store: &CredentialStore,
    session: &mut Session,
    form: &LoginForm,
    admin_username: &str,
) -> Outcome {
    match try_login(store, form) {
        Ok(()) => {
            let is_admin = form.username == admin_username;
            session.login(form.username.as_str(), is_admin);
            info!("User {} logged in (admin: {})", form.username, is_admin);
            session.flash(FlashKind::Success, "Login successful!");
            Outcome::Redirect(Route::Home)
        }
        Err(err) => fail(session, err, Route::Login),
    }
}

fn try_login(store: &CredentialStore, form: &LoginForm) -> Result<(), FlowError> {
    if store.verify(&form.username, &form.password)? {
        Ok(())
    } else {
        Err(FlowError::InvalidPassword(form.username.clone()))
    }
}

/// `POST /predict`
///
/// Anonymous sessions are sent to the login page without touching the model.
pub fn predict(
    service: &RecommendationService,
    session: &mut Session,
    form: &PredictionForm,
) -> Outcome {
    if !session.is_authenticated() {
        warn!("Rejected prediction from anonymous session");
        return Outcome::Redirect(Route::Login);
    }

    let prediction = match try_predict(service, form) {
        Ok(label) => label,
        Err(err) => return fail(session, err, Route::Home),
    };

    debug!(
        "Recommended {} for {}",
        prediction,
        session.username().unwrap_or_default()
    );
    match home_view(session, Some(prediction)) {
        Some(view) => Outcome::Render(view),
        None => Outcome::Redirect(Route::Login),
    }
}

fn try_predict(service: &RecommendationService, form: &PredictionForm) -> Result<String, FlowError> {
    let features = form.parse()?;
    Ok(service.predict(&features)?)
}

/// `GET /logout`
pub fn logout(session: &mut Session) -> Outcome {
    if let Some(username) = session.username() {
        info!("User {} logged out", username);
    }
    session.logout();
    Outcome::Redirect(Route::Login)
}
