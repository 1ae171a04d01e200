//! HTTP routes
//!
//! Each handler loads the visitor's [`Session`] from the cookie session,
//! runs one flow step, writes the session back and turns the [`Outcome`]
//! into a response.
//!
//! ```text
//! GET  /          home (redirects to /login when anonymous)
//! GET  /register  registration form
//! POST /register
//! GET  /login     login form
//! POST /login
//! POST /predict
//! GET  /logout
//! ```

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router, middleware};
use log::{debug, error};
use std::fmt::Display;
use std::sync::Arc;
use tower_sessions::cookie::SameSite;
use tower_sessions::{Expiry, Session as WebSession, SessionManagerLayer};

use crate::auth::CredentialStore;
use crate::config::AuthConfig;
use crate::flow::{self, LoginForm, Outcome, PredictionForm, RegistrationForm};
use crate::middleware::logging::log_request;
use crate::model::RecommendationService;
use crate::server::pages;
use crate::session::{Session, SessionRegistry};

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "crop_session";

/// Key of the [`Session`] value inside the cookie session record.
const SESSION_KEY: &str = "session";

/// Shared state injected into every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CredentialStore>,
    pub service: Arc<RecommendationService>,
    pub sessions: SessionRegistry,
    pub admin_username: Arc<str>,
}

impl AppState {
    pub fn new(store: CredentialStore, service: RecommendationService, auth: &AuthConfig) -> Self {
        Self {
            store: Arc::new(store),
            service: Arc::new(service),
            sessions: SessionRegistry::new(auth.session_ttl()),
            admin_username: Arc::from(auth.admin_username.as_str()),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let sessions = SessionManagerLayer::new(state.sessions.clone())
        .with_name(SESSION_COOKIE)
        .with_path("/")
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_secure(false)
        .with_expiry(Expiry::OnInactivity(state.sessions.cookie_lifetime()));

    Router::new()
        .route("/", get(home))
        .route("/register", get(show_register).post(register))
        .route("/login", get(show_login).post(login))
        .route("/predict", post(predict))
        .route("/logout", get(logout))
        .layer(sessions)
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

fn internal_error(err: impl Display) -> Response {
    error!("Session store failure: {}", err);
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}

async fn load_session(web: &WebSession) -> Result<Session, tower_sessions::session::Error> {
    Ok(web.get::<Session>(SESSION_KEY).await?.unwrap_or_default())
}

/// Write the session back after a flow step.
///
/// Any change of identity retires the old session id: login moves the
/// session to a fresh id, logout deletes it outright. Empty sessions are not
/// kept at all.
async fn save_session(
    web: &WebSession,
    before: &Session,
    after: Session,
) -> Result<(), tower_sessions::session::Error> {
    if before.identity() != after.identity() {
        if after.is_authenticated() {
            web.cycle_id().await?;
            debug!("Session moved to a new id after login");
        } else {
            web.flush().await?;
            debug!("Session deleted on logout");
        }
    }

    if after.is_empty() {
        if !before.is_empty() {
            web.remove_value(SESSION_KEY).await?;
        }
    } else if after != *before {
        web.insert(SESSION_KEY, after).await?;
    }
    Ok(())
}

/// Persist the session and build the response for `outcome`.
async fn finish(web: &WebSession, before: &Session, mut session: Session, outcome: Outcome) -> Response {
    let response = match outcome {
        Outcome::Redirect(route) => Redirect::to(route.path()).into_response(),
        Outcome::Render(view) => {
            let flashes = session.take_flashes();
            Html(pages::render(&view, &flashes)).into_response()
        }
    };

    match save_session(web, before, session).await {
        Ok(()) => response,
        Err(e) => internal_error(e),
    }
}

/// Run a cheap flow step inline.
async fn run<F>(web: &WebSession, step: F) -> Response
where
    F: FnOnce(&mut Session) -> Outcome,
{
    let before = match load_session(web).await {
        Ok(session) => session,
        Err(e) => return internal_error(e),
    };

    let mut session = before.clone();
    let outcome = step(&mut session);
    finish(web, &before, session, outcome).await
}

/// Run a blocking flow step off the async executor.
async fn run_blocking<F>(web: &WebSession, step: F) -> Response
where
    F: FnOnce(&mut Session) -> Outcome + Send + 'static,
{
    let before = match load_session(web).await {
        Ok(session) => session,
        Err(e) => return internal_error(e),
    };

    let mut session = before.clone();
    let result = tokio::task::spawn_blocking(move || {
        let outcome = step(&mut session);
        (session, outcome)
    })
    .await;

    match result {
        Ok((session, outcome)) => finish(web, &before, session, outcome).await,
        Err(e) => {
            error!("Request task failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn home(web: WebSession) -> Response {
    run(&web, |session| flow::handlers::home(session)).await
}

async fn show_register(web: WebSession) -> Response {
    run(&web, |_| flow::handlers::show_register()).await
}

async fn show_login(web: WebSession) -> Response {
    run(&web, |_| flow::handlers::show_login()).await
}

async fn register(
    State(state): State<AppState>,
    web: WebSession,
    Form(form): Form<RegistrationForm>,
) -> Response {
    let store = Arc::clone(&state.store);
    run_blocking(&web, move |session| {
        flow::handlers::register(&store, session, &form)
    })
    .await
}

async fn login(
    State(state): State<AppState>,
    web: WebSession,
    Form(form): Form<LoginForm>,
) -> Response {
    let store = Arc::clone(&state.store);
    let admin_username = Arc::clone(&state.admin_username);
    run_blocking(&web, move |session| {
        flow::handlers::login(&store, session, &form, &admin_username)
    })
    .await
}

async fn predict(
    State(state): State<AppState>,
    web: WebSession,
    Form(form): Form<PredictionForm>,
) -> Response {
    run(&web, |session| {
        flow::handlers::predict(&state.service, session, &form)
    })
    .await
}

async fn logout(web: WebSession) -> Response {
    run(&web, flow::handlers::logout).await
}
