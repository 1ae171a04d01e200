//! Request flow result types
//!
//! What a flow step asks the transport layer to do next.

/// Pages a flow step can redirect to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Register,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
            Route::Register => "/register",
        }
    }
}

/// Pages a flow step can render directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Login,
    Register,
    UserHome {
        username: String,
        prediction: Option<String>,
    },
    AdminHome {
        username: String,
        prediction: Option<String>,
    },
}

/// Outcome of one flow step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Redirect(Route),
    Render(View),
}
