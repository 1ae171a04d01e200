use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

use crop_recommender::auth::{CredentialHasher, CredentialStore};
use crop_recommender::config::AuthConfig;
use crop_recommender::model::{Dataset, RecommendationService, SearchGrid};
use crop_recommender::server::{AppState, SESSION_COOKIE, build_router};

const RICE: &str = "N=80&P=45&K=40&temperature=23.5&humidity=82&ph=6.4&rainfall=230";
const MANGO: &str = "N=20&P=27&K=30&temperature=31.2&humidity=50.2&ph=5.8&rainfall=95";
const BAD_N: &str = "N=abc&P=45&K=40&temperature=23.5&humidity=82&ph=6.4&rainfall=230";

// Helper to build the app over a scratch credential file
fn test_app(dir: &TempDir) -> Router {
    test_app_with(dir, CredentialHasher::new(8, 1, 1).unwrap(), AuthConfig::default())
}

fn test_app_with(dir: &TempDir, hasher: CredentialHasher, auth: AuthConfig) -> Router {
    let fixture = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/crops.csv");
    let dataset = Dataset::load(&fixture).unwrap();
    let grid = SearchGrid {
        n_estimators: vec![5, 10],
        max_depth: vec![3, 6],
        cv_folds: 3,
        seed: 42,
    };
    let service = RecommendationService::train(&dataset, &grid).unwrap();
    let store = CredentialStore::open(dir.path().join("users.csv"), hasher).unwrap();

    let auth = AuthConfig {
        admin_username: "admin".into(),
        ..auth
    };
    build_router(AppState::new(store, service, &auth))
}

struct Reply {
    status: StatusCode,
    location: Option<String>,
    cookie: Option<String>,
    body: String,
}

/// A browser stand-in that keeps the session cookie between requests.
struct Browser {
    app: Router,
    cookie: Option<String>,
}

impl Browser {
    fn new(app: Router) -> Self {
        Self { app, cookie: None }
    }

    async fn send(&mut self, method: &str, uri: &str, form: Option<&str>) -> Reply {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, format!("{SESSION_COOKIE}={cookie}"));
        }
        let body = match form {
            Some(form) => {
                request = request.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
                Body::from(form.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .map(|v| v.to_str().unwrap().to_string());
        if let Some(set) = &cookie {
            let pair = set.split(';').next().unwrap();
            let (_, token) = pair.split_once('=').unwrap();
            // an empty value is the server clearing the cookie
            self.cookie = (!token.is_empty()).then(|| token.to_string());
        }

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        Reply {
            status,
            location,
            cookie,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    async fn get(&mut self, uri: &str) -> Reply {
        self.send("GET", uri, None).await
    }

    async fn post(&mut self, uri: &str, form: &str) -> Reply {
        self.send("POST", uri, Some(form)).await
    }
}

fn assert_redirect(reply: &Reply, to: &str) {
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(reply.location.as_deref(), Some(to));
}

#[tokio::test]
async fn register_login_predict_logout() {
    let dir = tempfile::tempdir().unwrap();
    let mut browser = Browser::new(test_app(&dir));

    let reply = browser.get("/").await;
    assert_redirect(&reply, "/login");
    assert!(reply.cookie.is_none());

    let reply = browser
        .post("/register", "username=alice&password=pw1&confirm_password=pw1")
        .await;
    assert_redirect(&reply, "/login");
    let set_cookie = reply.cookie.unwrap();
    assert!(set_cookie.starts_with("crop_session="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Path=/"));
    assert!(browser.get("/login").await.body.contains("Registration successful!"));

    let reply = browser
        .post("/register", "username=alice&password=pw2&confirm_password=pw2")
        .await;
    assert_redirect(&reply, "/register");
    assert!(browser.get("/register").await.body.contains("Username already exists"));

    let before_login = browser.cookie.clone();
    let reply = browser.post("/login", "username=alice&password=pw1").await;
    assert_redirect(&reply, "/");
    assert!(reply.cookie.is_some());
    assert_ne!(browser.cookie, before_login);

    let home = browser.get("/").await;
    assert_eq!(home.status, StatusCode::OK);
    assert!(home.body.contains("Login successful!"));
    assert!(home.body.contains("Signed in as alice"));
    assert!(!home.body.contains("Admin Dashboard"));

    let reply = browser.post("/predict", BAD_N).await;
    assert_redirect(&reply, "/");
    let home = browser.get("/").await;
    assert_eq!(home.status, StatusCode::OK);
    assert!(home.body.contains("Invalid value for N"));

    let reply = browser.post("/predict", RICE).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body.contains("Recommended crop: rice"));

    let reply = browser.post("/predict", MANGO).await;
    assert!(reply.body.contains("Recommended crop: mango"));

    assert_redirect(&browser.get("/logout").await, "/login");
    assert_redirect(&browser.post("/predict", RICE).await, "/login");
    assert_redirect(&browser.get("/").await, "/login");

    let contents = std::fs::read_to_string(dir.path().join("users.csv")).unwrap();
    assert!(contents.starts_with("username,password\n"));
    assert!(contents.contains("alice,"));
    assert!(!contents.contains("pw1"));
}

#[tokio::test]
async fn pre_login_token_is_not_authenticated() {
    let dir = tempfile::tempdir().unwrap();
    let mut browser = Browser::new(test_app(&dir));

    browser
        .post("/register", "username=bob&password=pw&confirm_password=pw")
        .await;
    let stale = browser.cookie.clone();
    browser.post("/login", "username=bob&password=pw").await;
    assert_eq!(browser.get("/").await.status, StatusCode::OK);

    browser.cookie = stale;
    assert_redirect(&browser.get("/").await, "/login");
}

#[tokio::test]
async fn failed_login_is_generic() {
    let dir = tempfile::tempdir().unwrap();
    let mut browser = Browser::new(test_app(&dir));
    browser
        .post("/register", "username=carol&password=right&confirm_password=right")
        .await;
    assert!(browser.get("/login").await.body.contains("Registration successful!"));

    assert_redirect(
        &browser.post("/login", "username=carol&password=wrong").await,
        "/login",
    );
    let wrong = browser.get("/login").await.body;

    assert_redirect(
        &browser.post("/login", "username=nobody&password=right").await,
        "/login",
    );
    let unknown = browser.get("/login").await.body;

    assert!(wrong.contains("Invalid username or password"));
    assert_eq!(wrong, unknown);
    assert_redirect(&browser.get("/").await, "/login");
}

#[tokio::test]
async fn admin_sees_admin_view() {
    let dir = tempfile::tempdir().unwrap();
    let mut browser = Browser::new(test_app(&dir));
    browser
        .post("/register", "username=admin&password=root&confirm_password=root")
        .await;
    browser.post("/login", "username=admin&password=root").await;

    let home = browser.get("/").await;
    assert_eq!(home.status, StatusCode::OK);
    assert!(home.body.contains("Admin Dashboard"));
}

#[tokio::test]
async fn mismatched_confirmation_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut browser = Browser::new(test_app(&dir));

    let reply = browser
        .post("/register", "username=dave&password=one&confirm_password=two")
        .await;
    assert_redirect(&reply, "/register");
    assert!(browser.get("/register").await.body.contains("Passwords must match"));

    assert_redirect(
        &browser.post("/login", "username=dave&password=one").await,
        "/login",
    );
}

#[tokio::test]
async fn anonymous_pages_store_no_session() {
    let dir = tempfile::tempdir().unwrap();
    let mut browser = Browser::new(test_app(&dir));

    for uri in ["/", "/login", "/register", "/logout"] {
        let reply = browser.get(uri).await;
        assert!(reply.cookie.is_none(), "{uri} set a cookie");
    }
    assert!(browser.cookie.is_none());
}

#[tokio::test]
async fn relogin_as_another_user_retires_old_session() {
    let dir = tempfile::tempdir().unwrap();
    let mut browser = Browser::new(test_app(&dir));
    browser
        .post("/register", "username=erin&password=a&confirm_password=a")
        .await;
    browser
        .post("/register", "username=frank&password=b&confirm_password=b")
        .await;

    browser.post("/login", "username=erin&password=a").await;
    let erin = browser.cookie.clone();
    assert!(browser.get("/").await.body.contains("Signed in as erin"));

    assert_redirect(&browser.post("/login", "username=frank&password=b").await, "/");
    assert_ne!(browser.cookie, erin);
    assert!(browser.get("/").await.body.contains("Signed in as frank"));

    browser.cookie = erin;
    assert_redirect(&browser.get("/").await, "/login");
}

#[tokio::test(start_paused = true)]
async fn idle_session_expires() {
    let dir = tempfile::tempdir().unwrap();
    let auth = AuthConfig {
        session_ttl_secs: 60,
        ..AuthConfig::default()
    };
    let mut browser = Browser::new(test_app_with(&dir, CredentialHasher::new(8, 1, 1).unwrap(), auth));
    browser
        .post("/register", "username=gina&password=pw&confirm_password=pw")
        .await;
    browser.post("/login", "username=gina&password=pw").await;
    assert_eq!(browser.get("/").await.status, StatusCode::OK);

    tokio::time::advance(Duration::from_secs(45)).await;
    assert_eq!(browser.get("/").await.status, StatusCode::OK);

    // still inside the window, counted from the last request
    tokio::time::advance(Duration::from_secs(45)).await;
    assert_eq!(browser.get("/").await.status, StatusCode::OK);

    tokio::time::advance(Duration::from_secs(61)).await;
    assert_redirect(&browser.get("/").await, "/login");
    assert_redirect(&browser.post("/predict", RICE).await, "/login");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn logout_survives_a_concurrent_slow_request() {
    let dir = tempfile::tempdir().unwrap();
    // realistic hashing cost so registration is still running when logout lands
    let hasher = CredentialHasher::new(64 * 1024, 3, 1).unwrap();
    let mut browser = Browser::new(test_app_with(&dir, hasher, AuthConfig::default()));

    browser
        .post("/register", "username=hana&password=pw&confirm_password=pw")
        .await;
    browser.post("/login", "username=hana&password=pw").await;
    assert_eq!(browser.get("/").await.status, StatusCode::OK);

    let mut slow = Browser {
        app: browser.app.clone(),
        cookie: browser.cookie.clone(),
    };
    let pending = tokio::spawn(async move {
        slow.post("/register", "username=ivan&password=pw&confirm_password=pw")
            .await
            .status
    });
    tokio::time::sleep(Duration::from_millis(20)).await;

    let token = browser.cookie.clone();
    assert_redirect(&browser.get("/logout").await, "/login");
    assert_eq!(pending.await.unwrap(), StatusCode::SEE_OTHER);

    // replay the pre-logout cookie: the session must stay gone
    browser.cookie = token;
    assert_redirect(&browser.get("/").await, "/login");
    assert_redirect(&browser.post("/predict", RICE).await, "/login");
}
