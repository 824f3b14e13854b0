//! End-to-end tests for the HTML account flows.
//!
//! Requests go through the full router (middleware included) with
//! `tower::ServiceExt::oneshot`, carrying the session cookie between calls the
//! way a browser would.

use anyhow::{Context, Result};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{
        Method, Request, StatusCode,
        header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
    },
    response::Response,
};
use sesame::{
    accounts::{Accounts, MemoryStore},
    session::{SessionConfig, SessionStore},
    web,
};
use std::{path::PathBuf, sync::Arc};
use tower::ServiceExt;

struct TestApp {
    router: Router,
    accounts: Arc<Accounts>,
    sessions: SessionStore,
}

impl TestApp {
    fn new() -> Self {
        Self::with_static_dir(None)
    }

    fn with_static_dir(static_dir: Option<PathBuf>) -> Self {
        let accounts = Arc::new(Accounts::new(Arc::new(MemoryStore::new())));
        let sessions = SessionStore::new(SessionConfig::new());
        let router = web::router(accounts.clone(), sessions.clone(), static_dir);
        Self {
            router,
            accounts,
            sessions,
        }
    }

    async fn send(&self, request: Request<Body>) -> Result<Response> {
        Ok(self.router.clone().oneshot(request).await?)
    }

    async fn get(&self, path: &str, cookie: Option<&str>) -> Result<Response> {
        let mut builder = Request::builder().method(Method::GET).uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        self.send(builder.body(Body::empty())?).await
    }

    async fn post(&self, path: &str, form: &str, cookie: Option<&str>) -> Result<Response> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        self.send(builder.body(Body::from(form.to_string()))?).await
    }

    /// Sign up and return the session cookie pair.
    async fn signup(&self, username: &str, password: &str) -> Result<String> {
        let response = self
            .post(
                "/sign",
                &format!("username={username}&password1={password}&password2={password}"),
                None,
            )
            .await?;
        assert_redirect_home(&response);
        session_cookie(&response).context("signup did not set a session cookie")
    }
}

/// The `name=value` pair of the session cookie, if the response sets one.
fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("sesame_session="))
        .and_then(|value| value.split(';').next())
        .map(str::to_string)
}

fn clears_session_cookie(response: &Response) -> bool {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.starts_with("sesame_session=;") && value.contains("Max-Age=0"))
}

fn assert_redirect_home(response: &Response) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok()),
        Some("/")
    );
}

async fn body_text(response: Response) -> Result<String> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(String::from_utf8(bytes.to_vec())?)
}

#[tokio::test]
async fn index_without_session_links_to_forms() -> Result<()> {
    let app = TestApp::new();

    let response = app.get("/", None).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_cookie(&response).is_none());

    let body = body_text(response).await?;
    assert!(body.contains("You are not logged in."));
    assert!(body.contains(r#"href="/signup""#));
    Ok(())
}

#[tokio::test]
async fn form_pages_render_without_error() -> Result<()> {
    let app = TestApp::new();

    for (path, action) in [("/signup", "/sign"), ("/login", "/log"), ("/delete", "/rm")] {
        let response = app.get(path, None).await?;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await?;
        assert!(body.contains(&format!(r#"action="{action}""#)), "{path}");
        assert!(!body.contains(r#"class="error""#), "{path}");
    }
    Ok(())
}

#[tokio::test]
async fn signup_logs_the_new_user_in() -> Result<()> {
    let app = TestApp::new();

    let cookie = app.signup("ab", "secret").await?;
    assert!(app.accounts.user_exists("ab").await?);

    let body = body_text(app.get("/", Some(&cookie)).await?).await?;
    assert!(body.contains("Welcome, ab"));
    Ok(())
}

#[tokio::test]
async fn duplicate_signup_is_rejected() -> Result<()> {
    let app = TestApp::new();
    app.signup("ab", "secret").await?;

    let response = app
        .post("/sign", "username=ab&password1=other1&password2=other1", None)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_cookie(&response).is_none());

    let body = body_text(response).await?;
    assert!(body.contains("Already a user with that name."));
    Ok(())
}

#[tokio::test]
async fn signup_validation_messages() -> Result<()> {
    let app = TestApp::new();

    let cases = [
        (
            "username=a&password1=secret&password2=secret",
            "Username needs to be at least 2 characters long",
        ),
        (
            "username=ab&password1=12345&password2=12345",
            "Password needs to be at least 6 characters long",
        ),
        (
            "username=ab&password1=secret&password2=secreT",
            "Passwords did not match",
        ),
        ("", "Username needs to be at least 2 characters long"),
        (
            "username=a%00b&password1=secret&password2=secret",
            "Username cannot contain NUL characters",
        ),
    ];

    for (form, message) in cases {
        let response = app.post("/sign", form, None).await?;
        assert_eq!(response.status(), StatusCode::OK, "{form}");
        let body = body_text(response).await?;
        assert!(body.contains(message), "{form}: expected {message}");
    }

    assert!(!app.accounts.user_exists("ab").await?);
    assert!(app.sessions.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn login_with_wrong_password_is_rejected() -> Result<()> {
    let app = TestApp::new();
    app.signup("ab", "secret").await?;

    let response = app
        .post("/log", "username=ab&password=wrong1", None)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_cookie(&response).is_none());
    assert!(body_text(response)
        .await?
        .contains("Incorrect username or password."));

    let response = app
        .post("/log", "username=nobody&password=secret", None)
        .await?;
    assert!(body_text(response)
        .await?
        .contains("Incorrect username or password."));
    Ok(())
}

#[tokio::test]
async fn login_issues_a_fresh_session() -> Result<()> {
    let app = TestApp::new();
    let signup_cookie = app.signup("ab", "secret").await?;

    let response = app
        .post("/log", "username=ab&password=secret", Some(&signup_cookie))
        .await?;
    assert_redirect_home(&response);

    let login_cookie = session_cookie(&response);
    assert!(login_cookie.is_some());
    assert_ne!(login_cookie.as_deref(), Some(signup_cookie.as_str()));

    let body = body_text(app.get("/", login_cookie.as_deref()).await?).await?;
    assert!(body.contains("Welcome, ab"));
    Ok(())
}

#[tokio::test]
async fn logout_clears_the_session() -> Result<()> {
    let app = TestApp::new();
    let cookie = app.signup("ab", "secret").await?;

    let response = app.get("/logout", Some(&cookie)).await?;
    assert_redirect_home(&response);
    assert!(clears_session_cookie(&response));

    let body = body_text(app.get("/", Some(&cookie)).await?).await?;
    assert!(body.contains("You are not logged in."));
    // The account itself survives a logout.
    assert!(app.accounts.user_exists("ab").await?);
    Ok(())
}

#[tokio::test]
async fn delete_then_login_fails() -> Result<()> {
    let app = TestApp::new();
    let cookie = app.signup("ab", "secret").await?;

    let response = app.post("/rm", "username=ab", Some(&cookie)).await?;
    assert_redirect_home(&response);
    assert!(clears_session_cookie(&response));
    assert!(!app.accounts.user_exists("ab").await?);

    let body = body_text(app.get("/", Some(&cookie)).await?).await?;
    assert!(body.contains("You are not logged in."));

    let response = app
        .post("/log", "username=ab&password=secret", None)
        .await?;
    assert!(body_text(response)
        .await?
        .contains("Incorrect username or password."));
    Ok(())
}

#[tokio::test]
async fn delete_unknown_username_is_rejected() -> Result<()> {
    let app = TestApp::new();
    let cookie = app.signup("ab", "secret").await?;

    let response = app.post("/rm", "username=zz", Some(&cookie)).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!clears_session_cookie(&response));
    assert!(body_text(response)
        .await?
        .contains("Incorrect username inputted!"));

    // Still logged in as before.
    let body = body_text(app.get("/", Some(&cookie)).await?).await?;
    assert!(body.contains("Welcome, ab"));
    Ok(())
}

#[tokio::test]
async fn delete_accepts_any_existing_username() -> Result<()> {
    let app = TestApp::new();
    let alice = app.signup("alice", "secret").await?;
    let bob = app.signup("bob", "secret").await?;

    let response = app.post("/rm", "username=alice", Some(&bob)).await?;
    assert_redirect_home(&response);
    assert!(!app.accounts.user_exists("alice").await?);
    assert!(app.accounts.user_exists("bob").await?);

    // Alice's session now names a missing account and is treated as logged out.
    let response = app.get("/", Some(&alice)).await?;
    assert!(clears_session_cookie(&response));
    assert!(body_text(response).await?.contains("You are not logged in."));
    Ok(())
}

#[tokio::test]
async fn delete_page_names_the_session_user() -> Result<()> {
    let app = TestApp::new();
    let cookie = app.signup("ab", "secret").await?;

    let body = body_text(app.get("/delete", Some(&cookie)).await?).await?;
    assert!(body.contains("<strong>ab</strong>"));
    Ok(())
}

#[tokio::test]
async fn usernames_are_escaped_in_pages() -> Result<()> {
    let app = TestApp::new();
    let response = app
        .post(
            "/sign",
            "username=%3Cb%3Ex%3C%2Fb%3E&password1=secret&password2=secret",
            None,
        )
        .await?;
    let cookie = session_cookie(&response).context("no session cookie")?;

    let body = body_text(app.get("/", Some(&cookie)).await?).await?;
    assert!(body.contains("Welcome, &lt;b&gt;x&lt;/b&gt;"));
    assert!(!body.contains("<b>x</b>"));
    Ok(())
}

#[tokio::test]
async fn health_reports_store_status() -> Result<()> {
    let app = TestApp::new();

    let response = app.get("/health", None).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let x_app = response
        .headers()
        .get("X-App")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    assert!(x_app.is_some_and(|v| v.starts_with(&format!("sesame:{}:", env!("CARGO_PKG_VERSION")))));

    let health: serde_json::Value = serde_json::from_str(&body_text(response).await?)?;
    assert_eq!(health["name"], "sesame");
    assert_eq!(health["store"], "ok");
    assert_eq!(health["store_backend"], "memory");

    let response = app
        .send(
            Request::builder()
                .method(Method::HEAD)
                .uri("/health")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn request_id_is_propagated() -> Result<()> {
    let app = TestApp::new();

    let response = app.get("/", None).await?;
    assert!(response.headers().contains_key("x-request-id"));

    let response = app
        .send(
            Request::builder()
                .uri("/")
                .header("x-request-id", "req-123")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some("req-123")
    );
    Ok(())
}

#[tokio::test]
async fn static_files_are_served_when_configured() -> Result<()> {
    let dir = std::env::temp_dir().join(format!("sesame-static-{}", ulid::Ulid::new()));
    std::fs::create_dir_all(&dir)?;
    std::fs::write(dir.join("hello.txt"), "hello")?;

    let app = TestApp::with_static_dir(Some(dir.clone()));
    let response = app.get("/static/hello.txt", None).await?;
    let status = response.status();
    let body = body_text(response).await?;
    std::fs::remove_dir_all(&dir)?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "hello");

    let app = TestApp::new();
    let response = app.get("/static/hello.txt", None).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}
