use super::respond;
use crate::{
    accounts::{Accounts, LoginOutcome},
    session::SessionStore,
    web::{error::AppError, pages},
};
use axum::{
    Form,
    extract::Extension,
    http::HeaderMap,
    response::{Html, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(ToSchema, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

#[utoipa::path(
    get,
    path = "/login",
    responses(
        (status = 200, description = "Login form", content_type = "text/html", body = String)
    ),
    tag = "pages"
)]
pub async fn login_page() -> Html<String> {
    Html(pages::login(None))
}

#[utoipa::path(
    post,
    path = "/log",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Logged in, redirect to /"),
        (status = 200, description = "Unknown user or wrong password", content_type = "text/html", body = String),
        (status = 500, description = "Store failure", content_type = "text/html", body = String)
    ),
    tag = "accounts"
)]
pub async fn login(
    accounts: Extension<Arc<Accounts>>,
    sessions: Extension<SessionStore>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let LoginForm { username, password } = form;
    let password = SecretString::from(password);

    let mut session = sessions.load(&headers).await;
    let outcome = accounts
        .login(&username, &password, &mut session.identity)
        .await?;

    match outcome {
        LoginOutcome::LoggedIn => {
            session.rotate();
            respond(&sessions, session, Redirect::to("/")).await
        }
        LoginOutcome::Rejected(reason) => {
            respond(
                &sessions,
                session,
                Html(pages::login(Some(&reason.to_string()))),
            )
            .await
        }
    }
}
