use super::respond;
use crate::{
    accounts::{Accounts, SignupOutcome},
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
pub struct SignupForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password1: String,
    #[serde(default)]
    password2: String,
}

#[utoipa::path(
    get,
    path = "/signup",
    responses(
        (status = 200, description = "Signup form", content_type = "text/html", body = String)
    ),
    tag = "pages"
)]
pub async fn signup_page() -> Html<String> {
    Html(pages::signup(None))
}

#[utoipa::path(
    post,
    path = "/sign",
    request_body(content = SignupForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Account created, session logged in, redirect to /"),
        (status = 200, description = "Signup rejected, form rendered with the reason", content_type = "text/html", body = String),
        (status = 500, description = "Store or hashing failure", content_type = "text/html", body = String)
    ),
    tag = "accounts"
)]
pub async fn signup(
    accounts: Extension<Arc<Accounts>>,
    sessions: Extension<SessionStore>,
    headers: HeaderMap,
    Form(form): Form<SignupForm>,
) -> Result<Response, AppError> {
    let SignupForm {
        username,
        password1,
        password2,
    } = form;
    let password1 = SecretString::from(password1);
    let password2 = SecretString::from(password2);

    let mut session = sessions.load(&headers).await;
    let outcome = accounts
        .signup(&username, &password1, &password2, &mut session.identity)
        .await?;

    match outcome {
        SignupOutcome::Created => {
            session.rotate();
            respond(&sessions, session, Redirect::to("/")).await
        }
        SignupOutcome::Rejected(reason) => {
            respond(
                &sessions,
                session,
                Html(pages::signup(Some(&reason.to_string()))),
            )
            .await
        }
    }
}
