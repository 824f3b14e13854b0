use super::{current_user, respond};
use crate::{
    accounts::{Accounts, DeleteOutcome},
    session::SessionStore,
    web::{error::AppError, pages},
};
use axum::{
    Form,
    extract::Extension,
    http::HeaderMap,
    response::{Html, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(ToSchema, Deserialize)]
pub struct DeleteForm {
    #[serde(default)]
    username: String,
}

#[utoipa::path(
    get,
    path = "/delete",
    responses(
        (status = 200, description = "Delete-account confirmation", content_type = "text/html", body = String)
    ),
    tag = "pages"
)]
pub async fn delete_page(
    accounts: Extension<Arc<Accounts>>,
    sessions: Extension<SessionStore>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let mut session = sessions.load(&headers).await;
    let user = current_user(&accounts, &mut session).await?;

    respond(
        &sessions,
        session,
        Html(pages::delete(user.as_deref(), None)),
    )
    .await
}

// The username comes from the form and is not required to match the session user.
#[utoipa::path(
    post,
    path = "/rm",
    request_body(content = DeleteForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Account deleted, session cleared, redirect to /"),
        (status = 200, description = "Unknown username", content_type = "text/html", body = String),
        (status = 500, description = "Store failure", content_type = "text/html", body = String)
    ),
    tag = "accounts"
)]
pub async fn delete(
    accounts: Extension<Arc<Accounts>>,
    sessions: Extension<SessionStore>,
    headers: HeaderMap,
    Form(form): Form<DeleteForm>,
) -> Result<Response, AppError> {
    let mut session = sessions.load(&headers).await;
    let outcome = accounts.delete(&form.username, &mut session.identity).await?;

    match outcome {
        DeleteOutcome::Deleted => respond(&sessions, session, Redirect::to("/")).await,
        DeleteOutcome::Rejected(reason) => {
            let page = pages::delete(session.user(), Some(&reason.to_string()));
            respond(&sessions, session, Html(page)).await
        }
    }
}
