use super::respond;
use crate::{session::SessionStore, web::error::AppError};
use axum::{
    extract::Extension,
    http::HeaderMap,
    response::{Redirect, Response},
};
use tracing::debug;

#[utoipa::path(
    get,
    path = "/logout",
    responses(
        (status = 303, description = "Session user cleared, redirect to /")
    ),
    tag = "accounts"
)]
pub async fn logout(
    sessions: Extension<SessionStore>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let mut session = sessions.load(&headers).await;
    if session.user().is_some() {
        debug!("Logging out");
    }
    session.identity.clear();

    respond(&sessions, session, Redirect::to("/")).await
}
