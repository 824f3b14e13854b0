use super::{current_user, respond};
use crate::{
    accounts::Accounts,
    session::SessionStore,
    web::{error::AppError, pages},
};
use axum::{
    extract::Extension,
    http::HeaderMap,
    response::{Html, Response},
};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Home page, shows the session user when logged in", content_type = "text/html", body = String)
    ),
    tag = "pages"
)]
pub async fn index(
    accounts: Extension<Arc<Accounts>>,
    sessions: Extension<SessionStore>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let mut session = sessions.load(&headers).await;
    let user = current_user(&accounts, &mut session).await?;

    respond(&sessions, session, Html(pages::index(user.as_deref()))).await
}
