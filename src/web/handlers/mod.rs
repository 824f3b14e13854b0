//! Route handlers and the session plumbing they share.

pub mod delete;
pub mod health;
pub mod index;
pub mod login;
pub mod logout;
pub mod signup;

use super::error::AppError;
use crate::{
    accounts::Accounts,
    session::{Session, SessionStore},
};
use anyhow::Result;
use axum::{
    http::header::SET_COOKIE,
    response::{IntoResponse, Response},
};
use tracing::debug;

/// Persist the session and attach its cookie, if any, to the response.
pub(crate) async fn respond(
    sessions: &SessionStore,
    session: Session,
    response: impl IntoResponse,
) -> Result<Response, AppError> {
    let cookie = sessions.save(session).await?;
    let mut response = response.into_response();
    if let Some(cookie) = cookie {
        response.headers_mut().append(SET_COOKIE, cookie);
    }
    Ok(response)
}

/// The session user, provided the account still exists.
///
/// A session whose account was deleted is cleared in place.
pub(crate) async fn current_user(
    accounts: &Accounts,
    session: &mut Session,
) -> Result<Option<String>> {
    let Some(user) = session.user().map(str::to_string) else {
        return Ok(None);
    };

    if accounts.user_exists(&user).await? {
        Ok(Some(user))
    } else {
        debug!("Session user no longer exists");
        session.identity.clear();
        Ok(None)
    }
}
