//! # Sesame (username/password accounts)
//!
//! `sesame` serves a handful of HTML pages that let a visitor sign up, log in,
//! delete an account and log out. Identity is carried by a server-side session
//! referenced from an `HttpOnly` cookie.
//!
//! ## Credentials
//!
//! Passwords are never stored. Each account keeps an Argon2id verifier in PHC
//! format (salt and parameters embedded), checked in constant time on login.
//! Verifiers are redacted from `Debug` output and never rendered.
//!
//! ## Storage
//!
//! The credential store is a small async key-value trait with an in-memory
//! backend (default) and a PostgreSQL backend selected by `--dsn`.
//!
//! Signup, login and delete serialize on a per-username lock and signup writes
//! with a conditional insert, so two concurrent signups for the same name
//! cannot both succeed.
//!
//! ## Sessions
//!
//! Session tokens are 32 random bytes; only their SHA-256 digest is kept
//! server side. A session whose user was deleted is treated as logged out.

pub mod accounts;
pub mod cli;
pub mod session;
pub mod web;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
