//! User-facing rejections. `Display` is the exact text rendered on the page.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SignupError {
    #[error("Already a user with that name.")]
    UsernameTaken,
    #[error("Username needs to be at least 2 characters long")]
    UsernameTooShort,
    #[error("Username cannot contain NUL characters")]
    UsernameInvalid,
    #[error("Password needs to be at least 6 characters long")]
    PasswordTooShort,
    #[error("Passwords did not match")]
    PasswordMismatch,
}

/// Unknown username and wrong password share one message on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LoginError {
    #[error("Incorrect username or password.")]
    UnknownUser,
    #[error("Incorrect username or password.")]
    WrongPassword,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeleteError {
    #[error("Incorrect username inputted!")]
    UnknownUser,
}
