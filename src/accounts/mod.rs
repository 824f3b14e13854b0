//! Account records and the flows that create, authenticate and remove them.

pub mod error;
pub mod flows;
pub mod locks;
pub mod store;
pub mod verifier;

pub use error::{DeleteError, LoginError, SignupError};
pub use flows::{Accounts, DeleteOutcome, LoginOutcome, SignupOutcome};
pub use store::{CredentialStore, MemoryStore, PostgresStore, StoreError};
pub use verifier::Verifier;
