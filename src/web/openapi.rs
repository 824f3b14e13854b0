use super::handlers::{delete, health, index, login, logout, signup};
use utoipa::{
    OpenApi,
    openapi::{Contact, License},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        index::index,
        signup::signup_page,
        signup::signup,
        login::login_page,
        login::login,
        delete::delete_page,
        delete::delete,
        logout::logout,
        health::health,
    ),
    components(schemas(
        signup::SignupForm,
        login::LoginForm,
        delete::DeleteForm,
        health::Health,
    )),
    tags(
        (name = "accounts", description = "Signup, login, logout and account deletion"),
        (name = "pages", description = "Server-rendered forms"),
        (name = "health", description = "Liveness of the service and its credential store"),
    )
)]
struct ApiDoc;

/// `OpenAPI` document with the info block taken from Cargo metadata.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();

    doc.info.title = env!("CARGO_PKG_NAME").to_string();
    doc.info.version = env!("CARGO_PKG_VERSION").to_string();
    doc.info.description = optional_str(env!("CARGO_PKG_DESCRIPTION")).map(str::to_string);
    doc.info.contact = cargo_contact();
    doc.info.license = cargo_license();

    doc
}

fn cargo_contact() -> Option<Contact> {
    // Cargo authors are `:` separated and may include "Name <email>".
    let primary = env!("CARGO_PKG_AUTHORS").split(':').next().map(str::trim)?;
    let (name, email) = parse_author(primary);
    if name.is_none() && email.is_none() {
        return None;
    }

    let mut contact = Contact::new();
    contact.name = name.map(str::to_string);
    contact.email = email.map(str::to_string);
    Some(contact)
}

fn cargo_license() -> Option<License> {
    let identifier = optional_str(env!("CARGO_PKG_LICENSE"))?;
    let mut license = License::new(identifier);
    license.identifier = Some(identifier.to_string());
    Some(license)
}

fn optional_str(value: &'static str) -> Option<&'static str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn parse_author(author: &str) -> (Option<&str>, Option<&str>) {
    let (name, email) = match author.find('<') {
        Some(start) => (
            author[..start].trim(),
            author[start + 1..].trim_end_matches('>').trim(),
        ),
        None => (author.trim(), ""),
    };
    (
        Some(name).filter(|s| !s.is_empty()),
        Some(email).filter(|s| !s.is_empty()),
    )
}
