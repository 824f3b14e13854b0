//! HTML pages
//!
//! Inline templates, no template engine. Every value coming from a user or
//! the store goes through `html_escape`.

const COMMON_STYLES: &str = r#"
    body {
        font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
        max-width: 640px;
        margin: 40px auto;
        padding: 0 20px;
        background: #f5f5f5;
    }
    .container {
        background: white;
        padding: 30px;
        border-radius: 8px;
        box-shadow: 0 2px 4px rgba(0,0,0,0.1);
    }
    h1 {
        color: #333;
        border-bottom: 2px solid #0066cc;
        padding-bottom: 10px;
    }
    .form-group {
        margin: 15px 0;
    }
    label {
        display: block;
        font-weight: bold;
        margin-bottom: 5px;
        color: #333;
    }
    input[type="text"],
    input[type="password"] {
        width: 100%;
        padding: 10px;
        border: 1px solid #ddd;
        border-radius: 4px;
        font-size: 14px;
        box-sizing: border-box;
    }
    button {
        background: #0066cc;
        color: white;
        padding: 10px 20px;
        border: none;
        border-radius: 4px;
        cursor: pointer;
        font-size: 14px;
    }
    button.danger {
        background: #d9534f;
    }
    .error {
        color: #d9534f;
        background: #f2dede;
        padding: 10px;
        border-radius: 4px;
        margin: 10px 0;
    }
    .links a {
        margin-right: 15px;
    }
"#;

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Sesame - {title}</title>
    <style>{COMMON_STYLES}</style>
</head>
<body>
    <div class="container">
        {body}
    </div>
</body>
</html>"#
    )
}

fn error_block(error: Option<&str>) -> String {
    error.map_or(String::new(), |e| {
        format!(r#"<div class="error">{}</div>"#, html_escape(e))
    })
}

/// Render the home page
pub fn index(user: Option<&str>) -> String {
    let body = match user {
        Some(user) => format!(
            r#"<h1>Welcome, {}</h1>
        <p class="links">
            <a href="/logout">Log out</a>
            <a href="/delete">Delete account</a>
        </p>"#,
            html_escape(user)
        ),
        None => r#"<h1>Welcome</h1>
        <p>You are not logged in.</p>
        <p class="links">
            <a href="/signup">Sign up</a>
            <a href="/login">Log in</a>
        </p>"#
            .to_string(),
    };

    layout("Home", &body)
}

/// Render the signup page
pub fn signup(error: Option<&str>) -> String {
    let error_html = error_block(error);

    layout(
        "Sign up",
        &format!(
            r#"<h1>Sign up</h1>
        {error_html}
        <form method="POST" action="/sign">
            <div class="form-group">
                <label for="username">Username:</label>
                <input type="text" id="username" name="username" autofocus>
            </div>
            <div class="form-group">
                <label for="password1">Password:</label>
                <input type="password" id="password1" name="password1">
            </div>
            <div class="form-group">
                <label for="password2">Repeat password:</label>
                <input type="password" id="password2" name="password2">
            </div>
            <button type="submit">Sign up</button>
        </form>
        <p>Already have an account? <a href="/login">Log in</a></p>"#
        ),
    )
}

/// Render the login page
pub fn login(error: Option<&str>) -> String {
    let error_html = error_block(error);

    layout(
        "Log in",
        &format!(
            r#"<h1>Log in</h1>
        {error_html}
        <form method="POST" action="/log">
            <div class="form-group">
                <label for="username">Username:</label>
                <input type="text" id="username" name="username" autofocus>
            </div>
            <div class="form-group">
                <label for="password">Password:</label>
                <input type="password" id="password" name="password">
            </div>
            <button type="submit">Log in</button>
        </form>
        <p>Don't have an account? <a href="/signup">Sign up</a></p>"#
        ),
    )
}

/// Render the delete-account confirmation page
pub fn delete(user: Option<&str>, error: Option<&str>) -> String {
    let error_html = error_block(error);
    let prompt = user.map_or_else(
        || "Type the username of the account to delete.".to_string(),
        |user| {
            format!(
                "Type <strong>{}</strong> to confirm deleting your account.",
                html_escape(user)
            )
        },
    );

    layout(
        "Delete account",
        &format!(
            r#"<h1>Delete account</h1>
        {error_html}
        <p>{prompt}</p>
        <form method="POST" action="/rm">
            <div class="form-group">
                <label for="username">Username:</label>
                <input type="text" id="username" name="username" autofocus>
            </div>
            <button type="submit" class="danger">Delete</button>
        </form>
        <p><a href="/">Cancel</a></p>"#
        ),
    )
}

pub fn internal_error() -> String {
    layout(
        "Error",
        r#"<h1>Something went wrong</h1>
        <p>Please try again later.</p>
        <p><a href="/">Home</a></p>"#,
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
