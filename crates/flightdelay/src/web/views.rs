//! HTML pages.
//!
//! Each page takes its named variables and returns the rendered document.
//! Anything that may come from the request is escaped.

use axum::response::Html;

use crate::model::features::{AIRPORTS, CARRIERS};
use crate::model::DelayEstimate;

/// Escape text for inclusion in HTML content or attribute values.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | Flight Delay Prediction</title>
</head>
<body>
<main>
{body}
</main>
</body>
</html>
"#,
        title = escape(title),
    ))
}

fn error_banner(error: Option<&str>) -> String {
    error.map_or_else(String::new, |e| {
        format!(r#"<p class="error" role="alert">{}</p>"#, escape(e))
    })
}

fn credentials_form(action: &str, submit: &str) -> String {
    format!(
        r#"<form method="post" action="{action}">
<label>Username <input type="text" name="username" required autofocus></label>
<label>Password <input type="password" name="password" required></label>
<button type="submit">{submit}</button>
</form>"#
    )
}

/// Sign-in page.
#[must_use]
pub fn signin(error: Option<&str>) -> Html<String> {
    let body = format!(
        r#"<h1>Sign in</h1>
{}
{}
<p>No account? <a href="/signup">Sign up</a></p>"#,
        error_banner(error),
        credentials_form("/signin", "Sign in"),
    );
    layout("Sign in", &body)
}

/// Sign-up page.
#[must_use]
pub fn signup(error: Option<&str>) -> Html<String> {
    let body = format!(
        r#"<h1>Create an account</h1>
{}
{}
<p>Already registered? <a href="/signin">Sign in</a></p>"#,
        error_banner(error),
        credentials_form("/signup", "Sign up"),
    );
    layout("Sign up", &body)
}

fn select(name: &str, label: &str, options: &[(&str, u8)]) -> String {
    let options: String = options
        .iter()
        .map(|(code, _)| format!(r#"<option value="{code}">{code}</option>"#))
        .collect();
    format!(r#"<label>{label} <select name="{name}" required>{options}</select></label>"#)
}

/// Prediction form.
#[must_use]
pub fn predict_form(username: &str, error: Option<&str>) -> Html<String> {
    let body = format!(
        r#"<p>Signed in as <strong>{user}</strong> | <a href="/logout">Log out</a></p>
<h1>Flight Delay Prediction</h1>
{error}
<form method="post" action="/predict">
{origin}
{dest}
{carrier}
<label>Temperature <input type="number" step="any" name="temperature" required></label>
<label>Wind speed <input type="number" step="any" name="wind_speed" required></label>
<label>Flight date <input type="date" name="flight_date" required></label>
<button type="submit">Predict</button>
</form>"#,
        user = escape(username),
        error = error_banner(error),
        origin = select("origin", "Origin", AIRPORTS),
        dest = select("dest", "Destination", AIRPORTS),
        carrier = select("carrier", "Carrier", CARRIERS),
    );
    layout("Predict", &body)
}

/// Prediction result page.
#[must_use]
pub fn result(estimate: &DelayEstimate, flight_date: &str) -> Html<String> {
    let body = format!(
        r#"<h1>{message}</h1>
<p class="delay">{text}</p>
<p>Flight date: {date}</p>
<p><a href="/predict">Predict another flight</a> | <a href="/logout">Log out</a></p>"#,
        message = escape(estimate.message),
        text = escape(&estimate.text),
        date = escape(flight_date),
    );
    layout("Result", &body)
}
