//! Route handlers.

use axum::extract::{Form, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::model::FeatureVector;

use super::{blocking, views, AppState};

const DUPLICATE_USERNAME: &str = "Username already exists";
const MISSING_CREDENTIALS: &str = "Username and password are required";
const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Sign-in and sign-up form fields.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    username: String,
    password: String,
}

/// Prediction form fields.
#[derive(Debug, Deserialize)]
pub struct PredictionForm {
    origin: String,
    dest: String,
    carrier: String,
    temperature: String,
    wind_speed: String,
    flight_date: String,
}

fn parse_reading(value: &str, field: &str) -> std::result::Result<f64, String> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("{field} must be a number"))
}

impl PredictionForm {
    fn features(&self) -> std::result::Result<FeatureVector, String> {
        let temperature = parse_reading(&self.temperature, "Temperature")?;
        let wind_speed = parse_reading(&self.wind_speed, "Wind speed")?;
        Ok(FeatureVector::encode(
            &self.origin,
            &self.dest,
            &self.carrier,
            temperature,
            wind_speed,
        ))
    }
}

/// Resolve the session cookie to a signed-in username.
async fn current_user(state: &AppState, jar: &CookieJar) -> Result<Option<String>> {
    let Some(token) = jar
        .get(&state.session.cookie_name)
        .map(|cookie| cookie.value().to_string())
    else {
        return Ok(None);
    };

    let auth = state.auth.clone();
    blocking(move || auth.resolve_session(&token)).await
}

/// `GET /`
pub async fn home() -> Redirect {
    Redirect::to("/signin")
}

/// `GET /health`
pub async fn health() -> &'static str {
    "ok"
}

/// `GET /signup`
pub async fn signup_form() -> Response {
    views::signup(None).into_response()
}

/// `POST /signup`
pub async fn signup(
    State(state): State<AppState>,
    Form(form): Form<Credentials>,
) -> Result<Response> {
    let auth = state.auth.clone();
    let username = form.username.clone();
    let created = blocking(move || auth.add_user(&form.username, &form.password)).await;

    match created {
        Ok(true) => Ok(Redirect::to("/signin").into_response()),
        Ok(false) => {
            debug!("Sign-up rejected, {} already exists", username);
            Ok(views::signup(Some(DUPLICATE_USERNAME)).into_response())
        }
        Err(err) if err.is_client_error() => {
            Ok(views::signup(Some(MISSING_CREDENTIALS)).into_response())
        }
        Err(err) => Err(err),
    }
}

/// `GET /signin`
pub async fn signin_form() -> Response {
    views::signin(None).into_response()
}

/// `POST /signin`
pub async fn signin(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<Credentials>,
) -> Result<Response> {
    let auth = state.auth.clone();
    let token = blocking(move || {
        if auth.verify_user(&form.username, &form.password)? {
            auth.start_session(&form.username).map(Some)
        } else {
            Ok(None)
        }
    })
    .await?;

    let Some(token) = token else {
        return Ok(views::signin(Some(INVALID_CREDENTIALS)).into_response());
    };

    let cookie = Cookie::build((state.session.cookie_name.clone(), token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.session.secure_cookie);

    Ok((jar.add(cookie), Redirect::to("/predict")).into_response())
}

/// `GET /logout`
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Result<Response> {
    if let Some(cookie) = jar.get(&state.session.cookie_name) {
        let token = cookie.value().to_string();
        let auth = state.auth.clone();
        blocking(move || auth.end_session(&token)).await?;
    }

    let jar = jar.remove(Cookie::build((state.session.cookie_name.clone(), "")).path("/"));
    Ok((jar, Redirect::to("/signin")).into_response())
}

/// `GET /predict`
pub async fn predict_form(State(state): State<AppState>, jar: CookieJar) -> Result<Response> {
    let Some(username) = current_user(&state, &jar).await? else {
        return Ok(Redirect::to("/signin").into_response());
    };
    Ok(views::predict_form(&username, None).into_response())
}

/// `POST /predict`
pub async fn predict(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<PredictionForm>,
) -> Result<Response> {
    let Some(username) = current_user(&state, &jar).await? else {
        return Ok(Redirect::to("/signin").into_response());
    };

    let features = match form.features() {
        Ok(features) => features,
        Err(message) => {
            debug!("Rejected prediction form from {}: {}", username, message);
            return Ok(views::predict_form(&username, Some(&message)).into_response());
        }
    };

    let estimate = state.predictor.estimate(&features);
    info!(
        user = %username,
        origin = %form.origin,
        dest = %form.dest,
        carrier = %form.carrier,
        delay_minutes = estimate.minutes,
        delayed = estimate.is_delayed(),
        "Served prediction"
    );

    Ok(views::result(&estimate, &form.flight_date).into_response())
}
