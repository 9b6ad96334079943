//! HTTP front end.
//!
//! Routes:
//!
//! | Path | Purpose |
//! |------|---------|
//! | `/` | redirect to sign-in |
//! | `/signup` | create an account |
//! | `/signin` | start a session |
//! | `/logout` | end the session |
//! | `/predict` | prediction form and result (signed-in only) |
//! | `/health` | liveness probe |

mod handlers;
pub mod views;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::auth::AuthService;
use crate::config::{Config, SessionConfig};
use crate::error::{Error, Result};
use crate::model::DelayPredictor;
use crate::storage::Storage;

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    auth: Arc<AuthService>,
    predictor: DelayPredictor,
    session: Arc<SessionConfig>,
}

impl AppState {
    /// Assemble state from already-opened parts.
    #[must_use]
    pub fn new(auth: AuthService, predictor: DelayPredictor, session: SessionConfig) -> Self {
        Self {
            auth: Arc::new(auth),
            predictor,
            session: Arc::new(session),
        }
    }

    /// Open the store and load the model named by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the model
    /// artifact cannot be loaded.
    pub fn from_config(config: &Config) -> Result<Self> {
        let storage = Storage::open(config.database_path())?;
        let predictor = DelayPredictor::load(config.model_path())?;
        let auth = AuthService::new(storage, config.session_ttl());
        Ok(Self::new(auth, predictor, config.session.clone()))
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        if self.is_client_error() {
            return (StatusCode::BAD_REQUEST, self.to_string()).into_response();
        }
        error!("Request failed: {}", self);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

/// Run a store or hashing call off the async workers.
async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::internal(format!("blocking task failed: {e}")))?
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/signup", get(handlers::signup_form).post(handlers::signup))
        .route("/signin", get(handlers::signin_form).post(handlers::signin))
        .route("/logout", get(handlers::logout))
        .route("/predict", get(handlers::predict_form).post(handlers::predict))
        .route("/health", get(handlers::health))
        .with_state(state)
}

/// Serve the application until interrupted.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn serve(bind_address: &str, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(bind_address).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
