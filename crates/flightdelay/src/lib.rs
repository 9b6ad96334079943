//! `flightdelay` - Signed-in flight delay prediction service
//!
//! This library provides the credential store, session handling, delay model
//! and HTTP front end behind the `flightdelay` binary.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod storage;
pub mod web;

pub use auth::AuthService;
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use model::{DelayEstimate, DelayPredictor, FeatureVector};
pub use storage::{Storage, StorageStats};
pub use web::AppState;
