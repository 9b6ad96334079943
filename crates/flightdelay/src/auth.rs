//! User registration, credential checks and sign-in sessions.
//!
//! Passwords are stored as salted Argon2 hashes. Sessions are opaque random
//! tokens handed to the browser; only their BLAKE3 hash is persisted.

use std::sync::{Mutex, MutexGuard, OnceLock};

use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use chrono::{Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::storage::{Session, Storage, StorageStats};

/// Length of the session token handed to the client.
const SESSION_TOKEN_LEN: usize = 48;

/// Hash a password with a fresh random salt.
///
/// # Errors
///
/// Returns an error if hashing fails.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Check a password against a stored hash.
///
/// # Errors
///
/// Returns an error if the stored hash is malformed.
pub fn check_password(stored_hash: &str, password: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Hash checked when the username is unknown, so both paths pay the Argon2 cost.
fn dummy_hash() -> Option<&'static str> {
    static DUMMY: OnceLock<Option<String>> = OnceLock::new();
    DUMMY
        .get_or_init(|| hash_password("flightdelay-unknown-user").ok())
        .as_deref()
}

fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_TOKEN_LEN)
        .map(char::from)
        .collect()
}

fn token_hash(token: &str) -> String {
    blake3::hash(token.as_bytes()).to_hex().to_string()
}

/// Credential store and session issuer.
///
/// Wraps the single storage connection behind a mutex; every method is a
/// short synchronous call.
#[derive(Debug)]
pub struct AuthService {
    storage: Mutex<Storage>,
    session_ttl: Duration,
}

impl AuthService {
    /// Create a service over an opened store.
    #[must_use]
    pub fn new(storage: Storage, session_ttl: Duration) -> Self {
        dummy_hash();
        Self {
            storage: Mutex::new(storage),
            session_ttl,
        }
    }

    fn storage(&self) -> Result<MutexGuard<'_, Storage>> {
        self.storage
            .lock()
            .map_err(|_| Error::internal("storage lock poisoned"))
    }

    /// Register a new user.
    ///
    /// Returns `false` if the username is already taken.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for an empty username or password, or
    /// an error if hashing or the database operation fails.
    pub fn add_user(&self, username: &str, password: &str) -> Result<bool> {
        if username.is_empty() {
            return Err(Error::invalid_input("username is required"));
        }
        if password.is_empty() {
            return Err(Error::invalid_input("password is required"));
        }

        let hash = hash_password(password)?;
        let created = self.storage()?.create_user(username, &hash)?;
        if created {
            info!("Registered user {}", username);
        }
        Ok(created)
    }

    /// Check a username and password.
    ///
    /// Unknown users and wrong passwords both yield `false`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails or the stored hash
    /// is malformed.
    pub fn verify_user(&self, username: &str, password: &str) -> Result<bool> {
        let user = self.storage()?.get_user(username)?;
        match user {
            Some(user) => {
                let ok = check_password(&user.password_hash, password)?;
                debug!("Credential check for {}: {}", username, ok);
                Ok(ok)
            }
            None => {
                if let Some(hash) = dummy_hash() {
                    check_password(hash, password)?;
                }
                debug!("Credential check for unknown user {}", username);
                Ok(false)
            }
        }
    }

    /// Start a session for a signed-in user and return its token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn start_session(&self, username: &str) -> Result<String> {
        let token = generate_token();
        let now = Utc::now();
        let session = Session {
            token_hash: token_hash(&token),
            username: username.to_string(),
            created_at: now,
            expires_at: now + self.session_ttl,
        };

        let storage = self.storage()?;
        storage.prune_expired_sessions(now)?;
        storage.insert_session(&session)?;

        info!("Signed in {}", username);
        Ok(token)
    }

    /// Resolve a session token to the signed-in username.
    ///
    /// Unknown and expired tokens resolve to `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn resolve_session(&self, token: &str) -> Result<Option<String>> {
        let hash = token_hash(token);
        let storage = self.storage()?;

        match storage.get_session(&hash)? {
            Some(session) if session.is_expired(Utc::now()) => {
                debug!("Session for {} expired", session.username);
                storage.delete_session(&hash)?;
                Ok(None)
            }
            Some(session) => Ok(Some(session.username)),
            None => Ok(None),
        }
    }

    /// End a session. Unknown tokens are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn end_session(&self, token: &str) -> Result<()> {
        if self.storage()?.delete_session(&token_hash(token))? {
            info!("Session ended");
        }
        Ok(())
    }

    /// Get store statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        self.storage()?.stats()
    }
}
