//! Storage layer for flightdelay.
//!
//! This module provides `SQLite`-based persistent storage for user
//! credentials and server-side sign-in sessions.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// A registered user as stored in the credentials table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Row identifier.
    pub id: i64,
    /// Unique username.
    pub username: String,
    /// Salted password hash in PHC string format.
    pub password_hash: String,
}

/// A persisted sign-in session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// BLAKE3 hash of the session token handed to the client.
    pub token_hash: String,
    /// The signed-in user.
    pub username: String,
    /// When the session was started.
    pub created_at: DateTime<Utc>,
    /// When the session stops being valid.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Check whether the session has expired as of `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Credential and session store.
///
/// Holds a single direct connection to the database file.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

/// Format a timestamp so that lexical order matches chronological order.
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value).map_or_else(
        |_| {
            warn!("Unparseable timestamp in sessions table: {}", value);
            DateTime::<Utc>::default()
        },
        |dt| dt.with_timezone(&Utc),
    )
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert a new user row.
    ///
    /// Returns `false` if the username is already taken.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails for any other reason.
    pub fn create_user(&self, username: &str, password_hash: &str) -> Result<bool> {
        let result = self.conn.execute(
            "INSERT INTO users (username, password) VALUES (?1, ?2)",
            params![username, password_hash],
        );

        match result {
            Ok(_) => {
                debug!("Created user {}", username);
                Ok(true)
            }
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                debug!("Username {} already exists", username);
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Look up a user by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_user(&self, username: &str) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, username, password FROM users WHERE username = ?1",
                [username],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        password_hash: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    /// Count registered users.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count_users(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Persist a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert_session(&self, session: &Session) -> Result<()> {
        self.conn.execute(
            r"
            INSERT INTO sessions (token_hash, username, created_at, expires_at)
            VALUES (?1, ?2, ?3, ?4)
            ",
            params![
                session.token_hash,
                session.username,
                format_timestamp(session.created_at),
                format_timestamp(session.expires_at),
            ],
        )?;
        Ok(())
    }

    /// Get a session by its token hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_session(&self, token_hash: &str) -> Result<Option<Session>> {
        let session = self
            .conn
            .query_row(
                r"
                SELECT token_hash, username, created_at, expires_at
                FROM sessions WHERE token_hash = ?1
                ",
                [token_hash],
                Self::row_to_session,
            )
            .optional()?;
        Ok(session)
    }

    /// Delete a session by its token hash.
    ///
    /// Returns `true` if a session was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_session(&self, token_hash: &str) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM sessions WHERE token_hash = ?1", [token_hash])?;
        Ok(affected > 0)
    }

    /// Delete every session that has expired as of `now`.
    ///
    /// Returns the number of sessions deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn prune_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize> {
        let affected = self.conn.execute(
            "DELETE FROM sessions WHERE expires_at <= ?1",
            [format_timestamp(now)],
        )?;

        if affected > 0 {
            info!("Pruned {} expired sessions", affected);
        }
        Ok(affected)
    }

    /// Count sessions that are still valid as of `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count_active_sessions(&self, now: DateTime<Utc>) -> Result<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sessions WHERE expires_at > ?1",
            [format_timestamp(now)],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let total_users = self.count_users()?;
        let active_sessions = self.count_active_sessions(Utc::now())?;

        let path = self.path();
        let db_size_bytes = if path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            database_path: path.to_path_buf(),
            total_users,
            active_sessions,
            db_size_bytes,
        })
    }

    fn row_to_session(row: &rusqlite::Row) -> rusqlite::Result<Session> {
        let created_at: String = row.get(2)?;
        let expires_at: String = row.get(3)?;

        Ok(Session {
            token_hash: row.get(0)?,
            username: row.get(1)?,
            created_at: parse_timestamp(&created_at),
            expires_at: parse_timestamp(&expires_at),
        })
    }
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageStats {
    /// Database file the counts were read from.
    pub database_path: PathBuf,
    /// Number of registered users.
    pub total_users: i64,
    /// Number of sessions that have not expired.
    pub active_sessions: i64,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
