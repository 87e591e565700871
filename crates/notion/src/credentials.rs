//! Per-request Notion credentials.
//!
//! The secret and database id are resolved on every request through a
//! [`CredentialSource`]; nothing is cached between requests.

use thiserror::Error;

pub const SECRET_VAR: &str = "NOTION_SECRET";
pub const DATABASE_ID_VAR: &str = "NOTION_DATABASE_ID";

/// Validated credentials, both values non-empty.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub secret: String,
    pub database_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("secret", &"<redacted>")
            .field("database_id", &self.database_id)
            .finish()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("Missing {}", .missing.join(" and "))]
    Missing { missing: Vec<&'static str> },
}

impl CredentialsError {
    /// Names of the variables that were absent or empty
    pub fn missing(&self) -> &[&'static str] {
        match self {
            CredentialsError::Missing { missing } => missing,
        }
    }
}

/// Credentials as read, before presence is checked.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RawCredentials {
    pub secret: Option<String>,
    pub database_id: Option<String>,
}

impl std::fmt::Debug for RawCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawCredentials")
            .field("has_secret", &self.has_secret())
            .field("database_id", &self.database_id)
            .finish()
    }
}

impl RawCredentials {
    pub fn has_secret(&self) -> bool {
        is_present(&self.secret)
    }

    pub fn has_database_id(&self) -> bool {
        is_present(&self.database_id)
    }

    /// Require both values to be present and non-empty.
    pub fn require(self) -> Result<Credentials, CredentialsError> {
        let mut missing = Vec::new();
        if !self.has_secret() {
            missing.push(SECRET_VAR);
        }
        if !self.has_database_id() {
            missing.push(DATABASE_ID_VAR);
        }

        match (self.secret, self.database_id) {
            (Some(secret), Some(database_id)) if missing.is_empty() => Ok(Credentials {
                secret,
                database_id,
            }),
            _ => Err(CredentialsError::Missing { missing }),
        }
    }
}

fn is_present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

/// Where request handlers obtain credentials from.
pub trait CredentialSource: Send + Sync {
    fn load(&self) -> RawCredentials;
}

/// Reads `NOTION_SECRET` and `NOTION_DATABASE_ID` from the process
/// environment at call time.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn load(&self) -> RawCredentials {
        RawCredentials {
            secret: std::env::var(SECRET_VAR).ok(),
            database_id: std::env::var(DATABASE_ID_VAR).ok(),
        }
    }
}

/// Fixed credentials, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials(RawCredentials);

impl StaticCredentials {
    pub fn new(secret: impl Into<String>, database_id: impl Into<String>) -> Self {
        Self(RawCredentials {
            secret: Some(secret.into()),
            database_id: Some(database_id.into()),
        })
    }

    /// A source with neither value set
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_raw(raw: RawCredentials) -> Self {
        Self(raw)
    }
}

impl CredentialSource for StaticCredentials {
    fn load(&self) -> RawCredentials {
        self.0.clone()
    }
}
