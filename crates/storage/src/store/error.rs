#![forbid(unsafe_code)]

use tb_core::profile::SchemaProfile;

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Sql(rusqlite::Error),
    InvalidInput(&'static str),
    ProfileMismatch {
        requested: SchemaProfile,
        stored: String,
    },
    UnknownId,
}

impl StoreError {
    /// The underlying engine message without the store's own prefix.
    pub fn engine_message(&self) -> String {
        match self {
            Self::Sql(err) => err.to_string(),
            Self::Io(err) => err.to_string(),
            other => other.to_string(),
        }
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io: {err}"),
            Self::Sql(err) => write!(f, "sqlite: {err}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::ProfileMismatch { requested, stored } => write!(
                f,
                "schema profile mismatch (requested={requested}, stored={stored})"
            ),
            Self::UnknownId => write!(f, "unknown id"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Sql(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sql(value)
    }
}
