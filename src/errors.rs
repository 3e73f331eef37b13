//! Error handling for the voting system

/// Result type alias for the voting system
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the voting system
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A record required by the operation does not exist
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// Name and voter ID do not match a registered voter
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The voter has already cast their vote
    #[error("Voter {voter_id} has already voted")]
    AlreadyVoted { voter_id: String },

    /// Underlying store failure
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// File access errors (seed data)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or invalid configuration
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl Error {
    /// Create a new not-found error
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Create a new already-voted error
    pub fn already_voted(voter_id: impl Into<String>) -> Self {
        Self::AlreadyVoted {
            voter_id: voter_id.into(),
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether the caller can recover by asking the user again.
    ///
    /// Storage, serialization and configuration failures abort the current
    /// operation instead.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::InvalidCredentials | Self::AlreadyVoted { .. }
        )
    }
}

/// Convenience macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($msg:expr) => {
        $crate::Error::config($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::config(format!($fmt, $($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let not_found = Error::not_found("voter", "1001");
        assert!(matches!(not_found, Error::NotFound { entity: "voter", .. }));
        assert_eq!(not_found.to_string(), "voter not found: 1001");

        let voted = Error::already_voted("1001");
        assert!(matches!(voted, Error::AlreadyVoted { .. }));

        let config_err = Error::config("PASSWORD missing");
        assert!(matches!(config_err, Error::Config { .. }));
    }

    #[test]
    fn test_error_macros() {
        let err = config_error!("bad value");
        assert!(matches!(err, Error::Config { .. }));

        let err = config_error!("bad value for {}", "PASSWORD");
        assert_eq!(err.to_string(), "Configuration error: bad value for PASSWORD");
    }

    #[test]
    fn test_user_correctable_classification() {
        assert!(Error::InvalidCredentials.is_user_correctable());
        assert!(Error::already_voted("1001").is_user_correctable());
        assert!(Error::not_found("party", "9").is_user_correctable());

        let storage = Error::Storage(rusqlite::Error::QueryReturnedNoRows);
        assert!(!storage.is_user_correctable());
        assert!(!Error::config("x").is_user_correctable());
    }
}
