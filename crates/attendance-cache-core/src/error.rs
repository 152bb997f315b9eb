use thiserror::Error;

/// Error types for cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The remote store could not be reached or a command against it failed.
    ///
    /// Read paths degrade to a cache miss on this error; write paths
    /// propagate it so the caller can decide whether to retry.
    #[error("remote store unavailable: {0}")]
    StoreUnavailable(String),

    /// A cached value could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A write was issued with neither an explicit TTL nor a known category.
    #[error("no TTL policy for write to key: {key}")]
    MissingTtlPolicy { key: String },

    /// Invalid configuration supplied at construction time.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl CacheError {
    /// Create a new StoreUnavailable error.
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable(message.into())
    }

    /// Create a new MissingTtlPolicy error.
    pub fn missing_ttl_policy(key: impl Into<String>) -> Self {
        Self::MissingTtlPolicy { key: key.into() }
    }

    /// Create a new Configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// True when the error indicates the remote store is unreachable.
    ///
    /// The cache manager uses this to turn remote failures on read paths
    /// into cache misses instead of hard failures.
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }

    /// True for errors caused by the caller rather than the environment.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::MissingTtlPolicy { .. } | Self::Configuration(_) | Self::Serialization(_)
        )
    }
}

/// Convenience result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_unavailable() {
        let err = CacheError::store_unavailable("connection refused");
        assert_eq!(
            err.to_string(),
            "remote store unavailable: connection refused"
        );
        assert!(err.is_store_unavailable());
        assert!(!err.is_caller_error());
    }

    #[test]
    fn test_missing_ttl_policy() {
        let err = CacheError::missing_ttl_policy("attendance:record:1:2025-11-17");
        assert_eq!(
            err.to_string(),
            "no TTL policy for write to key: attendance:record:1:2025-11-17"
        );
        assert!(err.is_caller_error());
        assert!(!err.is_store_unavailable());
    }

    #[test]
    fn test_serialization_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{ nope }").unwrap_err();
        let err: CacheError = json_err.into();
        assert!(matches!(err, CacheError::Serialization(_)));
        assert!(err.is_caller_error());
    }

    #[test]
    fn test_configuration_error() {
        let err = CacheError::configuration("unknown category: foo");
        assert_eq!(err.to_string(), "configuration error: unknown category: foo");
        assert!(err.is_caller_error());
    }
}
