/// Structured error handling for scorehub
///
/// One top-level error type wrapping the per-subsystem error enums. The
/// rate-limited outcome is deliberately NOT an error: a rejected submission
/// is an expected result and travels through `RateLimitResult` instead.

// =============================================================================
// MAIN ERROR TYPE
// =============================================================================

#[derive(Debug, Clone)]
pub enum ScorehubError {
    // Backing score/window storage failures
    Store(StoreError),

    // Configuration errors
    Configuration(ConfigurationError),
}

impl std::fmt::Display for ScorehubError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScorehubError::Store(e) => write!(f, "Store Error: {}", e),
            ScorehubError::Configuration(e) => write!(f, "Configuration Error: {}", e),
        }
    }
}

impl std::error::Error for ScorehubError {}

impl From<StoreError> for ScorehubError {
    fn from(e: StoreError) -> Self {
        ScorehubError::Store(e)
    }
}

impl From<ConfigurationError> for ScorehubError {
    fn from(e: ConfigurationError) -> Self {
        ScorehubError::Configuration(e)
    }
}

// =============================================================================
// STORE ERROR TYPES
// =============================================================================

/// Failures of the backing state engine.
///
/// The ranked score store propagates these to its caller; a failed increment
/// is never reported as successful. The sliding-window limiter is the one
/// component that recovers locally (fail-open) instead of propagating.
#[derive(Debug, Clone)]
pub enum StoreError {
    Unavailable { operation: &'static str, reason: String },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Unavailable { operation, reason } => {
                write!(f, "backing store unavailable during {}: {}", operation, reason)
            }
        }
    }
}

impl std::error::Error for StoreError {}

// =============================================================================
// SINK ERROR TYPES
// =============================================================================

/// Subscriber sink write failures
///
/// Recovered locally inside the hub by detaching the subscriber; never
/// surfaced to a publisher. Deliberately not part of `ScorehubError`.
#[derive(Debug, Clone)]
pub enum SinkError {
    Closed { subscriber_id: String },
}

impl std::fmt::Display for SinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkError::Closed { subscriber_id } => {
                write!(f, "subscriber sink closed: {}", subscriber_id)
            }
        }
    }
}

impl std::error::Error for SinkError {}

// =============================================================================
// CONFIGURATION ERROR TYPES
// =============================================================================

#[derive(Debug, Clone)]
pub enum ConfigurationError {
    InvalidValue { field: &'static str, reason: String },
}

impl std::fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigurationError::InvalidValue { field, reason } => {
                write!(f, "invalid value for {}: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ConfigurationError {}
