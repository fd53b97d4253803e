//! Error types for libnexus
//!
//! This module provides error handling for registry access and the tag
//! retention engine.
//! All errors implement the standard Error trait and provide context-rich
//! error messages.

use thiserror::Error;


/// Main error type for libnexus operations
#[derive(Error, Debug)]
pub enum NexusError {
    /// Network-related errors (connection, timeout, DNS)
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Authentication errors (401, 403, token issues)
    #[error("Authentication error (status: {status_code:?}): {message}")]
    Authentication {
        message: String,
        status_code: Option<u16>,
    },

    /// Resource not found errors (404)
    #[error("{resource_type} not found: {name}")]
    NotFound { resource_type: String, name: String },

    /// Rate limiting errors (429)
    #[error("Rate limit: {message}")]
    RateLimit {
        message: String,
        retry_after: Option<u64>,
    },

    /// Server errors (500, 503)
    #[error("Server error (status: {status_code}): {message}")]
    Server { message: String, status_code: u16 },

    /// Validation errors (invalid manifest, digest mismatch, etc.)
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration errors (invalid config file, missing settings)
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        path: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A tag could not be resolved to its content digest
    #[error("Failed to resolve digest for tag '{tag}': {source}")]
    Resolution {
        tag: String,
        #[source]
        source: Box<NexusError>,
    },

    /// A tag could not be parsed as a version
    #[error("Failed to parse version from tag '{tag}': {message}")]
    VersionParse { tag: String, message: String },

    /// The registry rejected or failed a delete request for one tag
    #[error("Failed to delete tag '{tag}': {source}")]
    Delete {
        tag: String,
        #[source]
        source: Box<NexusError>,
    },

    /// A keep specification could not be parsed
    #[error("Invalid keep specification '{spec}': {message}")]
    InvalidSpec { spec: String, message: String },
}

/// Result type alias for libnexus operations
pub type Result<T> = std::result::Result<T, NexusError>;

impl NexusError {
    /// Creates a new network error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libnexus::error::NexusError;
    ///
    /// let err = NexusError::network("connection refused");
    /// assert!(matches!(err, NexusError::Network { .. }));
    /// ```
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new network error with a source error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libnexus::error::NexusError;
    /// use std::io;
    ///
    /// let io_err = io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused");
    /// let err = NexusError::network_with_source("failed to connect", io_err);
    /// assert!(matches!(err, NexusError::Network { .. }));
    /// ```
    pub fn network_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Network {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new authentication error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libnexus::error::NexusError;
    ///
    /// let err = NexusError::authentication("invalid credentials", Some(401));
    /// assert!(matches!(err, NexusError::Authentication { .. }));
    /// ```
    pub fn authentication<S: Into<String>>(message: S, status_code: Option<u16>) -> Self {
        Self::Authentication {
            message: message.into(),
            status_code,
        }
    }

    /// Creates a new not found error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libnexus::error::NexusError;
    ///
    /// let err = NexusError::not_found("repository", "myrepo");
    /// assert!(matches!(err, NexusError::NotFound { .. }));
    /// ```
    pub fn not_found<R: Into<String>, N: Into<String>>(resource_type: R, name: N) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }

    /// Creates a new rate limit error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libnexus::error::NexusError;
    ///
    /// let err = NexusError::rate_limit("too many requests", Some(60));
    /// assert!(matches!(err, NexusError::RateLimit { .. }));
    /// ```
    pub fn rate_limit<S: Into<String>>(message: S, retry_after: Option<u64>) -> Self {
        Self::RateLimit {
            message: message.into(),
            retry_after,
        }
    }

    /// Creates a new server error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libnexus::error::NexusError;
    ///
    /// let err = NexusError::server("internal server error", 500);
    /// assert!(matches!(err, NexusError::Server { .. }));
    /// ```
    pub fn server<S: Into<String>>(message: S, status_code: u16) -> Self {
        Self::Server {
            message: message.into(),
            status_code,
        }
    }

    /// Creates a new validation error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libnexus::error::NexusError;
    ///
    /// let err = NexusError::validation("invalid manifest format");
    /// assert!(matches!(err, NexusError::Validation { .. }));
    /// ```
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new validation error with a source error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libnexus::error::NexusError;
    /// use std::io;
    ///
    /// let io_err = io::Error::new(io::ErrorKind::InvalidData, "invalid data");
    /// let err = NexusError::validation_with_source("invalid format", io_err);
    /// assert!(matches!(err, NexusError::Validation { .. }));
    /// ```
    pub fn validation_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Validation {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new configuration error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libnexus::error::NexusError;
    ///
    /// let err = NexusError::config("invalid config file", Some("/path/to/config.toml"));
    /// assert!(matches!(err, NexusError::Config { .. }));
    /// ```
    pub fn config<S: Into<String>, P: Into<String>>(message: S, path: Option<P>) -> Self {
        Self::Config {
            message: message.into(),
            path: path.map(|p| p.into()),
            source: None,
        }
    }

    /// Creates a new configuration error with a source error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libnexus::error::NexusError;
    /// use std::io;
    ///
    /// let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
    /// let err = NexusError::config_with_source("failed to read config", Some("/path/to/config.toml"), io_err);
    /// assert!(matches!(err, NexusError::Config { .. }));
    /// ```
    pub fn config_with_source<S, P, E>(message: S, path: Option<P>, source: E) -> Self
    where
        S: Into<String>,
        P: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Config {
            message: message.into(),
            path: path.map(|p| p.into()),
            source: Some(Box::new(source)),
        }
    }

    /// Wraps an error raised while resolving `tag` to a digest.
    ///
    /// # Examples
    ///
    /// ```
    /// use libnexus::error::NexusError;
    ///
    /// let err = NexusError::resolution("v1", NexusError::not_found("tag", "v1"));
    /// assert!(matches!(err, NexusError::Resolution { .. }));
    /// ```
    pub fn resolution<S: Into<String>>(tag: S, source: NexusError) -> Self {
        Self::Resolution {
            tag: tag.into(),
            source: Box::new(source),
        }
    }

    /// Creates a version parse error.
    pub fn version_parse<S: Into<String>, M: Into<String>>(tag: S, message: M) -> Self {
        Self::VersionParse {
            tag: tag.into(),
            message: message.into(),
        }
    }

    /// Wraps an error raised while deleting `tag`.
    pub fn delete<S: Into<String>>(tag: S, source: NexusError) -> Self {
        Self::Delete {
            tag: tag.into(),
            source: Box::new(source),
        }
    }

    /// Creates an invalid keep specification error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libnexus::error::NexusError;
    ///
    /// let err = NexusError::invalid_spec(":3", "group key is empty");
    /// assert!(err.to_string().contains(":3"));
    /// ```
    pub fn invalid_spec<S: Into<String>, M: Into<String>>(spec: S, message: M) -> Self {
        Self::InvalidSpec {
            spec: spec.into(),
            message: message.into(),
        }
    }

    /// Returns true if this error (or the error it wraps) is a not found error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Resolution { source, .. } | Self::Delete { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    /// Returns the tag this error refers to, if it is tag scoped.
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Resolution { tag, .. }
            | Self::VersionParse { tag, .. }
            | Self::Delete { tag, .. } => Some(tag),
            _ => None,
        }
    }
}
