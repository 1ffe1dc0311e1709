//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid public base URL")]
    InvalidBaseUrl,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("A database URL is required in production")]
    DatabaseRequiredInProduction,

    #[error("SMTP server not configured")]
    MissingSmtpServer,

    #[error("Invalid from email address")]
    InvalidFromEmail,

    #[error("SMTP username/password not configured")]
    IncompleteBasicCredentials,

    #[error("OAuth2 credentials incomplete")]
    IncompleteOAuth2Credentials,

    #[error("Invalid AI endpoint URL")]
    InvalidAiBaseUrl,

    #[error("Administrator secret digest must be 64 hex characters")]
    InvalidAdminDigest,

    #[error("Session TTL must be between 60 seconds and 7 days")]
    InvalidSessionTtl,
}
