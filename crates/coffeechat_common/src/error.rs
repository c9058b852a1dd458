use std::fmt;
use thiserror::Error;

/// The base error type for all Coffee Chat errors.
///
/// Each crate keeps its own error enum and implements `From<SpecificError> for CoffeechatError`,
/// so handlers can return this type and let [`IntoResponse`](axum::response::IntoResponse)
/// pick the status code.
#[derive(Error, Debug)]
pub enum CoffeechatError {
    /// Error occurred during an HTTP request
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error occurred during authentication or authorization
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Error occurred during validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error occurred during external service call
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    /// A feature is switched off in the runtime configuration
    #[error("Service unavailable: {0}")]
    ServiceDisabled(String),

    /// Error occurred due to a resource not being found
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Error occurred due to a timeout
    #[error("Timeout: {0}")]
    TimeoutError(String),

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for CoffeechatError {
    fn status_code(&self) -> u16 {
        match self {
            CoffeechatError::HttpError(_) => 500,
            CoffeechatError::ParseError(_) => 400,
            CoffeechatError::ConfigError(_) => 500,
            CoffeechatError::AuthError(_) => 401,
            CoffeechatError::ValidationError(_) => 400,
            CoffeechatError::ExternalServiceError { .. } => 502,
            CoffeechatError::ServiceDisabled(_) => 503,
            CoffeechatError::NotFoundError(_) => 404,
            CoffeechatError::TimeoutError(_) => 504,
            CoffeechatError::InternalError(_) => 500,
        }
    }
}

/// A trait for adding context to errors.
pub trait Context<T, E> {
    /// Adds context to an error.
    fn context<C>(self, context: C) -> Result<T, CoffeechatError>
    where
        C: fmt::Display + Send + Sync + 'static;

    /// Adds context to an error with a lazy context provider.
    fn with_context<C, F>(self, f: F) -> Result<T, CoffeechatError>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E: std::error::Error + Send + Sync + 'static> Context<T, E> for Result<T, E> {
    fn context<C>(self, context: C) -> Result<T, CoffeechatError>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|error| CoffeechatError::InternalError(format!("{}: {}", context, error)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T, CoffeechatError>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|error| CoffeechatError::InternalError(format!("{}: {}", f(), error)))
    }
}

// Common error conversions
impl From<reqwest::Error> for CoffeechatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CoffeechatError::TimeoutError(err.to_string())
        } else {
            CoffeechatError::HttpError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for CoffeechatError {
    fn from(err: serde_json::Error) -> Self {
        CoffeechatError::ParseError(err.to_string())
    }
}

impl From<std::io::Error> for CoffeechatError {
    fn from(err: std::io::Error) -> Self {
        CoffeechatError::InternalError(err.to_string())
    }
}

// Utility functions for error handling
pub fn config_error<T: fmt::Display>(message: T) -> CoffeechatError {
    CoffeechatError::ConfigError(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> CoffeechatError {
    CoffeechatError::ValidationError(message.to_string())
}

pub fn service_disabled<T: fmt::Display>(message: T) -> CoffeechatError {
    CoffeechatError::ServiceDisabled(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> CoffeechatError {
    CoffeechatError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}

pub fn internal_error<T: fmt::Display>(message: T) -> CoffeechatError {
    CoffeechatError::InternalError(message.to_string())
}
