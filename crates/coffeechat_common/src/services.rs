//! Service abstractions for external providers.
//!
//! The reply flows and HTTP handlers depend on these traits rather than on the Google or
//! OpenAI clients directly, so tests can inject in-memory implementations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Busy or free interval as a pair of UTC instants.
pub type Interval = (DateTime<Utc>, DateTime<Utc>);

/// A wrapper error type that implements std::error::Error for Box<dyn std::error::Error + Send + Sync>
#[derive(Debug)]
pub struct BoxedError(pub Box<dyn StdError + Send + Sync>);

impl BoxedError {
    pub fn new<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        BoxedError(Box::new(err))
    }
}

impl fmt::Display for BoxedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StdError for BoxedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

impl From<Box<dyn StdError + Send + Sync>> for BoxedError {
    fn from(err: Box<dyn StdError + Send + Sync>) -> Self {
        BoxedError(err)
    }
}

/// Result of a calendar connection check.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarStatus {
    pub connected: bool,
    /// Summary of the first calendar visible to the credentials.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CalendarStatus {
    pub fn connected(calendar: Option<String>) -> Self {
        Self {
            connected: true,
            calendar,
            error: None,
        }
    }

    pub fn disconnected(error: impl Into<String>) -> Self {
        Self {
            connected: false,
            calendar: None,
            error: Some(error.into()),
        }
    }
}

/// A source of busy intervals for a calendar.
pub trait CalendarProvider: Send + Sync {
    /// Error type returned by calendar operations.
    type Error: StdError + Send + Sync + 'static;

    /// Busy intervals overlapping `[start, end)`. Order and overlap are not guaranteed.
    fn list_busy_intervals(
        &self,
        calendar_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<Interval>, Self::Error>;

    /// Verifies the credentials by reading a single calendar entry.
    fn check_connection(&self, calendar_id: &str) -> BoxFuture<'_, CalendarStatus, Self::Error>;
}

/// Produces free-form text for a prompt.
pub trait TextGenerator: Send + Sync {
    /// Error type returned by generation calls.
    type Error: StdError + Send + Sync + 'static;

    fn generate(&self, prompt: &str) -> BoxFuture<'_, String, Self::Error>;
}

/// Shared, type-erased calendar provider as stored in handler state.
pub type SharedCalendarProvider = Arc<dyn CalendarProvider<Error = BoxedError>>;

/// Shared, type-erased text generator as stored in handler state.
pub type SharedTextGenerator = Arc<dyn TextGenerator<Error = BoxedError>>;

/// Adapter that boxes the error type of a concrete [`CalendarProvider`].
pub struct ErasedCalendarProvider<P>(pub P);

impl<P: CalendarProvider> CalendarProvider for ErasedCalendarProvider<P> {
    type Error = BoxedError;

    fn list_busy_intervals(
        &self,
        calendar_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<Interval>, Self::Error> {
        let fut = self.0.list_busy_intervals(calendar_id, start, end);
        Box::pin(async move { fut.await.map_err(BoxedError::new) })
    }

    fn check_connection(&self, calendar_id: &str) -> BoxFuture<'_, CalendarStatus, Self::Error> {
        let fut = self.0.check_connection(calendar_id);
        Box::pin(async move { fut.await.map_err(BoxedError::new) })
    }
}

/// Adapter that boxes the error type of a concrete [`TextGenerator`].
pub struct ErasedTextGenerator<G>(pub G);

impl<G: TextGenerator> TextGenerator for ErasedTextGenerator<G> {
    type Error = BoxedError;

    fn generate(&self, prompt: &str) -> BoxFuture<'_, String, Self::Error> {
        let fut = self.0.generate(prompt);
        Box::pin(async move { fut.await.map_err(BoxedError::new) })
    }
}

/// Wraps a concrete provider for storage in handler state.
pub fn share_calendar_provider<P: CalendarProvider + 'static>(provider: P) -> SharedCalendarProvider {
    Arc::new(ErasedCalendarProvider(provider))
}

/// Wraps a concrete generator for storage in handler state.
pub fn share_text_generator<G: TextGenerator + 'static>(generator: G) -> SharedTextGenerator {
    Arc::new(ErasedTextGenerator(generator))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(Debug, thiserror::Error)]
    #[error("calendar offline")]
    struct Offline;

    struct OfflineCalendar;

    impl CalendarProvider for OfflineCalendar {
        type Error = Offline;

        fn list_busy_intervals(
            &self,
            _calendar_id: &str,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> BoxFuture<'_, Vec<Interval>, Self::Error> {
            Box::pin(async { Err(Offline) })
        }

        fn check_connection(&self, _calendar_id: &str) -> BoxFuture<'_, CalendarStatus, Self::Error> {
            Box::pin(async { Ok(CalendarStatus::disconnected("offline")) })
        }
    }

    struct Echo;

    impl TextGenerator for Echo {
        type Error = Offline;

        fn generate(&self, prompt: &str) -> BoxFuture<'_, String, Self::Error> {
            let reply = format!("echo: {}", prompt);
            Box::pin(async move { Ok(reply) })
        }
    }

    #[tokio::test]
    async fn erased_provider_keeps_error_message() {
        let provider = share_calendar_provider(OfflineCalendar);
        let start = Utc.with_ymd_and_hms(2025, 3, 4, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 3, 5, 0, 0, 0).unwrap();

        let err = provider
            .list_busy_intervals("primary", start, end)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "calendar offline");

        let status = provider.check_connection("primary").await.unwrap();
        assert!(!status.connected);
        assert_eq!(status.error.as_deref(), Some("offline"));
    }

    #[tokio::test]
    async fn erased_generator_passes_output_through() {
        let generator = share_text_generator(Echo);
        assert_eq!(generator.generate("hi").await.unwrap(), "echo: hi");
    }

    #[test]
    fn status_omits_empty_fields() {
        let json = serde_json::to_value(CalendarStatus::connected(None)).unwrap();
        assert_eq!(json, serde_json::json!({ "connected": true }));
    }
}
