// --- File: crates/coffeechat_common/src/lib.rs ---

pub mod error; // Error handling
pub mod features; // Runtime feature flags
pub mod handlers; // Shared HTTP handlers
pub mod http; // HTTP utilities
pub mod logging; // Logging setup
pub mod routes; // Shared routes
pub mod services; // Provider abstractions

pub use routes::routes;

pub use error::{
    config_error, external_service_error, internal_error, service_disabled,
    validation_error, CoffeechatError, Context, HttpStatusCode,
};

pub use http::{client::create_client, IntoHttpResponse};

pub use logging::{init_from_config, parse_level};

pub use features::{is_feature_enabled, is_gcal_enabled, is_openai_enabled};

pub use services::{
    share_calendar_provider, share_text_generator, BoxFuture, BoxedError, CalendarProvider,
    CalendarStatus, Interval, SharedCalendarProvider, SharedTextGenerator, TextGenerator,
};
