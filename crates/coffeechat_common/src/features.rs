//! Runtime feature flags.
//!
//! A provider is enabled when its `use_*` flag is set and its config section exists.
//! Compile-time features only gate the OpenAPI documentation (`openapi`).

use coffeechat_config::AppConfig;

/// Check if a feature is enabled at runtime based on configuration.
pub fn is_feature_enabled<T>(use_feature: bool, feature_config: Option<&T>) -> bool {
    use_feature && feature_config.is_some()
}

/// `true` when the Google Calendar provider should be built.
pub fn is_gcal_enabled(config: &AppConfig) -> bool {
    is_feature_enabled(config.use_gcal, config.gcal.as_ref())
}

/// `true` when the text generator should be built.
pub fn is_openai_enabled(config: &AppConfig) -> bool {
    is_feature_enabled(config.use_openai, config.openai.as_ref())
}
