// --- File: crates/services/coffeechat_backend/src/service_factory.rs ---
//! Builds the external providers selected by the runtime flags.
//!
//! A provider that fails to initialize is logged and left out; the routes that need it
//! answer 503 instead of the server refusing to start.
use coffeechat_common::services::{
    share_calendar_provider, share_text_generator, SharedCalendarProvider, SharedTextGenerator,
};
use coffeechat_common::{is_gcal_enabled, is_openai_enabled};
use coffeechat_config::AppConfig;
use coffeechat_gcal::auth::create_calendar_hub;
use coffeechat_gcal::GoogleCalendarService;
use coffeechat_openai::OpenAiService;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Clone, Default)]
pub struct CoffeechatServiceFactory {
    calendar: Option<SharedCalendarProvider>,
    generator: Option<SharedTextGenerator>,
}

impl CoffeechatServiceFactory {
    pub async fn new(config: &AppConfig) -> Self {
        Self {
            calendar: build_calendar_provider(config).await,
            generator: build_text_generator(config),
        }
    }

    /// Factory around already-built providers, used by tests.
    pub fn from_providers(
        calendar: Option<SharedCalendarProvider>,
        generator: Option<SharedTextGenerator>,
    ) -> Self {
        Self { calendar, generator }
    }

    pub fn calendar_provider(&self) -> Option<SharedCalendarProvider> {
        self.calendar.clone()
    }

    pub fn text_generator(&self) -> Option<SharedTextGenerator> {
        self.generator.clone()
    }
}

async fn build_calendar_provider(config: &AppConfig) -> Option<SharedCalendarProvider> {
    if !is_gcal_enabled(config) {
        warn!("Google Calendar is disabled; availability routes will answer 503");
        return None;
    }
    let gcal = config.gcal.as_ref()?;

    info!("ℹ️ Initializing Google Calendar service...");
    match create_calendar_hub(gcal).await {
        Ok(hub) => {
            info!("✅ Google Calendar service initialized");
            Some(share_calendar_provider(GoogleCalendarService::new(Arc::new(hub))))
        }
        Err(e) => {
            error!("❌ Failed to initialize Google Calendar: {}", e);
            None
        }
    }
}

fn build_text_generator(config: &AppConfig) -> Option<SharedTextGenerator> {
    if !is_openai_enabled(config) {
        info!("OpenAI is disabled; replies will use templates");
        return None;
    }
    let openai = config.openai.as_ref()?;

    match OpenAiService::new(openai) {
        Ok(service) => {
            info!("✅ OpenAI text generator initialized ({})", service.model());
            Some(share_text_generator(service))
        }
        Err(e) => {
            error!("❌ Failed to initialize OpenAI: {}", e);
            None
        }
    }
}
