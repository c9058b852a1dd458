// --- File: crates/coffeechat_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding the HTML front end, served as a fallback when present.
    pub static_dir: Option<String>,
    /// Origins allowed by the CORS layer. Empty means same-origin only.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5050,
            static_dir: None,
            allowed_origins: Vec::new(),
        }
    }
}

// --- Logging Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct LoggingConfig {
    /// Minimum level for the application's own targets ("info", "debug", ...).
    pub level: Option<String>,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<String>,
    /// File name prefix for the rolling log file.
    pub file_prefix: Option<String>,
}

// --- Google Calendar Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct GcalConfig {
    pub calendar_id: Option<String>,
    // Authorized-user credentials as raw or base64 JSON, usually "secret_from_env" -> GCAL_CREDENTIALS
    pub credentials: Option<String>,
    // Service account key file, used when no authorized-user credentials are configured
    pub key_path: Option<String>,
}

// --- Text Generation Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OpenAiConfig {
    // Secret, usually "secret_from_env" -> OPENAI_API_KEY
    pub api_key: Option<String>,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    #[serde(default = "default_openai_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    500
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_openai_base_url(),
            model: default_openai_model(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// --- Scheduling Config ---
// Times are "HH:MM" strings, days are "Mon".."Sun"; they are parsed by the gcal crate.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SchedulingConfig {
    /// IANA name of the reference timezone, e.g. "America/New_York".
    pub time_zone: String,
    pub work_start_time: String,
    pub work_end_time: String,
    pub working_days: Vec<String>,
    pub buffer_minutes: i64,
    /// Free ranges are snapped to this wall-clock grid. 0 disables snapping.
    pub slot_increment_minutes: i64,
    /// Working window applied in the recipient's timezone when it differs from `time_zone`.
    pub local_work_start_time: String,
    pub local_work_end_time: String,
    pub lead_time_minutes: i64,
    /// Maximum number of days proposed in a drafted email.
    pub max_days: usize,
    /// Label printed after reference-timezone times.
    pub reference_label: String,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            time_zone: "America/New_York".to_string(),
            work_start_time: "10:00".to_string(),
            work_end_time: "18:00".to_string(),
            working_days: ["Mon", "Tue", "Wed", "Thu", "Fri"]
                .iter()
                .map(|d| d.to_string())
                .collect(),
            buffer_minutes: 30,
            slot_increment_minutes: 30,
            local_work_start_time: "09:00".to_string(),
            local_work_end_time: "17:00".to_string(),
            lead_time_minutes: 0,
            max_days: 4,
            reference_label: "EST".to_string(),
        }
    }
}

// --- Reply Assistant Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ReplyConfig {
    /// Name used to sign drafted emails.
    pub signature_name: String,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            signature_name: "Candice".to_string(),
        }
    }
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_gcal: bool,
    #[serde(default)]
    pub use_openai: bool,

    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub scheduling: SchedulingConfig,
    #[serde(default)]
    pub reply: ReplyConfig,

    // --- Optional Provider Configurations ---
    #[serde(default)]
    pub gcal: Option<GcalConfig>,
    #[serde(default)]
    pub openai: Option<OpenAiConfig>,
}
