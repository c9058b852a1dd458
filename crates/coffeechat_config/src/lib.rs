use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::env;
use std::path::PathBuf;
use tracing::{debug, warn};

pub mod models;
pub use models::*;

/// Marker value in config files whose real value comes from the environment.
pub const SECRET_MARKER: &str = "secret_from_env";

/// Loads the application configuration.
///
/// Sources, later ones overriding earlier ones:
/// 1. `{CONFIG_DIR}/default.*` (optional)
/// 2. `{CONFIG_DIR}/{RUN_ENV}.*` (optional, `RUN_ENV` defaults to "debug")
/// 3. environment variables prefixed with `PREFIX` (default "COFFEECHAT") and `__` separated,
///    e.g. `COFFEECHAT__SERVER__PORT=8080`
///
/// Afterwards every `"secret_from_env"` value is replaced by the environment variable
/// named after its path, see [`apply_env_overrides_from_marker`].
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let prefix = env::var("PREFIX").unwrap_or_else(|_| "COFFEECHAT".to_string());
    let config_dir = PathBuf::from(env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string()));

    let default_path = config_dir.join("default");
    let env_path = config_dir.join(&run_env);
    debug!(
        "Loading config from {} and {}",
        default_path.display(),
        env_path.display()
    );

    let builder = Config::builder()
        .add_source(File::with_name(&default_path.to_string_lossy()).required(false))
        .add_source(File::with_name(&env_path.to_string_lossy()).required(false))
        .add_source(Environment::with_prefix(&prefix).separator("__"));

    let raw_config: AppConfig = builder.build()?.try_deserialize()?;
    apply_env_overrides_from_marker(raw_config)
}

/// Recursively replaces all "secret_from_env" string values with environment variable values
fn inject_env_secrets(value: &mut Value) {
    fn walk(path: Vec<String>, obj: &mut Value) {
        match obj {
            Value::Object(map) => {
                for (k, v) in map.iter_mut() {
                    let mut new_path = path.clone();
                    new_path.push(k.to_string());
                    walk(new_path, v);
                }
            }
            Value::String(s) if s == SECRET_MARKER => {
                let env_key = path.join("_").to_uppercase();
                match env::var(&env_key) {
                    Ok(env_val) => *obj = Value::String(env_val),
                    Err(_) => {
                        warn!("env var {} not found for {}", env_key, SECRET_MARKER);
                        *obj = Value::Null;
                    }
                }
            }
            _ => {}
        }
    }

    walk(vec![], value);
}

/// Applies environment overrides based on "secret_from_env" markers in serialized config.
///
/// `openai.api_key: secret_from_env` reads `OPENAI_API_KEY`, `gcal.credentials` reads
/// `GCAL_CREDENTIALS`. Markers without a matching variable become `None`.
pub fn apply_env_overrides_from_marker(config: AppConfig) -> Result<AppConfig, ConfigError> {
    let mut json = serde_json::to_value(&config)
        .map_err(|err| ConfigError::Message(format!("failed to serialize config: {err}")))?;
    inject_env_secrets(&mut json);
    serde_json::from_value(json)
        .map_err(|err| ConfigError::Message(format!("failed to rebuild config: {err}")))
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Ensures that the dotenv file is loaded into the environment variables.
///
/// The file is `DOTENV_OVERRIDE` when set, else the first command line argument when it
/// starts with ".env", else ".env". Loading happens once per process; the chosen path is
/// returned either way.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path_override = env::var("DOTENV_OVERRIDE").ok();
    let dotenv_path_arg = env::args().nth(1).filter(|s| s.starts_with(".env"));

    let dotenv_path = dotenv_path_override
        .or(dotenv_path_arg)
        .unwrap_or_else(|| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_eastern_business_hours() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 5050);
        assert_eq!(config.scheduling.time_zone, "America/New_York");
        assert_eq!(config.scheduling.work_start_time, "10:00");
        assert_eq!(config.scheduling.work_end_time, "18:00");
        assert_eq!(config.scheduling.buffer_minutes, 30);
        assert_eq!(config.scheduling.working_days.len(), 5);
        assert!(!config.use_gcal);
    }

    #[test]
    fn secret_marker_is_replaced_from_environment() {
        env::set_var("OPENAI_API_KEY", "sk-test-from-env");
        let config = AppConfig {
            use_openai: true,
            openai: Some(OpenAiConfig {
                api_key: Some(SECRET_MARKER.to_string()),
                ..OpenAiConfig::default()
            }),
            ..AppConfig::default()
        };

        let config = apply_env_overrides_from_marker(config).expect("config rebuilds");
        let api_key = config.openai.and_then(|o| o.api_key);
        assert_eq!(api_key.as_deref(), Some("sk-test-from-env"));
    }

    #[test]
    fn missing_secret_becomes_none() {
        let config = AppConfig {
            gcal: Some(GcalConfig {
                calendar_id: Some("primary".to_string()),
                credentials: None,
                key_path: Some(SECRET_MARKER.to_string()),
            }),
            ..AppConfig::default()
        };

        // GCAL_KEY_PATH is not expected to exist in the test environment.
        env::remove_var("GCAL_KEY_PATH");
        let config = apply_env_overrides_from_marker(config).expect("config rebuilds");
        let gcal = config.gcal.expect("gcal section kept");
        assert_eq!(gcal.key_path, None);
        assert_eq!(gcal.calendar_id.as_deref(), Some("primary"));
    }

    #[test]
    fn partial_scheduling_section_keeps_defaults() {
        let json = serde_json::json!({
            "scheduling": { "buffer_minutes": 15 }
        });
        let config: AppConfig = serde_json::from_value(json).expect("deserializes");
        assert_eq!(config.scheduling.buffer_minutes, 15);
        assert_eq!(config.scheduling.work_end_time, "18:00");
        assert_eq!(config.scheduling.max_days, 4);
    }
}
