// --- File: crates/services/coffeechat_backend/src/lib.rs ---
pub mod app_state;
pub mod service_factory;

pub use app_state::{cors_layer, AppState};
pub use service_factory::CoffeechatServiceFactory;
