// --- File: crates/coffeechat_openai/src/lib.rs ---
pub mod error;
pub mod models;
pub mod service;

pub use error::OpenAiError;
pub use service::OpenAiService;
