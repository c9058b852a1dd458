// --- File: crates/coffeechat_reply/src/lib.rs ---
pub mod date_range;
pub mod doc;
pub mod email;
pub mod format;
pub mod handlers;
pub mod logic;
#[cfg(test)]
mod mock;
pub mod prompts;
pub mod routes;

pub use date_range::{DateRange, DateRangeKind};
pub use email::EmailAnalysis;
pub use format::FormattedBlock;
pub use logic::{ReplyError, ReplyState};
