// --- File: crates/coffeechat_common/src/http/client.rs ---
use reqwest::{redirect::Policy, Client, Error as ReqwestError};
use std::time::Duration;

const USER_AGENT: &str = concat!("coffeechat/", env!("CARGO_PKG_VERSION"));

/// Builds the client used for outbound provider calls.
///
/// The timeout covers the whole request, so a slow provider fails the call instead of
/// holding the handler open.
pub fn create_client(timeout_secs: u64, follow_redirects: bool) -> Result<Client, ReqwestError> {
    let redirect = if follow_redirects {
        Policy::limited(5)
    } else {
        Policy::none()
    };
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(USER_AGENT)
        .redirect(redirect)
        .build()
}
