// --- File: crates/coffeechat_reply/src/email.rs ---
use crate::date_range::next_monday;
use chrono::{Duration, NaiveDate};
use coffeechat_common::services::TextGenerator;
use coffeechat_common::BoxedError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

/// Greeting used when no sender name can be found.
pub const DEFAULT_SENDER_NAME: &str = "there";

/// Meeting details extracted from an incoming email.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmailAnalysis {
    #[serde(default, deserialize_with = "optional_text")]
    pub sender_name: Option<String>,
    #[serde(default, deserialize_with = "optional_minutes")]
    pub duration: Option<i64>,
    #[serde(default, deserialize_with = "optional_text")]
    pub timezone: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub start_date: Option<String>,
    /// Exclusive
    #[serde(default, deserialize_with = "optional_text")]
    pub end_date: Option<String>,
}

impl EmailAnalysis {
    pub fn custom_range(&self) -> Option<(&str, &str)> {
        Some((self.start_date.as_deref()?, self.end_date.as_deref()?))
    }
}

/// Treats JSON null, blank strings and the literal "null" as absent.
pub fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => {
            let s = s.trim();
            (!s.is_empty() && !s.eq_ignore_ascii_case("null")).then(|| s.to_string())
        }
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Accepts a number or a numeric string; anything else is absent.
pub fn optional_minutes<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Some(serde_json::Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}

/// Prompt asking the model for an [`EmailAnalysis`] as bare JSON.
pub fn analysis_prompt(email_text: &str, today: NaiveDate) -> String {
    let monday = next_monday(today);
    let friday = monday + Duration::days(4);
    let saturday = friday + Duration::days(1);

    format!(
        r#"Today is {today}. Next week runs from Monday {monday} to Friday {friday}.

Read the email below and extract what it says about scheduling a meeting. Reply with ONLY a JSON object containing:

1. "sender_name": first name of the person who WROTE the email, taken from the signature at the bottom, not from the greeting.

2. "duration": meeting length in minutes, only when the email states it ("30-minute call" = 30, "1 hour" = 60). Otherwise null.

3. "timezone": inferred from locations or company mentions.
   - New York, NYC, East Coast, Eastern = "ET"
   - Chicago, Central = "CST"
   - Los Angeles, San Francisco, Seattle, West Coast, Pacific = "PST"
   - null when there is no clue

4. "start_date": first day they want to meet, YYYY-MM-DD.
   - "next week" = {monday}
   - "this week" = tomorrow
   - null when no dates are mentioned

5. "end_date": the day AFTER the last day they want to meet, YYYY-MM-DD (exclusive).
   - "next week" = {saturday}
   - null when no dates are mentioned

Only extract what is stated or clearly implied and use null for everything else. "Next week" means the whole week, Monday to Friday.

Email:
{email_text}

Return ONLY valid JSON, no explanation."#,
        today = today.format("%A, %B %d, %Y"),
        monday = monday.format("%Y-%m-%d"),
        friday = friday.format("%Y-%m-%d"),
        saturday = saturday.format("%Y-%m-%d"),
    )
}

/// Parses the model's answer, tolerating a surrounding markdown code fence.
pub fn parse_analysis(raw: &str) -> Result<EmailAnalysis, serde_json::Error> {
    serde_json::from_str(strip_code_fence(raw))
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split("```").next().unwrap_or(rest);
    body.strip_prefix("json").unwrap_or(body).trim()
}

/// Runs the analysis prompt. Failures are logged and yield `None`.
pub async fn analyze_email<G>(generator: &G, email_text: &str, today: NaiveDate) -> Option<EmailAnalysis>
where
    G: TextGenerator<Error = BoxedError> + ?Sized,
{
    let raw = match generator.generate(&analysis_prompt(email_text, today)).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Email analysis failed: {}", e);
            return None;
        }
    };
    match parse_analysis(&raw) {
        Ok(analysis) => {
            debug!("Email analysis: {:?}", analysis);
            Some(analysis)
        }
        Err(e) => {
            warn!("Email analysis was not valid JSON: {}", e);
            None
        }
    }
}

static SIGN_OFF_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?im)(?:thank you|thanks|best regards|kind regards|warm regards|best|regards|cheers|sincerely)[,.]?[ \t]*\n+\s*([a-z]+)",
    )
    .expect("SIGN_OFF_NAME should compile")
});

static LAST_LINE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)\n([A-Z][a-z]+)[ \t]*$").expect("LAST_LINE_NAME should compile"));

/// Sender's first name from the signature ("Thanks,\nMaya") or a lone name on the last line.
pub fn extract_sender_name(email_text: &str) -> Option<String> {
    let text = email_text.replace("\r\n", "\n");
    [&*SIGN_OFF_NAME, &*LAST_LINE_NAME]
        .iter()
        .find_map(|re| re.captures(&text))
        .and_then(|caps| caps.get(1))
        .map(|m| capitalize(m.as_str()))
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
