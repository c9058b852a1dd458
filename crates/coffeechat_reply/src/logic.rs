// --- File: crates/coffeechat_reply/src/logic.rs ---
use crate::date_range::{DateRange, DateRangeKind};
use crate::email::{analyze_email, extract_sender_name, optional_minutes, optional_text, EmailAnalysis, DEFAULT_SENDER_NAME};
use crate::format::{format_blocks, slots_text, FormattedBlock};
use crate::prompts;
use chrono::{DateTime, Utc};
use coffeechat_common::error::{internal_error, service_disabled, validation_error, CoffeechatError};
use coffeechat_common::services::SharedTextGenerator;
use coffeechat_common::BoxedError;
use coffeechat_gcal::{find_free_slots, meeting_duration, GcalError, GcalState, TargetTimezone};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

// --- Errors ---

#[derive(Error, Debug)]
pub enum ReplyError {
    #[error(transparent)]
    Calendar(#[from] GcalError),

    #[error("No available slots found for {duration}-minute meetings with {buffer}-min buffer.")]
    NoAvailability { duration: i64, buffer: i64 },

    #[error("Meeting duration must be between 1 and {max} minutes, got {0}", max = MAX_MEETING_MINUTES)]
    InvalidDuration(i64),

    #[error("Please provide feedback")]
    EmptyFeedback,

    #[error("Text generation is not configured")]
    GeneratorMissing,

    #[error("AI refinement failed: {0}")]
    Generation(#[source] BoxedError),
}

impl From<ReplyError> for CoffeechatError {
    fn from(err: ReplyError) -> Self {
        match err {
            ReplyError::Calendar(e) => e.into(),
            e @ (ReplyError::NoAvailability { .. } | ReplyError::InvalidDuration(_) | ReplyError::EmptyFeedback) => {
                validation_error(e)
            }
            e @ ReplyError::GeneratorMissing => service_disabled(e),
            e @ ReplyError::Generation(_) => internal_error(e),
        }
    }
}

/// A meeting longer than a day can never fit a working window.
pub const MAX_MEETING_MINUTES: i64 = 24 * 60;

// --- State ---

/// Everything the reply flows need: calendar access, an optional text generator and the signature.
#[derive(Clone)]
pub struct ReplyState {
    pub gcal: GcalState,
    /// `None` when OpenAI is disabled; analysis is skipped and templates are used.
    pub generator: Option<SharedTextGenerator>,
    pub signature_name: String,
}

// --- Requests & Responses ---

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub email_text: String,
    /// Clarification from the user when the email gives no clue
    #[serde(default, deserialize_with = "optional_text")]
    pub timezone: Option<String>,
    #[serde(default, deserialize_with = "optional_minutes")]
    pub duration: Option<i64>,
    #[serde(default, deserialize_with = "optional_text")]
    pub date_range: Option<String>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Deserialize)]
pub struct ComposeRequest {
    #[serde(default = "default_recipient")]
    pub recipient_name: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_duration", deserialize_with = "required_minutes")]
    pub duration: i64,
    /// this_week, next_week or two_weeks; anything else means two_weeks
    #[serde(default, deserialize_with = "optional_text")]
    pub date_range: Option<String>,
    #[serde(default)]
    pub context: String,
}

fn default_recipient() -> String {
    DEFAULT_SENDER_NAME.to_string()
}

fn default_timezone() -> String {
    TargetTimezone::Eastern.code().to_string()
}

fn default_duration() -> i64 {
    30
}

fn required_minutes<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(optional_minutes(deserializer)?.unwrap_or_else(default_duration))
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefineRequest {
    #[serde(default)]
    pub current_reply: String,
    #[serde(default)]
    pub feedback: String,
}

/// A drafted email together with the days it proposes.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize)]
pub struct ReplyDraft {
    pub reply: String,
    pub blocks: Vec<FormattedBlock>,
    pub timezone: TargetTimezone,
    pub duration: i64,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize)]
pub struct GenerateResponse {
    #[serde(flatten)]
    pub draft: ReplyDraft,
    pub ai_parsed: Option<EmailAnalysis>,
}

/// Returned instead of a draft when the email leaves required details open.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClarificationResponse {
    pub needs_clarification: bool,
    pub missing_fields: Vec<String>,
    pub ai_parsed: Option<EmailAnalysis>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum GenerateOutcome {
    Draft(GenerateResponse),
    Clarification(ClarificationResponse),
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RefineResponse {
    pub reply: String,
}

// --- Resolution ---

/// Meeting parameters once every required detail is known.
#[derive(Debug, Clone, PartialEq)]
pub struct MeetingRequest {
    pub sender_name: String,
    pub timezone: TargetTimezone,
    pub duration: i64,
    pub range: DateRange,
}

/// Combines the email analysis with the user's answers.
///
/// Each field comes from the analysis first and the request second. Unknown timezone names
/// and non-positive durations count as missing.
pub fn resolve_request(
    analysis: Option<&EmailAnalysis>,
    request: &GenerateRequest,
    today: chrono::NaiveDate,
) -> Result<MeetingRequest, Vec<String>> {
    let mut missing = Vec::new();

    let timezone = analysis
        .and_then(|a| a.timezone.as_deref())
        .and_then(|tz| tz.parse::<TargetTimezone>().ok())
        .or_else(|| {
            request
                .timezone
                .as_deref()
                .and_then(|tz| tz.parse::<TargetTimezone>().ok())
        });
    if timezone.is_none() {
        missing.push("timezone".to_string());
    }

    let duration = analysis
        .and_then(|a| a.duration)
        .filter(|d| *d > 0)
        .or(request.duration.filter(|d| *d > 0));
    if duration.is_none() {
        missing.push("duration".to_string());
    }

    let custom = analysis.and_then(EmailAnalysis::custom_range);
    if custom.is_none() && request.date_range.is_none() {
        missing.push("date_range".to_string());
    }

    let sender_name = analysis
        .and_then(|a| a.sender_name.clone())
        .or_else(|| extract_sender_name(&request.email_text))
        .unwrap_or_else(|| DEFAULT_SENDER_NAME.to_string());

    match (timezone, duration) {
        (Some(timezone), Some(duration)) if missing.is_empty() => {
            let kind = request
                .date_range
                .as_deref()
                .map(DateRangeKind::from_name)
                .unwrap_or_default();
            Ok(MeetingRequest {
                sender_name,
                timezone,
                duration,
                range: DateRange::resolve(kind, custom, today),
            })
        }
        _ => Err(missing),
    }
}

// --- Flows ---

/// Free days for a meeting, rendered for the recipient.
pub async fn propose_blocks(
    state: &ReplyState,
    range: DateRange,
    target: TargetTimezone,
    duration: i64,
    now: DateTime<Utc>,
) -> Result<Vec<FormattedBlock>, ReplyError> {
    if !(1..=MAX_MEETING_MINUTES).contains(&duration) {
        return Err(ReplyError::InvalidDuration(duration));
    }
    let min_duration = meeting_duration(duration).map_err(|_| ReplyError::InvalidDuration(duration))?;
    let policy = &state.gcal.policy;
    let no_availability = || ReplyError::NoAvailability {
        duration,
        buffer: policy.buffer.buffer.num_minutes(),
    };

    let provider = state.gcal.provider()?;
    if range.is_empty() {
        return Err(no_availability());
    }
    let Some((range_start, range_end)) = range.to_utc(&policy.reference_tz()) else {
        return Err(no_availability());
    };

    let slots = find_free_slots(
        &**provider,
        &state.gcal.calendar_id,
        policy,
        range_start,
        range_end,
        min_duration,
        target,
        now,
    )
    .await?;
    debug!("{} free ranges between {} and {}", slots.len(), range.first_day, range.end_day);

    let blocks = format_blocks(&slots, target, policy);
    if blocks.is_empty() {
        return Err(no_availability());
    }
    Ok(blocks)
}

/// Asks the generator for a draft and falls back to `fallback` on any failure.
async fn draft_with_fallback(
    generator: Option<&SharedTextGenerator>,
    prompt: String,
    fallback: impl FnOnce() -> String,
) -> String {
    let Some(generator) = generator else {
        return fallback();
    };
    match generator.generate(&prompt).await {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => {
            warn!("Text generator returned an empty draft, using template");
            fallback()
        }
        Err(e) => {
            warn!("Draft generation failed, using template: {}", e);
            fallback()
        }
    }
}

/// Reply to an incoming email, or the list of details still needed.
pub async fn generate_reply(
    state: &ReplyState,
    request: GenerateRequest,
    now: DateTime<Utc>,
) -> Result<GenerateOutcome, ReplyError> {
    let today = now.with_timezone(&state.gcal.policy.reference_tz()).date_naive();

    let ai_parsed = match (&state.generator, request.email_text.trim().is_empty()) {
        (Some(generator), false) => analyze_email(&**generator, &request.email_text, today).await,
        _ => None,
    };

    let meeting = match resolve_request(ai_parsed.as_ref(), &request, today) {
        Ok(meeting) => meeting,
        Err(missing_fields) => {
            info!("Asking for clarification of {:?}", missing_fields);
            return Ok(GenerateOutcome::Clarification(ClarificationResponse {
                needs_clarification: true,
                missing_fields,
                ai_parsed,
            }));
        }
    };

    let blocks = propose_blocks(state, meeting.range, meeting.timezone, meeting.duration, now).await?;
    let text = slots_text(&blocks);
    let reply = draft_with_fallback(
        state.generator.as_ref(),
        prompts::reply_prompt(&request.email_text, &meeting.sender_name, &text, &state.signature_name),
        || prompts::fallback_reply(&meeting.sender_name, &text, &state.signature_name),
    )
    .await;

    Ok(GenerateOutcome::Draft(GenerateResponse {
        draft: ReplyDraft {
            reply,
            blocks,
            timezone: meeting.timezone,
            duration: meeting.duration,
        },
        ai_parsed,
    }))
}

/// Outbound meeting request.
pub async fn compose_email(
    state: &ReplyState,
    request: ComposeRequest,
    now: DateTime<Utc>,
) -> Result<ReplyDraft, ReplyError> {
    let target: TargetTimezone = request.timezone.parse().map_err(GcalError::from)?;
    let recipient = match request.recipient_name.trim() {
        "" => DEFAULT_SENDER_NAME,
        name => name,
    };
    let today = now.with_timezone(&state.gcal.policy.reference_tz()).date_naive();
    let kind = request
        .date_range
        .as_deref()
        .map(DateRangeKind::from_name)
        .unwrap_or_default();
    let range = DateRange::resolve(kind, None, today);

    let blocks = propose_blocks(state, range, target, request.duration, now).await?;
    let text = slots_text(&blocks);
    let reply = draft_with_fallback(
        state.generator.as_ref(),
        prompts::compose_prompt(recipient, &request.context, &text, &state.signature_name),
        || prompts::fallback_compose(recipient, &request.context, &text, &state.signature_name),
    )
    .await;

    Ok(ReplyDraft {
        reply,
        blocks,
        timezone: target,
        duration: request.duration,
    })
}

/// Rewrites a draft according to the user's feedback.
pub async fn refine_reply(state: &ReplyState, request: RefineRequest) -> Result<RefineResponse, ReplyError> {
    if request.feedback.trim().is_empty() {
        return Err(ReplyError::EmptyFeedback);
    }
    let generator = state.generator.as_ref().ok_or(ReplyError::GeneratorMissing)?;
    let reply = generator
        .generate(&prompts::refine_prompt(&request.current_reply, &request.feedback))
        .await
        .map_err(ReplyError::Generation)?;
    Ok(RefineResponse {
        reply: reply.trim().to_string(),
    })
}
