use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::dispatch::{Intent, IntentRequest, PLAYER_NAME_SLOT};
use crate::error::{Result, SkillError};
use crate::models::SpokenResponse;
use crate::speech;

/// Inbound request envelope. Only the fields the skill acts on are
/// modeled; everything else in the platform payload is ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub session: Option<Session>,
    pub request: Request,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Session {
    pub application: Option<Application>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Application {
    pub application_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    LaunchRequest {},
    IntentRequest {
        #[serde(default)]
        intent: Option<IntentPayload>,
    },
    SessionEndedRequest {},
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct IntentPayload {
    pub name: String,
    pub slots: HashMap<String, Slot>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Slot {
    pub name: String,
    pub value: Option<String>,
}

impl RequestEnvelope {
    pub fn application_id(&self) -> Option<&str> {
        self.session
            .as_ref()
            .and_then(|s| s.application.as_ref())
            .map(|a| a.application_id.as_str())
    }
}

/// True unless the envelope carries an application id that differs from
/// the configured one. Envelopes without a session or application id
/// pass (test consoles omit them) but are logged.
pub fn verify_application_id(envelope: &RequestEnvelope, expected: &str) -> bool {
    match envelope.application_id() {
        Some(id) if id == expected => true,
        Some(id) => {
            tracing::warn!("Rejecting request for foreign application id {}", id);
            false
        }
        None => {
            tracing::debug!("Request carries no application id");
            true
        }
    }
}

/// Maps a decoded envelope to the intent it asks for. `Ok(None)` means
/// the turn needs no speech (session ended, unrecognized request type).
pub fn to_intent_request(envelope: &RequestEnvelope) -> Result<Option<IntentRequest>> {
    match &envelope.request {
        Request::LaunchRequest {} => Ok(Some(IntentRequest::new(Intent::Launch))),
        Request::SessionEndedRequest {} => Ok(None),
        Request::Unknown => {
            tracing::warn!("Ignoring unrecognized request type");
            Ok(None)
        }
        Request::IntentRequest { intent } => {
            let payload = intent
                .as_ref()
                .ok_or_else(|| SkillError::UnknownIntent(String::new()))?;
            let intent = Intent::from_name(&payload.name)
                .ok_or_else(|| SkillError::UnknownIntent(payload.name.clone()))?;
            let player_name = payload
                .slots
                .get(PLAYER_NAME_SLOT)
                .and_then(|slot| slot.value.clone());
            Ok(Some(IntentRequest {
                intent,
                player_name,
            }))
        }
    }
}

/// Outbound response envelope, `version` fixed at "1.0".
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub version: &'static str,
    pub response: ResponseBody,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_speech: Option<OutputSpeech>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<Reprompt>,
    pub should_end_session: bool,
}

#[derive(Debug, Serialize)]
pub struct OutputSpeech {
    #[serde(rename = "type")]
    pub speech_type: &'static str,
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reprompt {
    pub output_speech: OutputSpeech,
}

impl OutputSpeech {
    fn plain(text: &str) -> Self {
        Self {
            speech_type: "PlainText",
            text: text.to_string(),
        }
    }
}

impl ResponseEnvelope {
    pub fn speak(response: &SpokenResponse) -> Self {
        Self {
            version: "1.0",
            response: ResponseBody {
                output_speech: Some(OutputSpeech::plain(response.text())),
                reprompt: response.reprompt().map(|text| Reprompt {
                    output_speech: OutputSpeech::plain(text),
                }),
                should_end_session: response.ends_session(),
            },
        }
    }

    /// Envelope with no speech at all, used for session-ended turns.
    pub fn empty() -> Self {
        Self {
            version: "1.0",
            response: ResponseBody {
                output_speech: None,
                reprompt: None,
                should_end_session: true,
            },
        }
    }
}

/// Error policy for a dispatched turn. Successful responses are wrapped;
/// a fetch failure speaks the fixed service-unavailable line only when
/// `speak_errors` is set. Everything else yields `None` and the turn
/// stays silent, answered at the HTTP layer as a plain failure.
pub fn envelope_for_turn(
    result: Result<SpokenResponse>,
    speak_errors: bool,
) -> Option<ResponseEnvelope> {
    match result {
        Ok(response) => Some(ResponseEnvelope::speak(&response)),
        Err(e) if e.is_fetch() && speak_errors => {
            tracing::error!("Stats fetch failed, speaking fallback: {}", e);
            Some(ResponseEnvelope::speak(&speech::service_unavailable()))
        }
        Err(e) => {
            tracing::error!("Intent dispatch failed: {}", e);
            None
        }
    }
}
