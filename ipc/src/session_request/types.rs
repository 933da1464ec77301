use serde::{Deserialize, Serialize};
use surveyor_core::{null_as_default, Message, SessionId};

/// `POST /start-session`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StartSessionRequest {
    /// What the user wants the survey to be about
    pub prompt: String,
    /// Whether the user accepted the privacy notice
    pub consent: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionResponse {
    pub session_id: SessionId,
    /// The agent's greeting
    pub initial_message: String,
}

/// `POST /send-message`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub session_id: SessionId,
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    pub agent_message: String,
}

/// `GET /session/{id}`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SessionInfoResponse {
    pub id: SessionId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub paused: bool,
    #[serde(default)]
    pub consent: Option<bool>,
}

/// `GET /sessions/{id}/messages`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MessagesResponse {
    #[serde(default)]
    pub session_id: Option<SessionId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub messages: Vec<Message>,
}

/// Acknowledgement returned by pause, resume and delete
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StatusResponse {
    #[serde(default)]
    pub status: String,
}

/// Error body the service attaches to non-2xx responses
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    pub detail: serde_json::Value,
}

impl ErrorResponse {
    /// Human-readable form of `detail`, which is either a string or a list of validation errors
    pub fn message(&self) -> String {
        match &self.detail {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}
