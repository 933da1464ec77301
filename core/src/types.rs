use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Opaque identifier of a server-managed session.
///
/// The service hands out integer ids, but the client never does arithmetic on them, so
/// they are kept as text. Ids arrive as JSON numbers or strings and numeric ids are sent
/// back as numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for SessionId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Serialize for SessionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Only re-emit as a number when that round-trips to the same text ("007" stays a string)
        match self.0.parse::<u64>() {
            Ok(n) if n.to_string() == self.0 => serializer.serialize_u64(n),
            _ => serializer.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for SessionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(serde_json::Number),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => SessionId(n.to_string()),
            RawId::Text(s) => SessionId(s),
        })
    }
}

/// Treats an explicit JSON `null` the same as a missing field.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A session as it appears in the service's session index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    /// The (server-generated) purpose prompt; fixed once the session exists
    #[serde(default, deserialize_with = "null_as_default")]
    pub prompt: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub paused: bool,
}

/// Author of a transcript message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Agent => f.write_str("agent"),
        }
    }
}

/// One entry of a session transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn agent(content: impl Into<String>) -> Self {
        Self {
            role: Role::Agent,
            content: content.into(),
        }
    }
}

/// An interest inferred by the service, as shown in the ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interest {
    pub name: String,
    /// Expected in `[0, 1]`
    pub confidence: f64,
    #[serde(default)]
    pub rationale: String,
}

impl Interest {
    pub fn new(name: impl Into<String>, confidence: f64, rationale: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            confidence,
            rationale: rationale.into(),
        }
    }

    /// Confidence as a whole percentage, clamped to 0..=100
    pub fn confidence_percent(&self) -> u8 {
        if self.confidence.is_nan() {
            return 0;
        }
        (self.confidence.clamp(0.0, 1.0) * 100.0).round() as u8
    }
}

/// The client-held state of the active session.
///
/// At most one session is active. Switching sessions empties `transcript` and `interests`
/// before anything from the next session is installed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionView {
    pub active_id: Option<SessionId>,
    pub transcript: Vec<Message>,
    pub interests: Vec<Interest>,
    pub paused: bool,
}

impl SessionView {
    pub fn is_active(&self, id: &SessionId) -> bool {
        self.active_id.as_ref() == Some(id)
    }
}
