//! JSON bodies exchanged with the session service.
//!
//! Field names follow the service exactly (`sessionId`, `initialMessage`, ...). Responses
//! ignore fields the client has no use for.

mod types;

pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use surveyor_core::{Interest, Message, SessionId};

    #[test]
    fn start_session_request_uses_service_field_names() {
        let request = StartSessionRequest {
            prompt: "help me shop".to_string(),
            consent: true,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"prompt": "help me shop", "consent": true})
        );
    }

    #[test]
    fn start_session_response_parses() {
        let response: StartSessionResponse =
            serde_json::from_str(r#"{"sessionId": 12, "initialMessage": "Hello!"}"#).unwrap();
        assert_eq!(response.session_id, SessionId::from(12u64));
        assert_eq!(response.initial_message, "Hello!");
    }

    #[test]
    fn send_message_request_sends_numeric_id() {
        let request = SendMessageRequest {
            session_id: SessionId::from("5"),
            message: "I like running shoes".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"sessionId": 5, "message": "I like running shoes"})
        );
    }

    #[test]
    fn session_info_treats_null_paused_as_false() {
        let info: SessionInfoResponse =
            serde_json::from_str(r#"{"id": 1, "paused": null, "consent": true}"#).unwrap();
        assert!(!info.paused);
        assert_eq!(info.consent, Some(true));
    }

    #[test]
    fn messages_response_defaults_to_empty() {
        let response: MessagesResponse = serde_json::from_str(r#"{"session_id": 2}"#).unwrap();
        assert!(response.messages.is_empty());

        let response: MessagesResponse = serde_json::from_str(
            r#"{"session_id": 2, "messages": [{"role": "user", "content": "hi"}, {"role": "agent", "content": "hello"}]}"#,
        )
        .unwrap();
        assert_eq!(
            response.messages,
            vec![Message::user("hi"), Message::agent("hello")]
        );
    }

    #[test]
    fn interests_parse_as_plain_array() {
        let interests: Vec<Interest> = serde_json::from_str(
            r#"[{"name": "running", "confidence": 0.92, "rationale": "shoes"}]"#,
        )
        .unwrap();
        assert_eq!(interests, vec![Interest::new("running", 0.92, "shoes")]);
    }
}
