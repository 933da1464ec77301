use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use surveyor_core::{
    ClientConfig, CreatedSession, Interest, Message, Session, SessionId, SessionService,
    SessionStatus, SurveyorError, SurveyorResult,
};
use surveyor_ipc::session_request::{
    ErrorResponse, MessagesResponse, SendMessageRequest, SendMessageResponse, SessionInfoResponse,
    StartSessionRequest, StartSessionResponse, StatusResponse,
};
use tracing::{debug, info, instrument};

/// HTTP client for the remote session service
#[derive(Debug, Clone)]
pub struct HttpSessionClient {
    client: Client,
    base_url: String,
    history_limit: u32,
}

impl HttpSessionClient {
    /// Creates a new client from the resolved configuration.
    pub fn new(config: &ClientConfig) -> SurveyorResult<Self> {
        let base_url = config.api_url();
        Url::parse(&base_url).map_err(|e| {
            SurveyorError::ConfigError(format!("Invalid service URL '{}': {}", base_url, e))
        })?;

        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| {
                SurveyorError::ConfigError(format!("Failed to build HTTP client: {}", e))
            })?;

        info!("Using session service at {}", base_url);
        Ok(Self {
            client,
            base_url,
            history_limit: config.message_history_limit(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends a request and decodes a JSON body, mapping failures onto `SurveyorError`.
    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> SurveyorResult<T> {
        let response = request
            .send()
            .await
            .map_err(|e| SurveyorError::RequestError(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.map_err(|e| {
                SurveyorError::RequestError(format!("Failed to read error response: {}", e))
            })?;
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|err| err.message())
                .unwrap_or(body);

            return Err(SurveyorError::HttpError {
                status_code: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| SurveyorError::ParsingError(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl SessionService for HttpSessionClient {
    #[instrument(skip(self))]
    async fn list_sessions(&self) -> SurveyorResult<Vec<Session>> {
        let sessions: Vec<Session> = self.send_json(self.client.get(self.url("/sessions"))).await?;
        debug!("Received {} sessions", sessions.len());
        Ok(sessions)
    }

    #[instrument(skip(self))]
    async fn create_session(&self, prompt: &str, consent: bool) -> SurveyorResult<CreatedSession> {
        let request = StartSessionRequest {
            prompt: prompt.to_string(),
            consent,
        };
        let response: StartSessionResponse = self
            .send_json(self.client.post(self.url("/start-session")).json(&request))
            .await?;
        debug!("Service created session {}", response.session_id);

        Ok(CreatedSession {
            session_id: response.session_id,
            initial_message: response.initial_message,
        })
    }

    #[instrument(skip(self))]
    async fn fetch_session(&self, id: &SessionId) -> SurveyorResult<SessionStatus> {
        let info: SessionInfoResponse = self
            .send_json(self.client.get(self.url(&format!("/session/{}", id))))
            .await?;
        Ok(SessionStatus {
            paused: info.paused,
        })
    }

    #[instrument(skip(self))]
    async fn fetch_messages(&self, id: &SessionId) -> SurveyorResult<Vec<Message>> {
        let response: MessagesResponse = self
            .send_json(
                self.client
                    .get(self.url(&format!("/sessions/{}/messages", id)))
                    .query(&[("limit", self.history_limit)]),
            )
            .await?;
        debug!("Received {} messages", response.messages.len());
        Ok(response.messages)
    }

    #[instrument(skip(self, message))]
    async fn send_message(&self, id: &SessionId, message: &str) -> SurveyorResult<String> {
        let request = SendMessageRequest {
            session_id: id.clone(),
            message: message.to_string(),
        };
        let response: SendMessageResponse = self
            .send_json(self.client.post(self.url("/send-message")).json(&request))
            .await?;
        Ok(response.agent_message)
    }

    #[instrument(skip(self))]
    async fn fetch_interests(&self, id: &SessionId) -> SurveyorResult<Vec<Interest>> {
        self.send_json(self.client.get(self.url(&format!("/interests/{}", id))))
            .await
    }

    #[instrument(skip(self))]
    async fn pause(&self, id: &SessionId) -> SurveyorResult<()> {
        let ack: StatusResponse = self
            .send_json(self.client.post(self.url(&format!("/pause/{}", id))))
            .await?;
        debug!("Pause acknowledged: {}", ack.status);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn resume(&self, id: &SessionId) -> SurveyorResult<()> {
        let ack: StatusResponse = self
            .send_json(self.client.post(self.url(&format!("/resume/{}", id))))
            .await?;
        debug!("Resume acknowledged: {}", ack.status);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_session(&self, id: &SessionId) -> SurveyorResult<()> {
        let ack: StatusResponse = self
            .send_json(self.client.delete(self.url(&format!("/session/{}", id))))
            .await?;
        debug!("Delete acknowledged: {}", ack.status);
        Ok(())
    }
}
