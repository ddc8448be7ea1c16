use reqwest::{Client, header::CONTENT_TYPE};
use tracing::debug;
use url::Url;

use crate::bridge_config::BridgeConfig;
use crate::endpoint::resolve_target;
use crate::errors::TranslateError;
use crate::types::{InboundMessage, OutboundMessage, PlayerRequest};

/// Header carrying the caller-supplied token to the media server.
pub const TOKEN_HEADER: &str = "X-POST2MPV-TOKEN";

/// A message with every default applied, ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedCall {
    pub target: Url,
    pub request: PlayerRequest,
    pub token: Option<String>,
}

/// Turns inbound messages into POSTs against the media server.
pub struct RequestTranslator {
    client: Client,
    config: BridgeConfig,
}

impl RequestTranslator {
    pub fn new(config: BridgeConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self { client, config })
    }

    /// Applies the host, port and action defaults.
    pub fn prepare(&self, message: InboundMessage) -> Result<PreparedCall, TranslateError> {
        let target = resolve_target(&message.host, message.port, &self.config)?;

        let action = if !message.action.is_empty() {
            message.action
        } else if !message.message_type.is_empty() {
            message.message_type
        } else {
            self.config.default_action.clone()
        };

        let token = (!message.token.is_empty()).then_some(message.token);

        Ok(PreparedCall {
            target,
            request: PlayerRequest {
                url: message.url,
                action,
                params: message.params,
            },
            token,
        })
    }

    /// Sends one message to the media server and describes the outcome.
    ///
    /// Never fails: every error becomes an `error` [`OutboundMessage`].
    pub async fn forward(&self, message: InboundMessage) -> OutboundMessage {
        match self.try_forward(message).await {
            Ok(response) => response,
            Err(err) => err.into(),
        }
    }

    async fn try_forward(&self, message: InboundMessage) -> Result<OutboundMessage, TranslateError> {
        let call = self.prepare(message)?;
        let body = serde_json::to_vec(&call.request).map_err(TranslateError::Marshal)?;

        let mut builder = self
            .client
            .post(call.target.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(token) = &call.token {
            builder = builder.header(TOKEN_HEADER, token);
        }
        let request = builder.build().map_err(TranslateError::Build)?;

        debug!(
            "POST {} action={} params={}",
            call.target,
            call.request.action,
            call.request.params.len()
        );
        let response = self
            .client
            .execute(request)
            .await
            .map_err(TranslateError::Send)?;

        let code = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|source| TranslateError::ReadBody { code, source })?;
        let body = String::from_utf8_lossy(&body).into_owned();

        if code >= 400 {
            Ok(OutboundMessage::http_error(code, body))
        } else {
            Ok(OutboundMessage::ok(code, body))
        }
    }
}
