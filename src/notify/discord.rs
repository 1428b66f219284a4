use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{GridError, Result};

/// Upper bound for a single webhook request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Payload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Embed {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub description: String,
    pub fields: Vec<Field>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<Footer>,
    pub color: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl Field {
    pub fn inline(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            inline: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Footer {
    pub text: String,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    id: String,
}

/// Split `.../webhooks/{id}/{token}` into its id and token.
pub fn parse_webhook_url(raw: &str) -> Result<(String, String)> {
    let parsed = Url::parse(raw).map_err(|e| GridError::invalid_webhook_url(e.to_string()))?;
    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    match segments.as_slice() {
        [.., id, token] => Ok((id.to_string(), token.to_string())),
        _ => Err(GridError::invalid_webhook_url(
            "expected .../webhooks/{id}/{token}",
        )),
    }
}

/// Minimal client for creating and editing one webhook message.
#[derive(Debug, Clone)]
pub struct DiscordWebhook {
    client: reqwest::Client,
    base: Url,
    id: String,
}

impl DiscordWebhook {
    pub fn new(webhook_url: &str) -> Result<Self> {
        let (id, _token) = parse_webhook_url(webhook_url)?;
        let mut base =
            Url::parse(webhook_url).map_err(|e| GridError::invalid_webhook_url(e.to_string()))?;
        base.set_query(None);
        base.set_fragment(None);

        let client = reqwest::Client::builder()
            .user_agent(concat!("grid-node/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { client, base, id })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Post a new message and return its id.
    pub async fn send_message(&self, payload: &Payload) -> Result<String> {
        let mut url = self.base.clone();
        url.query_pairs_mut().append_pair("wait", "true");

        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await?
            .error_for_status()?;
        let message: MessageResponse = response.json().await?;
        Ok(message.id)
    }

    /// Replace the content of a previously sent message.
    pub async fn edit_message(&self, message_id: &str, payload: &Payload) -> Result<()> {
        let url = self.message_url(message_id)?;
        self.client
            .patch(url)
            .json(payload)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    fn message_url(&self, message_id: &str) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| GridError::invalid_webhook_url("URL cannot be a base"))?
            .pop_if_empty()
            .push("messages")
            .push(message_id);
        Ok(url)
    }
}

/// True when the server says the message no longer exists.
pub fn is_missing_message(err: &GridError) -> bool {
    matches!(err, GridError::Http(e) if e.status() == Some(StatusCode::NOT_FOUND))
}
