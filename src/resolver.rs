//! Resolution of a channel id to its live chat session id.
//!
//! Chat session ids rotate between broadcasts, so the supervisor resolves
//! afresh before every connection attempt instead of reusing an old id.

use std::time::Duration;

use reqwest::header;
use serde::Deserialize;

use crate::error::ResolveError;
use crate::protocol::USER_AGENT;

const DEFAULT_BASE_URL: &str = "https://api.chzzk.naver.com";

/// Upper bound on one live-status request, so a stalled polling server
/// cannot park the supervisor in resolution forever.
const RESOLVE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct LiveStatusResponse {
    #[serde(default)]
    content: Option<LiveStatusContent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LiveStatusContent {
    #[serde(default)]
    chat_channel_id: Option<String>,
}

/// Client for the public live-status polling endpoint.
pub struct ChannelResolver {
    http: reqwest::Client,
    base_url: String,
}

impl ChannelResolver {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the resolver at a different host, mainly for tests.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(RESOLVE_TIMEOUT)
            .build()
            // the builder only fails on TLS backend initialization
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Look up the chat session id for `channel_id`.
    ///
    /// Transport failures and error statuses map to
    /// [`ResolveError::Transport`]; a body without a usable
    /// `content.chatChannelId` means the channel is not live.
    pub async fn resolve(&self, channel_id: &str) -> Result<String, ResolveError> {
        let url = format!(
            "{}/polling/v2/channels/{}/live-status",
            self.base_url, channel_id
        );
        let body: LiveStatusResponse = self
            .http
            .get(&url)
            .header(header::USER_AGENT, USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        extract_chat_channel_id(body).ok_or_else(|| ResolveError::NotLive(channel_id.to_string()))
    }
}

impl Default for ChannelResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn extract_chat_channel_id(body: LiveStatusResponse) -> Option<String> {
    body.content
        .and_then(|content| content.chat_channel_id)
        .filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> LiveStatusResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_extract_chat_channel_id_from_live_channel() {
        // given:
        let body = parse(r#"{"code":200,"content":{"chatChannelId":"room42","status":"OPEN"}}"#);

        // when / then:
        assert_eq!(extract_chat_channel_id(body).as_deref(), Some("room42"));
    }

    #[test]
    fn test_extract_chat_channel_id_with_empty_content() {
        // given: channel exists but reports no chat session
        let body = parse(r#"{"content":{}}"#);

        // when / then:
        assert_eq!(extract_chat_channel_id(body), None);
    }

    #[test]
    fn test_extract_chat_channel_id_with_null_id() {
        let body = parse(r#"{"content":{"chatChannelId":null}}"#);
        assert_eq!(extract_chat_channel_id(body), None);
    }

    #[test]
    fn test_extract_chat_channel_id_with_empty_string_id() {
        let body = parse(r#"{"content":{"chatChannelId":""}}"#);
        assert_eq!(extract_chat_channel_id(body), None);
    }

    #[test]
    fn test_extract_chat_channel_id_with_missing_content() {
        let body = parse(r#"{"code":404}"#);
        assert_eq!(extract_chat_channel_id(body), None);
    }
}
