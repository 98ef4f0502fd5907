//! Wire types for the chat websocket protocol.
//!
//! Frames are UTF-8 JSON envelopes carrying an integer command code. The
//! client only ever sends two things: the initial connect request and the
//! fixed pong literal answering server keep-alive pings. Inbound frames
//! are decoded leniently so unknown commands and extra fields pass through
//! without error.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Server keep-alive ping; must be answered with [`PONG_FRAME`].
pub const CMD_PING: i64 = 0;
/// Connect request on the way out, chat-batch carrier on the way in.
pub const CMD_CHAT: i64 = 100;

/// Fixed pong literal. The live protocol accepts the minimal form with no
/// `tid` or session fields; revisit if the platform starts rejecting it.
pub const PONG_FRAME: &str = r#"{"ver":"2","cmd":10000}"#;

/// Browser-like user agent sent on both the polling request and the
/// websocket upgrade.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:140.0) Gecko/20100101 Firefox/140.0";

/// Origin header required by the chat websocket endpoints.
pub const ORIGIN: &str = "https://chzzk.naver.com";

/// Connect envelope sent immediately after the websocket opens.
#[derive(Debug, Serialize)]
pub struct ConnectRequest {
    pub ver: &'static str,
    pub cmd: i64,
    pub svcid: &'static str,
    pub cid: String,
    pub bdy: ConnectBody,
    pub tid: i64,
}

/// Read-only session metadata inside the connect envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectBody {
    pub uid: Option<String>,
    pub dev_type: i64,
    pub acc_tkn: &'static str,
    pub auth: &'static str,
    pub lib_ver: &'static str,
    pub os_ver: &'static str,
    pub dev_name: &'static str,
    pub locale: &'static str,
    pub timezone: &'static str,
}

impl ConnectRequest {
    /// Build the anonymous read-only connect request for a chat session.
    pub fn new(chat_channel_id: &str) -> Self {
        Self {
            ver: "3",
            cmd: CMD_CHAT,
            svcid: "game",
            cid: chat_channel_id.to_string(),
            bdy: ConnectBody {
                uid: None,
                dev_type: 2001,
                acc_tkn: "",
                auth: "READ",
                lib_ver: "4.9.3",
                os_ver: "Windows/10",
                dev_name: "Mozilla Firefox/140.0",
                locale: "ko-KR",
                timezone: "Asia/Seoul",
            },
            tid: 1,
        }
    }
}

/// Decoded top-level inbound frame.
#[derive(Debug, Deserialize)]
pub struct RawEnvelope {
    #[serde(default)]
    pub cmd: i64,
    #[serde(default)]
    pub bdy: Option<Value>,
}

impl RawEnvelope {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Interpret `bdy` as a chat batch, in server order.
    ///
    /// Items that are not even object-shaped are skipped here; field-level
    /// problems are the decoder's concern.
    pub fn chat_items(&self) -> Vec<RawChatItem> {
        match &self.bdy {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// One element of a chat batch. `profile` and `extras` are JSON encoded a
/// second time inside the string fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawChatItem {
    #[serde(default)]
    pub msg_time: Option<i64>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub extras: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_request_wire_shape() {
        // given:
        let request = ConnectRequest::new("chat-room-1");

        // when:
        let json: Value = serde_json::to_value(&request).unwrap();

        // then:
        assert_eq!(json["ver"], "3");
        assert_eq!(json["cmd"], 100);
        assert_eq!(json["svcid"], "game");
        assert_eq!(json["cid"], "chat-room-1");
        assert_eq!(json["tid"], 1);
        assert_eq!(json["bdy"]["uid"], Value::Null);
        assert_eq!(json["bdy"]["devType"], 2001);
        assert_eq!(json["bdy"]["auth"], "READ");
        assert_eq!(json["bdy"]["locale"], "ko-KR");
        assert_eq!(json["bdy"]["timezone"], "Asia/Seoul");
    }

    #[test]
    fn test_pong_frame_is_minimal_literal() {
        let parsed: Value = serde_json::from_str(PONG_FRAME).unwrap();
        assert_eq!(parsed, serde_json::json!({"ver": "2", "cmd": 10000}));
    }

    #[test]
    fn test_parse_ping_envelope() {
        // given:
        let frame = r#"{"svcid":"game","ver":"2","bdy":{},"cmd":0,"tid":null}"#;

        // when:
        let envelope = RawEnvelope::parse(frame).unwrap();

        // then:
        assert_eq!(envelope.cmd, CMD_PING);
        assert!(envelope.chat_items().is_empty());
    }

    #[test]
    fn test_parse_chat_batch_preserves_order() {
        // given:
        let frame = r#"{"cmd":100,"bdy":[
            {"msgTime":1,"msg":"first","profile":"{}","extras":"{}"},
            {"msgTime":2,"msg":"second","profile":"{}","extras":"{}"}
        ]}"#;

        // when:
        let envelope = RawEnvelope::parse(frame).unwrap();
        let items = envelope.chat_items();

        // then:
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].msg.as_deref(), Some("first"));
        assert_eq!(items[1].msg.as_deref(), Some("second"));
    }

    #[test]
    fn test_chat_items_with_non_array_body() {
        // given: a connect-accept style envelope whose bdy is an object
        let frame = r#"{"cmd":100,"bdy":{"accTkn":"...","auth":"READ"}}"#;

        // when:
        let envelope = RawEnvelope::parse(frame).unwrap();

        // then:
        assert!(envelope.chat_items().is_empty());
    }

    #[test]
    fn test_chat_items_skips_non_object_entries() {
        // given: one well-formed item sandwiched between junk
        let frame = r#"{"cmd":100,"bdy":[42,{"msgTime":1,"msg":"hi"},"str"]}"#;

        // when:
        let items = RawEnvelope::parse(frame).unwrap().chat_items();

        // then:
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].msg.as_deref(), Some("hi"));
    }
}
