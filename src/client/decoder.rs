//! Decoding of raw chat items into normalized [`ChatEvent`]s.
//!
//! The decode policy is deliberately lenient: `msgTime` and `msg` are the
//! only required fields, and every other field degrades to a default when
//! missing or malformed. One broken item never aborts the rest of a batch.

use serde::Deserialize;

use crate::protocol::RawChatItem;

/// Nickname used when the embedded profile is missing or unparsable.
pub const DEFAULT_NICKNAME: &str = "anonymous";

/// One normalized chat message, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEvent {
    /// Message time as epoch milliseconds.
    pub timestamp_millis: i64,
    pub nickname: String,
    pub message: String,
    /// Sender's client platform, when the server reported one.
    pub os_type: Option<String>,
    /// Donation amount in won; present only for paid messages.
    pub donation_amount: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct Profile {
    #[serde(default)]
    nickname: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Extras {
    #[serde(default)]
    os_type: Option<String>,
    #[serde(default)]
    pay_amount: Option<i64>,
}

/// Decode one raw chat item, or `None` if it does not carry a displayable
/// message. Dropping an item is not an error.
pub fn decode(item: &RawChatItem) -> Option<ChatEvent> {
    let timestamp_millis = item.msg_time.filter(|t| *t > 0)?;
    let message = item.msg.as_deref().filter(|m| !m.is_empty())?.to_string();

    let profile = parse_embedded::<Profile>(item.profile.as_deref());
    let extras = parse_embedded::<Extras>(item.extras.as_deref());

    let nickname = profile
        .nickname
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| DEFAULT_NICKNAME.to_string());

    Some(ChatEvent {
        timestamp_millis,
        nickname,
        message,
        os_type: extras.os_type.filter(|t| !t.is_empty()),
        donation_amount: extras.pay_amount.filter(|amount| *amount > 0).map(|a| a as u64),
    })
}

/// Parse one of the doubly-encoded JSON string fields, falling back to the
/// type's defaults on any failure.
fn parse_embedded<T: Default + for<'de> Deserialize<'de>>(raw: Option<&str>) -> T {
    raw.and_then(|s| serde_json::from_str(s).ok()).unwrap_or_default()
}
