//! Rendering of chat events as log lines.

use crate::client::decoder::ChatEvent;
use crate::common::time::format_kst_timestamp;

/// Format one chat event as a display/log line (no trailing newline):
///
/// `[YYYY-MM-DD HH:MM:SS] <nickname>[ (osType)][ (N원 후원)]: <message>`
pub fn format_chat_line(event: &ChatEvent) -> String {
    let time = format_kst_timestamp(event.timestamp_millis);
    let os_info = match &event.os_type {
        Some(os_type) => format!(" ({os_type})"),
        None => String::new(),
    };
    match event.donation_amount {
        Some(amount) => format!(
            "[{time}] {}{os_info} ({amount}원 후원): {}",
            event.nickname, event.message
        ),
        None => format!("[{time}] {}{os_info}: {}", event.nickname, event.message),
    }
}
