//! Error types for the chat viewer.

use thiserror::Error;

/// Failures while resolving a channel's live chat session id.
///
/// Both variants are recoverable from the supervisor's point of view: it
/// waits out the retry delay and resolves again. They are distinguished
/// only so the status messages can tell "network trouble" apart from
/// "channel simply is not live right now".
#[derive(Debug, Error)]
pub enum ResolveError {
    /// HTTP transport failure or an error status from the polling endpoint.
    #[error("live status request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The channel exists but has no active chat session.
    #[error("channel '{0}' has no active chat session (not live?)")]
    NotLive(String),
}

impl ResolveError {
    /// `true` when the channel is simply offline rather than unreachable.
    pub fn is_not_live(&self) -> bool {
        matches!(self, ResolveError::NotLive(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_not_live_with_not_live_error() {
        // given:
        let error = ResolveError::NotLive("abc123".to_string());

        // when / then:
        assert!(error.is_not_live());
    }

    #[test]
    fn test_not_live_message_names_the_channel() {
        // given:
        let error = ResolveError::NotLive("abc123".to_string());

        // when:
        let message = error.to_string();

        // then:
        assert!(message.contains("abc123"));
        assert!(message.contains("no active chat session"));
    }
}
