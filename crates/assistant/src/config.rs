use std::sync::Arc;

use crate::message::DEFAULT_WELCOME_MESSAGE;
use crate::responder::{PlaceholderResponder, Responder};

/// Options accepted by [`crate::ai_chat_plugin`].
#[derive(Clone, Default)]
pub struct AiChatConfig {
    /// Async backend turning a question into a reply. The development
    /// placeholder answers when this is absent.
    pub on_send_message: Option<Arc<dyn Responder>>,
    /// Greeting seeded into every new transcript.
    pub welcome_message: Option<String>,
}

impl AiChatConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_responder(mut self, responder: Arc<dyn Responder>) -> Self {
        self.on_send_message = Some(responder);
        self
    }

    pub fn with_welcome_message(mut self, welcome_message: impl Into<String>) -> Self {
        self.welcome_message = Some(welcome_message.into());
        self
    }

    /// The configured responder, or a fresh placeholder.
    pub fn responder(&self) -> Arc<dyn Responder> {
        match &self.on_send_message {
            Some(responder) => responder.clone(),
            None => Arc::new(PlaceholderResponder::default()),
        }
    }

    pub fn welcome_message(&self) -> &str {
        self.welcome_message
            .as_deref()
            .map(str::trim)
            .filter(|message| !message.is_empty())
            .unwrap_or(DEFAULT_WELCOME_MESSAGE)
    }

    pub fn uses_placeholder(&self) -> bool {
        self.on_send_message.is_none()
    }
}

impl std::fmt::Debug for AiChatConfig {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("AiChatConfig")
            .field(
                "on_send_message",
                &self.on_send_message.as_ref().map(|responder| responder.id()),
            )
            .field("welcome_message", &self.welcome_message)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responder::responder_fn;

    #[test]
    fn absent_options_select_the_defaults() {
        let config = AiChatConfig::new();

        assert!(config.uses_placeholder());
        assert_eq!(config.responder().id(), PlaceholderResponder::ID);
        assert_eq!(config.welcome_message(), DEFAULT_WELCOME_MESSAGE);
    }

    #[test]
    fn blank_welcome_falls_back_to_the_default_greeting() {
        let config = AiChatConfig::new().with_welcome_message("   ");
        assert_eq!(config.welcome_message(), DEFAULT_WELCOME_MESSAGE);
    }

    #[test]
    fn configured_options_are_used() {
        let responder = responder_fn("docs-backend", |message: String| async move { Ok(message) });
        let config = AiChatConfig::new()
            .with_responder(responder)
            .with_welcome_message("Ask about the Cargo API.");

        assert!(!config.uses_placeholder());
        assert_eq!(config.responder().id(), "docs-backend");
        assert_eq!(config.welcome_message(), "Ask about the Cargo API.");
    }
}
