//! Text labels exposed to assistive technology by every interactive control.

pub const PROMPT_INPUT: &str = "Ask a question...";
pub const COMPOSER_INPUT: &str = "Ask a question...";
pub const SEND_MESSAGE: &str = "Send message";
pub const CLOSE_CHAT: &str = "Close chat";
pub const OPEN_ASSISTANT: &str = "Open assistant";
pub const SURFACE_TITLE: &str = "Assistant";
pub const AI_DISCLAIMER: &str = "Responses are generated using AI and may contain mistakes.";
pub const COMPOSER_HINT: &str = "Press Enter to send, Shift + Enter for new line";
