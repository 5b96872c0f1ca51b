use std::time::SystemTime;

use crate::ids::MessageId;

/// Greeting used when the host does not configure one.
pub const DEFAULT_WELCOME_MESSAGE: &str =
    "Hi! I'm your AI assistant. Ask me anything about the documentation.";

/// Chat speaker role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Display name shown above a message.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::User => "You",
            Self::Assistant => "Assistant",
        }
    }
}

/// One immutable transcript entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    id: MessageId,
    role: Role,
    content: String,
    timestamp: SystemTime,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new_v7(),
            role,
            content: content.into(),
            timestamp: SystemTime::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

/// Append-only record of one session's messages.
///
/// A transcript always starts with a single assistant welcome message, so it is
/// never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn with_welcome(welcome: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::assistant(welcome)],
        }
    }

    pub(crate) fn push(&mut self, message: Message) -> MessageId {
        let id = message.id();
        self.messages.push(message);
        id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn welcome(&self) -> Option<&Message> {
        self.messages.first()
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::with_welcome(DEFAULT_WELCOME_MESSAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_is_seeded_with_one_assistant_welcome() {
        let transcript = Transcript::default();

        assert_eq!(transcript.len(), 1);
        let welcome = transcript.welcome().expect("welcome message");
        assert_eq!(welcome.role(), Role::Assistant);
        assert_eq!(welcome.content(), DEFAULT_WELCOME_MESSAGE);
    }

    #[test]
    fn push_keeps_creation_order_and_unique_ids() {
        let mut transcript = Transcript::with_welcome("hello");
        let first = transcript.push(Message::user("one"));
        let second = transcript.push(Message::assistant("two"));

        assert_ne!(first, second);
        let contents = transcript
            .iter()
            .map(|message| message.content())
            .collect::<Vec<_>>();
        assert_eq!(contents, ["hello", "one", "two"]);
        assert_eq!(transcript.last().map(Message::id), Some(second));
    }
}
