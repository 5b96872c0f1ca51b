use scribe_assistant::{ChatVisibility, FocusContext, KeyPress};

/// Emitted on every edit of the composer draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftEdited {
    pub text: String,
}

/// Emitted when the composer asks to send its draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Submit;

/// Emitted when the floating prompt hands its text to the chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSubmitted {
    pub content: String,
}

/// Emitted by the launcher button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpenRequested;

/// Emitted by the widget whenever the chat opens or closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisibilityChanged {
    pub visibility: ChatVisibility,
}

/// Emitted by the host page for keys the widget may act on, together with
/// where focus sat when the key arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageKeyPressed {
    pub press: KeyPress,
    pub focus: FocusContext,
}
