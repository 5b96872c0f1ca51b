/// Event contracts between the widget and its child views.
pub mod events;
pub mod composer;
pub mod prompt_bar;
pub mod scroll;
pub mod transcript;
pub mod view;

pub use composer::Composer;
pub use events::{
    DraftEdited, OpenRequested, PageKeyPressed, PromptSubmitted, Submit, VisibilityChanged,
};
pub use prompt_bar::PromptBar;
pub use scroll::TranscriptScroll;
pub use view::AssistantWidget;
