pub mod a11y;
pub mod activation;
pub mod config;
pub mod error;
pub mod ids;
pub mod keyboard;
pub mod message;
pub mod plugin;
pub mod responder;
pub mod session;
pub mod surface;
pub mod viewport;

pub use activation::{ActivationController, AffordanceStyle, ChatVisibility, KeyOutcome};
pub use config::AiChatConfig;
pub use error::{ResponderError, ResponderResult};
pub use ids::{MessageId, SessionId};
pub use keyboard::{FocusContext, KeyPress, Modifiers, Platform, Shortcut};
pub use message::{DEFAULT_WELCOME_MESSAGE, Message, Role, Transcript};
pub use plugin::{
    AiChatPlugin, ChatCapability, ChatRenderProps, CloseHandle, ConsumeHandle, Plugin,
    PluginRegistry, PluginRegistryBuilder, SurfaceCommand, ai_chat_plugin,
};
pub use responder::{
    BoxFuture, FnResponder, PLACEHOLDER_REPLY_DELAY, PlaceholderResponder, ReplyFuture, Responder,
    placeholder_reply, responder_fn,
};
pub use session::{
    ChatSession, ExchangeTicket, PendingExchange, RESPONDER_FAILURE_NOTICE, ResolveRejection,
    SendRejection, SessionPhase,
};
pub use surface::{ChatSurface, DefaultChat, SurfaceCommands, SurfaceFrame};
pub use viewport::{FOOTER_VISIBILITY_THRESHOLD, FooterObserver, Span, Subscription};
