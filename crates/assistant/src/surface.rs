use tokio::sync::mpsc;

use crate::activation::ActivationController;
use crate::config::AiChatConfig;
use crate::error::ResponderResult;
use crate::plugin::{ChatRenderProps, CloseHandle, ConsumeHandle, PluginRegistry, SurfaceCommand};
use crate::session::{ChatSession, ExchangeTicket, PendingExchange, SendRejection};

/// What the surface shows on one render pass.
pub enum SurfaceFrame<'a, E> {
    /// A plugin rendered the chat itself; the default UI is not built.
    Delegated(E),
    /// Default transcript and composer.
    Default(DefaultChat<'a>),
}

/// Borrowed state needed to paint the default chat UI.
#[derive(Debug, Clone, Copy)]
pub struct DefaultChat<'a> {
    pub is_open: bool,
    /// `None` until the surface is opened for the first time.
    pub session: Option<&'a ChatSession>,
}

/// Receiver side of the renderer callbacks, for hosts that apply commands as
/// soon as they arrive instead of on the next render pass.
#[derive(Debug)]
pub struct SurfaceCommands {
    receiver: mpsc::UnboundedReceiver<SurfaceCommand>,
}

impl SurfaceCommands {
    pub async fn recv(&mut self) -> Option<SurfaceCommand> {
        self.receiver.recv().await
    }
}

/// The composed widget: activation state, plugin delegation and the default
/// chat session.
pub struct ChatSurface<E> {
    registry: PluginRegistry<E>,
    activation: ActivationController,
    session: Option<ChatSession>,
    staged: Option<StagedDecision<E>>,
    commands_tx: mpsc::UnboundedSender<SurfaceCommand>,
    commands_rx: Option<mpsc::UnboundedReceiver<SurfaceCommand>>,
}

/// The renderer's answer from `activate`, reused by the next render pass while
/// the props it was built from still hold.
struct StagedDecision<E> {
    key: RenderKey,
    element: Option<E>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RenderKey {
    is_open: bool,
    pending_message: Option<String>,
}

impl<E: 'static> ChatSurface<E> {
    pub fn new(registry: PluginRegistry<E>, activation: ActivationController) -> Self {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        Self {
            registry,
            activation,
            session: None,
            staged: None,
            commands_tx,
            commands_rx: Some(commands_rx),
        }
    }

    pub fn registry(&self) -> &PluginRegistry<E> {
        &self.registry
    }

    pub fn activation(&self) -> &ActivationController {
        &self.activation
    }

    pub fn activation_mut(&mut self) -> &mut ActivationController {
        &mut self.activation
    }

    pub fn session(&self) -> Option<&ChatSession> {
        self.session.as_ref()
    }

    /// Hands the command receiver to the host. Afterwards commands are no
    /// longer drained on render passes.
    pub fn take_commands(&mut self) -> Option<SurfaceCommands> {
        self.commands_rx
            .take()
            .map(|receiver| SurfaceCommands { receiver })
    }

    pub fn apply_command(&mut self, command: SurfaceCommand) {
        apply_to(&mut self.activation, command);
    }

    /// Builds this pass's frame. The registry is queried on every pass unless
    /// `activate` already asked the renderer about the same props.
    pub fn render(&mut self) -> SurfaceFrame<'_, E> {
        self.drain_commands();

        let element = match self.staged.take() {
            Some(staged) if staged.key == self.render_key() => staged.element,
            _ => self.delegated_element(),
        };
        if let Some(element) = element {
            return SurfaceFrame::Delegated(element);
        }

        if self.activation.is_open() {
            self.ensure_session();
        }

        SurfaceFrame::Default(DefaultChat {
            is_open: self.activation.is_open(),
            session: self.session.as_ref(),
        })
    }

    /// Runs after every activation change. When the default UI is active and
    /// open, creates the session and sends a pending hand-off exactly once.
    pub fn activate(&mut self) -> Option<PendingExchange> {
        self.drain_commands();
        self.staged = None;

        if !self.activation.is_open() {
            return None;
        }

        let element = self.delegated_element();
        let delegated = element.is_some();
        self.staged = Some(StagedDecision {
            key: self.render_key(),
            element,
        });
        if delegated {
            return None;
        }

        self.ensure_session();
        self.send_pending()
    }

    /// Sends a hand-off that had to wait for the previous reply. Call after an
    /// exchange settles.
    pub fn dispatch_pending(&mut self) -> Option<PendingExchange> {
        if !self.activation.is_open() {
            return None;
        }
        self.send_pending()
    }

    pub fn update_input(&mut self, text: impl Into<String>) {
        if let Some(session) = self.session.as_mut() {
            session.update_input(text);
        }
    }

    /// Sends the composer contents of the default session.
    pub fn submit_input(&mut self) -> Option<PendingExchange> {
        let session = self.session.as_mut()?;
        match session.submit_input() {
            Ok(exchange) => Some(exchange),
            Err(SendRejection::EmptyInput) => None,
            Err(rejection) => {
                tracing::trace!(?rejection, "composer submission ignored");
                None
            }
        }
    }

    /// Applies a responder outcome. Outcomes for a session that has since been
    /// torn down are discarded. Returns true when the transcript changed.
    pub fn resolve(&mut self, ticket: ExchangeTicket, outcome: ResponderResult<String>) -> bool {
        let Some(session) = self.session.as_mut() else {
            tracing::debug!(exchange = ticket.exchange, "reply discarded, no live session");
            return false;
        };

        if session.id() != ticket.session_id {
            tracing::debug!(exchange = ticket.exchange, "reply discarded, session was replaced");
            return false;
        }

        match session.resolve(ticket, outcome) {
            Ok(_) => true,
            Err(rejection) => {
                tracing::debug!(?rejection, "reply discarded");
                false
            }
        }
    }

    /// Tears the widget down: the transcript is dropped and host listeners are
    /// released. The next open starts a fresh session.
    pub fn unmount(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::debug!(
                session = %session.id(),
                awaiting = session.is_awaiting_reply(),
                "chat session torn down"
            );
        }
        self.staged = None;
        self.activation.unmount();
    }

    /// A hand-off stays pending while a reply is in flight and is only taken
    /// once the session accepts it.
    fn send_pending(&mut self) -> Option<PendingExchange> {
        let session = self.session.as_mut()?;
        let message = self.activation.pending_message()?;

        match session.begin_send(message) {
            Ok(exchange) => {
                self.activation.take_pending_message();
                Some(exchange)
            }
            Err(SendRejection::AwaitingReply { active }) => {
                tracing::debug!(exchange = active.exchange, "hand-off waits for the reply in flight");
                None
            }
            Err(rejection) => {
                self.activation.take_pending_message();
                tracing::debug!(?rejection, "hand-off dropped");
                None
            }
        }
    }

    fn render_key(&self) -> RenderKey {
        RenderKey {
            is_open: self.activation.is_open(),
            pending_message: self.activation.pending_message().map(str::to_string),
        }
    }

    fn render_props(&self) -> ChatRenderProps {
        ChatRenderProps {
            is_open: self.activation.is_open(),
            on_close: CloseHandle::new(self.commands_tx.clone()),
            pending_message: self.activation.pending_message().map(str::to_string),
            on_message_consumed: ConsumeHandle::new(self.commands_tx.clone()),
        }
    }

    fn delegated_element(&self) -> Option<E> {
        self.registry
            .chat_capability()
            .and_then(|capability| capability.render_chat(self.render_props()))
    }

    fn ensure_session(&mut self) -> &mut ChatSession {
        let registry = &self.registry;
        self.session.get_or_insert_with(|| {
            let config = registry
                .chat_capability()
                .and_then(|capability| capability.chat_config())
                .cloned()
                .unwrap_or_default();
            new_session(&config)
        })
    }

    fn drain_commands(&mut self) {
        let Some(receiver) = self.commands_rx.as_mut() else {
            return;
        };

        while let Ok(command) = receiver.try_recv() {
            apply_to(&mut self.activation, command);
        }
    }
}

fn new_session(config: &AiChatConfig) -> ChatSession {
    ChatSession::new(config.responder(), config.welcome_message())
}

fn apply_to(activation: &mut ActivationController, command: SurfaceCommand) {
    match command {
        SurfaceCommand::Close => {
            activation.close();
        }
        SurfaceCommand::ConsumePendingMessage => {
            if activation.take_pending_message().is_some() {
                tracing::debug!("hand-off consumed by delegated renderer");
            }
        }
    }
}
