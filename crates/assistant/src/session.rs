use std::sync::Arc;

use crate::error::ResponderResult;
use crate::ids::{MessageId, SessionId};
use crate::message::{DEFAULT_WELCOME_MESSAGE, Message, Transcript};
use crate::responder::{PlaceholderResponder, ReplyFuture, Responder, guarded_reply};

/// Assistant message appended when the responder fails to produce a reply.
pub const RESPONDER_FAILURE_NOTICE: &str =
    "Sorry, I couldn't get a response right now. Please try again.";

/// Observable lifecycle of the default chat experience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    /// Nothing typed and nothing in flight; the last reply is on display.
    Idle,
    /// The composer holds text that has not been sent.
    Composing,
    /// A user message was appended and its reply has not landed yet.
    AwaitingReply,
}

/// Routing key for one in-flight exchange.
///
/// Outcomes carrying a ticket from another session or an older exchange are
/// rejected, so late replies can never land in the wrong transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExchangeTicket {
    pub session_id: SessionId,
    pub exchange: u64,
}

/// Why a send request was ignored. Callers in the UI drop these silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendRejection {
    EmptyInput,
    AwaitingReply { active: ExchangeTicket },
}

/// Why a responder outcome was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveRejection {
    NoExchangeInFlight,
    StaleTicket {
        active: ExchangeTicket,
        attempted: ExchangeTicket,
    },
}

/// The asynchronous half of a send, returned to whoever drives the UI loop.
pub struct PendingExchange {
    pub ticket: ExchangeTicket,
    pub user_message_id: MessageId,
    pub reply: ReplyFuture,
}

impl PendingExchange {
    /// Awaits the responder and pairs its outcome with the exchange ticket.
    pub async fn wait(self) -> (ExchangeTicket, ResponderResult<String>) {
        let outcome = self.reply.await;
        (self.ticket, outcome)
    }
}

impl std::fmt::Debug for PendingExchange {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("PendingExchange")
            .field("ticket", &self.ticket)
            .field("user_message_id", &self.user_message_id)
            .finish_non_exhaustive()
    }
}

/// Transcript, composer buffer and request lifecycle for one conversation.
pub struct ChatSession {
    id: SessionId,
    transcript: Transcript,
    input_buffer: String,
    in_flight: Option<ExchangeTicket>,
    next_exchange: u64,
    responder: Arc<dyn Responder>,
}

impl ChatSession {
    pub fn new(responder: Arc<dyn Responder>, welcome_message: impl Into<String>) -> Self {
        let id = SessionId::new_v7();
        tracing::debug!(session = %id, responder = responder.id(), "chat session created");

        Self {
            id,
            transcript: Transcript::with_welcome(welcome_message),
            input_buffer: String::new(),
            in_flight: None,
            next_exchange: 1,
            responder,
        }
    }

    /// Session backed by the placeholder responder and the default greeting.
    pub fn with_defaults() -> Self {
        Self::new(
            Arc::new(PlaceholderResponder::default()),
            DEFAULT_WELCOME_MESSAGE,
        )
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn input(&self) -> &str {
        &self.input_buffer
    }

    pub fn responder_id(&self) -> &str {
        self.responder.id()
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<ExchangeTicket> {
        self.in_flight
    }

    pub fn phase(&self) -> SessionPhase {
        if self.in_flight.is_some() {
            SessionPhase::AwaitingReply
        } else if self.input_buffer.is_empty() {
            SessionPhase::Idle
        } else {
            SessionPhase::Composing
        }
    }

    /// Returns true when the send button should be enabled.
    pub fn can_submit(&self) -> bool {
        self.in_flight.is_none() && !self.input_buffer.trim().is_empty()
    }

    pub fn update_input(&mut self, text: impl Into<String>) {
        self.input_buffer = text.into();
    }

    /// Sends whatever the composer currently holds.
    pub fn submit_input(&mut self) -> Result<PendingExchange, SendRejection> {
        let content = self.input_buffer.clone();
        self.begin_send(&content)
    }

    /// Synchronous half of `send`.
    ///
    /// On success the user message is already in the transcript, the composer is
    /// cleared and the session is awaiting the returned exchange.
    pub fn begin_send(&mut self, content: &str) -> Result<PendingExchange, SendRejection> {
        if let Some(active) = self.in_flight {
            tracing::trace!(session = %self.id, "send ignored while awaiting a reply");
            return Err(SendRejection::AwaitingReply { active });
        }

        let content = content.trim();
        if content.is_empty() {
            tracing::trace!(session = %self.id, "send ignored for empty input");
            return Err(SendRejection::EmptyInput);
        }

        let ticket = ExchangeTicket {
            session_id: self.id,
            exchange: self.next_exchange,
        };
        self.next_exchange = self.next_exchange.saturating_add(1);

        let user_message_id = self.transcript.push(Message::user(content));
        self.input_buffer.clear();
        self.in_flight = Some(ticket);

        tracing::debug!(
            session = %self.id,
            exchange = ticket.exchange,
            responder = self.responder.id(),
            "dispatching message to responder"
        );

        Ok(PendingExchange {
            ticket,
            user_message_id,
            reply: guarded_reply(self.responder.as_ref(), content.to_string()),
        })
    }

    /// Applies the responder outcome of the in-flight exchange.
    ///
    /// Failures are recorded as an assistant failure notice so the transcript
    /// always ends with an assistant message once the exchange settles.
    pub fn resolve(
        &mut self,
        ticket: ExchangeTicket,
        outcome: ResponderResult<String>,
    ) -> Result<MessageId, ResolveRejection> {
        let Some(active) = self.in_flight else {
            return Err(ResolveRejection::NoExchangeInFlight);
        };
        if active != ticket {
            return Err(ResolveRejection::StaleTicket {
                active,
                attempted: ticket,
            });
        }

        let reply = match outcome {
            Ok(reply) => reply,
            Err(error) => {
                tracing::warn!(
                    session = %self.id,
                    exchange = ticket.exchange,
                    "responder failed: {error}"
                );
                RESPONDER_FAILURE_NOTICE.to_string()
            }
        };

        self.in_flight = None;
        Ok(self.transcript.push(Message::assistant(reply)))
    }

    /// Full exchange: append the user message, await the responder, append
    /// the reply (or failure notice).
    pub async fn send(&mut self, content: &str) -> Result<(), SendRejection> {
        let exchange = self.begin_send(content)?;
        let (ticket, outcome) = exchange.wait().await;
        // `&mut self` is held across the await, so nothing else settles this exchange.
        if let Err(rejection) = self.resolve(ticket, outcome) {
            tracing::error!(session = %self.id, "exchange settled twice: {rejection:?}");
        }
        Ok(())
    }
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ChatSession")
            .field("id", &self.id)
            .field("messages", &self.transcript.len())
            .field("in_flight", &self.in_flight)
            .field("responder", &self.responder.id())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::error::ResponderError;
    use crate::message::Role;
    use crate::responder::{placeholder_reply, responder_fn};

    fn echo_session() -> ChatSession {
        let responder = responder_fn("echo", |message: String| async move {
            Ok(format!("echo: {message}"))
        });
        ChatSession::new(responder, "welcome")
    }

    fn roles(session: &ChatSession) -> Vec<Role> {
        session.transcript().iter().map(Message::role).collect()
    }

    #[tokio::test]
    async fn each_exchange_appends_user_then_assistant() {
        let mut session = echo_session();

        for question in ["first", "second", "third"] {
            let before = session.transcript().len();
            session.send(question).await.expect("send accepted");

            let added = &session.transcript().messages()[before..];
            assert_eq!(added.len(), 2);
            assert_eq!(added[0].role(), Role::User);
            assert_eq!(added[0].content(), question);
            assert_eq!(added[1].role(), Role::Assistant);
            assert_eq!(added[1].content(), format!("echo: {question}"));
        }

        assert_eq!(session.phase(), SessionPhase::Idle);
    }

    #[tokio::test]
    async fn user_message_lands_before_the_reply_resolves() {
        let mut session = echo_session();
        session.update_input("  how do I paginate?  ");

        let exchange = session.submit_input().expect("accepted");

        assert_eq!(roles(&session), [Role::Assistant, Role::User]);
        assert_eq!(session.transcript().messages()[1].content(), "how do I paginate?");
        assert_eq!(session.input(), "");
        assert!(session.is_awaiting_reply());
        assert_eq!(session.phase(), SessionPhase::AwaitingReply);

        let (ticket, outcome) = exchange.wait().await;
        session.resolve(ticket, outcome).expect("current ticket");

        assert_eq!(roles(&session), [Role::Assistant, Role::User, Role::Assistant]);
        assert!(!session.is_awaiting_reply());
    }

    #[test]
    fn whitespace_sends_are_ignored() {
        let mut session = echo_session();

        for blank in ["", "   ", "\n\t"] {
            let rejection = session.begin_send(blank).expect_err("blank rejected");
            assert_eq!(rejection, SendRejection::EmptyInput);
        }

        assert_eq!(session.transcript().len(), 1);
        assert!(!session.is_awaiting_reply());
    }

    #[tokio::test]
    async fn sends_while_awaiting_are_ignored_until_the_reply_lands() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = calls.clone();
        let responder = responder_fn("counting", move |message: String| {
            counted.fetch_add(1, Ordering::SeqCst);
            async move { Ok(message) }
        });
        let mut session = ChatSession::new(responder, "welcome");

        let exchange = session.begin_send("one").expect("first accepted");
        let rejection = session.begin_send("two").expect_err("second ignored");
        assert_eq!(
            rejection,
            SendRejection::AwaitingReply {
                active: exchange.ticket
            }
        );
        assert_eq!(session.transcript().len(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let (ticket, outcome) = exchange.wait().await;
        session.resolve(ticket, outcome).expect("resolved");

        session.begin_send("two").expect("accepted after reply");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn rejecting_responder_leaves_a_failure_notice() {
        let responder = responder_fn("rejecting", |_message: String| async move {
            Err(ResponderError::rejected("backend unavailable"))
        });
        let mut session = ChatSession::new(responder, "welcome");

        session.send("hello").await.expect("send accepted");

        assert!(!session.is_awaiting_reply());
        let last = session.transcript().last().expect("last message");
        assert_eq!(last.role(), Role::Assistant);
        assert_eq!(last.content(), RESPONDER_FAILURE_NOTICE);
    }

    #[tokio::test]
    async fn panicking_responder_leaves_a_failure_notice() {
        let responder = responder_fn("panicking", |_message: String| async move {
            if true {
                panic!("responder bug");
            }
            Ok(String::new())
        });
        let mut session = ChatSession::new(responder, "welcome");

        session.send("hello").await.expect("send accepted");

        assert!(!session.is_awaiting_reply());
        assert_eq!(
            session.transcript().last().map(Message::content),
            Some(RESPONDER_FAILURE_NOTICE)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn default_session_uses_the_placeholder() {
        let mut session = ChatSession::with_defaults();
        assert_eq!(session.responder_id(), PlaceholderResponder::ID);
        assert_eq!(
            session.transcript().welcome().map(Message::content),
            Some(DEFAULT_WELCOME_MESSAGE)
        );

        session.send("What is a rate limit?").await.expect("accepted");

        assert_eq!(
            session.transcript().last().map(Message::content),
            Some(placeholder_reply("What is a rate limit?").as_str())
        );
    }

    #[test]
    fn stale_and_unexpected_outcomes_are_rejected() {
        let mut session = echo_session();
        let stray = ExchangeTicket {
            session_id: session.id(),
            exchange: 99,
        };

        assert_eq!(
            session.resolve(stray, Ok("late".into())),
            Err(ResolveRejection::NoExchangeInFlight)
        );

        let exchange = session.begin_send("question").expect("accepted");
        let rejection = session
            .resolve(stray, Ok("late".into()))
            .expect_err("stale ticket");
        assert_eq!(
            rejection,
            ResolveRejection::StaleTicket {
                active: exchange.ticket,
                attempted: stray,
            }
        );
        assert_eq!(session.transcript().len(), 2);
        assert!(session.is_awaiting_reply());
    }

    #[test]
    fn phase_tracks_composer_and_flight() {
        let mut session = echo_session();
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(!session.can_submit());

        session.update_input("draft");
        assert_eq!(session.phase(), SessionPhase::Composing);
        assert!(session.can_submit());

        session.update_input("   ");
        assert_eq!(session.phase(), SessionPhase::Composing);
        assert!(!session.can_submit());

        session.update_input("ready");
        let _exchange = session.submit_input().expect("accepted");
        session.update_input("typing ahead");
        assert_eq!(session.phase(), SessionPhase::AwaitingReply);
        assert!(!session.can_submit());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_replies_keep_per_exchange_ordering() {
        let responder = responder_fn("slow", |message: String| async move {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(format!("answer to {message}"))
        });
        let mut session = ChatSession::new(responder, "welcome");

        session.send("a").await.expect("accepted");
        session.send("b").await.expect("accepted");

        let contents = session
            .transcript()
            .iter()
            .map(Message::content)
            .collect::<Vec<_>>();
        assert_eq!(contents, ["welcome", "a", "answer to a", "b", "answer to b"]);
    }
}
