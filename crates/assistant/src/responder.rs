use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;

use crate::error::{PanickedSnafu, ResponderResult};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Reply future handed back to the UI loop for one exchange.
pub type ReplyFuture = BoxFuture<'static, ResponderResult<String>>;

/// Delay applied by the development placeholder before it answers.
pub const PLACEHOLDER_REPLY_DELAY: Duration = Duration::from_millis(1000);

/// Host-supplied asynchronous backend: message in, reply text out.
///
/// The returned future must own everything it needs, because the session keeps
/// running (and may be torn down) while it is pending.
pub trait Responder: Send + Sync {
    fn id(&self) -> &str;
    fn respond(&self, message: String) -> ReplyFuture;
}

/// Builds the reply text of the development placeholder.
pub fn placeholder_reply(message: &str) -> String {
    format!(
        "This is a placeholder response. The actual AI integration would go here. \
         Your question was: {message}"
    )
}

/// Development stand-in used when the host configures no responder.
///
/// It restates the question after a fixed delay and never talks to a backend.
#[derive(Debug, Clone)]
pub struct PlaceholderResponder {
    delay: Duration,
}

impl PlaceholderResponder {
    pub const ID: &'static str = "placeholder";

    pub fn new() -> Self {
        Self::with_delay(PLACEHOLDER_REPLY_DELAY)
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for PlaceholderResponder {
    fn default() -> Self {
        Self::new()
    }
}

impl Responder for PlaceholderResponder {
    fn id(&self) -> &str {
        Self::ID
    }

    fn respond(&self, message: String) -> ReplyFuture {
        let delay = self.delay;
        Box::pin(async move {
            tracing::debug!(
                "placeholder responder answering; configure `on_send_message` for real replies"
            );
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            Ok(placeholder_reply(&message))
        })
    }
}

/// Adapts an async closure into a [`Responder`].
pub struct FnResponder<F> {
    id: String,
    respond: F,
}

impl<F, Fut> Responder for FnResponder<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = ResponderResult<String>> + Send + 'static,
{
    fn id(&self) -> &str {
        &self.id
    }

    fn respond(&self, message: String) -> ReplyFuture {
        Box::pin((self.respond)(message))
    }
}

/// Wraps a host async function `message -> reply` as a shareable responder.
pub fn responder_fn<F, Fut>(id: impl Into<String>, respond: F) -> Arc<dyn Responder>
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ResponderResult<String>> + Send + 'static,
{
    Arc::new(FnResponder {
        id: id.into(),
        respond,
    })
}

/// Invokes a responder so that neither a panicking call nor a panicking future
/// escapes into the UI loop; both surface as `ResponderError::Panicked`.
pub(crate) fn guarded_reply(responder: &dyn Responder, message: String) -> ReplyFuture {
    let future = match std::panic::catch_unwind(AssertUnwindSafe(|| responder.respond(message))) {
        Ok(future) => future,
        Err(payload) => {
            let error = PanickedSnafu {
                stage: "invoke-responder",
                details: panic_details(payload.as_ref()),
            }
            .build();
            return Box::pin(async move { Err(error) });
        }
    };

    Box::pin(async move {
        match AssertUnwindSafe(future).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(payload) => PanickedSnafu {
                stage: "await-responder",
                details: panic_details(payload.as_ref()),
            }
            .fail(),
        }
    })
}

fn panic_details(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
