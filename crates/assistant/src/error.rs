use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ResponderError {
    #[snafu(display("responder rejected the message on `{stage}`: {reason}"))]
    Rejected { stage: &'static str, reason: String },
    #[snafu(display("responder panicked on `{stage}`: {details}"))]
    Panicked {
        stage: &'static str,
        details: String,
    },
    #[snafu(display("responder task was interrupted on `{stage}`: {details}"))]
    Interrupted {
        stage: &'static str,
        details: String,
    },
}

impl ResponderError {
    /// Builds a rejection from a host responder with a human readable reason.
    pub fn rejected(reason: impl Into<String>) -> Self {
        RejectedSnafu {
            stage: "host-responder",
            reason,
        }
        .build()
    }

    /// Reports that the runtime driving the responder dropped or aborted it.
    pub fn interrupted(details: impl Into<String>) -> Self {
        InterruptedSnafu {
            stage: "drive-responder",
            details,
        }
        .build()
    }
}

pub type ResponderResult<T> = Result<T, ResponderError>;
