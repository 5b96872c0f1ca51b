use std::fmt;

use uuid::Uuid;

// Every id wrapper shares one shape; ids are opaque outside this crate.
macro_rules! define_assistant_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(Uuid);

        impl $name {
            /// Allocates a fresh, time-ordered identifier.
            pub fn new_v7() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(formatter, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }
    };
}

define_assistant_id!(
    /// Identifies one message inside a transcript.
    MessageId
);
define_assistant_id!(
    /// Identifies one mounted chat session; a remount always yields a new id.
    SessionId
);
