#![deny(unsafe_code)]

/// Demo documentation page that hosts the assistant.
pub mod app;
/// Persisted widget settings.
pub mod settings;
/// gpui rendering of the assistant widget.
pub mod widget;
