pub mod state;

pub use state::{Affordance, SettingsError, SettingsStore, WidgetSettings};
