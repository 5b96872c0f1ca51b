use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized},
};
use scribe_assistant::{
    ActivationController, AffordanceStyle, AiChatConfig, PLACEHOLDER_REPLY_DELAY,
    PlaceholderResponder,
};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};

pub const SETTINGS_DIRECTORY_NAME: &str = "scribe";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const SETTINGS_ENV_PREFIX: &str = "SCRIBE_";
pub const MAX_PLACEHOLDER_DELAY_MS: u64 = 30_000;

/// Serialized name of the closed-state affordance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Affordance {
    #[default]
    PromptBar,
    LauncherButton,
}

impl From<Affordance> for AffordanceStyle {
    fn from(value: Affordance) -> Self {
        match value {
            Affordance::PromptBar => AffordanceStyle::PromptBar,
            Affordance::LauncherButton => AffordanceStyle::LauncherButton,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetSettings {
    /// Greeting for new transcripts. Blank selects the built-in greeting.
    #[serde(default)]
    pub welcome_message: String,
    #[serde(default)]
    pub affordance: Affordance,
    #[serde(default = "default_placeholder_delay_ms")]
    pub placeholder_delay_ms: u64,
    #[serde(default = "default_shortcut_enabled")]
    pub shortcut_enabled: bool,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            welcome_message: String::new(),
            affordance: Affordance::default(),
            placeholder_delay_ms: default_placeholder_delay_ms(),
            shortcut_enabled: default_shortcut_enabled(),
        }
    }
}

impl WidgetSettings {
    pub fn normalized(mut self) -> Self {
        self.welcome_message = self.welcome_message.trim().to_string();
        self.placeholder_delay_ms = self.placeholder_delay_ms.min(MAX_PLACEHOLDER_DELAY_MS);
        self
    }

    pub fn placeholder_delay(&self) -> Duration {
        Duration::from_millis(self.placeholder_delay_ms)
    }

    /// Plugin options for the assistant. Without a backend the placeholder
    /// answers, slowed down by the configured delay.
    pub fn chat_config(&self) -> AiChatConfig {
        let mut config = AiChatConfig::new();
        if !self.welcome_message.is_empty() {
            config = config.with_welcome_message(self.welcome_message.clone());
        }
        if self.placeholder_delay() != PLACEHOLDER_REPLY_DELAY {
            config = config.with_responder(Arc::new(PlaceholderResponder::with_delay(
                self.placeholder_delay(),
            )));
        }
        config
    }

    pub fn activation(&self) -> ActivationController {
        ActivationController::new(self.affordance.into())
            .with_shortcut_enabled(self.shortcut_enabled)
    }
}

pub struct SettingsStore {
    settings: Arc<ArcSwap<WidgetSettings>>,
    config_path: PathBuf,
}

impl SettingsStore {
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|path| path.join(SETTINGS_DIRECTORY_NAME))
            .unwrap_or_else(|| PathBuf::from(".scribe"))
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join(SETTINGS_FILE_NAME)
    }

    pub fn new(config_path: PathBuf) -> Self {
        let settings = Self::load_from_disk(&config_path);
        Self {
            settings: Arc::new(ArcSwap::from_pointee(settings)),
            config_path,
        }
    }

    pub fn load() -> Self {
        Self::new(Self::default_config_path())
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn settings(&self) -> Arc<WidgetSettings> {
        self.settings.load_full()
    }

    pub fn update(&self, settings: WidgetSettings) -> Result<(), SettingsError> {
        let normalized_settings = settings.normalized();
        self.persist(&normalized_settings)?;
        self.settings.store(Arc::new(normalized_settings));
        Ok(())
    }

    fn load_from_disk(path: &Path) -> WidgetSettings {
        if !path.exists() {
            tracing::info!("settings file not found at {:?}, using defaults", path);
        }

        let figment = Figment::from(Serialized::defaults(WidgetSettings::default()))
            .merge(Json::file(path))
            .merge(Env::prefixed(SETTINGS_ENV_PREFIX));

        match figment.extract::<WidgetSettings>() {
            Ok(settings) => settings.normalized(),
            Err(error) => {
                tracing::warn!(
                    "failed to parse settings from {:?}: {}. using defaults",
                    path,
                    error
                );
                WidgetSettings::default()
            }
        }
    }

    fn persist(&self, settings: &WidgetSettings) -> Result<(), SettingsError> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).context(CreateDirSnafu {
                stage: "create-settings-directory",
                path: parent.to_path_buf(),
            })?;
        }

        let content = serde_json::to_string_pretty(settings).context(SerializeConfigSnafu {
            stage: "serialize-settings-json",
        })?;

        let temp_path = self.config_path.with_extension("json.tmp");
        std::fs::write(&temp_path, content).context(WriteFileSnafu {
            stage: "write-temporary-settings-file",
            path: temp_path.clone(),
        })?;

        std::fs::rename(&temp_path, &self.config_path).context(RenameTempFileSnafu {
            stage: "rename-temporary-settings-file",
            from: temp_path,
            to: self.config_path.clone(),
        })?;

        tracing::info!("saved settings to {:?}", self.config_path);
        Ok(())
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SettingsError {
    #[snafu(display("failed to create settings directory at {path:?} on `{stage}`: {source}"))]
    CreateDir {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("failed to serialize settings on `{stage}`: {source}"))]
    SerializeConfig {
        stage: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("failed to write settings file at {path:?} on `{stage}`: {source}"))]
    WriteFile {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display(
        "failed to replace settings file from {from:?} to {to:?} on `{stage}`: {source}"
    ))]
    RenameTempFile {
        stage: &'static str,
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

fn default_placeholder_delay_ms() -> u64 {
    PLACEHOLDER_REPLY_DELAY.as_millis() as u64
}

fn default_shortcut_enabled() -> bool {
    true
}
