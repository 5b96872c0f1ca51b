use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::AiChatConfig;

/// Signals a delegated renderer may send back to the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceCommand {
    Close,
    ConsumePendingMessage,
}

/// `onClose` callback handed to chat renderers.
#[derive(Debug, Clone)]
pub struct CloseHandle {
    commands: mpsc::UnboundedSender<SurfaceCommand>,
}

impl CloseHandle {
    pub(crate) fn new(commands: mpsc::UnboundedSender<SurfaceCommand>) -> Self {
        Self { commands }
    }

    /// Requests the surface to close. A no-op once the surface is gone.
    pub fn close(&self) {
        if self.commands.send(SurfaceCommand::Close).is_err() {
            tracing::debug!("close requested after the chat surface was dropped");
        }
    }
}

/// Callback a renderer invokes once it has taken over the hand-off message.
#[derive(Debug, Clone)]
pub struct ConsumeHandle {
    commands: mpsc::UnboundedSender<SurfaceCommand>,
}

impl ConsumeHandle {
    pub(crate) fn new(commands: mpsc::UnboundedSender<SurfaceCommand>) -> Self {
        Self { commands }
    }

    pub fn consume(&self) {
        if self
            .commands
            .send(SurfaceCommand::ConsumePendingMessage)
            .is_err()
        {
            tracing::debug!("hand-off consumed after the chat surface was dropped");
        }
    }
}

/// Inputs a plugin receives when asked to render the chat surface.
#[derive(Debug, Clone)]
pub struct ChatRenderProps {
    pub is_open: bool,
    pub on_close: CloseHandle,
    pub pending_message: Option<String>,
    pub on_message_consumed: ConsumeHandle,
}

/// Capability of rendering the chat surface in place of the default UI.
///
/// `E` is the host toolkit's element type.
pub trait ChatCapability<E> {
    /// Returns the element to show, or `None` for "no opinion", in which case
    /// the default transcript and composer are used.
    fn render_chat(&self, props: ChatRenderProps) -> Option<E>;

    /// Settings for the default UI when this capability declines to render.
    fn chat_config(&self) -> Option<&AiChatConfig> {
        None
    }
}

/// An extension installed by the host at configuration time.
pub trait Plugin<E> {
    fn name(&self) -> &str;

    fn chat_capability(&self) -> Option<&dyn ChatCapability<E>> {
        None
    }
}

/// Ordered, append-only list of plugins collected before the first render.
pub struct PluginRegistryBuilder<E> {
    plugins: Vec<Arc<dyn Plugin<E>>>,
}

impl<E: 'static> PluginRegistryBuilder<E> {
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
        }
    }

    pub fn register(mut self, plugin: impl Plugin<E> + 'static) -> Self {
        let plugin: Arc<dyn Plugin<E>> = Arc::new(plugin);
        tracing::debug!(
            plugin = plugin.name(),
            position = self.plugins.len(),
            chat_capability = plugin.chat_capability().is_some(),
            "plugin registered"
        );
        self.plugins.push(plugin);
        self
    }

    /// Freezes the list. The registry cannot be mutated afterwards.
    pub fn build(self) -> PluginRegistry<E> {
        PluginRegistry {
            plugins: self.plugins.into(),
        }
    }
}

impl<E: 'static> Default for PluginRegistryBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable plugin list with capability lookup. Cloning shares the list.
pub struct PluginRegistry<E> {
    plugins: Arc<[Arc<dyn Plugin<E>>]>,
}

impl<E: 'static> PluginRegistry<E> {
    pub fn builder() -> PluginRegistryBuilder<E> {
        PluginRegistryBuilder::new()
    }

    pub fn empty() -> Self {
        PluginRegistryBuilder::new().build()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Plugin<E>> {
        self.plugins.iter().map(|plugin| plugin.as_ref())
    }

    /// First plugin, in registration order, accepted by `predicate`.
    pub fn find_capability<P>(&self, predicate: P) -> Option<&dyn Plugin<E>>
    where
        P: Fn(&dyn Plugin<E>) -> bool,
    {
        self.iter().find(|plugin| predicate(*plugin))
    }

    /// The chat renderer capability of the first plugin that offers one.
    pub fn chat_capability(&self) -> Option<&dyn ChatCapability<E>> {
        self.find_capability(|plugin| plugin.chat_capability().is_some())
            .and_then(|plugin| plugin.chat_capability())
    }
}

impl<E> Clone for PluginRegistry<E> {
    fn clone(&self) -> Self {
        Self {
            plugins: self.plugins.clone(),
        }
    }
}

/// Plugin produced by [`ai_chat_plugin`]: enables the assistant and carries
/// its configuration, leaving rendering to the default UI.
#[derive(Debug, Clone, Default)]
pub struct AiChatPlugin {
    config: AiChatConfig,
}

impl AiChatPlugin {
    pub const NAME: &'static str = "ai-chat";

    pub fn config(&self) -> &AiChatConfig {
        &self.config
    }
}

impl<E> Plugin<E> for AiChatPlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn chat_capability(&self) -> Option<&dyn ChatCapability<E>> {
        Some(self)
    }
}

impl<E> ChatCapability<E> for AiChatPlugin {
    fn render_chat(&self, _props: ChatRenderProps) -> Option<E> {
        None
    }

    fn chat_config(&self) -> Option<&AiChatConfig> {
        Some(&self.config)
    }
}

/// Host-facing constructor for the assistant plugin.
pub fn ai_chat_plugin(config: AiChatConfig) -> AiChatPlugin {
    if config.uses_placeholder() {
        tracing::info!("ai chat plugin configured without `on_send_message`; using placeholder replies");
    }
    AiChatPlugin { config }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Opaque(&'static str);

    impl Plugin<String> for Opaque {
        fn name(&self) -> &str {
            self.0
        }
    }

    struct Renderer(&'static str);

    impl Plugin<String> for Renderer {
        fn name(&self) -> &str {
            self.0
        }

        fn chat_capability(&self) -> Option<&dyn ChatCapability<String>> {
            Some(self)
        }
    }

    impl ChatCapability<String> for Renderer {
        fn render_chat(&self, props: ChatRenderProps) -> Option<String> {
            Some(format!("{} open={}", self.0, props.is_open))
        }
    }

    fn props() -> ChatRenderProps {
        let (commands, _rx) = mpsc::unbounded_channel();
        ChatRenderProps {
            is_open: true,
            on_close: CloseHandle::new(commands.clone()),
            pending_message: None,
            on_message_consumed: ConsumeHandle::new(commands),
        }
    }

    #[test]
    fn lookup_without_a_match_is_none() {
        let registry = PluginRegistry::<String>::builder()
            .register(Opaque("search"))
            .register(Opaque("analytics"))
            .build();

        assert_eq!(registry.len(), 2);
        assert!(registry.chat_capability().is_none());
        assert!(registry.find_capability(|plugin| plugin.name() == "theme").is_none());
    }

    #[test]
    fn lookup_returns_the_first_match_in_registration_order() {
        let registry = PluginRegistry::<String>::builder()
            .register(Opaque("search"))
            .register(Renderer("first"))
            .register(Renderer("second"))
            .build();

        let capability = registry.chat_capability().expect("renderer registered");
        assert_eq!(
            capability.render_chat(props()).as_deref(),
            Some("first open=true")
        );

        let found = registry
            .find_capability(|plugin| plugin.name().starts_with('s'))
            .expect("search plugin");
        assert_eq!(found.name(), "search");
    }

    #[test]
    fn ai_chat_plugin_has_no_rendering_opinion_but_carries_config() {
        let registry = PluginRegistry::<String>::builder()
            .register(ai_chat_plugin(
                AiChatConfig::new().with_welcome_message("Welcome to the docs"),
            ))
            .build();

        let capability = registry.chat_capability().expect("ai chat capability");
        assert!(capability.render_chat(props()).is_none());
        assert_eq!(
            capability.chat_config().map(AiChatConfig::welcome_message),
            Some("Welcome to the docs")
        );
    }

    #[test]
    fn clones_share_the_same_plugins() {
        let registry = PluginRegistry::<String>::builder()
            .register(Opaque("search"))
            .build();
        let clone = registry.clone();

        assert_eq!(
            clone.iter().map(|plugin| plugin.name()).collect::<Vec<_>>(),
            ["search"]
        );
        assert!(PluginRegistry::<String>::empty().is_empty());
    }
}
