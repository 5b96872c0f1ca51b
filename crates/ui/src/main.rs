use gpui::*;
use gpui_component::Root;
use scribe::app::{DocsPageShell, Quit, ToggleAssistant};
use scribe::settings::SettingsStore;
use scribe_assistant::{PluginRegistry, ai_chat_plugin};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings_store = SettingsStore::load();
    if !settings_store.config_path().exists() {
        // Write the defaults once so there is a file to edit.
        let defaults = settings_store.settings().as_ref().clone();
        if let Err(error) = settings_store.update(defaults) {
            tracing::warn!("failed to write default settings: {}", error);
        }
    }
    let settings = settings_store.settings();

    let registry = PluginRegistry::<AnyElement>::builder()
        .register(ai_chat_plugin(settings.chat_config()))
        .build();

    let app = Application::new().with_assets(gpui_component_assets::Assets);

    app.run(move |cx| {
        gpui_tokio_bridge::init(cx);

        // Required before any Root usage.
        gpui_component::init(cx);

        cx.on_action(|_: &Quit, cx| {
            cx.quit();
        });

        cx.bind_keys([
            KeyBinding::new("cmd-q", Quit, None),
            KeyBinding::new("ctrl-q", Quit, None),
            KeyBinding::new("cmd-i", ToggleAssistant, None),
            KeyBinding::new("ctrl-i", ToggleAssistant, None),
        ]);

        cx.spawn(async move |cx| {
            cx.update(|cx| {
                let options = WindowOptions {
                    window_bounds: Some(WindowBounds::Windowed(Bounds::centered(
                        None,
                        size(px(1100.), px(780.)),
                        cx,
                    ))),
                    titlebar: Some(TitlebarOptions {
                        title: Some("Scribe Docs".into()),
                        ..Default::default()
                    }),
                    ..Default::default()
                };

                let opened = cx.open_window(options, |window, cx| {
                    let shell = cx.new(|cx| DocsPageShell::new(registry, settings, window, cx));
                    cx.new(|cx| Root::new(shell, window, cx))
                });
                if let Err(error) = opened {
                    tracing::error!("failed to open main window: {}", error);
                    cx.quit();
                    return;
                }

                cx.activate(true);
            })
        })
        .detach();
    });
}
