use std::sync::Arc;

use gpui::*;
use gpui_component::{
    ActiveTheme, Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    input::{Input, InputState},
    label::Label,
    v_flex,
};
use scribe_assistant::{
    ChatVisibility, FocusContext, KeyPress, Modifiers, Platform, PluginRegistry, Shortcut, Span,
};

use crate::settings::WidgetSettings;
use crate::widget::{AssistantWidget, PageKeyPressed, VisibilityChanged};

gpui::actions!(scribe, [Quit, ToggleAssistant]);

const PAGE_MAX_WIDTH: Pixels = px(760.);

/// Sample documentation rendered by the host page.
const DOC_SECTIONS: &[(&str, &str)] = &[
    (
        "Getting started",
        "Install the CLI, point it at your OpenAPI schema and run the dev server. \
         Pages are rebuilt on every change.",
    ),
    (
        "Authentication",
        "Requests are authenticated with bearer tokens. Tokens are scoped to a \
         project and can be rotated from the dashboard at any time.",
    ),
    (
        "Pagination",
        "List endpoints return a `next_cursor` field. Pass it back as the `cursor` \
         query parameter to fetch the following page.",
    ),
    (
        "Webhooks",
        "Subscribe to events by registering an HTTPS endpoint. Deliveries are \
         signed and retried with exponential backoff for up to three days.",
    ),
    (
        "Rate limits",
        "Each token may issue 600 requests per minute. Exceeding the limit \
         returns status 429 with a `retry-after` header.",
    ),
    (
        "Errors",
        "Errors use a stable `code` field alongside a human readable message. \
         Codes are documented per endpoint.",
    ),
];

/// Host page that mounts the assistant: a header with search, a scrolling
/// documentation body ending in a footer, and the floating widget.
pub struct DocsPageShell {
    focus_handle: FocusHandle,
    search_input: Entity<InputState>,
    page_scroll: ScrollHandle,
    registry: PluginRegistry<AnyElement>,
    settings: Arc<WidgetSettings>,
    widget: Option<Entity<AssistantWidget>>,
    _visibility_subscription: Option<Subscription>,
}

impl DocsPageShell {
    pub fn new(
        registry: PluginRegistry<AnyElement>,
        settings: Arc<WidgetSettings>,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Self {
        let search_input =
            cx.new(|cx| InputState::new(window, cx).placeholder("Search documentation..."));

        let focus_handle = cx.focus_handle();
        focus_handle.focus(window, cx);

        let mut shell = Self {
            focus_handle,
            search_input,
            page_scroll: ScrollHandle::new(),
            registry,
            settings,
            widget: None,
            _visibility_subscription: None,
        };
        shell.mount_widget(window, cx);
        shell
    }

    fn mount_widget(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        let registry = self.registry.clone();
        let activation = self.settings.activation();
        let host = cx.entity();
        let widget =
            cx.new(|cx| AssistantWidget::new(&host, registry, activation, window, cx));

        self._visibility_subscription = Some(cx.subscribe_in(
            &widget,
            window,
            |this, _, event: &VisibilityChanged, window, cx| {
                tracing::debug!(visibility = ?event.visibility, "assistant visibility changed");
                // Keep the page shortcut reachable once the drawer gives focus back.
                if event.visibility == ChatVisibility::Closed {
                    this.focus_handle.focus(window, cx);
                }
            },
        ));
        self.widget = Some(widget);
        tracing::info!("assistant mounted");
    }

    /// Mounting again starts from a fresh transcript.
    fn toggle_mount(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        if self.widget.take().is_some() {
            self._visibility_subscription = None;
            tracing::info!("assistant unmounted");
        } else {
            self.mount_widget(window, cx);
        }
        cx.notify();
    }

    fn toggle_assistant(
        &mut self,
        _: &ToggleAssistant,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        let press = Shortcut::TOGGLE_ASSISTANT.press(Platform::current());
        self.forward_key(press, window, cx);
    }

    /// Escape is the only raw key the widget listens to.
    fn route_escape(&mut self, event: &KeyDownEvent, window: &mut Window, cx: &mut Context<Self>) {
        let press = key_press(&event.keystroke);
        if press.is_escape() {
            self.forward_key(press, window, cx);
        }
    }

    fn forward_key(&mut self, press: KeyPress, window: &mut Window, cx: &mut Context<Self>) {
        let Some(widget) = self.widget.clone() else {
            return;
        };

        let focus = self.focus_context(&widget, window, cx);
        cx.emit(PageKeyPressed { press, focus });
    }

    fn focus_context(
        &self,
        widget: &Entity<AssistantWidget>,
        window: &Window,
        cx: &App,
    ) -> FocusContext {
        if widget.read(cx).owns_focus(window, cx) {
            FocusContext::AssistantInput
        } else if self
            .search_input
            .read(cx)
            .focus_handle(cx)
            .is_focused(window)
        {
            FocusContext::ForeignTextInput
        } else {
            FocusContext::Page
        }
    }

    fn observe_footer(&mut self, cx: &mut Context<Self>) {
        let Some(widget) = self.widget.clone() else {
            return;
        };
        let Some(footer) = self.page_scroll.bounds_for_item(DOC_SECTIONS.len()) else {
            return;
        };

        let viewport = span(self.page_scroll.bounds());
        let footer = span(footer);
        widget.update(cx, |widget, cx| widget.observe_footer(viewport, footer, cx));
    }

    fn render_header(&self, cx: &Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let mount_label = if self.widget.is_some() {
            "Unmount assistant"
        } else {
            "Mount assistant"
        };

        h_flex()
            .id("docs-header")
            .w_full()
            .flex_shrink_0()
            .items_center()
            .justify_between()
            .gap_4()
            .px_6()
            .py_3()
            .border_b_1()
            .border_color(theme.border)
            .child(Label::new("Scribe Docs").text_lg())
            .child(
                h_flex()
                    .gap_2()
                    .items_center()
                    .child(div().w(px(260.)).child(Input::new(&self.search_input)))
                    .child(
                        Button::new("docs-toggle-assistant")
                            .ghost()
                            .small()
                            .child(mount_label)
                            .on_click(cx.listener(|this, _, window, cx| {
                                this.toggle_mount(window, cx);
                            })),
                    ),
            )
    }

    fn render_footer(&self, cx: &Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        v_flex()
            .id("docs-footer")
            .w_full()
            .gap_1()
            .mt_12()
            .px_6()
            .py_8()
            .border_t_1()
            .border_color(theme.border)
            .bg(theme.muted)
            .child(Label::new("Scribe Docs").text_sm())
            .child(
                Label::new("Built with the documentation assistant.")
                    .text_xs()
                    .text_color(theme.muted_foreground),
            )
    }
}

impl Render for DocsPageShell {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        let sections = DOC_SECTIONS.iter().map(|(title, body)| {
            v_flex()
                .w_full()
                .max_w(PAGE_MAX_WIDTH)
                .gap_2()
                .px_6()
                .py_8()
                .child(Label::new(*title).text_xl())
                .child(
                    Label::new(*body)
                        .text_sm()
                        .text_color(theme.foreground.opacity(0.8)),
                )
        });

        div()
            .id("docs-page-shell")
            .size_full()
            .relative()
            .bg(theme.background)
            .text_color(theme.foreground)
            .track_focus(&self.focus_handle)
            .on_action(cx.listener(Self::toggle_assistant))
            .capture_key_down(cx.listener(|this, event: &KeyDownEvent, window, cx| {
                this.route_escape(event, window, cx);
            }))
            .child(
                v_flex()
                    .size_full()
                    .child(self.render_header(cx))
                    .child(
                        v_flex()
                            .id("docs-body")
                            .flex_1()
                            .min_h_0()
                            .overflow_y_scroll()
                            .track_scroll(&self.page_scroll)
                            .children(sections)
                            .child(self.render_footer(cx)),
                    ),
            )
            .children(self.widget.clone())
            .child(footer_tracker(cx.entity().downgrade()))
    }
}

impl EventEmitter<PageKeyPressed> for DocsPageShell {}

/// Reports footer geometry after every layout pass, the first one included.
fn footer_tracker(shell: WeakEntity<DocsPageShell>) -> impl IntoElement {
    canvas(
        move |_, _, cx| {
            let _ = shell.update(cx, |shell, cx| shell.observe_footer(cx));
        },
        |_, _, _, _| {},
    )
    .absolute()
    .size_full()
}

fn key_press(keystroke: &Keystroke) -> KeyPress {
    let modifiers = Modifiers {
        control: keystroke.modifiers.control,
        alt: keystroke.modifiers.alt,
        shift: keystroke.modifiers.shift,
        platform: keystroke.modifiers.platform,
    };
    KeyPress::new(keystroke.key.clone(), modifiers)
}

fn span(bounds: Bounds<Pixels>) -> Span {
    Span::new(f32::from(bounds.top()), f32::from(bounds.bottom()))
}
