use gpui::*;
use gpui_component::{
    ActiveTheme, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    input::{Input, InputEvent, InputState},
    label::Label,
};
use scribe_assistant::{AffordanceStyle, Platform, Shortcut, a11y};

use crate::widget::events::{OpenRequested, PromptSubmitted};

/// Floating affordance shown while the chat is closed.
pub struct PromptBar {
    style: AffordanceStyle,
    shortcut_label: Option<SharedString>,
    input_state: Entity<InputState>,
}

impl EventEmitter<PromptSubmitted> for PromptBar {}
impl EventEmitter<OpenRequested> for PromptBar {}

impl PromptBar {
    pub fn new(
        style: AffordanceStyle,
        shortcut: Option<Shortcut>,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Self {
        let input_state = cx.new(|cx| InputState::new(window, cx).placeholder(a11y::PROMPT_INPUT));

        cx.subscribe_in(
            &input_state,
            window,
            |this, _, event: &InputEvent, _window, cx| {
                if let InputEvent::PressEnter { .. } = event {
                    this.submit(cx);
                }
            },
        )
        .detach();

        Self {
            style,
            shortcut_label: shortcut.map(|shortcut| shortcut.label(Platform::current()).into()),
            input_state,
        }
    }

    pub fn is_focused(&self, window: &Window, cx: &App) -> bool {
        self.input_state.read(cx).focus_handle(cx).is_focused(window)
    }

    /// Mirrors the controller's prompt buffer back into the input, e.g. after a
    /// hand-off cleared it.
    pub fn sync_text(&mut self, text: &str, window: &mut Window, cx: &mut Context<Self>) {
        if self.input_state.read(cx).value().to_string() == text {
            return;
        }
        self.input_state.update(cx, |state, cx| {
            state.set_value(text.to_string(), window, cx);
        });
    }

    fn submit(&mut self, cx: &mut Context<Self>) {
        let content = self.input_state.read(cx).value().to_string();
        cx.emit(PromptSubmitted { content });
    }

    fn render_prompt(&self, cx: &Context<Self>) -> AnyElement {
        let theme = cx.theme();

        h_flex()
            .id("assistant-prompt-bar")
            .w(px(420.))
            .gap_2()
            .items_center()
            .px_3()
            .py_2()
            .rounded_full()
            .border_1()
            .border_color(theme.border)
            .bg(theme.background)
            .shadow_lg()
            .child(div().flex_1().min_w_0().child(Input::new(&self.input_state)))
            .children(self.shortcut_label.clone().map(|label| {
                Label::new(label)
                    .text_xs()
                    .text_color(theme.muted_foreground)
            }))
            .child(
                Button::new("assistant-prompt-send")
                    .small()
                    .primary()
                    .icon(IconName::ArrowUp)
                    .tooltip(a11y::SEND_MESSAGE)
                    .on_click(cx.listener(|this, _, _window, cx| {
                        this.submit(cx);
                    })),
            )
            .into_any_element()
    }

    fn render_launcher(&self, cx: &Context<Self>) -> AnyElement {
        let label = match &self.shortcut_label {
            Some(shortcut) => format!("{} {shortcut}", a11y::OPEN_ASSISTANT),
            None => a11y::OPEN_ASSISTANT.to_string(),
        };

        Button::new("assistant-launcher")
            .primary()
            .icon(IconName::Bot)
            .tooltip(a11y::OPEN_ASSISTANT)
            .child(label)
            .on_click(cx.listener(|_, _, _window, cx| {
                cx.emit(OpenRequested);
            }))
            .into_any_element()
    }
}

impl Render for PromptBar {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        match self.style {
            AffordanceStyle::PromptBar => self.render_prompt(cx),
            AffordanceStyle::LauncherButton => self.render_launcher(cx),
        }
    }
}
