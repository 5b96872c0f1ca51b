use gpui::*;
use gpui_component::{
    ActiveTheme, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    input::{Input, InputEvent, InputState},
    label::Label,
    v_flex,
};
use scribe_assistant::a11y;

use crate::widget::events::{DraftEdited, Submit};

/// Chat input of the open drawer.
///
/// The session owns the draft: every edit is forwarded as [`DraftEdited`] and
/// the text is only cleared once the widget reports the send as accepted, so a
/// rejected send leaves the question in place.
pub struct Composer {
    input_state: Entity<InputState>,
    send_enabled: bool,
}

impl EventEmitter<DraftEdited> for Composer {}
impl EventEmitter<Submit> for Composer {}

impl Composer {
    pub fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        let input_state = cx.new(|cx| {
            InputState::new(window, cx)
                .placeholder(a11y::COMPOSER_INPUT)
                .auto_grow(1, 6)
        });
        cx.subscribe_in(&input_state, window, Self::on_input_event)
            .detach();

        Self {
            input_state,
            send_enabled: true,
        }
    }

    /// Mirrors whether the session would accept a send right now.
    pub fn set_send_enabled(&mut self, enabled: bool, cx: &mut Context<Self>) {
        if self.send_enabled != enabled {
            self.send_enabled = enabled;
            cx.notify();
        }
    }

    pub fn is_focused(&self, window: &Window, cx: &App) -> bool {
        self.input_state.read(cx).focus_handle(cx).is_focused(window)
    }

    pub fn focus(&self, window: &mut Window, cx: &mut Context<Self>) {
        self.input_state.update(cx, |state, cx| state.focus(window, cx));
    }

    /// Empties the input after the session took the draft.
    pub fn send_accepted(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.input_state
            .update(cx, |state, cx| state.set_value("", window, cx));
    }

    fn on_input_event(
        &mut self,
        state: &Entity<InputState>,
        event: &InputEvent,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        match event {
            InputEvent::Change => {
                let text = state.read(cx).value().to_string();
                cx.emit(DraftEdited { text });
            }
            // Shift+Enter keeps the line break and stays in the draft.
            InputEvent::PressEnter { .. } if !window.modifiers().shift => {
                self.drop_enter_line_break(window, cx);
                self.request_send(cx);
            }
            _ => {}
        }
    }

    /// The multi-line input inserts the break before reporting Enter.
    fn drop_enter_line_break(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        let value = self.input_state.read(cx).value().to_string();
        if let Some(draft) = value.strip_suffix('\n') {
            let draft = draft.to_string();
            self.input_state
                .update(cx, |state, cx| state.set_value(draft, window, cx));
        }
    }

    fn insert_line_break(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.input_state
            .update(cx, |state, cx| state.insert("\n", window, cx));
    }

    fn request_send(&mut self, cx: &mut Context<Self>) {
        if self.send_enabled {
            cx.emit(Submit);
        }
    }
}

impl Render for Composer {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        v_flex()
            .id("assistant-composer")
            .gap_2()
            .p_3()
            .bg(theme.background)
            .child(
                h_flex()
                    .w_full()
                    .gap_2()
                    .items_end()
                    .px_3()
                    .py_2()
                    .rounded_lg()
                    .border_1()
                    .border_color(theme.border)
                    .on_key_down(cx.listener(|this, event: &KeyDownEvent, window, cx| {
                        let keystroke = &event.keystroke;
                        if keystroke.key == "enter" && keystroke.modifiers.shift {
                            this.insert_line_break(window, cx);
                        }
                    }))
                    .child(div().flex_1().min_w_0().child(Input::new(&self.input_state)))
                    .child(
                        Button::new("assistant-send")
                            .small()
                            .primary()
                            .icon(IconName::ArrowUp)
                            .tooltip(a11y::SEND_MESSAGE)
                            .disabled(!self.send_enabled)
                            .on_click(cx.listener(|this, _, _window, cx| this.request_send(cx))),
                    ),
            )
            .child(
                Label::new(a11y::COMPOSER_HINT)
                    .text_xs()
                    .text_color(theme.muted_foreground),
            )
    }
}
