use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::{ActiveTheme, h_flex, label::Label, text::TextView, v_flex};
use scribe_assistant::{ChatSession, Message};

use crate::widget::scroll::TranscriptScroll;

const USER_BUBBLE_MAX_WIDTH: Pixels = px(320.);

pub fn render_transcript(session: &ChatSession, scroll: &TranscriptScroll, cx: &App) -> AnyElement {
    let theme = cx.theme();

    v_flex()
        .id("assistant-transcript")
        .flex_1()
        .min_h_0()
        .overflow_y_scroll()
        .track_scroll(scroll.handle())
        .px_4()
        .py_3()
        .gap_4()
        .children(
            session
                .transcript()
                .iter()
                .map(|message| render_message(message, cx)),
        )
        .when(session.is_awaiting_reply(), |column| {
            column.child(
                h_flex()
                    .id("assistant-thinking")
                    .gap_2()
                    .items_center()
                    .child(div().size(px(8.)).rounded_full().bg(theme.primary))
                    .child(
                        Label::new("Thinking...")
                            .text_xs()
                            .text_color(theme.muted_foreground),
                    ),
            )
        })
        .into_any_element()
}

fn render_message(message: &Message, cx: &App) -> AnyElement {
    let theme = cx.theme();

    if message.is_user() {
        return v_flex()
            .w_full()
            .items_end()
            .child(
                div()
                    .max_w(USER_BUBBLE_MAX_WIDTH)
                    .px_3()
                    .py_2()
                    .rounded_lg()
                    .bg(theme.accent)
                    .text_color(theme.accent_foreground)
                    .child(Label::new(message.content().to_string()).text_sm()),
            )
            .into_any_element();
    }

    let markdown_id = ElementId::Name(SharedString::from(format!(
        "assistant-message-{}",
        message.id()
    )));

    v_flex()
        .w_full()
        .gap_1()
        .child(
            Label::new(message.role().display_name())
                .text_xs()
                .text_color(theme.foreground.opacity(0.5)),
        )
        .child(TextView::markdown(markdown_id, message.content().to_string()).selectable(true))
        .into_any_element()
}
