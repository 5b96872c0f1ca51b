use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::{
    ActiveTheme, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    label::Label,
    v_flex,
};
use gpui_tokio_bridge::Tokio;
use scribe_assistant::{
    ActivationController, ChatSurface, ExchangeTicket, FocusContext, KeyOutcome, KeyPress,
    PendingExchange, PluginRegistry, ResponderError, ResponderResult, Span, Subscription,
    SurfaceFrame, a11y,
};

use crate::widget::composer::Composer;
use crate::widget::events::{
    DraftEdited, OpenRequested, PageKeyPressed, PromptSubmitted, Submit, VisibilityChanged,
};
use crate::widget::prompt_bar::PromptBar;
use crate::widget::scroll::TranscriptScroll;
use crate::widget::transcript::render_transcript;

const SURFACE_WIDTH: Pixels = px(400.);
const SURFACE_HEIGHT: Pixels = px(560.);

/// The mounted assistant: floating affordance plus the chat surface, which
/// is either the default transcript/composer or a plugin's own element.
pub struct AssistantWidget {
    surface: ChatSurface<AnyElement>,
    composer: Entity<Composer>,
    prompt_bar: Entity<PromptBar>,
    scroll: TranscriptScroll,
    exchange_task: Option<Task<()>>,
    _command_task: Option<Task<()>>,
}

impl EventEmitter<VisibilityChanged> for AssistantWidget {}

impl AssistantWidget {
    /// Mounts the widget on `host`, which reports the page keys the widget
    /// reacts to. Every listener is released when the widget is dropped.
    pub fn new<H: EventEmitter<PageKeyPressed>>(
        host: &Entity<H>,
        registry: PluginRegistry<AnyElement>,
        activation: ActivationController,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Self {
        let shortcut = activation
            .shortcut_enabled()
            .then(|| activation.shortcut());
        let style = activation.style();
        let composer = cx.new(|cx| Composer::new(window, cx));
        let prompt_bar = cx.new(|cx| PromptBar::new(style, shortcut, window, cx));
        let mut surface = ChatSurface::new(registry, activation);

        let keyboard_subscription = cx.subscribe_in(
            host,
            window,
            |this, _, event: &PageKeyPressed, window, cx| {
                this.handle_key(&event.press, event.focus, window, cx);
            },
        );
        let draft_subscription =
            cx.subscribe_in(&composer, window, |this, _, event: &DraftEdited, _, _| {
                this.surface.update_input(event.text.clone());
            });
        let composer_subscription =
            cx.subscribe_in(&composer, window, |this, _, _: &Submit, window, cx| {
                this.handle_submit(window, cx);
            });
        let prompt_subscription = cx.subscribe_in(
            &prompt_bar,
            window,
            |this, _, event: &PromptSubmitted, window, cx| {
                this.handle_prompt_submitted(event.clone(), window, cx);
            },
        );
        let launcher_subscription = cx.subscribe_in(
            &prompt_bar,
            window,
            |this, _, _: &OpenRequested, window, cx| {
                this.open(window, cx);
            },
        );

        let activation = surface.activation_mut();
        for (label, subscription) in [
            ("keyboard", keyboard_subscription),
            ("draft", draft_subscription),
            ("composer", composer_subscription),
            ("prompt-bar", prompt_subscription),
            ("launcher", launcher_subscription),
        ] {
            activation.attach(Subscription::new(label, move || drop(subscription)));
        }

        let command_task = surface.take_commands().map(|mut commands| {
            cx.spawn(async move |this, cx| {
                while let Some(command) = commands.recv().await {
                    let applied = this.update(cx, |this, cx| {
                        this.surface.apply_command(command);
                        this.after_activation_change(cx);
                    });
                    if applied.is_err() {
                        break;
                    }
                }
            })
        });

        cx.on_release(|this, _cx| this.surface.unmount()).detach();

        Self {
            surface,
            composer,
            prompt_bar,
            scroll: TranscriptScroll::new(),
            exchange_task: None,
            _command_task: command_task,
        }
    }

    pub fn is_open(&self) -> bool {
        self.surface.activation().is_open()
    }

    /// Whether keyboard focus sits in one of the widget's own inputs.
    pub fn owns_focus(&self, window: &Window, cx: &App) -> bool {
        self.composer.read(cx).is_focused(window, cx)
            || self.prompt_bar.read(cx).is_focused(window, cx)
    }

    /// Routes a page-level key press through the activation controller.
    fn handle_key(
        &mut self,
        press: &KeyPress,
        focus: FocusContext,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        match self.surface.activation_mut().handle_key(press, focus) {
            KeyOutcome::Toggled(_) | KeyOutcome::Dismissed => {
                self.after_activation_change(cx);
                self.focus_composer_if_open(window, cx);
            }
            KeyOutcome::Suppressed | KeyOutcome::Ignored => {}
        }
    }

    /// Feeds page geometry; the affordance hides while the footer shows.
    pub fn observe_footer(&mut self, viewport: Span, footer: Span, cx: &mut Context<Self>) {
        if self
            .surface
            .activation_mut()
            .observe_footer(viewport, footer)
        {
            cx.notify();
        }
    }

    pub fn open(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        if self.surface.activation_mut().open() {
            self.after_activation_change(cx);
            self.focus_composer_if_open(window, cx);
        }
    }

    pub fn close(&mut self, cx: &mut Context<Self>) {
        if self.surface.activation_mut().close() {
            self.after_activation_change(cx);
        }
    }

    fn handle_prompt_submitted(
        &mut self,
        event: PromptSubmitted,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        let activation = self.surface.activation_mut();
        activation.update_prompt(event.content);
        if !activation.submit_prompt() {
            return;
        }

        let prompt = self.surface.activation().prompt().to_string();
        self.prompt_bar
            .update(cx, |bar, cx| bar.sync_text(&prompt, window, cx));
        self.after_activation_change(cx);
        self.focus_composer_if_open(window, cx);
    }

    /// Sends the session's draft. A rejected send keeps the composer text.
    fn handle_submit(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        let Some(exchange) = self.surface.submit_input() else {
            return;
        };

        self.composer
            .update(cx, |composer, cx| composer.send_accepted(window, cx));
        self.drive(exchange, cx);
        self.sync_composer(cx);
        cx.notify();
    }

    /// Runs the hand-off (if any) and publishes the new visibility.
    fn after_activation_change(&mut self, cx: &mut Context<Self>) {
        if let Some(exchange) = self.surface.activate() {
            self.drive(exchange, cx);
        }
        if self.is_open() {
            self.scroll.reset();
        }

        self.sync_composer(cx);
        cx.emit(VisibilityChanged {
            visibility: self.surface.activation().visibility(),
        });
        cx.notify();
    }

    /// Awaits the responder on tokio and applies its outcome on the UI thread.
    /// A widget released in the meantime drops the outcome.
    fn drive(&mut self, exchange: PendingExchange, cx: &mut Context<Self>) {
        let ticket = exchange.ticket;
        let reply = Tokio::spawn(cx, exchange.wait());

        self.exchange_task = Some(cx.spawn(async move |this, cx| {
            let (ticket, outcome) = match reply.await {
                Ok(settled) => settled,
                Err(error) => (ticket, Err(ResponderError::interrupted(error.to_string()))),
            };

            let _ = this.update(cx, |this, cx| {
                this.settle(ticket, outcome, cx);
            });
        }));
    }

    /// Applies a reply, then sends a hand-off that was waiting behind it.
    fn settle(
        &mut self,
        ticket: ExchangeTicket,
        outcome: ResponderResult<String>,
        cx: &mut Context<Self>,
    ) {
        if let Some(finished) = self.exchange_task.take() {
            finished.detach();
        }
        if !self.surface.resolve(ticket, outcome) {
            return;
        }

        if let Some(exchange) = self.surface.dispatch_pending() {
            self.drive(exchange, cx);
        }
        self.sync_composer(cx);
        cx.notify();
    }

    fn sync_composer(&mut self, cx: &mut Context<Self>) {
        let can_send = self
            .surface
            .session()
            .is_some_and(|session| !session.is_awaiting_reply());
        self.composer
            .update(cx, |composer, cx| composer.set_send_enabled(can_send, cx));
    }

    fn focus_composer_if_open(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        if self.is_open() && self.surface.session().is_some() {
            self.composer
                .update(cx, |composer, cx| composer.focus(window, cx));
        }
    }

    fn render_header(&self, cx: &Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        h_flex()
            .id("assistant-header")
            .w_full()
            .flex_shrink_0()
            .items_center()
            .justify_between()
            .px_4()
            .py_2()
            .border_b_1()
            .border_color(theme.border)
            .child(Label::new(a11y::SURFACE_TITLE).text_sm())
            .child(
                Button::new("assistant-close")
                    .ghost()
                    .small()
                    .icon(IconName::Close)
                    .tooltip(a11y::CLOSE_CHAT)
                    .on_click(cx.listener(|this, _, _window, cx| {
                        this.close(cx);
                    })),
            )
    }

    fn render_disclaimer(&self, cx: &Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        div()
            .px_4()
            .pb_2()
            .child(
                Label::new(a11y::AI_DISCLAIMER)
                    .text_xs()
                    .text_color(theme.muted_foreground),
            )
    }
}

impl Render for AssistantWidget {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        if let Some(session) = self.surface.session() {
            self.scroll.track(session.transcript().len());
        }
        self.scroll.apply_pending_scroll();

        let affordance_visible = self.surface.activation().affordance_visible();
        let header = self.render_header(cx).into_any_element();
        let disclaimer = self.render_disclaimer(cx).into_any_element();

        let surface = match self.surface.render() {
            SurfaceFrame::Delegated(element) => Some(element),
            SurfaceFrame::Default(view) => match view.session {
                Some(session) if view.is_open => {
                    let theme = cx.theme();
                    Some(
                        v_flex()
                            .id("assistant-surface")
                            .w(SURFACE_WIDTH)
                            .h(SURFACE_HEIGHT)
                            .rounded_lg()
                            .border_1()
                            .border_color(theme.border)
                            .bg(theme.background)
                            .shadow_lg()
                            .overflow_hidden()
                            .child(header)
                            .child(render_transcript(session, &self.scroll, cx))
                            .child(
                                div()
                                    .w_full()
                                    .flex_shrink_0()
                                    .border_t_1()
                                    .border_color(theme.border)
                                    .child(self.composer.clone()),
                            )
                            .child(disclaimer)
                            .into_any_element(),
                    )
                }
                _ => None,
            },
        };

        v_flex()
            .id("assistant-widget")
            .absolute()
            .bottom_4()
            .right_4()
            .items_end()
            .gap_3()
            .children(surface)
            .when(affordance_visible, |column| {
                column.child(self.prompt_bar.clone())
            })
    }
}
