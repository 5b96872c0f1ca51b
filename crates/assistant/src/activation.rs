use crate::keyboard::{FocusContext, KeyPress, Shortcut};
use crate::viewport::{FooterObserver, Span, Subscription};

/// Open/closed state of the chat surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChatVisibility {
    #[default]
    Closed,
    Open,
}

impl ChatVisibility {
    pub fn toggled(self) -> Self {
        match self {
            Self::Closed => Self::Open,
            Self::Open => Self::Closed,
        }
    }
}

/// How the closed-state affordance is presented. Both styles drive the same
/// state machine; only `PromptBar` offers a hand-off input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AffordanceStyle {
    #[default]
    PromptBar,
    LauncherButton,
}

/// Result of routing one key press through the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The shortcut flipped visibility to the carried state.
    Toggled(ChatVisibility),
    /// Escape closed the open surface.
    Dismissed,
    /// The shortcut matched but the focus policy left it to the focused control.
    Suppressed,
    /// Not a key the controller handles.
    Ignored,
}

impl KeyOutcome {
    /// Whether the host should stop the event from propagating further.
    pub fn is_handled(self) -> bool {
        matches!(self, Self::Toggled(_) | Self::Dismissed)
    }
}

/// Single source of truth for chat visibility and the floating affordance.
#[derive(Debug)]
pub struct ActivationController {
    visibility: ChatVisibility,
    footer_visible: bool,
    pending_message: Option<String>,
    prompt_buffer: String,
    style: AffordanceStyle,
    shortcut: Shortcut,
    shortcut_enabled: bool,
    footer_observer: FooterObserver,
    subscriptions: Vec<Subscription>,
}

impl ActivationController {
    pub fn new(style: AffordanceStyle) -> Self {
        Self {
            visibility: ChatVisibility::Closed,
            footer_visible: false,
            pending_message: None,
            prompt_buffer: String::new(),
            style,
            shortcut: Shortcut::TOGGLE_ASSISTANT,
            shortcut_enabled: true,
            footer_observer: FooterObserver::new(),
            subscriptions: Vec::new(),
        }
    }

    pub fn with_shortcut_enabled(mut self, enabled: bool) -> Self {
        self.shortcut_enabled = enabled;
        self
    }

    pub fn visibility(&self) -> ChatVisibility {
        self.visibility
    }

    pub fn is_open(&self) -> bool {
        self.visibility == ChatVisibility::Open
    }

    pub fn style(&self) -> AffordanceStyle {
        self.style
    }

    pub fn shortcut(&self) -> Shortcut {
        self.shortcut
    }

    pub fn shortcut_enabled(&self) -> bool {
        self.shortcut_enabled
    }

    pub fn is_footer_visible(&self) -> bool {
        self.footer_visible
    }

    /// The floating affordance shows only while closed and clear of the footer.
    pub fn affordance_visible(&self) -> bool {
        !self.is_open() && !self.footer_visible
    }

    pub fn open(&mut self) -> bool {
        self.set_visibility(ChatVisibility::Open)
    }

    /// Closes the surface. An unconsumed hand-off is dropped with it.
    pub fn close(&mut self) -> bool {
        if self.pending_message.take().is_some() {
            tracing::debug!("dropping unconsumed hand-off on close");
        }
        self.set_visibility(ChatVisibility::Closed)
    }

    pub fn toggle(&mut self) -> ChatVisibility {
        let next = self.visibility.toggled();
        match next {
            ChatVisibility::Open => self.open(),
            ChatVisibility::Closed => self.close(),
        };
        next
    }

    /// Routes a key press: the shortcut toggles unless focus policy forbids
    /// it, Escape dismisses an open surface.
    pub fn handle_key(&mut self, press: &KeyPress, focus: FocusContext) -> KeyOutcome {
        if self.shortcut_enabled && self.shortcut.matches(press) {
            if !focus.allows_toggle() {
                tracing::trace!(?focus, "shortcut left to focused editable");
                return KeyOutcome::Suppressed;
            }
            return KeyOutcome::Toggled(self.toggle());
        }

        if press.is_escape() && self.is_open() {
            self.close();
            return KeyOutcome::Dismissed;
        }

        KeyOutcome::Ignored
    }

    /// Records footer intersection. Returns true when it changed.
    pub fn set_footer_visible(&mut self, visible: bool) -> bool {
        let changed = self.footer_visible != visible;
        self.footer_visible = visible;
        changed
    }

    /// Feeds page geometry through the footer observer.
    pub fn observe_footer(&mut self, viewport: Span, footer: Span) -> bool {
        match self.footer_observer.observe(viewport, footer) {
            Some(visible) => self.set_footer_visible(visible),
            None => false,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt_buffer
    }

    pub fn update_prompt(&mut self, text: impl Into<String>) {
        self.prompt_buffer = text.into();
    }

    /// Hands the floating prompt's text to the chat and opens it.
    ///
    /// Blank prompts are ignored and leave the controller untouched.
    pub fn submit_prompt(&mut self) -> bool {
        if self.prompt_buffer.trim().is_empty() {
            return false;
        }

        let message = std::mem::take(&mut self.prompt_buffer);
        self.pending_message = Some(message);
        self.open();
        true
    }

    pub fn pending_message(&self) -> Option<&str> {
        self.pending_message.as_deref()
    }

    /// Consumes the hand-off. Every later call returns `None` until a new
    /// prompt is submitted.
    pub fn take_pending_message(&mut self) -> Option<String> {
        self.pending_message.take()
    }

    /// Keeps a host listener alive for the lifetime of this mount.
    pub fn attach(&mut self, subscription: Subscription) {
        tracing::debug!(subscription = subscription.label(), "listener attached");
        self.subscriptions.push(subscription);
    }

    pub fn is_mounted(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    /// Releases every listener and forgets footer geometry.
    pub fn unmount(&mut self) {
        self.subscriptions.clear();
        self.footer_observer.reset();
        self.footer_visible = false;
    }

    fn set_visibility(&mut self, visibility: ChatVisibility) -> bool {
        if self.visibility == visibility {
            return false;
        }

        tracing::debug!(from = ?self.visibility, to = ?visibility, "chat visibility changed");
        self.visibility = visibility;
        true
    }
}

impl Default for ActivationController {
    fn default() -> Self {
        Self::new(AffordanceStyle::default())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::keyboard::{Modifiers, Platform};

    fn shortcut_press() -> KeyPress {
        KeyPress::new(
            "i",
            Modifiers {
                platform: true,
                ..Modifiers::default()
            },
        )
    }

    #[test]
    fn shortcut_toggles_between_closed_and_open() {
        let mut controller = ActivationController::default();

        assert_eq!(
            controller.handle_key(&shortcut_press(), FocusContext::Page),
            KeyOutcome::Toggled(ChatVisibility::Open)
        );
        assert!(controller.is_open());

        assert_eq!(
            controller.handle_key(&shortcut_press(), FocusContext::AssistantInput),
            KeyOutcome::Toggled(ChatVisibility::Closed)
        );
        assert!(!controller.is_open());
    }

    #[test]
    fn bound_shortcut_toggles_with_nothing_focused() {
        let mut controller = ActivationController::default();
        let press = controller.shortcut().press(Platform::current());

        assert_eq!(
            controller.handle_key(&press, FocusContext::Page),
            KeyOutcome::Toggled(ChatVisibility::Open)
        );
        assert_eq!(
            controller.handle_key(&press, FocusContext::ForeignTextInput),
            KeyOutcome::Suppressed
        );
        assert!(controller.is_open());
    }

    #[test]
    fn shortcut_is_left_to_foreign_editables() {
        let mut controller = ActivationController::default();

        let outcome = controller.handle_key(&shortcut_press(), FocusContext::ForeignTextInput);

        assert_eq!(outcome, KeyOutcome::Suppressed);
        assert!(!outcome.is_handled());
        assert!(!controller.is_open());

        controller.open();
        controller.handle_key(&shortcut_press(), FocusContext::ForeignTextInput);
        assert!(controller.is_open());
    }

    #[test]
    fn disabled_shortcut_is_ignored() {
        let mut controller = ActivationController::default().with_shortcut_enabled(false);

        assert_eq!(
            controller.handle_key(&shortcut_press(), FocusContext::Page),
            KeyOutcome::Ignored
        );
        assert!(!controller.is_open());
    }

    #[test]
    fn escape_closes_only_when_open() {
        let mut controller = ActivationController::default();
        let escape = KeyPress::plain("escape");

        assert_eq!(
            controller.handle_key(&escape, FocusContext::Page),
            KeyOutcome::Ignored
        );

        controller.open();
        assert_eq!(
            controller.handle_key(&escape, FocusContext::AssistantInput),
            KeyOutcome::Dismissed
        );
        assert!(!controller.is_open());
    }

    #[test]
    fn affordance_visible_iff_closed_and_footer_hidden() {
        let mut controller = ActivationController::default();
        assert!(controller.affordance_visible());

        controller.open();
        assert!(!controller.affordance_visible());

        controller.close();
        assert!(controller.set_footer_visible(true));
        assert!(!controller.affordance_visible());

        controller.open();
        assert!(!controller.affordance_visible());

        controller.close();
        assert!(controller.set_footer_visible(false));
        assert!(!controller.set_footer_visible(false));
        assert!(controller.affordance_visible());
    }

    #[test]
    fn footer_geometry_drives_affordance_visibility() {
        let mut controller = ActivationController::default();
        let viewport = Span::from_origin(0.0, 800.0);

        assert!(!controller.observe_footer(viewport, Span::from_origin(2000.0, 120.0)));
        assert!(controller.affordance_visible());

        assert!(controller.observe_footer(viewport, Span::from_origin(700.0, 120.0)));
        assert!(controller.is_footer_visible());
        assert!(!controller.affordance_visible());
    }

    #[test]
    fn footer_on_screen_at_mount_hides_the_affordance_without_scrolling() {
        let mut controller = ActivationController::default();
        let tall_window = Span::from_origin(0.0, 1400.0);
        let footer = Span::from_origin(1100.0, 160.0);

        assert!(controller.observe_footer(tall_window, footer));
        assert!(!controller.affordance_visible());

        assert!(!controller.observe_footer(tall_window, footer));
        assert!(controller.observe_footer(Span::from_origin(0.0, 600.0), footer));
        assert!(controller.affordance_visible());
    }

    #[test]
    fn prompt_submission_hands_off_once_and_opens() {
        let mut controller = ActivationController::default();
        controller.update_prompt("How do I authenticate?");

        assert!(controller.submit_prompt());
        assert!(controller.is_open());
        assert_eq!(controller.prompt(), "");
        assert_eq!(controller.pending_message(), Some("How do I authenticate?"));

        assert_eq!(
            controller.take_pending_message().as_deref(),
            Some("How do I authenticate?")
        );
        assert_eq!(controller.take_pending_message(), None);

        controller.close();
        controller.open();
        assert_eq!(controller.take_pending_message(), None);
    }

    #[test]
    fn blank_prompt_submission_is_ignored() {
        let mut controller = ActivationController::default();
        controller.update_prompt("   ");

        assert!(!controller.submit_prompt());
        assert!(!controller.is_open());
        assert_eq!(controller.prompt(), "   ");
        assert_eq!(controller.pending_message(), None);
    }

    #[test]
    fn closing_drops_an_unconsumed_hand_off() {
        let mut controller = ActivationController::default();
        controller.update_prompt("question");
        controller.submit_prompt();

        controller.close();

        assert_eq!(controller.pending_message(), None);
    }

    #[test]
    fn unmount_releases_every_listener() {
        let released = Arc::new(AtomicUsize::new(0));
        let mut controller = ActivationController::default();

        for label in ["keyboard", "footer"] {
            let counter = released.clone();
            controller.attach(Subscription::new(label, move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }));
        }
        controller.set_footer_visible(true);
        assert!(controller.is_mounted());

        controller.unmount();

        assert_eq!(released.load(Ordering::SeqCst), 2);
        assert!(!controller.is_mounted());
        assert!(!controller.is_footer_visible());
    }
}
