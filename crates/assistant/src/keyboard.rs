/// Host platform, used only to label the shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    MacOs,
    Windows,
    Linux,
    Other,
}

impl Platform {
    pub const fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "linux") {
            Self::Linux
        } else {
            Self::Other
        }
    }

    /// Glyph or label of the primary command modifier.
    pub fn command_label(self) -> &'static str {
        match self {
            Self::MacOs => "⌘",
            Self::Windows | Self::Linux | Self::Other => "Ctrl",
        }
    }
}

/// Modifier state of one key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub control: bool,
    pub alt: bool,
    pub shift: bool,
    /// Command on macOS, the Windows/Super key elsewhere.
    pub platform: bool,
}

/// Toolkit-independent description of a key-down event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPress {
    pub key: String,
    pub modifiers: Modifiers,
}

impl KeyPress {
    pub fn new(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
        }
    }

    pub fn plain(key: impl Into<String>) -> Self {
        Self::new(key, Modifiers::default())
    }

    pub fn is_escape(&self) -> bool {
        self.key.eq_ignore_ascii_case("escape")
    }
}

/// Where keyboard focus sits when a key press arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusContext {
    /// Nothing editable is focused.
    Page,
    /// One of the widget's own inputs (floating prompt or composer).
    AssistantInput,
    /// A host-page editable control that may bind the same chord itself.
    ForeignTextInput,
}

impl FocusContext {
    /// The toggle shortcut is left to host editables; the widget's own inputs
    /// never bind the chord, so it keeps working while typing a question.
    pub fn allows_toggle(self) -> bool {
        match self {
            Self::Page | Self::AssistantInput => true,
            Self::ForeignTextInput => false,
        }
    }
}

/// The global "toggle assistant" chord: command modifier plus a letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shortcut {
    key: char,
}

impl Shortcut {
    pub const TOGGLE_ASSISTANT: Self = Self { key: 'i' };

    pub fn key(self) -> char {
        self.key
    }

    /// Accepts the letter with either command or control held, as browsers
    /// report the chord through either flag depending on platform.
    pub fn matches(self, press: &KeyPress) -> bool {
        let mut chars = press.key.chars();
        let is_letter = matches!(
            (chars.next(), chars.next()),
            (Some(key), None) if key.eq_ignore_ascii_case(&self.key)
        );
        let modifiers = press.modifiers;

        is_letter && (modifiers.platform || modifiers.control) && !modifiers.alt
    }

    /// The chord as the platform's primary modifier produces it. Hosts that
    /// receive the shortcut as a bound action rather than a raw key event use
    /// this to route it like any other key press.
    pub fn press(self, platform: Platform) -> KeyPress {
        let modifiers = match platform {
            Platform::MacOs => Modifiers {
                platform: true,
                ..Modifiers::default()
            },
            Platform::Windows | Platform::Linux | Platform::Other => Modifiers {
                control: true,
                ..Modifiers::default()
            },
        };
        KeyPress::new(self.key.to_string(), modifiers)
    }

    /// Presentation label, e.g. `⌘I` on macOS and `Ctrl I` elsewhere.
    pub fn label(self, platform: Platform) -> String {
        let key = self.key.to_ascii_uppercase();
        match platform {
            Platform::MacOs => format!("{}{key}", platform.command_label()),
            Platform::Windows | Platform::Linux | Platform::Other => {
                format!("{} {key}", platform.command_label())
            }
        }
    }
}

impl Default for Shortcut {
    fn default() -> Self {
        Self::TOGGLE_ASSISTANT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chord(key: &str, modifiers: Modifiers) -> KeyPress {
        KeyPress::new(key, modifiers)
    }

    #[test]
    fn chord_matches_with_command_or_control() {
        let shortcut = Shortcut::TOGGLE_ASSISTANT;
        let command = Modifiers {
            platform: true,
            ..Modifiers::default()
        };
        let control = Modifiers {
            control: true,
            ..Modifiers::default()
        };

        assert!(shortcut.matches(&chord("i", command)));
        assert!(shortcut.matches(&chord("I", control)));
        assert!(shortcut.matches(&chord(
            "i",
            Modifiers {
                shift: true,
                ..control
            }
        )));
    }

    #[test]
    fn chord_rejects_other_keys_and_bare_letters() {
        let shortcut = Shortcut::TOGGLE_ASSISTANT;
        let control = Modifiers {
            control: true,
            ..Modifiers::default()
        };

        assert!(!shortcut.matches(&KeyPress::plain("i")));
        assert!(!shortcut.matches(&chord("k", control)));
        assert!(!shortcut.matches(&chord("insert", control)));
        assert!(!shortcut.matches(&chord(
            "i",
            Modifiers {
                alt: true,
                ..control
            }
        )));
    }

    #[test]
    fn labels_follow_platform_convention() {
        let shortcut = Shortcut::TOGGLE_ASSISTANT;

        assert_eq!(shortcut.label(Platform::MacOs), "⌘I");
        assert_eq!(shortcut.label(Platform::Windows), "Ctrl I");
        assert_eq!(shortcut.label(Platform::Linux), "Ctrl I");
    }

    #[test]
    fn bound_chord_routes_like_a_typed_one() {
        let shortcut = Shortcut::TOGGLE_ASSISTANT;

        for platform in [
            Platform::MacOs,
            Platform::Windows,
            Platform::Linux,
            Platform::Other,
        ] {
            assert!(shortcut.matches(&shortcut.press(platform)), "{platform:?}");
        }
        assert!(shortcut.press(Platform::MacOs).modifiers.platform);
        assert!(shortcut.press(Platform::Linux).modifiers.control);
    }

    #[test]
    fn only_foreign_editables_suppress_the_toggle() {
        assert!(FocusContext::Page.allows_toggle());
        assert!(FocusContext::AssistantInput.allows_toggle());
        assert!(!FocusContext::ForeignTextInput.allows_toggle());
    }
}
