//! Key events, configurable key bindings and word-break classification.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Symbolic key delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A key that produces a character (letters, digits, punctuation)
    Char(char),
    Space,
    Tab,
    Return,
    Escape,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    Shift,
    Control,
    Alt,
    Super,
    CapsLock,
    /// Any other key, carried as the host's raw symbol value
    Other(u32),
}

impl Key {
    /// Keys that only change modifier state.
    pub fn is_modifier(&self) -> bool {
        matches!(
            self,
            Key::Shift | Key::Control | Key::Alt | Key::Super | Key::CapsLock
        )
    }

    /// The byte this key contributes to the raw buffer, if it is printable
    /// 7-bit ASCII. Everything else is non-literal.
    pub fn literal_byte(&self) -> Option<u8> {
        match self {
            Key::Char(ch) if ch.is_ascii_graphic() => Some(*ch as u8),
            _ => None,
        }
    }

    /// Digit value for number-row keys.
    pub fn digit(&self) -> Option<u8> {
        match self {
            Key::Char(ch) if ch.is_ascii_digit() => Some(*ch as u8 - b'0'),
            _ => None,
        }
    }

    fn name(&self) -> String {
        match self {
            Key::Char(ch) => ch.to_string(),
            Key::Space => "Space".into(),
            Key::Tab => "Tab".into(),
            Key::Return => "Return".into(),
            Key::Escape => "Escape".into(),
            Key::Backspace => "BackSpace".into(),
            Key::Delete => "Delete".into(),
            Key::Left => "Left".into(),
            Key::Right => "Right".into(),
            Key::Up => "Up".into(),
            Key::Down => "Down".into(),
            Key::Home => "Home".into(),
            Key::End => "End".into(),
            Key::PageUp => "Page_Up".into(),
            Key::PageDown => "Page_Down".into(),
            Key::Shift => "Shift".into(),
            Key::Control => "Control".into(),
            Key::Alt => "Alt".into(),
            Key::Super => "Super".into(),
            Key::CapsLock => "Caps_Lock".into(),
            Key::Other(sym) => format!("0x{:x}", sym),
        }
    }

    fn from_name(name: &str) -> Option<Key> {
        let key = match name {
            "Space" | "space" => Key::Space,
            "Tab" => Key::Tab,
            "Return" | "Enter" => Key::Return,
            "Escape" | "Esc" => Key::Escape,
            "BackSpace" | "Backspace" => Key::Backspace,
            "Delete" => Key::Delete,
            "Left" => Key::Left,
            "Right" => Key::Right,
            "Up" => Key::Up,
            "Down" => Key::Down,
            "Home" => Key::Home,
            "End" => Key::End,
            "Page_Up" | "PageUp" | "Prior" => Key::PageUp,
            "Page_Down" | "PageDown" | "Next" => Key::PageDown,
            "Shift" | "Shift_L" | "Shift_R" => Key::Shift,
            "Control" | "Control_L" | "Control_R" => Key::Control,
            "Alt" | "Alt_L" | "Alt_R" => Key::Alt,
            "Super" | "Super_L" | "Super_R" => Key::Super,
            "Caps_Lock" | "CapsLock" => Key::CapsLock,
            _ => {
                if let Some(hex) = name.strip_prefix("0x") {
                    return u32::from_str_radix(hex, 16).ok().map(Key::Other);
                }
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => Key::Char(ch),
                    _ => return None,
                }
            }
        };
        Some(key)
    }
}

/// Modifier state at the time of a key press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub super_key: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        alt: false,
        shift: false,
        super_key: false,
    };

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    pub fn alt() -> Self {
        Self {
            alt: true,
            ..Self::NONE
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.ctrl || self.alt || self.shift || self.super_key)
    }
}

/// A key press or release as delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
    /// Release events are ignored by the engine
    pub release: bool,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
            release: false,
        }
    }

    pub fn with_modifiers(key: Key, modifiers: Modifiers) -> Self {
        Self {
            key,
            modifiers,
            release: false,
        }
    }

    pub fn char(ch: char) -> Self {
        Self::new(Key::Char(ch))
    }

    pub fn released(mut self) -> Self {
        self.release = true;
        self
    }
}

impl From<Key> for KeyEvent {
    fn from(key: Key) -> Self {
        KeyEvent::new(key)
    }
}

/// A configurable key binding such as `Alt+Down` or `Shift`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyBinding {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyBinding {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// Check whether an event triggers this binding.
    ///
    /// Modifier-only bindings match on the key alone. Otherwise ctrl, alt and
    /// super must agree exactly; shift is only checked when the binding names it.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        if self.key.is_modifier() {
            return event.key == self.key;
        }
        if event.key != self.key {
            return false;
        }
        let (b, e) = (self.modifiers, event.modifiers);
        b.ctrl == e.ctrl
            && b.alt == e.alt
            && b.super_key == e.super_key
            && (!b.shift || e.shift)
    }

    /// Check a list of bindings.
    pub fn any_matches(bindings: &[KeyBinding], event: &KeyEvent) -> bool {
        bindings.iter().any(|b| b.matches(event))
    }
}

impl fmt::Display for KeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.ctrl {
            f.write_str("Control+")?;
        }
        if self.modifiers.alt {
            f.write_str("Alt+")?;
        }
        if self.modifiers.shift {
            f.write_str("Shift+")?;
        }
        if self.modifiers.super_key {
            f.write_str("Super+")?;
        }
        f.write_str(&self.key.name())
    }
}

impl FromStr for KeyBinding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("empty key binding".to_string());
        }
        // "Alt++" binds the plus key itself
        let (prefix, key_name) = match s.strip_suffix("++") {
            Some(prefix) => (prefix, "+"),
            None => match s.rsplit_once('+') {
                Some((prefix, name)) => (prefix, name),
                None => ("", s),
            },
        };

        let mut modifiers = Modifiers::NONE;
        for part in prefix.split('+').filter(|p| !p.is_empty()) {
            match part {
                "Control" | "Ctrl" => modifiers.ctrl = true,
                "Alt" => modifiers.alt = true,
                "Shift" => modifiers.shift = true,
                "Super" => modifiers.super_key = true,
                other => return Err(format!("unknown modifier {:?} in {:?}", other, s)),
            }
        }

        let key = Key::from_name(key_name)
            .ok_or_else(|| format!("unknown key {:?} in {:?}", key_name, s))?;
        Ok(KeyBinding { key, modifiers })
    }
}

impl TryFrom<String> for KeyBinding {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<KeyBinding> for String {
    fn from(binding: KeyBinding) -> Self {
        binding.to_string()
    }
}

/// Characters that terminate the current composition.
///
/// `;`, `'` and `"` are scheme input in inscript layouts and only break
/// words outside inscript mode.
pub fn is_word_break_char(ch: char, inscript: bool) -> bool {
    match ch {
        ' ' | ',' | '.' | '?' | '!' | '(' | ')' => true,
        ';' | '\'' | '"' => !inscript,
        _ => false,
    }
}

/// Whether a key acts as a word break (space, tab, return or punctuation).
pub fn is_word_break(key: &Key, inscript: bool) -> bool {
    match key {
        Key::Space | Key::Tab | Key::Return => true,
        Key::Char(ch) => is_word_break_char(*ch, inscript),
        _ => false,
    }
}

/// Punctuation word breaks, i.e. breaks that have a script rendering of
/// their own. Whitespace breaks are excluded.
pub fn is_punctuation_break(key: &Key, inscript: bool) -> bool {
    matches!(key, Key::Char(ch) if *ch != ' ' && is_word_break_char(*ch, inscript))
}

/// The literal text a word-break key appends to a commit.
pub fn word_break_text(key: &Key) -> &'static str {
    match key {
        Key::Space | Key::Char(' ') => " ",
        Key::Tab => "\t",
        Key::Return => "\n",
        Key::Char(',') => ",",
        Key::Char('.') => ".",
        Key::Char('?') => "?",
        Key::Char('!') => "!",
        Key::Char('(') => "(",
        Key::Char(')') => ")",
        Key::Char(';') => ";",
        Key::Char('\'') => "'",
        Key::Char('"') => "\"",
        _ => "",
    }
}
