//! IME context for host communication.
//!
//! The `ImeContext` struct is a plain data container the host reads after each
//! key event: preedit, candidate page, committed text. The host writes its
//! capabilities and the input purpose into it.
//!
//! Design philosophy: Zero abstraction - just data transfer. No callbacks, no
//! traits, no generics. Host code reads/writes fields directly.

use crate::candidate::LayoutHint;

/// Input purpose hint for context-aware input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputPurpose {
    /// Free-form text input (default)
    #[default]
    FreeForm,
    /// Password (never learn from it)
    Password,
    /// PIN entry (never learn from it)
    Pin,
}

impl InputPurpose {
    /// Fields whose contents must not reach the dictionary or the logs.
    pub fn is_sensitive(&self) -> bool {
        matches!(self, InputPurpose::Password | InputPurpose::Pin)
    }
}

/// Where the preedit is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PreeditTarget {
    /// Inside the input panel
    #[default]
    Panel,
    /// Inline in the client application
    Client,
}

/// IME context for host communication.
///
/// # Fields
///
/// - `preedit_text`: Text being composed (displayed with highlight)
/// - `preedit_cursor`: Cursor position within preedit (byte offset)
/// - `preedit_target`: Whether the panel or the client renders the preedit
/// - `commit_text`: Text to commit to application (consume and clear)
/// - `candidates`: Candidate strings on the current page
/// - `candidate_cursor`: Highlighted candidate on the page, if any
/// - `auxiliary_text`: Page indicator (e.g., "2/3")
/// - `input_purpose`: Hint about what kind of input is expected
#[derive(Debug, Clone, Default)]
pub struct ImeContext {
    /// Text being composed
    pub preedit_text: String,

    /// Cursor position within preedit text (byte offset)
    pub preedit_cursor: usize,

    pub preedit_target: PreeditTarget,

    /// Text to commit to the application
    pub commit_text: String,

    /// Number of commit_string calls since the host last took the commit
    pub commit_count: usize,

    /// Candidate strings on the current page
    pub candidates: Vec<String>,

    /// Highlighted candidate index within the page
    pub candidate_cursor: Option<usize>,

    /// Auxiliary text for UI hints (page numbers)
    pub auxiliary_text: String,

    pub layout: LayoutHint,

    /// Input purpose hint for context-aware behavior
    pub input_purpose: InputPurpose,

    /// Host capability: the client renders preedit inline
    pub client_preedit: bool,

    /// Number of UI refresh signals sent to the host
    pub ui_updates: u64,
}

impl ImeContext {
    /// Create a new empty IME context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all visible state (preedit, candidates, auxiliary).
    /// Does NOT clear commit_text (host should consume it first).
    pub fn clear(&mut self) {
        self.preedit_text.clear();
        self.preedit_cursor = 0;
        self.candidates.clear();
        self.candidate_cursor = None;
        self.auxiliary_text.clear();
    }

    /// Send text to the application.
    pub fn commit_string(&mut self, text: &str) {
        self.commit_text.push_str(text);
        self.commit_count += 1;
    }

    /// Show preedit text, routed to the client or the panel depending on the
    /// host's capabilities.
    pub fn set_preedit(&mut self, text: String, cursor: usize) {
        self.preedit_target = if self.client_preedit {
            PreeditTarget::Client
        } else {
            PreeditTarget::Panel
        };
        self.preedit_cursor = cursor.min(text.len());
        self.preedit_text = text;
    }

    /// Signal the host to redraw.
    pub fn update_ui(&mut self) {
        self.ui_updates += 1;
    }

    /// Take the commit text, leaving it empty.
    pub fn take_commit(&mut self) -> String {
        self.commit_count = 0;
        std::mem::take(&mut self.commit_text)
    }

    /// Check if there's any visible state (preedit or candidates).
    pub fn has_visible_state(&self) -> bool {
        !self.preedit_text.is_empty() || !self.candidates.is_empty()
    }

    /// Check if there's text to commit.
    pub fn has_commit(&self) -> bool {
        !self.commit_text.is_empty()
    }

    /// Set the input purpose.
    pub fn set_input_purpose(&mut self, purpose: InputPurpose) {
        self.input_purpose = purpose;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_and_take() {
        let mut ctx = ImeContext::new();
        assert!(!ctx.has_commit());
        ctx.commit_string("നമസ്കാരം ");
        assert!(ctx.has_commit());
        assert_eq!(ctx.commit_count, 1);
        assert_eq!(ctx.take_commit(), "നമസ്കാരം ");
        assert_eq!(ctx.commit_count, 0);
        assert!(!ctx.has_commit());
    }

    #[test]
    fn test_preedit_target_follows_capability() {
        let mut ctx = ImeContext::new();
        ctx.set_preedit("ab".into(), 5);
        assert_eq!(ctx.preedit_target, PreeditTarget::Panel);
        assert_eq!(ctx.preedit_cursor, 2);

        ctx.client_preedit = true;
        ctx.set_preedit("abc".into(), 1);
        assert_eq!(ctx.preedit_target, PreeditTarget::Client);
        assert_eq!(ctx.preedit_cursor, 1);
    }

    #[test]
    fn test_clear_keeps_commit() {
        let mut ctx = ImeContext::new();
        ctx.commit_string("x");
        ctx.set_preedit("y".into(), 1);
        ctx.candidates.push("z".into());
        ctx.clear();
        assert!(!ctx.has_visible_state());
        assert_eq!(ctx.commit_text, "x");
    }

    #[test]
    fn test_sensitive_purposes() {
        assert!(InputPurpose::Password.is_sensitive());
        assert!(InputPurpose::Pin.is_sensitive());
        assert!(!InputPurpose::FreeForm.is_sensitive());
    }
}
