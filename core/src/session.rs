//! Per-input-context session state.
//!
//! A `Session` holds the raw buffer, the last oracle result, the displayed
//! candidate list and the selection state. Preedit text is never stored; it
//! is derived from the buffer and candidates every time the UI is redrawn.

use crate::candidate::{Candidate, CandidateList, CursorMovable, Pageable};
use crate::context::ImeContext;
use crate::input_buffer::InputBuffer;
use crate::selection::SelectionState;
use crate::translit::TransliterationClient;
use crate::{Config, PreeditMode};

/// Session state for one input context.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Raw keystrokes since the last commit (e.g. "namaskaram")
    buffer: InputBuffer,

    /// Most recent oracle result, best first
    candidates: Vec<Candidate>,

    /// Displayed list built from `candidates`
    list: CandidateList,

    selection: SelectionState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &InputBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut InputBuffer {
        &mut self.buffer
    }

    /// Most recent oracle result.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn candidate_list(&self) -> &CandidateList {
        &self.list
    }

    pub fn candidate_list_mut(&mut self) -> &mut CandidateList {
        &mut self.list
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionState {
        &mut self.selection
    }

    /// Composing means the buffer holds input; otherwise the session is idle.
    pub fn is_composing(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Replace the oracle result and rebuild the displayed list. Any pinned
    /// selection refers to the old list and is dropped.
    pub fn set_candidates(&mut self, candidates: Vec<Candidate>, config: &Config) {
        self.list = CandidateList::build(
            &candidates,
            &self.buffer.to_string(),
            config.raw_input_candidate,
            config.page_size,
            config.candidate_layout,
        );
        self.candidates = candidates;
        self.selection.invalidate();
    }

    /// Re-run transliteration for the current buffer.
    ///
    /// On oracle failure the previous candidates stay in place. An empty
    /// buffer clears the candidates without consulting the oracle.
    pub fn refresh(&mut self, client: &TransliterationClient, config: &Config, redact: bool) {
        if self.buffer.is_empty() {
            self.set_candidates(Vec::new(), config);
            return;
        }
        let input = self.buffer.to_string();
        match client.transliterate(&input) {
            Ok(candidates) => {
                if !redact {
                    tracing::trace!(input = %input, count = candidates.len(), "transliterated");
                }
                self.set_candidates(candidates, config);
            }
            Err(e) => {
                if redact {
                    tracing::warn!(error = %e, "transliteration failed, keeping previous candidates");
                } else {
                    tracing::warn!(error = %e, input = %input, "transliteration failed, keeping previous candidates");
                }
            }
        }
    }

    /// Pin a displayed candidate. Out-of-range indices are ignored.
    pub fn select_candidate(&mut self, index: usize) -> bool {
        self.selection.select(index, self.list.len())
    }

    /// Whether a candidate is explicitly chosen: pinned, or the list cursor
    /// moved off the first entry.
    pub fn has_explicit_selection(&self) -> bool {
        self.selection.pinned().is_some()
            || self.list.global_cursor_index().is_some_and(|c| c > 0)
    }

    /// Index of the candidate a commit would use: the pin, then the list
    /// cursor.
    pub fn current_index(&self) -> Option<usize> {
        if self.list.is_empty() {
            return None;
        }
        self.selection
            .pinned()
            .or_else(|| self.list.global_cursor_index())
    }

    pub fn current_candidate(&self) -> Option<&Candidate> {
        self.current_index().and_then(|i| self.list.candidate(i))
    }

    /// A candidate set is live when the host has a list with more than one
    /// entry and the last transliteration produced something.
    pub fn has_live_candidates(&self) -> bool {
        !self.candidates.is_empty() && self.list.len() > 1
    }

    /// Text shown as preedit.
    ///
    /// In `Raw` mode this is the buffer itself. In `Transliterated` mode it is
    /// the current candidate, falling back to the top result and then to the
    /// buffer.
    pub fn preedit_text(&self, mode: PreeditMode) -> String {
        if mode == PreeditMode::Transliterated {
            let text = self
                .current_candidate()
                .or_else(|| self.candidates.first())
                .map(|c| c.text.as_str())
                .filter(|t| !t.is_empty());
            if let Some(text) = text {
                return text.to_string();
            }
        }
        self.buffer.to_string()
    }

    /// Byte offset of the cursor inside `preedit`.
    ///
    /// In `Raw` mode the preedit is the buffer and the offsets coincide. A
    /// transliterated preedit has no byte correspondence with the buffer, so
    /// the cursor is placed after as many characters as it sits after bytes in
    /// the buffer, ending up at the end when the buffer cursor is.
    pub fn preedit_cursor(&self, mode: PreeditMode, preedit: &str) -> usize {
        let cursor = self.buffer.cursor();
        if cursor >= self.buffer.len() {
            return preedit.len();
        }
        if mode == PreeditMode::Raw {
            return cursor.min(preedit.len());
        }
        preedit
            .char_indices()
            .nth(cursor)
            .map(|(i, _)| i)
            .unwrap_or(preedit.len())
    }

    /// Recompute whether the buffer ends, at the cursor, in a digit typed as
    /// text. Called after every buffer edit or cursor move.
    pub fn update_digit_flag(&mut self) {
        let digit = self
            .buffer
            .byte_before_cursor()
            .is_some_and(|b| b.is_ascii_digit());
        self.selection.set_last_key_was_digit(digit);
    }

    /// Redraw preedit only (cursor moves).
    pub fn sync_preedit(&self, ctx: &mut ImeContext, mode: PreeditMode) {
        let text = self.preedit_text(mode);
        let cursor = self.preedit_cursor(mode, &text);
        ctx.set_preedit(text, cursor);
        ctx.update_ui();
    }

    /// Redraw everything: preedit, candidate page and page indicator.
    pub fn sync_to_context(&self, ctx: &mut ImeContext, mode: PreeditMode) {
        ctx.clear();
        if !self.is_composing() {
            ctx.update_ui();
            return;
        }

        let text = self.preedit_text(mode);
        let cursor = self.preedit_cursor(mode, &text);
        ctx.set_preedit(text, cursor);

        ctx.candidates = self
            .list
            .current_page_candidates()
            .iter()
            .map(|c| c.text.clone())
            .collect();
        ctx.candidate_cursor = self.list.cursor_index();
        ctx.layout = self.list.layout();
        if self.list.total_pages() > 1 {
            ctx.auxiliary_text = format!(
                "{}/{}",
                self.list.current_page() + 1,
                self.list.total_pages()
            );
        }
        ctx.update_ui();
    }

    /// Clear all session state. Idempotent.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.candidates.clear();
        self.list.clear();
        self.selection.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::RawInputPlacement;

    fn typed(s: &str) -> Session {
        let mut session = Session::new();
        for b in s.bytes() {
            session.buffer_mut().insert(b);
        }
        session
    }

    fn words() -> Vec<Candidate> {
        vec![Candidate::new("നമസ്കാരം", 10), Candidate::new("നമസ്കാരൻ", 5)]
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = Session::new();
        assert!(!session.is_composing());
        assert!(session.candidates().is_empty());
        assert_eq!(session.current_index(), None);
        assert!(!session.has_live_candidates());
    }

    #[test]
    fn test_set_candidates_invalidates_pin() {
        let config = Config::default();
        let mut session = typed("namaskaram");
        session.set_candidates(words(), &config);
        assert!(session.select_candidate(1));
        assert_eq!(session.current_index(), Some(1));

        session.set_candidates(words(), &config);
        assert_eq!(session.selection().pinned(), None);
        assert_eq!(session.current_index(), Some(0));
    }

    #[test]
    fn test_select_out_of_range_is_noop() {
        let config = Config::default();
        let mut session = typed("namaskaram");
        session.set_candidates(words(), &config);
        assert!(session.select_candidate(0));
        // words + raw entry = 3 displayed
        assert!(!session.select_candidate(3));
        assert_eq!(session.selection().pinned(), Some(0));
    }

    #[test]
    fn test_live_candidates_need_more_than_one_entry() {
        let mut config = Config::default();
        config.raw_input_candidate = RawInputPlacement::Omit;
        let mut session = typed("a");
        session.set_candidates(vec![Candidate::new("അ", 1)], &config);
        assert!(!session.has_live_candidates());

        config.raw_input_candidate = RawInputPlacement::Last;
        session.set_candidates(vec![Candidate::new("അ", 1)], &config);
        assert!(session.has_live_candidates());
    }

    #[test]
    fn test_preedit_modes() {
        let config = Config::default();
        let mut session = typed("namaskaram");
        assert_eq!(session.preedit_text(PreeditMode::Transliterated), "namaskaram");

        session.set_candidates(words(), &config);
        assert_eq!(session.preedit_text(PreeditMode::Transliterated), "നമസ്കാരം");
        assert_eq!(session.preedit_text(PreeditMode::Raw), "namaskaram");

        session.candidate_list_mut().next_candidate();
        assert_eq!(session.preedit_text(PreeditMode::Transliterated), "നമസ്കാരൻ");
    }

    #[test]
    fn test_preedit_cursor_mapping() {
        let session = typed("abc");
        assert_eq!(session.preedit_cursor(PreeditMode::Raw, "abc"), 3);

        let mut session = typed("abc");
        session.buffer_mut().move_cursor(-2);
        assert_eq!(session.preedit_cursor(PreeditMode::Raw, "abc"), 1);
        // "അബ" is two 3-byte characters; one character in
        assert_eq!(session.preedit_cursor(PreeditMode::Transliterated, "അബ"), 3);

        session.buffer_mut().move_to_end();
        assert_eq!(session.preedit_cursor(PreeditMode::Transliterated, "അബ"), 6);
    }

    #[test]
    fn test_digit_flag_tracks_cursor() {
        let mut session = typed("a1");
        session.update_digit_flag();
        assert!(session.selection().last_key_was_digit());
        session.buffer_mut().move_cursor(-1);
        session.update_digit_flag();
        assert!(!session.selection().last_key_was_digit());
    }

    #[test]
    fn test_sync_to_context_with_paging() {
        let mut config = Config::default();
        config.page_size = 3;
        config.raw_input_candidate = RawInputPlacement::Omit;
        let mut session = typed("ka");
        let many: Vec<_> = (0..7).map(|i| Candidate::new(format!("k{}", i), 7 - i)).collect();
        session.set_candidates(many, &config);

        let mut ctx = ImeContext::new();
        session.sync_to_context(&mut ctx, PreeditMode::Transliterated);
        assert_eq!(ctx.preedit_text, "k0");
        assert_eq!(ctx.candidates, ["k0", "k1", "k2"]);
        assert_eq!(ctx.candidate_cursor, Some(0));
        assert_eq!(ctx.auxiliary_text, "1/3");

        session.candidate_list_mut().next();
        session.sync_to_context(&mut ctx, PreeditMode::Transliterated);
        assert_eq!(ctx.candidates, ["k3", "k4", "k5"]);
        assert_eq!(ctx.auxiliary_text, "2/3");
        assert_eq!(ctx.preedit_text, "k3");
    }

    #[test]
    fn test_reset_is_idempotent() {
        let config = Config::default();
        let mut session = typed("a1");
        session.set_candidates(words(), &config);
        session.select_candidate(1);
        session.update_digit_flag();

        session.reset();
        let once = format!("{:?}", session);
        session.reset();
        assert_eq!(format!("{:?}", session), once);

        assert!(session.buffer().is_empty());
        assert!(!session.buffer().is_cursor_set());
        assert!(session.candidates().is_empty());
        assert_eq!(session.selection().pinned(), None);
        assert!(!session.selection().last_key_was_digit());
    }
}
