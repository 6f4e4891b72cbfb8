//! Key event routing for one session.
//!
//! The session is Idle while the buffer is empty and Composing otherwise.
//! Rules are checked top to bottom; the first match wins:
//!
//! 1. configured modifier-only keys are ignored
//! 2. a digit while composing with candidates shown, not following a digit
//!    typed as text, selects from the current page and commits
//! 3. Ctrl+Delete while composing unlearns the current candidate
//! 4. any other Ctrl chord is ignored
//! 5. navigation bindings move the candidate cursor or page
//! 6. Escape, Space, Tab and Return commit
//! 7. Left/Right move the buffer cursor (preedit redraw only)
//! 8. Home/End jump the buffer cursor
//! 9. Backspace/Delete edit the buffer
//! 10. keys without a printable ASCII value are ignored
//! 11. punctuation word-breaks commit instead of being buffered
//! 12. everything else is inserted at the cursor
//!
//! A space delivered as a character is treated as the Space key. In inscript
//! layouts `;`, `'` and `"` are input rather than word breaks.
//!
//! Keys a rule accepts return `KeyResult::Handled`. Everything else returns
//! `KeyResult::NotHandled` so the host applies its default behavior, which
//! is what happens to every editing or commit key while Idle.

use crate::candidate::{CursorMovable, Pageable};
use crate::commit::CommitDecider;
use crate::context::ImeContext;
use crate::key::{is_punctuation_break, is_word_break, Key, KeyBinding, KeyEvent};
use crate::learn::{LearnQueue, LearnRequest};
use crate::selection::DigitSelection;
use crate::session::Session;
use crate::translit::TransliterationClient;
use crate::Config;

/// Result of processing a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResult {
    /// Key was consumed by the input method
    Handled,
    /// Key was not handled (pass through to application)
    NotHandled,
}

/// Routes key events into session edits, commits and learn requests.
///
/// Borrowed from the engine for the duration of one event.
pub struct KeyEventDispatcher<'a> {
    config: &'a Config,
    client: &'a TransliterationClient,
    learn: &'a LearnQueue,
    inscript: bool,
}

impl<'a> KeyEventDispatcher<'a> {
    pub fn new(config: &'a Config, client: &'a TransliterationClient, learn: &'a LearnQueue) -> Self {
        Self {
            config,
            client,
            learn,
            inscript: false,
        }
    }

    /// Route keys for an inscript layout.
    pub fn inscript(mut self, inscript: bool) -> Self {
        self.inscript = inscript;
        self
    }

    /// Process one key press.
    pub fn dispatch(&self, session: &mut Session, ctx: &mut ImeContext, event: &KeyEvent) -> KeyResult {
        if event.release {
            return KeyResult::NotHandled;
        }
        let key = match event.key {
            Key::Char(' ') => Key::Space,
            key => key,
        };
        let composing = session.is_composing();
        let mods = event.modifiers;
        let redact = ctx.input_purpose.is_sensitive();

        if redact {
            tracing::trace!(composing, "key event");
        } else {
            tracing::trace!(?key, ?mods, composing, "key event");
        }

        // 1. Modifier-only keys
        if KeyBinding::any_matches(&self.config.filtered_keys, event) || key.is_modifier() {
            return KeyResult::NotHandled;
        }

        // 2. Digit fast-select
        if let Some(digit) = key.digit() {
            if !mods.ctrl
                && !mods.alt
                && !mods.super_key
                && !session.candidate_list().is_empty()
                && session.selection().digit_is_shortcut(composing)
            {
                self.select_by_digit(session, digit);
                self.commit(session, ctx, Some(&key));
                return KeyResult::Handled;
            }
        }

        // 3./4. Ctrl chords
        if mods.ctrl {
            if composing && key == Key::Delete {
                return self.unlearn_current(session, ctx);
            }
            return KeyResult::NotHandled;
        }

        // 5. Navigation
        if self.config.is_navigation(event) {
            if !composing {
                return KeyResult::NotHandled;
            }
            self.navigate(session, event);
            session.sync_to_context(ctx, self.config.preedit_mode);
            return KeyResult::Handled;
        }

        if mods.alt || mods.super_key {
            return KeyResult::NotHandled;
        }

        match key {
            // 6. Commit keys
            Key::Escape | Key::Space | Key::Tab | Key::Return => {
                if !composing {
                    return KeyResult::NotHandled;
                }
                self.commit(session, ctx, Some(&key));
                KeyResult::Handled
            }
            // 7./8. Cursor movement
            Key::Left | Key::Right | Key::Home | Key::End => {
                if !composing {
                    return KeyResult::NotHandled;
                }
                let buffer = session.buffer_mut();
                match key {
                    Key::Left => {
                        buffer.move_cursor(-1);
                    }
                    Key::Right => {
                        buffer.move_cursor(1);
                    }
                    Key::Home => buffer.move_to_start(),
                    _ => buffer.move_to_end(),
                }
                session.update_digit_flag();
                session.sync_preedit(ctx, self.config.preedit_mode);
                KeyResult::Handled
            }
            // 9. Editing
            Key::Backspace | Key::Delete => {
                if !composing {
                    return KeyResult::NotHandled;
                }
                let changed = if key == Key::Backspace {
                    session.buffer_mut().delete_before()
                } else {
                    session.buffer_mut().delete_after()
                };
                if changed {
                    self.after_edit(session, ctx, redact);
                }
                KeyResult::Handled
            }
            _ => {
                // 10. Non-literal keys
                let Some(byte) = key.literal_byte() else {
                    return KeyResult::NotHandled;
                };
                // 11. Punctuation word-breaks
                if is_word_break(&key, self.inscript) {
                    if composing
                        || (self.config.punctuation_as_transliterable
                            && is_punctuation_break(&key, self.inscript))
                    {
                        self.commit(session, ctx, Some(&key));
                        return KeyResult::Handled;
                    }
                    return KeyResult::NotHandled;
                }
                // 12. Literal input
                session.buffer_mut().insert(byte);
                self.after_edit(session, ctx, redact);
                KeyResult::Handled
            }
        }
    }

    /// Decide and apply a commit: send the text to the host exactly once,
    /// schedule any learn request, reset the session and redraw.
    pub fn commit(&self, session: &mut Session, ctx: &mut ImeContext, trigger: Option<&Key>) {
        let decision = CommitDecider::new(self.config, ctx.input_purpose)
            .inscript(self.inscript)
            .decide(session, trigger, self.client);
        if ctx.input_purpose.is_sensitive() {
            tracing::debug!(learn = decision.learn.is_some(), "commit");
        } else {
            tracing::debug!(text = %decision.text, learn = decision.learn.is_some(), "commit");
        }
        ctx.commit_string(&decision.text);
        if let Some(request) = decision.learn {
            self.submit(request);
        }
        session.reset();
        session.sync_to_context(ctx, self.config.preedit_mode);
    }

    fn submit(&self, request: LearnRequest) {
        self.client.clear_cache();
        self.learn.submit(request);
    }

    fn select_by_digit(&self, session: &mut Session, digit: u8) {
        match DigitSelection::from_digit(digit) {
            Some(DigitSelection::Index(offset)) => {
                let index = session.candidate_list().page_start() + offset;
                session.select_candidate(index);
            }
            Some(DigitSelection::ResetToFirst) => {
                session.selection_mut().invalidate();
                session.candidate_list_mut().set_global_cursor(0);
            }
            None => {}
        }
    }

    fn unlearn_current(&self, session: &mut Session, ctx: &mut ImeContext) -> KeyResult {
        let word = match session.current_candidate() {
            Some(candidate) if !candidate.text.is_empty() => candidate.text.clone(),
            _ => return KeyResult::NotHandled,
        };
        if !ctx.input_purpose.is_sensitive() {
            tracing::debug!(word = %word, "unlearn");
        }
        self.submit(LearnRequest::unlearn(word));
        session.reset();
        session.sync_to_context(ctx, self.config.preedit_mode);
        KeyResult::Handled
    }

    fn navigate(&self, session: &mut Session, event: &KeyEvent) {
        let list = session.candidate_list_mut();
        if KeyBinding::any_matches(&self.config.next_candidate, event) {
            list.next_candidate();
        } else if KeyBinding::any_matches(&self.config.prev_candidate, event) {
            list.prev_candidate();
        } else if KeyBinding::any_matches(&self.config.next_page, event) {
            list.next();
        } else if KeyBinding::any_matches(&self.config.prev_page, event) {
            list.prev();
        }
    }

    /// Re-transliterate and redraw after the buffer changed. An emptied
    /// buffer returns the session to Idle.
    fn after_edit(&self, session: &mut Session, ctx: &mut ImeContext, redact: bool) {
        if session.buffer().is_empty() {
            session.reset();
        } else {
            session.update_digit_flag();
            session.refresh(self.client, self.config, redact);
        }
        session.sync_to_context(ctx, self.config.preedit_mode);
    }
}
