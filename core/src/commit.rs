//! Commit decision: what text reaches the host and what gets learned.
//!
//! Rules, in order:
//! 1. Escape, digit `0`, or no live candidate set: commit the preedit
//!    verbatim and learn nothing.
//! 2. No explicit selection (no pin, cursor on the first entry): commit the
//!    top oracle result and mark it for learning.
//! 3. Otherwise commit the pinned or cursor candidate and mark it.
//! 4. A word-break trigger appends its literal text, or with
//!    `punctuation_as_transliterable` the top rendering of the punctuation
//!    itself (falling back to the literal when the oracle has none).
//! 5. Learning is dropped for empty words, digit-text input, sensitive
//!    fields, when `learn_words` is off, or when nothing was marked.
//!
//! The decider is pure apart from the seed transliteration in step 4; the
//! dispatcher applies the side effects.

use crate::context::InputPurpose;
use crate::key::{is_punctuation_break, is_word_break, word_break_text, Key};
use crate::learn::LearnRequest;
use crate::session::Session;
use crate::translit::TransliterationClient;
use crate::Config;

/// Outcome of a commit decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitDecision {
    /// Exact text for the host, word-break included
    pub text: String,
    /// Dictionary update to schedule, if any
    pub learn: Option<LearnRequest>,
}

/// Why a marked word was not learned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Suppression {
    NothingMarked,
    EmptyWord,
    DigitText,
    SensitiveField,
    LearningDisabled,
}

/// Evaluates the commit rules against a session.
pub struct CommitDecider<'a> {
    config: &'a Config,
    purpose: InputPurpose,
    inscript: bool,
}

impl<'a> CommitDecider<'a> {
    pub fn new(config: &'a Config, purpose: InputPurpose) -> Self {
        Self {
            config,
            purpose,
            inscript: false,
        }
    }

    /// Classify word breaks for an inscript layout.
    pub fn inscript(mut self, inscript: bool) -> Self {
        self.inscript = inscript;
        self
    }

    /// Decide the commit for `trigger`. `None` means a programmatic commit
    /// (input method switch) with no key involved.
    pub fn decide(
        &self,
        session: &Session,
        trigger: Option<&Key>,
        client: &TransliterationClient,
    ) -> CommitDecision {
        let (word, marked) = self.choose_word(session, trigger);

        let mut text = word;
        if let Some(key) = trigger.filter(|k| is_word_break(k, self.inscript)) {
            text.push_str(&self.break_text(key, client));
        }

        let learn = match self.suppression(session, marked.as_deref()) {
            None => marked.map(LearnRequest::learn),
            Some(reason) => {
                tracing::trace!(?reason, "not learning committed word");
                None
            }
        };

        CommitDecision { text, learn }
    }

    /// Rules 1-3: the committed word and the word marked for learning.
    fn choose_word(&self, session: &Session, trigger: Option<&Key>) -> (String, Option<String>) {
        let verbatim = matches!(trigger, Some(Key::Escape) | Some(Key::Char('0')));
        if verbatim || !session.has_live_candidates() {
            return (session.preedit_text(self.config.preedit_mode), None);
        }

        let chosen = if session.has_explicit_selection() {
            session.current_candidate()
        } else {
            session.candidates().first()
        };
        match chosen {
            Some(candidate) => (candidate.text.clone(), Some(candidate.text.clone())),
            None => (session.preedit_text(self.config.preedit_mode), None),
        }
    }

    /// Rule 4: the text a word-break trigger contributes.
    fn break_text(&self, key: &Key, client: &TransliterationClient) -> String {
        let literal = word_break_text(key);
        if self.config.punctuation_as_transliterable && is_punctuation_break(key, self.inscript) {
            if let Some(rendered) = client.first(literal) {
                return rendered;
            }
        }
        literal.to_string()
    }

    /// Rule 5.
    fn suppression(&self, session: &Session, marked: Option<&str>) -> Option<Suppression> {
        let word = match marked {
            None => return Some(Suppression::NothingMarked),
            Some(word) => word,
        };
        if word.is_empty() {
            Some(Suppression::EmptyWord)
        } else if session.selection().last_key_was_digit() {
            Some(Suppression::DigitText)
        } else if self.purpose.is_sensitive() {
            Some(Suppression::SensitiveField)
        } else if !self.config.learn_words {
            Some(Suppression::LearningDisabled)
        } else {
            None
        }
    }
}
