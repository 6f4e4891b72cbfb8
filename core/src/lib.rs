//! libtranslit-core
//!
//! Per-session state machine for a transliteration input method: raw
//! keystroke buffer, candidate selection, commit decisions and asynchronous
//! dictionary learning. The transliteration oracle and the dictionary are
//! collaborators supplied by the host through traits.
//!
//! Public API:
//! - `ImeEngine` - Registry of input contexts, entry point for key events
//! - `Session` - Buffer, candidates and selection for one input context
//! - `CommitDecider` - Decides what text is committed and what is learned
//! - `TransliterationClient` - Cached access to a `Transliterator`
//! - `LearnQueue` - Non-blocking learn/unlearn dispatch to a `Dictionary`
//! - `Config` - Configuration and key bindings
use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{DictError, EngineError, OracleError};

pub mod key;
pub use key::{Key, KeyBinding, KeyEvent, Modifiers};

pub mod input_buffer;
pub use input_buffer::InputBuffer;

pub mod candidate;
pub use candidate::{
    Candidate, CandidateList, CursorMovable, LayoutHint, Pageable, RawInputPlacement,
};

pub mod selection;
pub use selection::{DigitSelection, SelectionState};

pub mod translit;
pub use translit::{OracleSettings, SchemeInfo, SchemeLoader, TransliterationClient, Transliterator};

pub mod learn;
pub use learn::{Dictionary, DictionaryGeneration, InMemoryDictionary, LearnQueue, LearnRequest};

pub mod context;
pub use context::{ImeContext, InputPurpose, PreeditTarget};

pub mod session;
pub use session::Session;

pub mod commit;
pub use commit::{CommitDecider, CommitDecision};

pub mod dispatcher;
pub use dispatcher::{KeyEventDispatcher, KeyResult};

pub mod ime_engine;
pub use ime_engine::{ContextId, ImeEngine};

/// What the preedit shows while composing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PreeditMode {
    /// The current candidate, falling back to the raw buffer
    #[default]
    Transliterated,
    /// The raw buffer
    Raw,
}

pub const MIN_PAGE_SIZE: usize = 3;
pub const MAX_PAGE_SIZE: usize = 10;
pub const MAX_SUGGESTIONS_LIMIT: usize = 10;

/// Input method configuration.
///
/// Missing fields take their defaults when loading from TOML. The engine only
/// ever holds a `sanitized()` copy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Candidates per page (3-10)
    pub page_size: usize,

    /// Learn committed words
    pub learn_words: bool,

    // Oracle options, forwarded on activation
    pub strict_dictionary_match: bool,
    pub dictionary_suggestions_limit: usize,
    pub pattern_dictionary_suggestions_limit: usize,
    pub tokenizer_suggestions_limit: usize,
    /// Render digits in the target script
    pub indic_digits: bool,

    /// Punctuation word-breaks commit their own transliteration instead of
    /// the literal character
    pub punctuation_as_transliterable: bool,

    // Navigation key bindings
    pub next_candidate: Vec<KeyBinding>,
    pub prev_candidate: Vec<KeyBinding>,
    pub next_page: Vec<KeyBinding>,
    pub prev_page: Vec<KeyBinding>,

    /// Modifier-only keys ignored outright
    pub filtered_keys: Vec<KeyBinding>,

    pub candidate_layout: LayoutHint,

    /// Where the raw buffer appears among the candidates
    pub raw_input_candidate: RawInputPlacement,

    pub preedit_mode: PreeditMode,

    /// Pending learn/unlearn requests before new ones are dropped
    pub learn_queue_capacity: usize,

    /// Entries in the input -> candidates cache, 0 disables it
    pub transliteration_cache_size: usize,
}

fn binding(key: Key, modifiers: Modifiers) -> Vec<KeyBinding> {
    vec![KeyBinding::new(key, modifiers)]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_size: 5,
            learn_words: false,
            strict_dictionary_match: false,
            dictionary_suggestions_limit: 4,
            pattern_dictionary_suggestions_limit: 3,
            tokenizer_suggestions_limit: 10,
            indic_digits: false,
            punctuation_as_transliterable: false,
            next_candidate: binding(Key::Down, Modifiers::alt()),
            prev_candidate: binding(Key::Up, Modifiers::alt()),
            next_page: binding(Key::Right, Modifiers::alt()),
            prev_page: binding(Key::Left, Modifiers::alt()),
            filtered_keys: [Key::Shift, Key::Control, Key::Alt, Key::Super, Key::CapsLock]
                .into_iter()
                .map(|k| KeyBinding::new(k, Modifiers::NONE))
                .collect(),
            candidate_layout: LayoutHint::Vertical,
            raw_input_candidate: RawInputPlacement::Last,
            preedit_mode: PreeditMode::Transliterated,
            learn_queue_capacity: 64,
            transliteration_cache_size: 256,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
            .map_err(|e| EngineError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), EngineError> {
        let content = self
            .to_toml_string()
            .map_err(|e| EngineError::Config(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| EngineError::Config(e.to_string()))
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Copy with every numeric option clamped into its valid range.
    pub fn sanitized(&self) -> Self {
        Self {
            page_size: self.page_size.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE),
            dictionary_suggestions_limit: self.dictionary_suggestions_limit.min(MAX_SUGGESTIONS_LIMIT),
            pattern_dictionary_suggestions_limit: self
                .pattern_dictionary_suggestions_limit
                .min(MAX_SUGGESTIONS_LIMIT),
            tokenizer_suggestions_limit: self.tokenizer_suggestions_limit.min(MAX_SUGGESTIONS_LIMIT),
            learn_queue_capacity: self.learn_queue_capacity.max(1),
            ..self.clone()
        }
    }

    /// Whether an event is one of the navigation bindings.
    pub fn is_navigation(&self, event: &KeyEvent) -> bool {
        [
            &self.next_candidate,
            &self.prev_candidate,
            &self.next_page,
            &self.prev_page,
        ]
        .iter()
        .any(|bindings| KeyBinding::any_matches(bindings, event))
    }
}
