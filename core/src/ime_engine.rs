//! IME engine: scheme activation and the registry of input contexts.
//!
//! The `ImeEngine` owns everything that outlives a single keystroke: the
//! configuration, the scheme loader, the learn queue, the active
//! transliteration client and one `Session` + `ImeContext` pair per host
//! input context. Contexts are created on first access and dropped when the
//! host destroys them.

use crate::context::ImeContext;
use crate::dispatcher::{KeyEventDispatcher, KeyResult};
use crate::error::EngineError;
use crate::key::KeyEvent;
use crate::learn::{Dictionary, LearnQueue};
use crate::session::Session;
use crate::translit::{OracleSettings, SchemeInfo, SchemeLoader, TransliterationClient};
use crate::Config;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Host-assigned identity of an input context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(pub u64);

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ic-{}", self.0)
    }
}

/// Identifier fragment of schemes that are keyboard layouts rather than
/// phonetic transliteration.
const INSCRIPT: &str = "inscript";

/// Per-context state.
#[derive(Debug, Default)]
struct InputContextState {
    session: Session,
    context: ImeContext,
}

/// The scheme currently opened for transliteration.
struct ActiveScheme {
    id: String,
    inscript: bool,
    client: TransliterationClient,
}

impl ActiveScheme {
    fn dispatcher<'a>(&'a self, config: &'a Config, learn: &'a LearnQueue) -> KeyEventDispatcher<'a> {
        KeyEventDispatcher::new(config, &self.client, learn).inscript(self.inscript)
    }
}

/// IME engine with per-context sessions.
pub struct ImeEngine {
    config: Config,
    loader: Box<dyn SchemeLoader>,
    learn: LearnQueue,
    active: Option<ActiveScheme>,
    contexts: HashMap<ContextId, InputContextState>,
}

impl ImeEngine {
    /// Create an engine. No scheme is active until `activate` succeeds.
    pub fn new(loader: Box<dyn SchemeLoader>, dictionary: Arc<dyn Dictionary>, config: Config) -> Self {
        let config = config.sanitized();
        let learn = LearnQueue::spawn(dictionary, config.learn_queue_capacity);
        Self {
            config,
            loader,
            learn,
            active: None,
            contexts: HashMap::new(),
        }
    }

    /// Open `scheme` for transliteration.
    ///
    /// Failure is fatal for activation and leaves the engine without an
    /// active scheme. Sessions composed under a previous scheme are reset.
    pub fn activate(&mut self, scheme: &str) -> Result<(), EngineError> {
        let settings = OracleSettings::from_config(&self.config);
        let oracle = match self.loader.load(scheme, &settings) {
            Ok(oracle) => oracle,
            Err(source) => {
                tracing::error!(scheme, error = %source, "failed to initialize scheme");
                self.active = None;
                return Err(EngineError::SchemeInit {
                    scheme: scheme.to_string(),
                    source,
                });
            }
        };

        let inscript = scheme.contains(INSCRIPT);
        tracing::info!(scheme, inscript, "activate scheme");
        let client = TransliterationClient::new(oracle, self.config.transliteration_cache_size)
            .track_dictionary(self.learn.generation());
        self.active = Some(ActiveScheme {
            id: scheme.to_string(),
            inscript,
            client,
        });
        for state in self.contexts.values_mut() {
            state.session.reset();
            state.session.sync_to_context(&mut state.context, self.config.preedit_mode);
        }
        Ok(())
    }

    /// Deactivate the input method for a context.
    ///
    /// When the host is switching to another input method the pending
    /// composition is committed first. The context is then reset and the
    /// scheme closed.
    pub fn deactivate(&mut self, id: ContextId, switching: bool) {
        if let Some(active) = &self.active {
            tracing::info!(scheme = %active.id, context = %id, switching, "deactivate scheme");
            let state = self.contexts.entry(id).or_default();
            if switching && state.session.is_composing() {
                active
                    .dispatcher(&self.config, &self.learn)
                    .commit(&mut state.session, &mut state.context, None);
            }
        }
        self.reset(id);
        self.active = None;
    }

    /// Discard the composition of a context without committing.
    pub fn reset(&mut self, id: ContextId) {
        let state = self.contexts.entry(id).or_default();
        state.session.reset();
        state.session.sync_to_context(&mut state.context, self.config.preedit_mode);
    }

    /// The host moved focus away from a context.
    pub fn focus_out(&mut self, id: ContextId) {
        tracing::trace!(context = %id, "focus out");
        self.reset(id);
    }

    /// Drop all state of a destroyed context. In-flight learn requests are
    /// unaffected.
    pub fn destroy_context(&mut self, id: ContextId) -> bool {
        self.contexts.remove(&id).is_some()
    }

    /// Process a key event for a context.
    ///
    /// After calling this the host reads `context(id)` to update its UI and
    /// take any committed text.
    pub fn process_key(&mut self, id: ContextId, event: KeyEvent) -> KeyResult {
        if event.release {
            return KeyResult::NotHandled;
        }
        let Some(active) = &self.active else {
            tracing::warn!(context = %id, error = %EngineError::NotActivated, "key ignored");
            return KeyResult::NotHandled;
        };
        let state = self.contexts.entry(id).or_default();

        // Clear commit text from previous key
        state.context.take_commit();

        active
            .dispatcher(&self.config, &self.learn)
            .dispatch(&mut state.session, &mut state.context, &event)
    }

    /// Pin a displayed candidate, e.g. after a click in the candidate
    /// window. Out-of-range indices are ignored.
    pub fn select_candidate(&mut self, id: ContextId, index: usize) -> bool {
        let state = self.contexts.entry(id).or_default();
        if !state.session.select_candidate(index) {
            return false;
        }
        state.session.sync_preedit(&mut state.context, self.config.preedit_mode);
        true
    }

    /// Host-facing state of a context, created on first access.
    pub fn context(&mut self, id: ContextId) -> &ImeContext {
        &self.contexts.entry(id).or_default().context
    }

    pub fn context_mut(&mut self, id: ContextId) -> &mut ImeContext {
        &mut self.contexts.entry(id).or_default().context
    }

    /// Session of a context, if it exists.
    pub fn session(&self, id: ContextId) -> Option<&Session> {
        self.contexts.get(&id).map(|s| &s.session)
    }

    /// Number of live contexts.
    pub fn context_count(&self) -> usize {
        self.contexts.len()
    }

    pub fn active_scheme(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.id.as_str())
    }

    /// (hits, misses) of the active scheme's transliteration cache.
    pub fn cache_stats(&self) -> Option<(usize, usize)> {
        self.active.as_ref().map(|a| a.client.cache_stats())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replace the configuration. Display options apply from the next
    /// candidate set, oracle options from the next activation. The learn
    /// queue keeps the capacity it was created with.
    pub fn set_config(&mut self, config: Config) {
        self.config = config.sanitized();
        tracing::debug!("configuration updated");
    }

    /// Load the configuration from a TOML file. On error the current
    /// configuration is kept.
    pub fn reload_config<P: AsRef<Path>>(&mut self, path: P) -> Result<(), EngineError> {
        let config = Config::load_toml(path)?;
        self.set_config(config);
        Ok(())
    }

    /// Drop every context and wait for pending learn requests to reach the
    /// dictionary.
    pub fn shutdown(self) {
        tracing::debug!(contexts = self.contexts.len(), "shutting down");
        self.learn.shutdown();
    }

    /// Schemes the loader offers, inscript layouts excluded.
    pub fn list_schemes(&self) -> Vec<SchemeInfo> {
        self.loader
            .schemes()
            .into_iter()
            .filter(|s| !s.id.contains(INSCRIPT))
            .collect()
    }
}
