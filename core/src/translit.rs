//! Transliteration oracle client.
//!
//! The oracle maps a raw buffer to an ordered list of weighted candidates. It
//! is called synchronously on every edit because the next candidate list
//! depends on it. Results are cached per input in an LRU cache; the cache is
//! dropped whenever the dictionary is about to change, and again once the
//! learn worker reports that it did change, since learning and unlearning
//! change the ranking.

use crate::candidate::Candidate;
use crate::error::OracleError;
use crate::learn::DictionaryGeneration;
use crate::Config;
use std::cell::{Cell, RefCell};
use std::num::NonZeroUsize;
use std::sync::Arc;

/// A transliteration scheme ready to convert input.
pub trait Transliterator: Send + Sync {
    /// Convert raw input into ranked candidates, best first.
    fn transliterate(&self, input: &str) -> Result<Vec<Candidate>, OracleError>;
}

/// Oracle options applied when a scheme is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleSettings {
    pub strict_dictionary_match: bool,
    pub dictionary_suggestions_limit: usize,
    pub pattern_dictionary_suggestions_limit: usize,
    pub tokenizer_suggestions_limit: usize,
    pub indic_digits: bool,
}

impl OracleSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            strict_dictionary_match: config.strict_dictionary_match,
            dictionary_suggestions_limit: config.dictionary_suggestions_limit,
            pattern_dictionary_suggestions_limit: config.pattern_dictionary_suggestions_limit,
            tokenizer_suggestions_limit: config.tokenizer_suggestions_limit,
            indic_digits: config.indic_digits,
        }
    }
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Description of an available scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemeInfo {
    /// Unique scheme identifier (e.g. "ml")
    pub id: String,
    /// Human readable name
    pub display_name: String,
    /// Language code of the output script
    pub lang_code: String,
}

/// Opens transliteration schemes by identifier.
pub trait SchemeLoader {
    /// Open `scheme` with the given settings. Failure here is fatal for
    /// activation.
    fn load(
        &self,
        scheme: &str,
        settings: &OracleSettings,
    ) -> Result<Arc<dyn Transliterator>, OracleError>;

    /// Schemes this loader can open.
    fn schemes(&self) -> Vec<SchemeInfo>;
}

/// Wraps a transliterator with an input -> candidates cache.
pub struct TransliterationClient {
    oracle: Arc<dyn Transliterator>,
    cache: Option<RefCell<lru::LruCache<String, Vec<Candidate>>>>,
    cache_hits: Cell<usize>,
    cache_misses: Cell<usize>,
    dictionary: Option<DictionaryGeneration>,
    seen_generation: Cell<u64>,
}

impl TransliterationClient {
    /// Create a client. A `cache_size` of 0 disables caching.
    pub fn new(oracle: Arc<dyn Transliterator>, cache_size: usize) -> Self {
        Self {
            oracle,
            cache: NonZeroUsize::new(cache_size).map(|cap| RefCell::new(lru::LruCache::new(cap))),
            cache_hits: Cell::new(0),
            cache_misses: Cell::new(0),
            dictionary: None,
            seen_generation: Cell::new(0),
        }
    }

    /// Drop cached results whenever `generation` advances.
    pub fn track_dictionary(mut self, generation: DictionaryGeneration) -> Self {
        self.seen_generation.set(generation.current());
        self.dictionary = Some(generation);
        self
    }

    fn drop_stale(&self) {
        let Some(dictionary) = &self.dictionary else {
            return;
        };
        let current = dictionary.current();
        if current != self.seen_generation.get() {
            tracing::trace!(generation = current, "dictionary changed, dropping cache");
            self.seen_generation.set(current);
            self.clear_cache();
        }
    }

    /// Transliterate `input`. Empty input never reaches the oracle.
    pub fn transliterate(&self, input: &str) -> Result<Vec<Candidate>, OracleError> {
        if input.is_empty() {
            return Ok(Vec::new());
        }

        self.drop_stale();
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.borrow_mut().get(input) {
                self.cache_hits.set(self.cache_hits.get() + 1);
                return Ok(hit.clone());
            }
        }
        self.cache_misses.set(self.cache_misses.get() + 1);

        let candidates = self.oracle.transliterate(input)?;
        if let Some(cache) = &self.cache {
            cache.borrow_mut().put(input.to_string(), candidates.clone());
        }
        Ok(candidates)
    }

    /// Top-ranked rendering of `input`, if the oracle produced one.
    pub fn first(&self, input: &str) -> Option<String> {
        match self.transliterate(input) {
            Ok(candidates) => candidates
                .into_iter()
                .next()
                .map(|c| c.text)
                .filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "seed transliteration failed");
                None
            }
        }
    }

    /// Drop all cached results.
    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.borrow_mut().clear();
        }
    }

    /// (hits, misses) since creation.
    pub fn cache_stats(&self) -> (usize, usize) {
        (self.cache_hits.get(), self.cache_misses.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        calls: AtomicUsize,
    }

    impl Transliterator for Counting {
        fn transliterate(&self, input: &str) -> Result<Vec<Candidate>, OracleError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if input == "fail" {
                return Err(OracleError::Failed("boom".into()));
            }
            Ok(vec![Candidate::new(input.to_uppercase(), 1)])
        }
    }

    fn client(cache_size: usize) -> (Arc<Counting>, TransliterationClient) {
        let oracle = Arc::new(Counting {
            calls: AtomicUsize::new(0),
        });
        let client = TransliterationClient::new(oracle.clone(), cache_size);
        (oracle, client)
    }

    #[test]
    fn test_empty_input_skips_oracle() {
        let (oracle, client) = client(4);
        assert_eq!(client.transliterate("").unwrap(), vec![]);
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_cache_hit_and_clear() {
        let (oracle, client) = client(4);
        client.transliterate("ka").unwrap();
        client.transliterate("ka").unwrap();
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 1);
        assert_eq!(client.cache_stats(), (1, 1));

        client.clear_cache();
        client.transliterate("ka").unwrap();
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_cache_disabled() {
        let (oracle, client) = client(0);
        client.transliterate("ka").unwrap();
        client.transliterate("ka").unwrap();
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let (oracle, client) = client(4);
        assert!(client.transliterate("fail").is_err());
        assert!(client.transliterate("fail").is_err());
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 2);
        assert_eq!(client.first("fail"), None);
        assert_eq!(client.first("."), Some(".".to_string()));
    }

    #[test]
    fn test_dictionary_change_drops_cache() {
        let (oracle, client) = client(4);
        let generation = DictionaryGeneration::new();
        let client = client.track_dictionary(generation.clone());
        client.transliterate("ka").unwrap();
        client.transliterate("ka").unwrap();
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 1);

        generation.bump();
        client.transliterate("ka").unwrap();
        client.transliterate("ka").unwrap();
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 2);
    }
}
