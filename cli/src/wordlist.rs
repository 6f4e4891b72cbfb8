//! Word-list backed transliteration for the interactive driver.
//!
//! A word list is a TOML file mapping raw input to script words, best first:
//!
//! ```toml
//! scheme = "ml"
//! display_name = "Malayalam"
//! lang_code = "ml"
//!
//! [words]
//! namaskaram = ["നമസ്കാരം", "നമസ്കാരൻ"]
//! "." = ["।"]
//! ```
//!
//! Input without an entry is echoed back as its own single candidate, unless
//! strict dictionary matching is on.

use anyhow::Context;
use libtranslit_core::{Candidate, OracleError, OracleSettings, SchemeInfo, SchemeLoader, Transliterator};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Malayalam digit zero; the other digits follow contiguously.
const SCRIPT_DIGIT_ZERO: u32 = 0x0D66;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WordList {
    pub scheme: String,
    pub display_name: String,
    pub lang_code: String,
    pub words: HashMap<String, Vec<String>>,
}

impl Default for WordList {
    fn default() -> Self {
        Self {
            scheme: "ml".to_string(),
            display_name: "Malayalam".to_string(),
            lang_code: "ml".to_string(),
            words: HashMap::new(),
        }
    }
}

impl WordList {
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading word list {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing word list {}", path.display()))
    }

    /// The word list shipped with the driver.
    pub fn demo() -> anyhow::Result<Self> {
        Self::from_toml_str(include_str!("../words.toml")).context("parsing built-in word list")
    }
}

/// Looks words up in a `WordList`.
pub struct WordListTransliterator {
    list: Arc<WordList>,
    settings: OracleSettings,
}

impl WordListTransliterator {
    pub fn new(list: Arc<WordList>, settings: OracleSettings) -> Self {
        Self { list, settings }
    }

    fn script_digits(input: &str) -> Option<String> {
        if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        input
            .bytes()
            .map(|b| char::from_u32(SCRIPT_DIGIT_ZERO + u32::from(b - b'0')))
            .collect()
    }
}

impl Transliterator for WordListTransliterator {
    fn transliterate(&self, input: &str) -> Result<Vec<Candidate>, OracleError> {
        if self.settings.indic_digits {
            if let Some(digits) = Self::script_digits(input) {
                return Ok(vec![Candidate::new(digits, 1)]);
            }
        }

        let Some(words) = self.list.words.get(input) else {
            if self.settings.strict_dictionary_match {
                return Ok(Vec::new());
            }
            return Ok(vec![Candidate::new(input, 0)]);
        };

        let limit = match self.settings.dictionary_suggestions_limit {
            0 => words.len(),
            n => n,
        };
        let count = words.len().min(limit);
        Ok(words
            .iter()
            .take(count)
            .enumerate()
            .map(|(i, w)| Candidate::new(w.as_str(), (count - i) as i32))
            .collect())
    }
}

/// Opens the single scheme a word list describes.
pub struct WordListLoader {
    list: Arc<WordList>,
}

impl WordListLoader {
    pub fn new(list: WordList) -> Self {
        Self { list: Arc::new(list) }
    }
}

impl SchemeLoader for WordListLoader {
    fn load(&self, scheme: &str, settings: &OracleSettings) -> Result<Arc<dyn Transliterator>, OracleError> {
        if scheme != self.list.scheme {
            return Err(OracleError::SchemeUnavailable(scheme.to_string()));
        }
        Ok(Arc::new(WordListTransliterator::new(self.list.clone(), settings.clone())))
    }

    fn schemes(&self) -> Vec<SchemeInfo> {
        vec![SchemeInfo {
            id: self.list.scheme.clone(),
            display_name: self.list.display_name.clone(),
            lang_code: self.list.lang_code.clone(),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oracle(settings: OracleSettings) -> WordListTransliterator {
        let list = WordList::from_toml_str(
            r#"
            [words]
            namaskaram = ["നമസ്കാരം", "നമസ്കാരൻ"]
            "#,
        )
        .unwrap();
        WordListTransliterator::new(Arc::new(list), settings)
    }

    #[test]
    fn test_lookup_ranks_in_order() {
        let got = oracle(OracleSettings::default()).transliterate("namaskaram").unwrap();
        assert_eq!(got[0], Candidate::new("നമസ്കാരം", 2));
        assert_eq!(got[1], Candidate::new("നമസ്കാരൻ", 1));
    }

    #[test]
    fn test_unknown_input_echoes() {
        let got = oracle(OracleSettings::default()).transliterate("xyz").unwrap();
        assert_eq!(got, vec![Candidate::new("xyz", 0)]);

        let strict = OracleSettings {
            strict_dictionary_match: true,
            ..OracleSettings::default()
        };
        assert!(oracle(strict).transliterate("xyz").unwrap().is_empty());
    }

    #[test]
    fn test_suggestion_limit_and_digits() {
        let settings = OracleSettings {
            dictionary_suggestions_limit: 1,
            indic_digits: true,
            ..OracleSettings::default()
        };
        let o = oracle(settings);
        assert_eq!(o.transliterate("namaskaram").unwrap().len(), 1);
        assert_eq!(o.transliterate("42").unwrap()[0].text, "൪൨");
    }

    #[test]
    fn test_loader_only_opens_its_scheme() {
        let loader = WordListLoader::new(WordList::default());
        assert!(loader.load("ml", &OracleSettings::default()).is_ok());
        assert!(matches!(
            loader.load("hi", &OracleSettings::default()),
            Err(OracleError::SchemeUnavailable(_))
        ));
        assert_eq!(loader.schemes()[0].id, "ml");
    }

    #[test]
    fn test_demo_list_parses() {
        let list = WordList::demo().unwrap();
        assert!(list.words.contains_key("namaskaram"));
    }
}
