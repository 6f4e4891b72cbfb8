//! Candidate types for transliteration output.
//!
//! This module provides:
//! - `Candidate`: A single script word with the oracle's confidence
//! - `CandidateList`: The displayed list with pagination and a cursor
//! - `Pageable` / `CursorMovable`: the two navigation capabilities the
//!   session drives the list through

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A single transliteration candidate.
///
/// Confidence is on the oracle's own scale; higher is better.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub text: String,
    pub confidence: i32,
}

impl Candidate {
    pub fn new<T: Into<String>>(text: T, confidence: i32) -> Self {
        Candidate {
            text: text.into(),
            confidence,
        }
    }
}

/// Layout hint passed through to the host's candidate window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutHint {
    NotSet,
    #[default]
    Vertical,
    Horizontal,
}

/// Where the raw buffer is offered as a candidate of its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawInputPlacement {
    /// Never list the raw input
    Omit,
    /// Append the raw input once, after every oracle result
    #[default]
    Last,
    /// Reserve the last slot of every page for the raw input
    PageEnd,
}

/// Page navigation over a candidate list.
pub trait Pageable {
    fn has_prev(&self) -> bool;
    fn has_next(&self) -> bool;
    /// Move to the previous page. Returns true if the page changed.
    fn prev(&mut self) -> bool;
    /// Move to the next page. Returns true if the page changed.
    fn next(&mut self) -> bool;
    fn current_page(&self) -> usize;
    fn total_pages(&self) -> usize;
}

/// Cursor navigation over a candidate list.
pub trait CursorMovable {
    /// Move the cursor back one candidate, following it onto the previous
    /// page if needed. Returns true if the cursor moved.
    fn prev_candidate(&mut self) -> bool;
    /// Move the cursor forward one candidate, following it onto the next
    /// page if needed. Returns true if the cursor moved.
    fn next_candidate(&mut self) -> bool;
    /// Cursor position relative to the current page.
    fn cursor_index(&self) -> Option<usize>;
    /// Cursor position over the whole list.
    fn global_cursor_index(&self) -> Option<usize>;
    /// Place the cursor on a global index, switching pages as needed.
    /// Returns false and leaves the cursor alone if `index` is out of range.
    fn set_global_cursor(&mut self, index: usize) -> bool;
}

/// The candidate list shown to the user.
///
/// The cursor is global (an index over all entries) and always lies on the
/// current page when set. Paging resets the cursor to the first entry of
/// the new page.
#[derive(Debug, Clone)]
pub struct CandidateList {
    /// All displayed entries, raw-input entries included
    entries: Vec<Candidate>,

    /// Number of entries per page
    page_size: usize,

    /// Current page index (0-based)
    current_page: usize,

    /// Global cursor index
    cursor: Option<usize>,

    layout: LayoutHint,
}

impl CandidateList {
    /// Create a new empty candidate list.
    pub fn new() -> Self {
        Self::with_page_size(5)
    }

    /// Create a candidate list with specified page size.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            entries: Vec::new(),
            page_size: page_size.max(1),
            current_page: 0,
            cursor: None,
            layout: LayoutHint::default(),
        }
    }

    /// Build the displayed list from oracle results and the raw buffer.
    ///
    /// Returns an empty list when the oracle produced nothing, so the host
    /// shows no candidate window in that case. A non-empty list starts with
    /// the cursor on the first entry.
    pub fn build(
        words: &[Candidate],
        raw_input: &str,
        placement: RawInputPlacement,
        page_size: usize,
        layout: LayoutHint,
    ) -> Self {
        let mut list = Self::with_page_size(page_size);
        list.layout = layout;
        if words.is_empty() {
            return list;
        }

        let raw = || Candidate::new(raw_input, 0);
        match placement {
            RawInputPlacement::Omit => list.entries.extend_from_slice(words),
            RawInputPlacement::Last => {
                list.entries.extend_from_slice(words);
                list.entries.push(raw());
            }
            RawInputPlacement::PageEnd if list.page_size == 1 => {
                // No room for words next to the raw entry
                list.entries.extend_from_slice(words);
                list.entries.push(raw());
            }
            RawInputPlacement::PageEnd => {
                for chunk in words.chunks(list.page_size - 1) {
                    list.entries.extend_from_slice(chunk);
                    list.entries.push(raw());
                }
            }
        }
        list.cursor = Some(0);
        list
    }

    /// Append an entry at the end of the list.
    pub fn append<T: Into<String>>(&mut self, text: T, confidence: i32) {
        self.entries.push(Candidate::new(text, confidence));
        if self.cursor.is_none() {
            self.cursor = Some(0);
        }
    }

    /// Set the page size, returning to the first page.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.current_page = 0;
        if !self.entries.is_empty() {
            self.cursor = Some(0);
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn layout(&self) -> LayoutHint {
        self.layout
    }

    pub fn set_layout(&mut self, layout: LayoutHint) {
        self.layout = layout;
    }

    /// All entries.
    pub fn candidates(&self) -> &[Candidate] {
        &self.entries
    }

    /// Entry at a global index.
    pub fn candidate(&self, index: usize) -> Option<&Candidate> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Global index of the first entry on the current page.
    pub fn page_start(&self) -> usize {
        self.current_page * self.page_size
    }

    fn page_range(&self, page: usize) -> Range<usize> {
        let start = (page * self.page_size).min(self.entries.len());
        let end = (start + self.page_size).min(self.entries.len());
        start..end
    }

    /// Entries on the current page.
    pub fn current_page_candidates(&self) -> &[Candidate] {
        &self.entries[self.page_range(self.current_page)]
    }

    /// Entry under the cursor.
    pub fn cursor_candidate(&self) -> Option<&Candidate> {
        self.cursor.and_then(|c| self.entries.get(c))
    }

    fn set_page(&mut self, page: usize) {
        self.current_page = page;
        let range = self.page_range(page);
        self.cursor = if range.is_empty() {
            None
        } else {
            Some(range.start)
        };
    }

    /// Clear the list.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.current_page = 0;
        self.cursor = None;
    }
}

impl Default for CandidateList {
    fn default() -> Self {
        Self::new()
    }
}

impl Pageable for CandidateList {
    fn has_prev(&self) -> bool {
        self.current_page > 0
    }

    fn has_next(&self) -> bool {
        self.current_page + 1 < self.total_pages()
    }

    fn prev(&mut self) -> bool {
        if !self.has_prev() {
            return false;
        }
        self.set_page(self.current_page - 1);
        true
    }

    fn next(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.set_page(self.current_page + 1);
        true
    }

    fn current_page(&self) -> usize {
        self.current_page
    }

    fn total_pages(&self) -> usize {
        self.entries.len().div_ceil(self.page_size)
    }
}

impl CursorMovable for CandidateList {
    fn prev_candidate(&mut self) -> bool {
        match self.cursor {
            Some(c) if c > 0 => self.set_global_cursor(c - 1),
            _ => false,
        }
    }

    fn next_candidate(&mut self) -> bool {
        match self.cursor {
            Some(c) => self.set_global_cursor(c + 1),
            None => self.set_global_cursor(self.page_start()),
        }
    }

    fn cursor_index(&self) -> Option<usize> {
        self.cursor.map(|c| c - self.page_start())
    }

    fn global_cursor_index(&self) -> Option<usize> {
        self.cursor
    }

    fn set_global_cursor(&mut self, index: usize) -> bool {
        if index >= self.entries.len() {
            return false;
        }
        self.current_page = index / self.page_size;
        self.cursor = Some(index);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> Vec<Candidate> {
        (0..n)
            .map(|i| Candidate::new(format!("w{}", i), 10 - i as i32))
            .collect()
    }

    #[test]
    fn test_new_list() {
        let list = CandidateList::new();
        assert!(list.is_empty());
        assert_eq!(list.page_size(), 5);
        assert_eq!(list.total_pages(), 0);
        assert_eq!(list.global_cursor_index(), None);
    }

    #[test]
    fn test_build_appends_raw_input_last() {
        let list = CandidateList::build(
            &words(3),
            "raw",
            RawInputPlacement::Last,
            5,
            LayoutHint::Vertical,
        );
        let texts: Vec<_> = list.candidates().iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["w0", "w1", "w2", "raw"]);
        assert_eq!(list.global_cursor_index(), Some(0));
    }

    #[test]
    fn test_build_page_end_placement() {
        let list = CandidateList::build(
            &words(5),
            "raw",
            RawInputPlacement::PageEnd,
            3,
            LayoutHint::Horizontal,
        );
        let texts: Vec<_> = list.candidates().iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["w0", "w1", "raw", "w2", "w3", "raw", "w4", "raw"]);
        assert_eq!(list.layout(), LayoutHint::Horizontal);
    }

    #[test]
    fn test_build_without_words_is_empty() {
        let list = CandidateList::build(&[], "raw", RawInputPlacement::Last, 5, LayoutHint::NotSet);
        assert!(list.is_empty());
        assert_eq!(list.global_cursor_index(), None);
    }

    #[test]
    fn test_pagination_resets_cursor_to_first() {
        let mut list =
            CandidateList::build(&words(10), "raw", RawInputPlacement::Omit, 3, LayoutHint::Vertical);
        assert_eq!(list.total_pages(), 4);

        list.next_candidate();
        assert_eq!(list.global_cursor_index(), Some(1));

        assert!(list.next());
        assert_eq!(list.current_page(), 1);
        assert_eq!(list.global_cursor_index(), Some(3));
        assert_eq!(list.cursor_index(), Some(0));
        assert_eq!(list.current_page_candidates()[0].text, "w3");

        assert!(list.next());
        assert!(list.next());
        assert_eq!(list.current_page_candidates().len(), 1);
        assert!(!list.next());

        assert!(list.prev());
        assert_eq!(list.global_cursor_index(), Some(6));
    }

    #[test]
    fn test_cursor_follows_across_pages() {
        let mut list =
            CandidateList::build(&words(5), "raw", RawInputPlacement::Omit, 3, LayoutHint::Vertical);
        assert!(list.next_candidate());
        assert!(list.next_candidate());
        assert!(list.next_candidate());
        assert_eq!(list.current_page(), 1);
        assert_eq!(list.cursor_index(), Some(0));
        assert_eq!(list.cursor_candidate().unwrap().text, "w3");

        assert!(list.prev_candidate());
        assert_eq!(list.current_page(), 0);
        assert_eq!(list.cursor_index(), Some(2));
    }

    #[test]
    fn test_cursor_stops_at_ends() {
        let mut list =
            CandidateList::build(&words(2), "raw", RawInputPlacement::Omit, 5, LayoutHint::Vertical);
        assert!(!list.prev_candidate());
        assert!(list.next_candidate());
        assert!(!list.next_candidate());
        assert_eq!(list.global_cursor_index(), Some(1));
    }

    #[test]
    fn test_set_global_cursor_out_of_range() {
        let mut list =
            CandidateList::build(&words(3), "raw", RawInputPlacement::Omit, 5, LayoutHint::Vertical);
        assert!(!list.set_global_cursor(3));
        assert_eq!(list.global_cursor_index(), Some(0));
        assert!(list.set_global_cursor(2));
        assert_eq!(list.cursor_candidate().unwrap().text, "w2");
    }

    #[test]
    fn test_append_and_clear() {
        let mut list = CandidateList::with_page_size(0);
        assert_eq!(list.page_size(), 1);
        list.append("a", 1);
        list.append("b", 0);
        assert_eq!(list.total_pages(), 2);
        assert_eq!(list.global_cursor_index(), Some(0));

        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.current_page(), 0);
        assert_eq!(list.global_cursor_index(), None);
    }
}
