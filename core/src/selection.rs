//! Candidate selection state.
//!
//! Three mechanisms can pick the candidate that a commit uses:
//! - the list cursor, moved by the navigation keys (lives in `CandidateList`)
//! - a pinned index, set by a host click or a digit fast-select
//! - digit fast-select itself, which is only a shortcut when the previous
//!   keystroke did not leave the buffer ending in a digit
//!
//! This struct owns the pin and the digit flag. A pin is an index into the
//! displayed candidate list and is dropped whenever that list is replaced.

/// What a digit key does when it acts as a selection shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigitSelection {
    /// Digits 1-9: pick the n-th entry of the current page
    Index(usize),
    /// Digit 0: drop any selection and fall back to the first candidate
    ResetToFirst,
}

impl DigitSelection {
    /// Map a digit value to its shortcut meaning.
    pub fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            0 => Some(DigitSelection::ResetToFirst),
            1..=9 => Some(DigitSelection::Index(digit as usize - 1)),
            _ => None,
        }
    }
}

/// Pinned candidate plus the digit-continuation flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    pinned: Option<usize>,
    last_key_was_digit: bool,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The pinned candidate index, if any.
    pub fn pinned(&self) -> Option<usize> {
        self.pinned
    }

    /// Pin `index` if it is a valid position in a list of `available`
    /// entries. Out-of-range indices are ignored. Returns true if pinned.
    pub fn select(&mut self, index: usize, available: usize) -> bool {
        if index >= available {
            tracing::trace!(index, available, "ignoring out-of-range selection");
            return false;
        }
        self.pinned = Some(index);
        true
    }

    /// Forget the pin; used whenever the candidate list is replaced.
    pub fn invalidate(&mut self) {
        self.pinned = None;
    }

    /// Whether the buffer currently ends in a digit typed as text, which
    /// makes the next digit text as well instead of a shortcut.
    pub fn last_key_was_digit(&self) -> bool {
        self.last_key_was_digit
    }

    pub fn set_last_key_was_digit(&mut self, value: bool) {
        self.last_key_was_digit = value;
    }

    /// Whether a digit key should act as a fast-select shortcut while
    /// composing.
    pub fn digit_is_shortcut(&self, composing: bool) -> bool {
        composing && !self.last_key_was_digit
    }

    pub fn reset(&mut self) {
        self.pinned = None;
        self.last_key_was_digit = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_mapping() {
        assert_eq!(DigitSelection::from_digit(1), Some(DigitSelection::Index(0)));
        assert_eq!(DigitSelection::from_digit(9), Some(DigitSelection::Index(8)));
        assert_eq!(DigitSelection::from_digit(0), Some(DigitSelection::ResetToFirst));
        assert_eq!(DigitSelection::from_digit(10), None);
    }

    #[test]
    fn test_out_of_range_select_is_noop() {
        let mut s = SelectionState::new();
        assert!(s.select(1, 3));
        assert_eq!(s.pinned(), Some(1));

        assert!(!s.select(3, 3));
        assert_eq!(s.pinned(), Some(1));

        let mut empty = SelectionState::new();
        assert!(!empty.select(0, 0));
        assert_eq!(empty.pinned(), None);
    }

    #[test]
    fn test_digit_shortcut_gate() {
        let mut s = SelectionState::new();
        assert!(!s.digit_is_shortcut(false));
        assert!(s.digit_is_shortcut(true));
        s.set_last_key_was_digit(true);
        assert!(!s.digit_is_shortcut(true));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut s = SelectionState::new();
        s.select(0, 1);
        s.set_last_key_was_digit(true);
        s.reset();
        assert_eq!(s, SelectionState::new());
        s.reset();
        assert_eq!(s, SelectionState::new());
    }
}
