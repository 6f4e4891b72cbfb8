//! Raw keystroke buffer with cursor tracking.
//!
//! The buffer stores exactly what the user typed since the last commit, in the
//! scheme's ASCII input alphabet (e.g. "namaskaram"). It is the input to
//! transliteration and is never unicode-decoded or displayed directly.
//!
//! The cursor is `None` while nothing is being edited. Every read goes through
//! [`InputBuffer::cursor`], which normalizes the unset cursor to the end of
//! the buffer, so arithmetic never happens on an unset value.

use std::fmt;

/// Raw input bytes plus an optional cursor offset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBuffer {
    bytes: Vec<u8>,
    cursor: Option<usize>,
}

impl InputBuffer {
    /// Create a new empty buffer with an unset cursor.
    pub fn new() -> Self {
        Self {
            bytes: Vec::new(),
            cursor: None,
        }
    }

    /// Raw bytes typed so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Cursor offset, normalized: an unset cursor reads as the end.
    pub fn cursor(&self) -> usize {
        self.cursor.unwrap_or(self.bytes.len()).min(self.bytes.len())
    }

    /// Whether the cursor has been placed explicitly since the last reset.
    pub fn is_cursor_set(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Byte immediately before the cursor.
    pub fn byte_before_cursor(&self) -> Option<u8> {
        let cursor = self.cursor();
        if cursor == 0 {
            None
        } else {
            self.bytes.get(cursor - 1).copied()
        }
    }

    /// Clear the buffer and unset the cursor.
    pub fn clear(&mut self) {
        self.bytes.clear();
        self.cursor = None;
    }

    /// Insert a byte at `pos` (clamped to the buffer length).
    ///
    /// Inserting at or before the cursor shifts the cursor right by one, so
    /// insertion at the cursor advances it past the new byte.
    pub fn insert_at(&mut self, pos: usize, byte: u8) {
        let cursor = self.cursor();
        let pos = pos.min(self.bytes.len());
        self.bytes.insert(pos, byte);
        self.cursor = Some(if pos <= cursor { cursor + 1 } else { cursor });
    }

    /// Remove the byte at `pos`. Returns the removed byte, or `None` when
    /// `pos` is out of range.
    ///
    /// Removing a byte before the cursor moves the cursor left by one;
    /// removing at or after the cursor leaves it where it is.
    pub fn remove_at(&mut self, pos: usize) -> Option<u8> {
        if pos >= self.bytes.len() {
            return None;
        }
        let cursor = self.cursor();
        let removed = self.bytes.remove(pos);
        self.cursor = Some(if pos < cursor { cursor - 1 } else { cursor });
        Some(removed)
    }

    /// Move the cursor by `delta` bytes, clamped to `[0, len]`.
    /// Returns true if the cursor moved.
    pub fn move_cursor(&mut self, delta: isize) -> bool {
        let current = self.cursor();
        let target = if delta.is_negative() {
            current.saturating_sub(delta.unsigned_abs())
        } else {
            current.saturating_add(delta as usize).min(self.bytes.len())
        };
        self.cursor = Some(target);
        target != current
    }

    /// Insert a byte at the cursor.
    pub fn insert(&mut self, byte: u8) {
        self.insert_at(self.cursor(), byte);
    }

    /// Delete the byte before the cursor (backspace).
    /// Returns true if a byte was deleted.
    pub fn delete_before(&mut self) -> bool {
        let cursor = self.cursor();
        cursor > 0 && self.remove_at(cursor - 1).is_some()
    }

    /// Delete the byte at the cursor (forward delete).
    /// Returns true if a byte was deleted.
    pub fn delete_after(&mut self) -> bool {
        self.remove_at(self.cursor()).is_some()
    }

    pub fn move_to_start(&mut self) {
        self.cursor = Some(0);
    }

    pub fn move_to_end(&mut self) {
        self.cursor = Some(self.bytes.len());
    }
}

impl fmt::Display for InputBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Only printable ASCII is ever accepted, so a byte is a char.
        for &b in &self.bytes {
            fmt::Write::write_char(f, b as char)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(s: &str) -> InputBuffer {
        let mut b = InputBuffer::new();
        for byte in s.bytes() {
            b.insert(byte);
        }
        b
    }

    #[test]
    fn test_new_buffer_has_unset_cursor() {
        let b = InputBuffer::new();
        assert!(b.is_empty());
        assert!(!b.is_cursor_set());
        assert_eq!(b.cursor(), 0);
    }

    #[test]
    fn test_insert_advances_cursor() {
        let b = buffer("nama");
        assert_eq!(b.to_string(), "nama");
        assert_eq!(b.cursor(), 4);
    }

    #[test]
    fn test_insert_in_middle() {
        let mut b = buffer("nma");
        b.move_to_start();
        b.move_cursor(1);
        b.insert(b'a');
        assert_eq!(b.to_string(), "nama");
        assert_eq!(b.cursor(), 2);
    }

    #[test]
    fn test_insert_after_cursor_keeps_cursor() {
        let mut b = buffer("ab");
        b.move_to_start();
        b.insert_at(2, b'c');
        assert_eq!(b.to_string(), "abc");
        assert_eq!(b.cursor(), 0);
    }

    #[test]
    fn test_backspace_and_delete() {
        let mut b = buffer("abcd");
        b.move_cursor(-2);
        assert!(b.delete_before());
        assert_eq!(b.to_string(), "acd");
        assert_eq!(b.cursor(), 1);

        assert!(b.delete_after());
        assert_eq!(b.to_string(), "ad");
        assert_eq!(b.cursor(), 1);

        b.move_to_start();
        assert!(!b.delete_before());
        b.move_to_end();
        assert!(!b.delete_after());
    }

    #[test]
    fn test_move_cursor_clamps() {
        let mut b = buffer("abc");
        assert!(!b.move_cursor(5));
        assert_eq!(b.cursor(), 3);
        assert!(b.move_cursor(-10));
        assert_eq!(b.cursor(), 0);
        assert!(!b.move_cursor(-1));
        assert!(b.move_cursor(isize::MAX));
        assert_eq!(b.cursor(), 3);
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut b = buffer("a");
        assert_eq!(b.remove_at(1), None);
        assert_eq!(b.remove_at(0), Some(b'a'));
        assert!(b.is_empty());
        assert_eq!(b.cursor(), 0);
    }

    #[test]
    fn test_clear_unsets_cursor() {
        let mut b = buffer("abc");
        b.move_to_start();
        b.clear();
        assert!(b.is_empty());
        assert!(!b.is_cursor_set());
        assert_eq!(b.cursor(), 0);
    }

    #[test]
    fn test_cursor_invariant_over_mixed_edits() {
        let mut b = InputBuffer::new();
        let ops: [(u8, isize); 12] = [
            (b'a', 0),
            (b'b', -1),
            (b'c', 3),
            (0, -4),
            (b'd', 0),
            (1, 0),
            (2, 0),
            (b'e', 2),
            (1, 0),
            (1, 0),
            (2, 0),
            (b'f', -7),
        ];
        for (op, delta) in ops {
            match op {
                0 => {
                    b.move_cursor(delta);
                }
                1 => {
                    b.delete_before();
                }
                2 => {
                    b.delete_after();
                }
                byte => {
                    b.move_cursor(delta);
                    b.insert(byte);
                }
            }
            assert!(b.cursor() <= b.len());
        }
    }
}
