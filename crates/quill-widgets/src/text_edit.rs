//! Shared text buffer with a char-indexed cursor.
//!
//! `TextEditState` backs both the single-line tag field and the multi-line
//! article body. Offsets are char indices, never byte indices, so splicing
//! link text around multibyte titles cannot split a code point.

use std::ops::Range;

/// Text buffer plus cursor. Newlines are ordinary characters; the line-aware
/// movements (`move_up`, `move_down`, `move_line_start`, `move_line_end`)
/// treat them as row separators.
#[derive(Debug, Clone, Default)]
pub struct TextEditState {
    chars: Vec<char>,
    cursor: usize,
}

impl TextEditState {
    /// Create a new empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current value as a String.
    pub fn value(&self) -> String {
        self.chars.iter().collect()
    }

    /// Replace the value and move the cursor to the end.
    pub fn set_value(&mut self, s: &str) {
        self.chars = s.chars().collect();
        self.cursor = self.chars.len();
    }

    /// Get the character buffer.
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Current cursor position (char index, 0-based).
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Set cursor position, clamped to 0..=len.
    pub fn set_cursor(&mut self, pos: usize) {
        self.cursor = pos.min(self.chars.len());
    }

    /// Number of characters.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Insert a character at the cursor and advance past it.
    pub fn insert_char(&mut self, c: char) {
        self.chars.insert(self.cursor, c);
        self.cursor += 1;
    }

    /// Insert a string at the cursor and advance past it.
    /// Returns the number of chars inserted.
    pub fn insert_str(&mut self, s: &str) -> usize {
        let before = self.chars.len();
        self.chars.splice(self.cursor..self.cursor, s.chars());
        let inserted = self.chars.len() - before;
        self.cursor += inserted;
        inserted
    }

    /// Replace `range` (char indices) with `replacement` and put the cursor
    /// right after the inserted text. Characters outside `range` keep their
    /// relative order and content.
    ///
    /// The range is clamped to the buffer.
    pub fn splice(&mut self, range: Range<usize>, replacement: &str) {
        let end = range.end.min(self.chars.len());
        let start = range.start.min(end);
        let before = self.chars.len();
        self.chars.splice(start..end, replacement.chars());
        let inserted = self.chars.len() + (end - start) - before;
        self.cursor = start + inserted;
    }

    /// Delete the character before the cursor (backspace).
    /// Returns true if a character was deleted.
    pub fn delete_back(&mut self) -> bool {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.chars.remove(self.cursor);
            true
        } else {
            false
        }
    }

    /// Delete the character at the cursor (delete key).
    /// Returns true if a character was deleted.
    pub fn delete_forward(&mut self) -> bool {
        if self.cursor < self.chars.len() {
            self.chars.remove(self.cursor);
            true
        } else {
            false
        }
    }

    /// Move cursor left one character. Returns true if it moved.
    pub fn move_left(&mut self) -> bool {
        if self.cursor > 0 {
            self.cursor -= 1;
            true
        } else {
            false
        }
    }

    /// Move cursor right one character. Returns true if it moved.
    pub fn move_right(&mut self) -> bool {
        if self.cursor < self.chars.len() {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// Move cursor to the start of the current line.
    pub fn move_line_start(&mut self) {
        self.cursor = self.line_start(self.cursor);
    }

    /// Move cursor to the end of the current line.
    pub fn move_line_end(&mut self) {
        self.cursor = self.line_end(self.cursor);
    }

    /// Move cursor to the same column on the previous line (clamped to its
    /// length). Returns false on the first line.
    pub fn move_up(&mut self) -> bool {
        let start = self.line_start(self.cursor);
        if start == 0 {
            return false;
        }
        let column = self.cursor - start;
        let prev_start = self.line_start(start - 1);
        let prev_len = (start - 1) - prev_start;
        self.cursor = prev_start + column.min(prev_len);
        true
    }

    /// Move cursor to the same column on the next line (clamped to its
    /// length). Returns false on the last line.
    pub fn move_down(&mut self) -> bool {
        let end = self.line_end(self.cursor);
        if end >= self.chars.len() {
            return false;
        }
        let column = self.cursor - self.line_start(self.cursor);
        let next_start = end + 1;
        let next_len = self.line_end(next_start) - next_start;
        self.cursor = next_start + column.min(next_len);
        true
    }

    /// (row, column) of the cursor, both 0-based, in chars.
    pub fn cursor_position(&self) -> (usize, usize) {
        let row = self.chars[..self.cursor].iter().filter(|&&c| c == '\n').count();
        (row, self.cursor - self.line_start(self.cursor))
    }

    /// Split the buffer into lines (without the newline characters).
    pub fn lines(&self) -> Vec<&[char]> {
        self.chars.split(|&c| c == '\n').collect()
    }

    /// Clear the buffer and reset the cursor.
    pub fn clear(&mut self) {
        self.chars.clear();
        self.cursor = 0;
    }

    fn line_start(&self, pos: usize) -> usize {
        self.chars[..pos]
            .iter()
            .rposition(|&c| c == '\n')
            .map_or(0, |i| i + 1)
    }

    fn line_end(&self, pos: usize) -> usize {
        self.chars[pos..]
            .iter()
            .position(|&c| c == '\n')
            .map_or(self.chars.len(), |i| pos + i)
    }
}
