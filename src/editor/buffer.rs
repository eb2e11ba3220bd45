//! The logical-line text buffer behind the editor screen.
//!
//! Lines never contain `\n`; the cursor is `(row, col)` with `col` counted in
//! characters, matching the offsets the wrap engine works in.

use crate::editor::wrap::LineProvider;

#[derive(Debug, Clone)]
pub struct EditBuffer {
    lines: Vec<String>,
    cursor: (usize, usize),
    dirty: bool,
}

fn byte_index(line: &str, col: usize) -> usize {
    line.char_indices()
        .nth(col)
        .map(|(i, _)| i)
        .unwrap_or(line.len())
}

fn char_len(line: &str) -> usize {
    line.chars().count()
}

impl EditBuffer {
    pub fn from_text(text: &str) -> Self {
        let mut lines: Vec<String> = text.split('\n').map(|l| l.to_string()).collect();
        if lines.is_empty() {
            lines.push(String::new());
        }
        Self {
            lines,
            cursor: (0, 0),
            dirty: false,
        }
    }

    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line(&self, row: usize) -> &str {
        self.lines.get(row).map(|s| s.as_str()).unwrap_or("")
    }

    pub fn cursor(&self) -> (usize, usize) {
        self.cursor
    }

    /// Moves the cursor, clamping to valid coordinates.
    pub fn set_cursor(&mut self, row: usize, col: usize) {
        let row = row.min(self.lines.len().saturating_sub(1));
        let col = col.min(char_len(&self.lines[row]));
        self.cursor = (row, col);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn insert_char(&mut self, c: char) {
        let (row, col) = self.cursor;
        let bi = byte_index(&self.lines[row], col);
        self.lines[row].insert(bi, c);
        self.cursor = (row, col + 1);
        self.dirty = true;
    }

    /// Inserts a single-line string at the cursor (citation keys, list
    /// prefixes). Text containing newlines goes through `insert_newline`.
    pub fn insert_str(&mut self, s: &str) {
        let (row, col) = self.cursor;
        let bi = byte_index(&self.lines[row], col);
        self.lines[row].insert_str(bi, s);
        self.cursor = (row, col + char_len(s));
        self.dirty = true;
    }

    pub fn insert_newline(&mut self) {
        let (row, col) = self.cursor;
        let bi = byte_index(&self.lines[row], col);
        let tail = self.lines[row].split_off(bi);
        self.lines.insert(row + 1, tail);
        self.cursor = (row + 1, 0);
        self.dirty = true;
    }

    pub fn backspace(&mut self) {
        let (row, col) = self.cursor;
        if col > 0 {
            let bi = byte_index(&self.lines[row], col - 1);
            self.lines[row].remove(bi);
            self.cursor = (row, col - 1);
            self.dirty = true;
        } else if row > 0 {
            let removed = self.lines.remove(row);
            let join_col = char_len(&self.lines[row - 1]);
            self.lines[row - 1].push_str(&removed);
            self.cursor = (row - 1, join_col);
            self.dirty = true;
        }
    }

    pub fn delete_forward(&mut self) {
        let (row, col) = self.cursor;
        if col < char_len(&self.lines[row]) {
            let bi = byte_index(&self.lines[row], col);
            self.lines[row].remove(bi);
            self.dirty = true;
        } else if row + 1 < self.lines.len() {
            let next = self.lines.remove(row + 1);
            self.lines[row].push_str(&next);
            self.dirty = true;
        }
    }

    pub fn move_left(&mut self) {
        let (row, col) = self.cursor;
        if col > 0 {
            self.cursor = (row, col - 1);
        } else if row > 0 {
            self.cursor = (row - 1, char_len(&self.lines[row - 1]));
        }
    }

    pub fn move_right(&mut self) {
        let (row, col) = self.cursor;
        if col < char_len(&self.lines[row]) {
            self.cursor = (row, col + 1);
        } else if row + 1 < self.lines.len() {
            self.cursor = (row + 1, 0);
        }
    }

    pub fn move_line_start(&mut self) {
        self.cursor.1 = 0;
    }

    pub fn move_line_end(&mut self) {
        self.cursor.1 = char_len(&self.lines[self.cursor.0]);
    }

    pub fn move_doc_start(&mut self) {
        self.cursor = (0, 0);
    }

    pub fn move_doc_end(&mut self) {
        let row = self.lines.len() - 1;
        self.cursor = (row, char_len(&self.lines[row]));
    }
}

impl LineProvider for EditBuffer {
    fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(|s| s.as_str())
    }

    fn line_count(&self) -> usize {
        self.lines.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_text_splits_lines_and_roundtrips() {
        let buf = EditBuffer::from_text("one\ntwo\n\nfour");
        assert_eq!(buf.lines().len(), 4);
        assert_eq!(buf.line(2), "");
        assert_eq!(buf.to_text(), "one\ntwo\n\nfour");
        assert!(!buf.is_dirty());
    }

    #[test]
    fn empty_text_still_has_one_line() {
        let buf = EditBuffer::from_text("");
        assert_eq!(buf.lines().len(), 1);
        assert_eq!(buf.to_text(), "");
    }

    #[test]
    fn insert_char_advances_cursor_and_marks_dirty() {
        let mut buf = EditBuffer::from_text("hllo");
        buf.set_cursor(0, 1);
        buf.insert_char('e');
        assert_eq!(buf.line(0), "hello");
        assert_eq!(buf.cursor(), (0, 2));
        assert!(buf.is_dirty());
    }

    #[test]
    fn insert_handles_multibyte_chars() {
        let mut buf = EditBuffer::from_text("日本");
        buf.set_cursor(0, 1);
        buf.insert_char('x');
        assert_eq!(buf.line(0), "日x本");
        assert_eq!(buf.cursor(), (0, 2));
    }

    #[test]
    fn insert_str_moves_cursor_by_char_count() {
        let mut buf = EditBuffer::from_text("see .");
        buf.set_cursor(0, 4);
        buf.insert_str("[@smith2021]");
        assert_eq!(buf.line(0), "see [@smith2021].");
        assert_eq!(buf.cursor(), (0, 16));
    }

    #[test]
    fn newline_splits_the_current_line() {
        let mut buf = EditBuffer::from_text("hello world");
        buf.set_cursor(0, 5);
        buf.insert_newline();
        assert_eq!(buf.line(0), "hello");
        assert_eq!(buf.line(1), " world");
        assert_eq!(buf.cursor(), (1, 0));
    }

    #[test]
    fn backspace_at_line_start_joins_lines() {
        let mut buf = EditBuffer::from_text("hello\nworld");
        buf.set_cursor(1, 0);
        buf.backspace();
        assert_eq!(buf.line(0), "helloworld");
        assert_eq!(buf.cursor(), (0, 5));
    }

    #[test]
    fn backspace_at_document_start_is_a_no_op() {
        let mut buf = EditBuffer::from_text("abc");
        buf.backspace();
        assert_eq!(buf.line(0), "abc");
        assert!(!buf.is_dirty());
    }

    #[test]
    fn delete_forward_at_line_end_joins_next_line() {
        let mut buf = EditBuffer::from_text("ab\ncd");
        buf.set_cursor(0, 2);
        buf.delete_forward();
        assert_eq!(buf.line(0), "abcd");
        assert_eq!(buf.cursor(), (0, 2));
    }

    #[test]
    fn horizontal_moves_cross_line_boundaries() {
        let mut buf = EditBuffer::from_text("ab\ncd");
        buf.set_cursor(0, 2);
        buf.move_right();
        assert_eq!(buf.cursor(), (1, 0));
        buf.move_left();
        assert_eq!(buf.cursor(), (0, 2));
    }

    #[test]
    fn set_cursor_clamps_out_of_range_coordinates() {
        let mut buf = EditBuffer::from_text("short\nlonger line");
        buf.set_cursor(10, 99);
        assert_eq!(buf.cursor(), (1, 11));
    }

    #[test]
    fn line_provider_reports_lines_and_count() {
        let buf = EditBuffer::from_text("a\nb\nc");
        assert_eq!(LineProvider::line_count(&buf), 3);
        assert_eq!(LineProvider::line(&buf, 1), Some("b"));
        assert_eq!(LineProvider::line(&buf, 9), None);
    }
}
