use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::trace;

/// Single line text input. The cursor counts characters, not bytes.
#[derive(Default)]
pub struct Inputter {
    current_input: String,
    cursor_pos: usize,
    finished: bool,
    canceled: bool,
    changed: bool,
}

#[derive(Default, Clone, Debug, PartialEq)]
pub struct InputResult {
    pub input: String,
    pub finished: bool,
    pub canceled: bool,
    /// The text differs from before the last key.
    pub changed: bool,
    pub cursor_pos: usize,
}

impl Inputter {
    pub fn read(&mut self, key: KeyEvent) -> InputResult {
        self.changed = false;
        match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => self.finished = true,
            (KeyCode::Esc, _) => {
                self.canceled = true;
                self.finished = true;
            }
            (KeyCode::Backspace, _) => self.backspace(),
            (KeyCode::Delete, _) => self.delete(),
            (KeyCode::Left, _) => self.cursor_pos = self.cursor_pos.saturating_sub(1),
            (KeyCode::Right, _) => self.cursor_pos = (self.cursor_pos + 1).min(self.len()),
            (KeyCode::Home, _) => self.cursor_pos = 0,
            (KeyCode::End, _) => self.cursor_pos = self.len(),
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.changed = !self.current_input.is_empty();
                self.current_input.clear();
                self.cursor_pos = 0;
            }
            (KeyCode::Char(c), m) if !m.contains(KeyModifiers::CONTROL) => self.insert(c),
            (code, _) => trace!("Input ignores {code:?}"),
        }
        self.get()
    }

    /// Replaces the text and moves the cursor to its end.
    pub fn set(&mut self, s: &str) {
        self.current_input = s.to_string();
        self.cursor_pos = self.len();
    }

    pub fn get(&self) -> InputResult {
        InputResult {
            input: self.current_input.clone(),
            finished: self.finished,
            canceled: self.canceled,
            changed: self.changed,
            cursor_pos: self.cursor_pos,
        }
    }

    pub fn clear(&mut self) {
        self.current_input.clear();
        self.cursor_pos = 0;
        self.finished = false;
        self.canceled = false;
        self.changed = false;
    }

    fn len(&self) -> usize {
        self.current_input.chars().count()
    }

    fn insert(&mut self, c: char) {
        let at = self.byte_pos(self.cursor_pos);
        self.current_input.insert(at, c);
        self.cursor_pos += 1;
        self.changed = true;
    }

    fn backspace(&mut self) {
        if self.cursor_pos > 0 {
            self.cursor_pos -= 1;
            let at = self.byte_pos(self.cursor_pos);
            self.current_input.remove(at);
            self.changed = true;
        }
    }

    fn delete(&mut self) {
        if self.cursor_pos < self.len() {
            let at = self.byte_pos(self.cursor_pos);
            self.current_input.remove(at);
            self.changed = true;
        }
    }

    fn byte_pos(&self, char_pos: usize) -> usize {
        self.current_input
            .char_indices()
            .nth(char_pos)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.current_input.len())
    }
}
