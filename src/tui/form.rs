use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

// ── Single-line text field ────────────────────────────────────────────

/// An editable line with a byte-offset cursor that always sits on a char
/// boundary.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TextField {
    value: String,
    cursor: usize,
}

impl TextField {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// The value with a block cursor drawn in place.
    pub fn with_cursor(&self) -> String {
        let (before, after) = self.value.split_at(self.cursor.min(self.value.len()));
        format!("{before}\u{2588}{after}")
    }

    fn prev_char_start(&self) -> usize {
        self.value[..self.cursor]
            .char_indices()
            .next_back()
            .map_or(0, |(i, _)| i)
    }

    fn next_char_end(&self) -> usize {
        self.value[self.cursor..]
            .chars()
            .next()
            .map_or(self.cursor, |c| self.cursor + c.len_utf8())
    }

    fn delete_back_to(&mut self, start: usize) {
        self.value.drain(start..self.cursor);
        self.cursor = start;
    }

    /// Apply an editing key. Returns `false` for keys a text field has no
    /// use for, so the caller can handle them (Enter, Tab, Esc, ...).
    pub fn edit(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        self.cursor = self.cursor.min(self.value.len());
        let ctrl = modifiers.contains(KeyModifiers::CONTROL);
        let alt = modifiers.contains(KeyModifiers::ALT);
        let sup = modifiers.contains(KeyModifiers::SUPER);

        match code {
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.value.len(),
            KeyCode::Left if sup => self.cursor = 0,
            KeyCode::Right if sup => self.cursor = self.value.len(),
            KeyCode::Left if alt => self.cursor = word_start_before(&self.value, self.cursor),
            KeyCode::Right if alt => self.cursor = word_start_after(&self.value, self.cursor),
            KeyCode::Left => self.cursor = self.prev_char_start(),
            KeyCode::Right => self.cursor = self.next_char_end(),
            KeyCode::Char('a') if ctrl => self.cursor = 0,
            KeyCode::Char('e') if ctrl => self.cursor = self.value.len(),

            KeyCode::Backspace if alt => {
                self.delete_back_to(word_start_before(&self.value, self.cursor));
            }
            KeyCode::Char('w') if ctrl => {
                self.delete_back_to(word_start_before(&self.value, self.cursor));
            }
            KeyCode::Backspace if sup => self.delete_back_to(0),
            KeyCode::Char('u') if ctrl => self.delete_back_to(0),
            KeyCode::Backspace => self.delete_back_to(self.prev_char_start()),
            KeyCode::Delete => {
                let end = self.next_char_end();
                self.value.drain(self.cursor..end);
            }

            KeyCode::Char(c) if !ctrl && !alt => {
                self.value.insert(self.cursor, c);
                self.cursor += c.len_utf8();
            }
            _ => return false,
        }
        true
    }
}

/// Start of the word ending at or before `pos`, skipping trailing spaces.
fn word_start_before(s: &str, pos: usize) -> usize {
    let head = s[..pos].trim_end();
    head.char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map_or(0, |(i, c)| i + c.len_utf8())
}

/// Start of the next word after `pos`, or the end of the line.
fn word_start_after(s: &str, pos: usize) -> usize {
    let tail = &s[pos..];
    let Some(gap) = tail.find(char::is_whitespace) else {
        return s.len();
    };
    tail[gap..]
        .find(|c: char| !c.is_whitespace())
        .map_or(s.len(), |word| pos + gap + word)
}

// ── Rendering helpers ─────────────────────────────────────────────────

/// Clear a centred `width`×`height` box, draw its border and title, and
/// return the area inside the border.
pub fn render_modal(
    frame: &mut Frame,
    title: &str,
    border_style: Style,
    width: u16,
    height: u16,
) -> Rect {
    let screen = frame.area();
    let w = width.min(screen.width.saturating_sub(4));
    let h = height.min(screen.height.saturating_sub(4));
    let panel = Rect::new(
        screen.x + screen.width.saturating_sub(w) / 2,
        screen.y + screen.height.saturating_sub(h) / 2,
        w,
        h,
    );

    frame.render_widget(Clear, panel);
    let block = Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(border_style);
    let inner = block.inner(panel);
    frame.render_widget(block, panel);
    inner
}

/// One line of `key description` pairs.
pub fn render_hints(
    frame: &mut Frame,
    area: Rect,
    hints: &[(&str, &str)],
    key_style: Style,
    desc_style: Style,
) {
    let spans: Vec<Span<'_>> = hints
        .iter()
        .flat_map(|&(key, desc)| {
            [
                Span::styled(key, key_style),
                Span::styled(desc, desc_style),
            ]
        })
        .collect();
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
