//! Form field component for user input

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::tui::ui::Styles;
use crate::validation::ValidationErrors;

/// Type of form field
#[derive(Debug, Clone, PartialEq)]
pub enum FormFieldType {
    Text,
    Date,
    /// Input is shown as asterisks
    Password,
    /// Fixed options, cycled with the arrow keys
    Choice(Vec<String>),
}

/// Individual form field
#[derive(Debug, Clone)]
pub struct FormField {
    /// Name used to match validation errors
    pub key: &'static str,
    pub label: String,
    pub value: String,
    pub placeholder: String,
    pub field_type: FormFieldType,
    pub is_focused: bool,
    /// Cursor position in characters
    pub cursor_position: usize,
    pub validation_error: Option<String>,
}

impl FormField {
    pub fn new(key: &'static str, label: &str, field_type: FormFieldType) -> Self {
        Self {
            key,
            label: label.to_string(),
            value: String::new(),
            placeholder: String::new(),
            field_type,
            is_focused: false,
            cursor_position: 0,
            validation_error: None,
        }
    }

    pub fn text(key: &'static str, label: &str) -> Self {
        Self::new(key, label, FormFieldType::Text)
    }

    pub fn choice(key: &'static str, label: &str, options: &[&str]) -> Self {
        let options = options.iter().map(|o| o.to_string()).collect();
        Self::new(key, label, FormFieldType::Choice(options))
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = placeholder.to_string();
        self
    }

    pub fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
        self.cursor_position = self.value.chars().count();
        self.validation_error = None;
    }

    pub fn set_focus(&mut self, focused: bool) {
        self.is_focused = focused;
    }

    fn byte_index(&self) -> usize {
        self.value
            .char_indices()
            .nth(self.cursor_position)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    pub fn insert_char(&mut self, c: char) {
        if matches!(self.field_type, FormFieldType::Choice(_)) {
            return;
        }
        let index = self.byte_index();
        self.value.insert(index, c);
        self.cursor_position += 1;
        self.validation_error = None;
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            let index = self.byte_index();
            self.value.remove(index);
            self.validation_error = None;
        }
    }

    pub fn delete_char_forward(&mut self) {
        if self.cursor_position < self.value.chars().count() {
            let index = self.byte_index();
            self.value.remove(index);
            self.validation_error = None;
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.value.chars().count() {
            self.cursor_position += 1;
        }
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor_position = 0;
        self.validation_error = None;
    }

    /// Step through the options of a choice field; an empty value starts at the first one
    pub fn cycle_choice(&mut self, forward: bool) {
        let FormFieldType::Choice(options) = &self.field_type else {
            return;
        };
        if options.is_empty() {
            return;
        }
        let current = options.iter().position(|o| *o == self.value);
        let next = match (current, forward) {
            (None, _) => 0,
            (Some(i), true) => (i + 1) % options.len(),
            (Some(0), false) => options.len() - 1,
            (Some(i), false) => i - 1,
        };
        self.value = options[next].clone();
        self.validation_error = None;
    }

    fn display_value(&self) -> String {
        match self.field_type {
            FormFieldType::Password => "*".repeat(self.value.chars().count()),
            FormFieldType::Choice(_) if !self.value.is_empty() => format!("< {} >", self.value),
            _ => self.value.clone(),
        }
    }

    /// Render the form field
    pub fn render(&self, f: &mut Frame, area: Rect) {
        let show_placeholder = self.value.is_empty() && !self.placeholder.is_empty();
        let display_text = if show_placeholder {
            self.placeholder.clone()
        } else {
            self.display_value()
        };

        let border_style = if self.is_focused {
            Styles::border(true)
        } else if self.validation_error.is_some() {
            Styles::error()
        } else {
            Styles::border(false)
        };

        let title = match &self.validation_error {
            Some(error) => format!("{} - {}", self.label, error),
            None => self.label.clone(),
        };

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style);

        let text_style = if show_placeholder {
            Styles::muted()
        } else {
            Style::default()
        };

        f.render_widget(Paragraph::new(display_text).style(text_style).block(block), area);

        if self.is_focused && !matches!(self.field_type, FormFieldType::Choice(_)) {
            let cursor_x = area.x + 1 + self.cursor_position as u16;
            let cursor_y = area.y + 1;
            if cursor_x < area.x + area.width.saturating_sub(1) {
                f.set_cursor(cursor_x, cursor_y);
            }
        }
    }
}

/// Form container that manages multiple fields
#[derive(Debug, Clone)]
pub struct Form {
    pub fields: Vec<FormField>,
    pub current_field: usize,
}

impl Form {
    pub fn new(fields: Vec<FormField>) -> Self {
        let mut form = Self {
            fields,
            current_field: 0,
        };
        form.update_focus();
        form
    }

    fn update_focus(&mut self) {
        for (i, field) in self.fields.iter_mut().enumerate() {
            field.set_focus(i == self.current_field);
        }
    }

    pub fn value(&self, key: &str) -> &str {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.value.as_str())
            .unwrap_or("")
    }

    pub fn set_value(&mut self, key: &str, value: &str) {
        if let Some(field) = self.fields.iter_mut().find(|f| f.key == key) {
            field.set_value(value);
        }
    }

    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % self.fields.len().max(1);
        self.update_focus();
    }

    pub fn previous_field(&mut self) {
        let total = self.fields.len().max(1);
        self.current_field = (self.current_field + total - 1) % total;
        self.update_focus();
    }

    pub fn reset(&mut self) {
        for field in &mut self.fields {
            field.clear();
        }
        self.current_field = 0;
        self.update_focus();
    }

    /// Attach each error to its field; focus moves to the first failing one
    pub fn apply_errors(&mut self, errors: &ValidationErrors) {
        for field in &mut self.fields {
            field.validation_error = errors.for_field(field.key).map(str::to_string);
        }
        if let Some(first) = self.fields.iter().position(|f| f.validation_error.is_some()) {
            self.current_field = first;
            self.update_focus();
        }
    }

    pub fn has_errors(&self) -> bool {
        self.fields.iter().any(|f| f.validation_error.is_some())
    }

    /// Editing keys; returns false for keys the form does not use (Enter, Esc, ...)
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let Some(field) = self.fields.get_mut(self.current_field) else {
            return false;
        };
        let is_choice = matches!(field.field_type, FormFieldType::Choice(_));
        match key.code {
            KeyCode::Tab | KeyCode::Down => self.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.previous_field(),
            KeyCode::Left if is_choice => field.cycle_choice(false),
            KeyCode::Right | KeyCode::Char(' ') if is_choice => field.cycle_choice(true),
            KeyCode::Left => field.move_cursor_left(),
            KeyCode::Right => field.move_cursor_right(),
            KeyCode::Home => field.cursor_position = 0,
            KeyCode::End => field.cursor_position = field.value.chars().count(),
            KeyCode::Backspace => field.delete_char(),
            KeyCode::Delete => field.delete_char_forward(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                field.insert_char(c)
            }
            _ => return false,
        }
        true
    }

    /// Fields stacked vertically, three rows each
    pub fn render(&self, f: &mut Frame, area: Rect) {
        let mut constraints: Vec<Constraint> =
            self.fields.iter().map(|_| Constraint::Length(3)).collect();
        constraints.push(Constraint::Min(0));
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        for (field, chunk) in self.fields.iter().zip(chunks.iter()) {
            field.render(f, *chunk);
        }
    }
}
