//! Wishes tab: one greeting text per record

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    widgets::Paragraph,
    Frame,
};

use crate::columns::wish_columns;
use crate::models::Birthday;
use crate::table::DataTable;
use crate::tui::{
    components::{FormField, TableWidget},
    events::ScreenAction,
    ui::Styles,
};

pub struct WishesScreen {
    pub table: TableWidget<Birthday>,
    /// Open editor: record id and the wish being typed
    pub editor: Option<(String, FormField)>,
}

impl WishesScreen {
    pub fn new(rows_per_page_options: &[usize]) -> Self {
        let table = DataTable::new(wish_columns(true))
            .with_empty_message("No birthdays to send wishes to")
            .with_rows_per_page_options(rows_per_page_options);
        Self {
            table: TableWidget::new("Wishes", table),
            editor: None,
        }
    }

    pub fn is_capturing_input(&self) -> bool {
        self.editor.is_some() || self.table.searching
    }

    pub fn handle_key(&mut self, key: KeyEvent, data: &[Birthday]) -> ScreenAction {
        if let Some((id, field)) = self.editor.as_mut() {
            match key.code {
                KeyCode::Esc => self.editor = None,
                KeyCode::Enter => {
                    let wish = field.value.trim().to_string();
                    if wish.is_empty() {
                        field.validation_error = Some("Wish is required".to_string());
                        return ScreenAction::None;
                    }
                    let id = id.clone();
                    self.editor = None;
                    return ScreenAction::SaveWish { id, wish };
                }
                KeyCode::Backspace => field.delete_char(),
                KeyCode::Delete => field.delete_char_forward(),
                KeyCode::Left => field.move_cursor_left(),
                KeyCode::Right => field.move_cursor_right(),
                KeyCode::Char(c) => field.insert_char(c),
                _ => {}
            }
            return ScreenAction::None;
        }

        if self.table.handle_key(key, data) {
            return ScreenAction::None;
        }

        if let KeyCode::Char('w') | KeyCode::Enter = key.code {
            match self.table.selected(data) {
                Some(birthday) => {
                    let mut field = FormField::text("wish", &format!("Wish for {}", birthday.name));
                    field.set_value(birthday.wish.as_deref().unwrap_or(""));
                    field.set_focus(true);
                    self.editor = Some((birthday.id.clone(), field));
                }
                None => return ScreenAction::SetError("Select a birthday first".to_string()),
            }
        }
        ScreenAction::None
    }

    pub fn draw(&mut self, f: &mut Frame, area: Rect, data: &[Birthday]) {
        let editor_height = if self.editor.is_some() { 3 } else { 0 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(editor_height),
                Constraint::Length(1),
            ])
            .split(area);

        self.table.render(f, chunks[0], data, self.editor.is_none());

        if let Some((_, field)) = &self.editor {
            field.render(f, chunks[1]);
        }

        let hint = if self.editor.is_some() {
            "Enter: save wish  Esc: cancel"
        } else {
            "w/Enter: write wish  /: search  ←→: page  r: rows per page"
        };
        f.render_widget(Paragraph::new(hint).style(Styles::muted()), chunks[2]);
    }
}
