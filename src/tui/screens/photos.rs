//! Photos tab: upload images from disk and save stored ones locally

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    widgets::Paragraph,
    Frame,
};
use std::path::PathBuf;

use crate::columns::photo_columns;
use crate::models::Birthday;
use crate::table::DataTable;
use crate::tui::{
    components::{FormField, TableWidget},
    events::ScreenAction,
    ui::Styles,
};

pub struct PhotosScreen {
    pub table: TableWidget<Birthday>,
    /// Open path prompt: record id and the path being typed
    pub upload: Option<(String, FormField)>,
    photo_dir: PathBuf,
}

impl PhotosScreen {
    pub fn new(rows_per_page_options: &[usize], photo_dir: PathBuf) -> Self {
        let table = DataTable::new(photo_columns(true))
            .with_empty_message("No birthdays to attach photos to")
            .with_rows_per_page_options(rows_per_page_options);
        Self {
            table: TableWidget::new("Photos", table),
            upload: None,
            photo_dir,
        }
    }

    pub fn is_capturing_input(&self) -> bool {
        self.upload.is_some() || self.table.searching
    }

    pub fn handle_key(&mut self, key: KeyEvent, data: &[Birthday]) -> ScreenAction {
        if let Some((id, field)) = self.upload.as_mut() {
            match key.code {
                KeyCode::Esc => self.upload = None,
                KeyCode::Enter => {
                    let raw = field.value.trim().to_string();
                    if raw.is_empty() {
                        field.validation_error = Some("Enter the path of an image file".to_string());
                        return ScreenAction::None;
                    }
                    let path = PathBuf::from(raw);
                    if !path.is_file() {
                        field.validation_error = Some("File not found".to_string());
                        return ScreenAction::None;
                    }
                    let id = id.clone();
                    self.upload = None;
                    return ScreenAction::UploadPhoto { id, path };
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

        let selected = self.table.selected(data);
        match (key.code, selected) {
            (KeyCode::Char('u') | KeyCode::Enter, Some(birthday)) => {
                let mut field = FormField::text("path", &format!("Image file for {}", birthday.name))
                    .with_placeholder("/path/to/photo.jpg");
                field.set_focus(true);
                self.upload = Some((birthday.id.clone(), field));
            }
            (KeyCode::Char('s'), Some(birthday)) if birthday.photos == 0 => {
                return ScreenAction::SetError(format!("{} has no photos yet", birthday.name));
            }
            (KeyCode::Char('s'), Some(birthday)) => {
                return ScreenAction::SavePhotos {
                    id: birthday.id.clone(),
                    count: birthday.photos,
                };
            }
            (KeyCode::Char('u') | KeyCode::Char('s') | KeyCode::Enter, None) => {
                return ScreenAction::SetError("Select a birthday first".to_string());
            }
            _ => {}
        }
        ScreenAction::None
    }

    pub fn draw(&mut self, f: &mut Frame, area: Rect, data: &[Birthday]) {
        let prompt_height = if self.upload.is_some() { 3 } else { 0 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(prompt_height),
                Constraint::Length(1),
            ])
            .split(area);

        self.table.render(f, chunks[0], data, self.upload.is_none());

        if let Some((_, field)) = &self.upload {
            field.render(f, chunks[1]);
        }

        let hint = if self.upload.is_some() {
            "Enter: upload  Esc: cancel".to_string()
        } else {
            format!(
                "u/Enter: upload photo  s: save photos to {}  /: search  ←→: page",
                self.photo_dir.display()
            )
        };
        f.render_widget(Paragraph::new(hint).style(Styles::muted()), chunks[2]);
    }
}
