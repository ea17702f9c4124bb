//! Birthday details: add/edit form and the records table

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::columns::birthday_columns;
use crate::models::{age_on, Birthday, Gender, Relationship, DATE_FORMAT};
use crate::table::DataTable;
use crate::tui::{
    components::{Form, FormField, FormFieldType, TableWidget},
    events::ScreenAction,
    ui::Styles,
};
use crate::validation::BirthdayForm;

#[derive(Debug, Clone, PartialEq)]
pub enum DetailsMode {
    Browse,
    /// Form open; `None` creates a record, `Some(id)` edits one
    Editing(Option<String>),
}

pub struct DetailsScreen {
    pub table: TableWidget<Birthday>,
    pub form: Form,
    pub mode: DetailsMode,
    /// Record waiting for a y/n delete confirmation: (id, name)
    pub confirm_delete: Option<(String, String)>,
}

impl DetailsScreen {
    pub fn new(show_added_by: bool, rows_per_page_options: &[usize]) -> Self {
        let table = DataTable::new(birthday_columns(show_added_by, true))
            .with_empty_message("No birthdays yet. Press a to add one.")
            .with_rows_per_page_options(rows_per_page_options);
        Self {
            table: TableWidget::new("Birthdays", table),
            form: birthday_form(),
            mode: DetailsMode::Browse,
            confirm_delete: None,
        }
    }

    /// True while keys are captured by a form, the search box or a prompt
    pub fn is_capturing_input(&self) -> bool {
        self.mode != DetailsMode::Browse || self.table.searching || self.confirm_delete.is_some()
    }

    pub fn open_create(&mut self) {
        self.form.reset();
        self.mode = DetailsMode::Editing(None);
    }

    pub fn open_edit(&mut self, birthday: &Birthday) {
        let values = BirthdayForm::from_birthday(birthday);
        self.form.reset();
        self.form.set_value("name", &values.name);
        self.form.set_value("gender", &values.gender);
        self.form.set_value("relationship", &values.relationship);
        self.form.set_value("contact", &values.contact);
        self.form.set_value("dob", &values.dob);
        self.form.set_value("email", &values.email);
        self.mode = DetailsMode::Editing(Some(birthday.id.clone()));
    }

    pub fn close_form(&mut self) {
        self.form.reset();
        self.mode = DetailsMode::Browse;
    }

    fn form_values(&self) -> BirthdayForm {
        BirthdayForm {
            name: self.form.value("name").to_string(),
            gender: self.form.value("gender").to_string(),
            relationship: self.form.value("relationship").to_string(),
            contact: self.form.value("contact").to_string(),
            dob: self.form.value("dob").to_string(),
            email: self.form.value("email").to_string(),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, data: &[Birthday], today: NaiveDate) -> ScreenAction {
        if let Some((id, _)) = self.confirm_delete.take() {
            return match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => ScreenAction::DeleteBirthday(id),
                _ => ScreenAction::None,
            };
        }

        if let DetailsMode::Editing(editing) = &self.mode {
            let editing = editing.clone();
            return match key.code {
                KeyCode::Esc => {
                    self.close_form();
                    ScreenAction::None
                }
                KeyCode::Enter => self.submit(editing, today),
                _ => {
                    self.form.handle_key(key);
                    ScreenAction::None
                }
            };
        }

        if self.table.handle_key(key, data) {
            return ScreenAction::None;
        }

        match key.code {
            KeyCode::Char('a') => self.open_create(),
            KeyCode::Char('e') | KeyCode::Enter => match self.table.selected(data) {
                Some(birthday) => self.open_edit(birthday),
                None => return ScreenAction::SetError("Select a birthday to edit".to_string()),
            },
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(birthday) = self.table.selected(data) {
                    self.confirm_delete = Some((birthday.id.clone(), birthday.name.clone()));
                }
            }
            _ => {}
        }
        ScreenAction::None
    }

    fn submit(&mut self, editing: Option<String>, today: NaiveDate) -> ScreenAction {
        match self.form_values().parse(today) {
            Ok(payload) => {
                self.close_form();
                match editing {
                    None => ScreenAction::CreateBirthday(payload),
                    Some(id) => ScreenAction::UpdateBirthday {
                        id,
                        patch: payload.into_patch(),
                    },
                }
            }
            Err(errors) => {
                self.form.apply_errors(&errors);
                ScreenAction::None
            }
        }
    }

    pub fn draw(&mut self, f: &mut Frame, area: Rect, data: &[Birthday], today: NaiveDate) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(area);

        let table_area = match &self.mode {
            DetailsMode::Browse => rows[0],
            DetailsMode::Editing(editing) => {
                let columns = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Length(42), Constraint::Min(0)])
                    .split(rows[0]);
                let title = match editing {
                    None => "Add Birthday",
                    Some(_) => "Edit Birthday",
                };
                self.draw_form(f, columns[0], title, today);
                columns[1]
            }
        };
        let focused = self.mode == DetailsMode::Browse;
        self.table.render(f, table_area, data, focused);

        let hint = match &self.confirm_delete {
            Some((_, name)) => format!("Delete {}? y: confirm, any other key: cancel", name),
            None if self.mode != DetailsMode::Browse => {
                "Tab/↑↓: field  ←→: change choice  Enter: save  Esc: cancel".to_string()
            }
            None => "a: add  e/Enter: edit  d: delete  /: search  ←→: page  r: rows per page"
                .to_string(),
        };
        let style = if self.confirm_delete.is_some() {
            Styles::warning()
        } else {
            Styles::muted()
        };
        f.render_widget(Paragraph::new(hint).style(style), rows[1]);
    }

    fn draw_form(&self, f: &mut Frame, area: Rect, title: &str, today: NaiveDate) {
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Styles::border(true));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(inner);
        self.form.render(f, chunks[0]);

        // age is derived from the date of birth, never typed
        let age = NaiveDate::parse_from_str(self.form.value("dob").trim(), DATE_FORMAT)
            .ok()
            .filter(|dob| *dob <= today)
            .map(|dob| format!("Age: {}", age_on(dob, today)))
            .unwrap_or_else(|| "Age: -".to_string());
        f.render_widget(Paragraph::new(age).style(Styles::info()), chunks[1]);
    }
}

fn birthday_form() -> Form {
    let genders: Vec<&str> = Gender::ALL.iter().map(|g| g.as_str()).collect();
    let relationships: Vec<&str> = Relationship::ALL.iter().map(|r| r.as_str()).collect();
    Form::new(vec![
        FormField::text("name", "Name"),
        FormField::choice("gender", "Gender", &genders),
        FormField::choice("relationship", "Relationship", &relationships),
        FormField::text("contact", "Contact"),
        FormField::new("dob", "Date of Birth", FormFieldType::Date).with_placeholder("YYYY-MM-DD"),
        FormField::text("email", "Email"),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::birthday;
    use crossterm::event::KeyModifiers;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn press(screen: &mut DetailsScreen, code: KeyCode, data: &[Birthday]) -> ScreenAction {
        screen.handle_key(KeyEvent::new(code, KeyModifiers::NONE), data, today())
    }

    fn type_text(screen: &mut DetailsScreen, text: &str, data: &[Birthday]) {
        for c in text.chars() {
            press(screen, KeyCode::Char(c), data);
        }
    }

    #[test]
    fn test_add_flow_produces_payload_with_age() {
        let data = vec![];
        let mut screen = DetailsScreen::new(false, &[5, 10]);
        press(&mut screen, KeyCode::Char('a'), &data);
        assert!(screen.is_capturing_input());

        type_text(&mut screen, "Carol", &data);
        press(&mut screen, KeyCode::Tab, &data);
        press(&mut screen, KeyCode::Right, &data);
        press(&mut screen, KeyCode::Right, &data);
        press(&mut screen, KeyCode::Tab, &data);
        press(&mut screen, KeyCode::Right, &data);
        press(&mut screen, KeyCode::Tab, &data);
        type_text(&mut screen, "5551234", &data);
        press(&mut screen, KeyCode::Tab, &data);
        type_text(&mut screen, "1990-06-15", &data);
        press(&mut screen, KeyCode::Tab, &data);
        type_text(&mut screen, "carol@example.com", &data);

        match press(&mut screen, KeyCode::Enter, &data) {
            ScreenAction::CreateBirthday(payload) => {
                assert_eq!(payload.name, "Carol");
                assert_eq!(payload.gender, "Female");
                assert_eq!(payload.relationship, "family");
                assert_eq!(payload.age, 33);
            }
            other => panic!("unexpected action {:?}", other),
        }
        assert_eq!(screen.mode, DetailsMode::Browse);
    }

    #[test]
    fn test_invalid_form_stays_open() {
        let data = vec![];
        let mut screen = DetailsScreen::new(false, &[5]);
        press(&mut screen, KeyCode::Char('a'), &data);
        assert_eq!(press(&mut screen, KeyCode::Enter, &data), ScreenAction::None);
        assert_eq!(screen.mode, DetailsMode::Editing(None));
        assert_eq!(
            screen.form.fields[0].validation_error.as_deref(),
            Some("Name is required")
        );
    }

    #[test]
    fn test_edit_sends_full_patch() {
        let data = vec![birthday("a", "Alice")];
        let mut screen = DetailsScreen::new(true, &[5]);
        press(&mut screen, KeyCode::Char('e'), &data);
        assert_eq!(screen.mode, DetailsMode::Editing(Some("a".to_string())));
        assert_eq!(screen.form.value("name"), "Alice");

        press(&mut screen, KeyCode::Backspace, &data);
        match press(&mut screen, KeyCode::Enter, &data) {
            ScreenAction::UpdateBirthday { id, patch } => {
                assert_eq!(id, "a");
                assert_eq!(patch.name.as_deref(), Some("Alic"));
                assert_eq!(patch.age, Some(30));
            }
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let data = vec![birthday("a", "Alice"), birthday("b", "Bob")];
        let mut screen = DetailsScreen::new(false, &[5]);
        press(&mut screen, KeyCode::Down, &data);
        press(&mut screen, KeyCode::Char('d'), &data);
        assert_eq!(
            screen.confirm_delete,
            Some(("b".to_string(), "Bob".to_string()))
        );
        assert_eq!(press(&mut screen, KeyCode::Char('n'), &data), ScreenAction::None);
        assert!(screen.confirm_delete.is_none());

        press(&mut screen, KeyCode::Char('d'), &data);
        assert_eq!(
            press(&mut screen, KeyCode::Char('y'), &data),
            ScreenAction::DeleteBirthday("b".to_string())
        );
    }
}
