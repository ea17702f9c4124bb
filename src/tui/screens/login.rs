//! Login and registration screen

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::models::{Credentials, Registration};
use crate::tui::{
    components::{Form, FormField, FormFieldType},
    events::ScreenAction,
    ui::{centered_rect, Styles},
};
use crate::validation::{validate_credentials, validate_registration};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginMode {
    Login,
    Register,
}

pub struct LoginScreen {
    pub mode: LoginMode,
    pub form: Form,
    /// A request is in flight; input is ignored until it finishes
    pub busy: bool,
}

impl Default for LoginScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginScreen {
    pub fn new() -> Self {
        Self {
            mode: LoginMode::Login,
            form: login_form(),
            busy: false,
        }
    }

    pub fn switch_mode(&mut self) {
        let email = self.form.value("email").to_string();
        (self.mode, self.form) = match self.mode {
            LoginMode::Login => (LoginMode::Register, register_form()),
            LoginMode::Register => (LoginMode::Login, login_form()),
        };
        self.form.set_value("email", &email);
    }

    /// Back to the login form after a successful registration
    pub fn registered(&mut self, email: &str) {
        self.mode = LoginMode::Login;
        self.form = login_form();
        self.form.set_value("email", email);
        self.form.next_field();
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ScreenAction {
        if self.busy {
            return ScreenAction::None;
        }
        match key.code {
            KeyCode::Esc => ScreenAction::Quit,
            KeyCode::F(2) => {
                self.switch_mode();
                ScreenAction::None
            }
            KeyCode::Enter => self.submit(),
            _ => {
                self.form.handle_key(key);
                ScreenAction::None
            }
        }
    }

    fn submit(&mut self) -> ScreenAction {
        let email = self.form.value("email").trim().to_string();
        let password = self.form.value("password").to_string();
        match self.mode {
            LoginMode::Login => {
                let credentials = Credentials { email, password };
                match validate_credentials(&credentials) {
                    Ok(()) => ScreenAction::Login(credentials),
                    Err(errors) => {
                        self.form.apply_errors(&errors);
                        ScreenAction::None
                    }
                }
            }
            LoginMode::Register => {
                let registration = Registration {
                    name: self.form.value("name").trim().to_string(),
                    email,
                    password,
                };
                match validate_registration(&registration) {
                    Ok(()) => ScreenAction::Register(registration),
                    Err(errors) => {
                        self.form.apply_errors(&errors);
                        ScreenAction::None
                    }
                }
            }
        }
    }

    pub fn draw(&self, f: &mut Frame, area: Rect) {
        let popup = centered_rect(50, 70, area);
        let (title, switch_hint) = match self.mode {
            LoginMode::Login => ("Login", "F2: create an account"),
            LoginMode::Register => ("Register", "F2: back to login"),
        };

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Styles::border(true));
        let inner = block.inner(popup);
        f.render_widget(block, popup);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(2)])
            .split(inner);

        self.form.render(f, chunks[0]);

        let hint = Line::from(vec![
            Span::styled("Enter", Styles::accent()),
            Span::raw(": submit  "),
            Span::styled("Tab", Styles::accent()),
            Span::raw(": next field  "),
            Span::raw(switch_hint),
            Span::raw("  Esc: quit"),
        ]);
        f.render_widget(Paragraph::new(hint).style(Styles::muted()), chunks[1]);
    }
}

fn login_form() -> Form {
    Form::new(vec![
        FormField::text("email", "Email").with_placeholder("you@example.com"),
        FormField::new("password", "Password", FormFieldType::Password),
    ])
}

fn register_form() -> Form {
    Form::new(vec![
        FormField::text("name", "Name"),
        FormField::text("email", "Email").with_placeholder("you@example.com"),
        FormField::new("password", "Password", FormFieldType::Password),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn type_text(screen: &mut LoginScreen, text: &str) {
        for c in text.chars() {
            screen.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
    }

    fn press(screen: &mut LoginScreen, code: KeyCode) -> ScreenAction {
        screen.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_login_submits_credentials() {
        let mut screen = LoginScreen::new();
        type_text(&mut screen, "me@example.com");
        press(&mut screen, KeyCode::Tab);
        type_text(&mut screen, "secret");

        assert_eq!(
            press(&mut screen, KeyCode::Enter),
            ScreenAction::Login(Credentials {
                email: "me@example.com".to_string(),
                password: "secret".to_string(),
            })
        );
    }

    #[test]
    fn test_invalid_login_marks_fields() {
        let mut screen = LoginScreen::new();
        type_text(&mut screen, "nope");
        assert_eq!(press(&mut screen, KeyCode::Enter), ScreenAction::None);
        assert_eq!(
            screen.form.fields[0].validation_error.as_deref(),
            Some("Enter a valid email")
        );
        assert!(screen.form.fields[1].validation_error.is_some());
    }

    #[test]
    fn test_register_mode_keeps_email() {
        let mut screen = LoginScreen::new();
        type_text(&mut screen, "me@example.com");
        press(&mut screen, KeyCode::F(2));
        assert_eq!(screen.mode, LoginMode::Register);
        assert_eq!(screen.form.value("email"), "me@example.com");

        type_text(&mut screen, "Al");
        press(&mut screen, KeyCode::Enter);
        assert_eq!(
            screen.form.fields[0].validation_error.as_deref(),
            Some("Name must be at least 3 characters")
        );

        screen.registered("me@example.com");
        assert_eq!(screen.mode, LoginMode::Login);
        assert!(screen.form.fields[1].is_focused);
    }

    #[test]
    fn test_busy_ignores_input() {
        let mut screen = LoginScreen::new();
        screen.busy = true;
        assert_eq!(press(&mut screen, KeyCode::Esc), ScreenAction::None);
    }
}
