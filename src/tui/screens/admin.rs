//! Admin panel: account and record totals plus the users table

use crossterm::event::KeyEvent;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::columns::user_columns;
use crate::models::User;
use crate::table::DataTable;
use crate::tui::{components::TableWidget, events::ScreenAction, ui::Styles};

pub struct AdminScreen {
    pub users: TableWidget<User>,
    /// Total accounts as reported by the service; `None` until loaded
    pub user_count: Option<u64>,
}

impl AdminScreen {
    pub fn new(rows_per_page_options: &[usize]) -> Self {
        let table = DataTable::new(user_columns())
            .with_empty_message("No users found")
            .with_rows_per_page_options(rows_per_page_options);
        Self {
            users: TableWidget::new("Users", table),
            user_count: None,
        }
    }

    pub fn is_capturing_input(&self) -> bool {
        self.users.searching
    }

    pub fn handle_key(&mut self, key: KeyEvent, users: &[User]) -> ScreenAction {
        self.users.handle_key(key, users);
        ScreenAction::None
    }

    pub fn draw(&mut self, f: &mut Frame, area: Rect, users: &[User], birthday_count: usize) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        let cards = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[0]);

        let user_total = self
            .user_count
            .map(|n| n.to_string())
            .unwrap_or_else(|| "...".to_string());
        stat_card(f, cards[0], "Total Users", &user_total);
        stat_card(f, cards[1], "Total Birthdays", &birthday_count.to_string());

        self.users.render(f, chunks[1], users, true);

        f.render_widget(
            Paragraph::new("/: search  ↑↓: select  ←→: page  r: rows per page")
                .style(Styles::muted()),
            chunks[2],
        );
    }
}

fn stat_card(f: &mut Frame, area: Rect, label: &str, value: &str) {
    let line = Line::from(vec![
        Span::styled(format!("{}: ", label), Styles::muted()),
        Span::styled(value.to_string(), Styles::accent()),
    ]);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Styles::border(false));
    f.render_widget(Paragraph::new(line).block(block), area);
}
