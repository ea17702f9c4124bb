//! Dashboard tab bar

use ratatui::{
    layout::Rect,
    text::Line,
    widgets::{Block, Borders, Tabs},
    Frame,
};

use crate::tui::ui::Styles;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Admin,
    Details,
    Wishes,
    Photos,
}

impl Tab {
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Admin => "Admin Panel",
            Tab::Details => "Birthday Details",
            Tab::Wishes => "Wishes",
            Tab::Photos => "Photos",
        }
    }

    /// Tabs visible to a user; the admin panel only exists for admins
    pub fn available(is_admin: bool) -> Vec<Tab> {
        let mut tabs = Vec::new();
        if is_admin {
            tabs.push(Tab::Admin);
        }
        tabs.extend([Tab::Details, Tab::Wishes, Tab::Photos]);
        tabs
    }
}

pub struct TabBar {
    pub tabs: Vec<Tab>,
    pub selected: usize,
}

impl TabBar {
    pub fn new(is_admin: bool) -> Self {
        Self {
            tabs: Tab::available(is_admin),
            selected: 0,
        }
    }

    pub fn current(&self) -> Tab {
        self.tabs.get(self.selected).copied().unwrap_or(Tab::Details)
    }

    pub fn next(&mut self) {
        self.selected = (self.selected + 1) % self.tabs.len();
    }

    pub fn previous(&mut self) {
        self.selected = (self.selected + self.tabs.len() - 1) % self.tabs.len();
    }

    /// Select by 1-based position, as typed on the number row
    pub fn select_number(&mut self, number: usize) -> bool {
        if number >= 1 && number <= self.tabs.len() {
            self.selected = number - 1;
            true
        } else {
            false
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect, user_label: &str) {
        let titles: Vec<Line> = self
            .tabs
            .iter()
            .enumerate()
            .map(|(i, tab)| Line::from(format!("{} {}", i + 1, tab.title())))
            .collect();

        let tabs = Tabs::new(titles)
            .block(
                Block::default()
                    .title(format!("Birthday Book - {}", user_label))
                    .borders(Borders::ALL)
                    .border_style(Styles::border(false)),
            )
            .select(self.selected)
            .style(Styles::muted())
            .highlight_style(Styles::accent());

        f.render_widget(tabs, area);
    }
}
