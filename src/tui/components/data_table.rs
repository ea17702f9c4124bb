//! ratatui rendering and key handling on top of [`DataTable`]

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Rect},
    style::Style,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::table::{CellContent, DataTable, TableBody};
use crate::tui::ui::Styles;

/// A [`DataTable`] plus row selection and an inline search box
pub struct TableWidget<T> {
    pub table: DataTable<T>,
    pub state: TableState,
    /// Typing goes into the search text while set
    pub searching: bool,
    title: String,
    page_len: usize,
}

impl<T> TableWidget<T> {
    pub fn new(title: &str, table: DataTable<T>) -> Self {
        Self {
            table,
            state: TableState::default(),
            searching: false,
            title: title.to_string(),
            page_len: 0,
        }
    }

    /// Refresh the cached counts against the current data and keep the selection on screen
    pub fn sync(&mut self, data: &[T]) {
        let filtered = self.table.filter(data);
        let pages = self.table.page_count(filtered.len());
        if self.table.page() >= pages {
            self.table.set_page(pages - 1);
        }
        self.page_len = self.table.paginate(&filtered).len();

        let selected = match self.state.selected() {
            _ if self.page_len == 0 => None,
            Some(i) => Some(i.min(self.page_len - 1)),
            None => Some(0),
        };
        self.state.select(selected);
    }

    /// Row under the cursor
    pub fn selected<'a>(&self, data: &'a [T]) -> Option<&'a T> {
        let index = self.state.selected()?;
        self.table.page_rows(data).get(index).copied()
    }

    /// Browse and search keys; returns false when the key is not for the table
    pub fn handle_key(&mut self, key: KeyEvent, data: &[T]) -> bool {
        self.sync(data);
        if self.searching {
            match key.code {
                KeyCode::Esc => {
                    self.searching = false;
                    self.table.clear_search();
                }
                KeyCode::Enter => self.searching = false,
                KeyCode::Backspace => self.table.pop_search_char(),
                KeyCode::Char(c) => self.table.push_search_char(c),
                _ => return false,
            }
            self.state.select(None);
            self.sync(data);
            return true;
        }

        let last = self.page_len.saturating_sub(1);
        let current = self.state.selected().unwrap_or(0);
        match key.code {
            // wraps around within the page
            KeyCode::Up if self.page_len > 0 => {
                self.state.select(Some(if current == 0 { last } else { current - 1 }))
            }
            KeyCode::Down if self.page_len > 0 => {
                self.state.select(Some((current + 1) % self.page_len))
            }
            KeyCode::Up | KeyCode::Down => {}
            KeyCode::Home => self.state.select(Some(0)),
            KeyCode::End => self.state.select(Some(last)),
            KeyCode::Left | KeyCode::PageUp => {
                self.table.previous_page();
                self.state.select(Some(0));
            }
            KeyCode::Right | KeyCode::PageDown => {
                self.table.next_page(data);
                self.state.select(Some(0));
            }
            KeyCode::Char('/') => self.searching = true,
            KeyCode::Char('r') => {
                self.table.cycle_rows_per_page();
                self.state.select(None);
            }
            _ => return false,
        }
        self.sync(data);
        true
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, data: &[T], focused: bool) {
        self.sync(data);
        let view = self.table.view(data);

        let mut title = format!(
            "{} ({}, page {}/{}, {} per page)",
            self.title,
            view.range_label(),
            view.page + 1,
            view.page_count,
            view.rows_per_page
        );
        if self.searching || !self.table.search().is_empty() {
            let cursor = if self.searching { "_" } else { "" };
            title.push_str(&format!(" Search: {}{}", self.table.search(), cursor));
        }

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Styles::border(focused));

        let widths: Vec<Constraint> = self
            .table
            .columns()
            .iter()
            .map(|c| match c.preferred_width() {
                Some(width) => Constraint::Length(width),
                None => Constraint::Min(10),
            })
            .collect();
        let header = Row::new(view.headers.iter().map(|h| Cell::from(h.clone())))
            .style(Styles::header())
            .bottom_margin(1);

        match view.body {
            TableBody::Rows(rows) => {
                let rows = rows.into_iter().map(|cells| Row::new(cells.into_iter().map(styled_cell)));
                let widget = Table::new(rows, widths)
                    .header(header)
                    .block(block)
                    .highlight_style(Styles::selected())
                    .highlight_symbol("> ");
                f.render_stateful_widget(widget, area, &mut self.state);
            }
            TableBody::Empty { message, .. } => {
                // no colspan in ratatui: draw the header, then the message across the full width
                let widget = Table::new(Vec::<Row>::new(), widths).header(header).block(block);
                f.render_widget(widget, area);
                if area.height > 4 && area.width > 2 {
                    let message_area = Rect {
                        x: area.x + 1,
                        y: area.y + 3,
                        width: area.width - 2,
                        height: 1,
                    };
                    let paragraph = Paragraph::new(message)
                        .style(Styles::muted())
                        .alignment(Alignment::Center);
                    f.render_widget(paragraph, message_area);
                }
            }
        }
    }
}

fn styled_cell(content: CellContent) -> Cell<'static> {
    let style = match &content {
        CellContent::Badge { tone, .. } => Styles::tone(*tone),
        CellContent::Control(_) => Styles::muted(),
        CellContent::Text(_) | CellContent::Empty => Style::default(),
    };
    Cell::from(content.display().to_string()).style(style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn widget() -> TableWidget<String> {
        let columns = vec![Column::field("value", "Value", |s: &String| s.clone())];
        TableWidget::new("Items", DataTable::new(columns))
    }

    fn rows(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("row {}", i)).collect()
    }

    #[test]
    fn test_paging_and_selection() {
        let data = rows(12);
        let mut table = widget();
        table.sync(&data);
        assert_eq!(table.table.page_count(data.len()), 3);
        assert_eq!(table.selected(&data).map(String::as_str), Some("row 0"));

        table.handle_key(key(KeyCode::Right), &data);
        table.handle_key(key(KeyCode::Up), &data);
        assert_eq!(table.table.page(), 1);
        assert_eq!(table.selected(&data).map(String::as_str), Some("row 9"));

        table.handle_key(key(KeyCode::End), &data);
        table.handle_key(key(KeyCode::Right), &data);
        table.handle_key(key(KeyCode::Right), &data);
        assert_eq!(table.table.page(), 2);
        assert_eq!(table.table.page_rows(&data).len(), 2);
    }

    #[test]
    fn test_search_mode_captures_typing() {
        let data = rows(12);
        let mut table = widget();
        table.handle_key(key(KeyCode::Right), &data);
        assert!(table.handle_key(key(KeyCode::Char('/')), &data));
        for c in "row 11".chars() {
            table.handle_key(key(KeyCode::Char(c)), &data);
        }
        assert_eq!(table.table.page(), 0);
        assert_eq!(table.selected(&data).map(String::as_str), Some("row 11"));

        table.handle_key(key(KeyCode::Esc), &data);
        assert!(!table.searching);
        assert_eq!(table.table.search(), "");
        assert!(!table.handle_key(key(KeyCode::Char('x')), &data));
    }

    #[test]
    fn test_selection_follows_shrinking_data() {
        let mut data = rows(3);
        let mut table = widget();
        table.handle_key(key(KeyCode::End), &data);
        data.truncate(1);
        table.sync(&data);
        assert_eq!(table.state.selected(), Some(0));
        data.clear();
        table.sync(&data);
        assert_eq!(table.state.selected(), None);
        assert!(table.selected(&data).is_none());
    }
}
