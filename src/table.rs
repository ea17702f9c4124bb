//! Generic table model: client-side search, pagination and cell rendering
//!
//! A [`DataTable`] never owns the rows it displays. Callers pass the current
//! collection in on every query, so the table can sit on top of a store slice
//! without copying it. Columns are bound to typed accessor functions; a column
//! with no accessor is a synthetic column that only renders (e.g. actions).

use unicode_width::UnicodeWidthStr;

pub const DEFAULT_EMPTY_MESSAGE: &str = "No records found";
pub const DEFAULT_ROWS_PER_PAGE_OPTIONS: [usize; 3] = [5, 10, 25];

/// Colour family of a badge cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Neutral,
    Blue,
    Pink,
    Muted,
}

/// What a single cell shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellContent {
    /// Plain text; also what search matches against
    Text(String),
    /// Styled chip, e.g. a gender label
    Badge { text: String, tone: Tone },
    /// Hint for an interactive affordance (key bindings, buttons)
    Control(String),
    Empty,
}

impl CellContent {
    pub fn text(value: impl Into<String>) -> Self {
        CellContent::Text(value.into())
    }

    pub fn badge(value: impl Into<String>, tone: Tone) -> Self {
        CellContent::Badge {
            text: value.into(),
            tone,
        }
    }

    /// Textual content usable for search; badges and controls are visual only
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellContent::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Text to draw for this cell
    pub fn display(&self) -> &str {
        match self {
            CellContent::Text(text) => text,
            CellContent::Badge { text, .. } => text,
            CellContent::Control(text) => text,
            CellContent::Empty => "",
        }
    }
}

type Accessor<T> = Box<dyn Fn(&T) -> Option<String>>;
type Renderer<T> = Box<dyn Fn(&T) -> CellContent>;

/// Column descriptor bound to a row type
pub struct Column<T> {
    key: String,
    label: String,
    width: Option<u16>,
    value: Option<Accessor<T>>,
    render: Option<Renderer<T>>,
}

impl<T> Column<T> {
    /// Synthetic column with neither accessor nor renderer; add them with the builders
    pub fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            width: None,
            value: None,
            render: None,
        }
    }

    /// Column backed by a field that is always present
    pub fn field<F>(key: &str, label: &str, accessor: F) -> Self
    where
        F: Fn(&T) -> String + 'static,
    {
        Self::new(key, label).value(move |row| Some(accessor(row)))
    }

    /// Column backed by a field that may be missing on some rows
    pub fn optional<F>(key: &str, label: &str, accessor: F) -> Self
    where
        F: Fn(&T) -> Option<String> + 'static,
    {
        Self::new(key, label).value(accessor)
    }

    pub fn value<F>(mut self, accessor: F) -> Self
    where
        F: Fn(&T) -> Option<String> + 'static,
    {
        self.value = Some(Box::new(accessor));
        self
    }

    pub fn render<F>(mut self, renderer: F) -> Self
    where
        F: Fn(&T) -> CellContent + 'static,
    {
        self.render = Some(Box::new(renderer));
        self
    }

    pub fn width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn preferred_width(&self) -> Option<u16> {
        self.width
    }

    /// Text used for search: the renderer's output when textual, else the
    /// accessor's value, else empty
    pub fn resolve(&self, row: &T) -> String {
        if let Some(render) = &self.render {
            if let CellContent::Text(text) = render(row) {
                return text;
            }
        }
        self.value
            .as_ref()
            .and_then(|accessor| accessor(row))
            .unwrap_or_default()
    }

    /// Content to display for `row`
    pub fn cell(&self, row: &T) -> CellContent {
        if let Some(render) = &self.render {
            return render(row);
        }
        match self.value.as_ref().and_then(|accessor| accessor(row)) {
            Some(text) => CellContent::Text(text),
            None => CellContent::Empty,
        }
    }
}

/// Body of a rendered page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableBody {
    Rows(Vec<Vec<CellContent>>),
    /// Single full-width cell spanning `colspan` columns
    Empty { message: String, colspan: usize },
}

/// One rendered page of a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    pub headers: Vec<String>,
    pub body: TableBody,
    pub filtered_len: usize,
    pub page: usize,
    pub page_count: usize,
    pub rows_per_page: usize,
}

impl TableView {
    /// "start-end of total" label in the style of a pagination footer
    pub fn range_label(&self) -> String {
        let start = self.page * self.rows_per_page;
        let end = (start + self.rows_per_page).min(self.filtered_len);
        if start >= end {
            format!("0 of {}", self.filtered_len)
        } else {
            format!("{}-{} of {}", start + 1, end, self.filtered_len)
        }
    }

    /// Render as aligned plain text for terminal output
    pub fn to_plain_text(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.width()).collect();
        if let TableBody::Rows(rows) = &self.body {
            for row in rows {
                for (i, cell) in row.iter().enumerate() {
                    if let Some(width) = widths.get_mut(i) {
                        *width = (*width).max(cell.display().width());
                    }
                }
            }
        }

        let mut lines = Vec::new();
        lines.push(join_padded(self.headers.iter().map(String::as_str), &widths));
        lines.push(
            widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("-+-"),
        );
        match &self.body {
            TableBody::Rows(rows) => {
                for row in rows {
                    lines.push(join_padded(row.iter().map(CellContent::display), &widths));
                }
            }
            TableBody::Empty { message, .. } => lines.push(message.clone()),
        }
        lines.push(format!(
            "{} (page {}/{})",
            self.range_label(),
            self.page + 1,
            self.page_count
        ));
        lines.join("\n")
    }
}

fn join_padded<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.width());
            format!("{}{}", cell, " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}

/// Searchable, paginated view over a borrowed row collection
pub struct DataTable<T> {
    columns: Vec<Column<T>>,
    empty_message: String,
    rows_per_page_options: Vec<usize>,
    search: String,
    page: usize,
    rows_per_page: usize,
}

impl<T> DataTable<T> {
    pub fn new(columns: Vec<Column<T>>) -> Self {
        debug_assert!(
            {
                let mut keys: Vec<&str> = columns.iter().map(|c| c.key()).collect();
                keys.sort_unstable();
                keys.windows(2).all(|pair| pair[0] != pair[1])
            },
            "column keys must be unique within a table"
        );

        Self {
            columns,
            empty_message: DEFAULT_EMPTY_MESSAGE.to_string(),
            rows_per_page_options: DEFAULT_ROWS_PER_PAGE_OPTIONS.to_vec(),
            search: String::new(),
            page: 0,
            rows_per_page: DEFAULT_ROWS_PER_PAGE_OPTIONS[0],
        }
    }

    pub fn with_empty_message(mut self, message: &str) -> Self {
        self.empty_message = message.to_string();
        self
    }

    /// Zero entries are dropped; an empty list keeps the defaults
    pub fn with_rows_per_page_options(mut self, options: &[usize]) -> Self {
        let options: Vec<usize> = options.iter().copied().filter(|n| *n > 0).collect();
        if let Some(first) = options.first() {
            self.rows_per_page = *first;
            self.rows_per_page_options = options;
            self.page = 0;
        }
        self
    }

    pub fn columns(&self) -> &[Column<T>] {
        &self.columns
    }

    pub fn labels(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.label().to_string()).collect()
    }

    pub fn empty_message(&self) -> &str {
        &self.empty_message
    }

    pub fn rows_per_page_options(&self) -> &[usize] {
        &self.rows_per_page_options
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn rows_per_page(&self) -> usize {
        self.rows_per_page
    }

    pub fn set_search(&mut self, text: &str) {
        self.search = text.to_string();
        self.page = 0;
    }

    pub fn push_search_char(&mut self, c: char) {
        self.search.push(c);
        self.page = 0;
    }

    pub fn pop_search_char(&mut self) {
        self.search.pop();
        self.page = 0;
    }

    pub fn clear_search(&mut self) {
        self.set_search("");
    }

    pub fn set_rows_per_page(&mut self, rows: usize) {
        self.rows_per_page = rows.max(1);
        self.page = 0;
    }

    /// Advance to the next rows-per-page option, wrapping around
    pub fn cycle_rows_per_page(&mut self) {
        let next = self
            .rows_per_page_options
            .iter()
            .position(|n| *n == self.rows_per_page)
            .map(|i| (i + 1) % self.rows_per_page_options.len())
            .unwrap_or(0);
        self.set_rows_per_page(self.rows_per_page_options[next]);
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    /// Rows matching the current search, in their original order
    pub fn filter<'a>(&self, data: &'a [T]) -> Vec<&'a T> {
        if self.search.is_empty() {
            return data.iter().collect();
        }
        let needle = self.search.to_lowercase();
        data.iter()
            .filter(|row| {
                self.columns
                    .iter()
                    .any(|col| col.resolve(row).to_lowercase().contains(&needle))
            })
            .collect()
    }

    /// The current page of an already filtered sequence
    pub fn paginate<'a>(&self, filtered: &[&'a T]) -> Vec<&'a T> {
        let start = self.page.saturating_mul(self.rows_per_page);
        filtered
            .iter()
            .skip(start)
            .take(self.rows_per_page)
            .copied()
            .collect()
    }

    pub fn page_rows<'a>(&self, data: &'a [T]) -> Vec<&'a T> {
        self.paginate(&self.filter(data))
    }

    /// Number of pages for `filtered_len` rows; never less than one
    pub fn page_count(&self, filtered_len: usize) -> usize {
        filtered_len.div_ceil(self.rows_per_page).max(1)
    }

    pub fn next_page(&mut self, data: &[T]) {
        let total = self.page_count(self.filter(data).len());
        if self.page + 1 < total {
            self.page += 1;
        }
    }

    pub fn previous_page(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    /// Render the current page
    pub fn view(&self, data: &[T]) -> TableView {
        let filtered = self.filter(data);
        let rows = self.paginate(&filtered);

        let body = if rows.is_empty() {
            TableBody::Empty {
                message: self.empty_message.clone(),
                colspan: self.columns.len(),
            }
        } else {
            TableBody::Rows(
                rows.iter()
                    .map(|row| self.columns.iter().map(|col| col.cell(row)).collect())
                    .collect(),
            )
        };

        TableView {
            headers: self.labels(),
            body,
            filtered_len: filtered.len(),
            page: self.page,
            page_count: self.page_count(filtered.len()),
            rows_per_page: self.rows_per_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Person {
        name: String,
        age: u32,
        nickname: Option<String>,
    }

    fn person(name: &str, age: u32) -> Person {
        Person {
            name: name.to_string(),
            age,
            nickname: None,
        }
    }

    fn columns() -> Vec<Column<Person>> {
        vec![
            Column::field("name", "Name", |p: &Person| p.name.clone()),
            Column::field("age", "Age", |p: &Person| p.age.to_string()),
        ]
    }

    fn numbered(count: usize) -> Vec<Person> {
        (0..count).map(|i| person(&format!("Person {}", i), i as u32)).collect()
    }

    #[test]
    fn test_empty_search_returns_data_unchanged() {
        let data = vec![person("Zed", 40), person("Amy", 3), person("Bob", 8)];
        let table = DataTable::new(columns());
        let filtered: Vec<Person> = table.filter(&data).into_iter().cloned().collect();
        assert_eq!(filtered, data);
    }

    #[test]
    fn test_search_matches_any_column_case_insensitively() {
        let data = vec![person("Alice", 5), person("Bob", 8)];
        let mut table = DataTable::new(columns());

        table.set_search("ali");
        let filtered = table.filter(&data);
        assert_eq!(filtered, vec![&data[0]]);

        table.set_search("8");
        assert_eq!(table.filter(&data), vec![&data[1]]);

        table.set_search("BOB");
        assert_eq!(table.filter(&data), vec![&data[1]]);
    }

    #[test]
    fn test_search_partitions_rows() {
        let data = vec![
            person("Alice", 5),
            person("Malik", 51),
            person("Bob", 8),
            person("Carol", 15),
        ];
        let mut table = DataTable::new(columns());
        table.set_search("5");

        let filtered = table.filter(&data);
        let cols = columns();
        for row in &data {
            let matches = cols.iter().any(|c| c.resolve(row).to_lowercase().contains("5"));
            assert_eq!(filtered.contains(&row), matches, "row {:?}", row);
        }
        assert_eq!(filtered.len(), 3);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let data = numbered(30);
        let mut table = DataTable::new(columns());
        table.set_search("1");
        assert_eq!(table.filter(&data), table.filter(&data));
    }

    #[test]
    fn test_pagination_bounds() {
        let data = numbered(12);
        let mut table = DataTable::new(columns()).with_rows_per_page_options(&[5, 10]);

        table.set_page(1);
        let page: Vec<Person> = table.page_rows(&data).into_iter().cloned().collect();
        assert_eq!(page, data[5..10].to_vec());

        table.set_page(2);
        assert_eq!(table.page_rows(&data).len(), 2);

        for rows in [1, 3, 5, 7, 12, 50] {
            table.set_rows_per_page(rows);
            assert!(table.page_rows(&data).len() <= rows);
        }

        table.set_rows_per_page(12);
        assert_eq!(table.page_rows(&data).len(), 12);
        assert_eq!(table.page_count(12), 1);
    }

    #[test]
    fn test_search_and_rows_change_reset_page() {
        let data = numbered(30);
        let mut table = DataTable::new(columns());

        table.set_page(3);
        table.set_search("Person");
        assert_eq!(table.page(), 0);

        table.set_page(2);
        table.cycle_rows_per_page();
        assert_eq!(table.page(), 0);
        assert_eq!(table.rows_per_page(), 10);

        table.set_page(2);
        table.push_search_char('1');
        assert_eq!(table.page(), 0);

        table.next_page(&data);
        table.pop_search_char();
        assert_eq!(table.page(), 0);
    }

    #[test]
    fn test_next_page_stops_at_last_page() {
        let data = numbered(12);
        let mut table = DataTable::new(columns());
        for _ in 0..10 {
            table.next_page(&data);
        }
        assert_eq!(table.page(), 2);
        table.previous_page();
        table.previous_page();
        table.previous_page();
        assert_eq!(table.page(), 0);
    }

    #[test]
    fn test_empty_state_spans_all_columns() {
        let data = vec![person("Alice", 5)];
        let mut table = DataTable::new(columns()).with_empty_message("Nothing here");
        table.set_search("zzz");

        let view = table.view(&data);
        assert_eq!(
            view.body,
            TableBody::Empty {
                message: "Nothing here".to_string(),
                colspan: 2
            }
        );
        assert_eq!(view.page_count, 1);
        assert_eq!(view.range_label(), "0 of 0");
    }

    #[test]
    fn test_render_prefers_renderer_and_missing_values_are_empty() {
        let mut data = vec![person("Alice", 5)];
        data[0].nickname = Some("Al".to_string());
        data.push(person("Bob", 8));

        let table = DataTable::new(vec![
            Column::field("name", "Name", |p: &Person| p.name.clone())
                .render(|p: &Person| CellContent::badge(p.name.to_uppercase(), Tone::Blue)),
            Column::optional("nickname", "Nickname", |p: &Person| p.nickname.clone()),
            Column::new("actions", "Actions").render(|_| CellContent::Control("e/d".into())),
        ]);

        let view = table.view(&data);
        let TableBody::Rows(rows) = view.body else {
            panic!("expected rows");
        };
        assert_eq!(rows[0][0], CellContent::badge("ALICE", Tone::Blue));
        assert_eq!(rows[0][1], CellContent::text("Al"));
        assert_eq!(rows[1][1], CellContent::Empty);
        assert_eq!(rows[1][2].display(), "e/d");
    }

    #[test]
    fn test_search_uses_textual_render_then_accessor() {
        let data = vec![person("Alice", 5), person("Bob", 8)];
        let mut table = DataTable::new(vec![
            // badge is not textual, so search falls back to the accessor
            Column::field("name", "Name", |p: &Person| p.name.clone())
                .render(|_| CellContent::badge("chip", Tone::Neutral)),
            Column::new("label", "Label")
                .render(|p: &Person| CellContent::text(format!("aged {}", p.age))),
            Column::new("actions", "Actions").render(|_| CellContent::Control("edit".into())),
        ]);

        table.set_search("chip");
        assert!(table.filter(&data).is_empty());

        table.set_search("alice");
        assert_eq!(table.filter(&data).len(), 1);

        table.set_search("aged 8");
        assert_eq!(table.filter(&data), vec![&data[1]]);

        table.set_search("edit");
        assert!(table.filter(&data).is_empty());
    }

    #[test]
    fn test_plain_text_rendering() {
        let data = vec![person("Alice", 5), person("Bob", 8)];
        let table = DataTable::new(columns());
        let text = table.view(&data).to_plain_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Name  | Age");
        assert_eq!(lines[2], "Alice | 5");
        assert_eq!(lines[3], "Bob   | 8");
        assert_eq!(lines[4], "1-2 of 2 (page 1/1)");
    }

    #[test]
    fn test_invalid_rows_per_page_options_keep_defaults() {
        let table: DataTable<Person> = DataTable::new(columns()).with_rows_per_page_options(&[0]);
        assert_eq!(table.rows_per_page_options(), &DEFAULT_ROWS_PER_PAGE_OPTIONS);
        assert_eq!(table.rows_per_page(), 5);
    }
}
