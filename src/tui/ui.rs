//! Palette and layout helpers shared by the screens

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
};

use crate::table::Tone;
use crate::tui::components::status_display::StatusType;

/// Named styles, so screens agree on what each colour means
pub struct Styles;

impl Styles {
    /// Highlighted table row
    pub fn selected() -> Style {
        Style::new()
            .bg(Color::Blue)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    }

    /// Key names, stat values and the active tab
    pub fn accent() -> Style {
        Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    }

    pub fn header() -> Style {
        Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    }

    /// Hints, placeholders and action columns
    pub fn muted() -> Style {
        Style::new().fg(Color::Gray)
    }

    pub fn border(focused: bool) -> Style {
        if focused {
            Style::new().fg(Color::Yellow)
        } else {
            Style::new().fg(Color::Gray)
        }
    }

    pub fn error() -> Style {
        Style::new().fg(Color::Red)
    }

    pub fn warning() -> Style {
        Style::new().fg(Color::Yellow)
    }

    pub fn info() -> Style {
        Style::new().fg(Color::Cyan)
    }

    pub fn status(status_type: StatusType) -> Style {
        match status_type {
            StatusType::Info => Self::info(),
            StatusType::Success => Style::new().fg(Color::Green),
            StatusType::Error => Self::error(),
            StatusType::Loading => Self::warning(),
        }
    }

    /// Chip colours for badge cells
    pub fn tone(tone: Tone) -> Style {
        let chip = Style::new().add_modifier(Modifier::BOLD);
        match tone {
            Tone::Neutral => chip.fg(Color::White),
            Tone::Blue => chip.fg(Color::LightBlue),
            Tone::Pink => chip.fg(Color::LightMagenta),
            Tone::Muted => Style::new().fg(Color::DarkGray),
        }
    }
}

/// A `percent_x` by `percent_y` rectangle centered in `area`
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let scale = |len: u16, percent: u16| (u32::from(len) * u32::from(percent.min(100)) / 100) as u16;
    let width = scale(area.width, percent_x);
    let height = scale(area.height, percent_y);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_stays_inside() {
        let area = Rect::new(10, 5, 81, 41);
        let popup = centered_rect(50, 50, area);
        assert_eq!((popup.width, popup.height), (40, 20));
        assert_eq!((popup.x, popup.y), (30, 15));
        assert!(popup.right() <= area.right() && popup.bottom() <= area.bottom());
    }
}
