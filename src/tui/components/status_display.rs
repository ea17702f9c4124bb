//! Status bar toasts

use chrono::{DateTime, Local};
use ratatui::{
    layout::Rect,
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::time::Duration;

use crate::tui::ui::Styles;

/// Types of status messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusType {
    Info,
    Success,
    Error,
    Loading,
}

/// Status message with type and content
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub message: String,
    pub status_type: StatusType,
    pub timestamp: DateTime<Local>,
}

impl StatusMessage {
    pub fn new(message: String, status_type: StatusType) -> Self {
        Self {
            message,
            status_type,
            timestamp: Local::now(),
        }
    }
}

/// Status display component
pub struct StatusDisplay {
    pub current_message: Option<StatusMessage>,
    pub auto_clear_timeout: Option<Duration>,
    /// Shown when there is no message
    pub hint: String,
}

impl Default for StatusDisplay {
    fn default() -> Self {
        Self {
            current_message: None,
            auto_clear_timeout: None,
            hint: "Ready".to_string(),
        }
    }
}

impl StatusDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_auto_clear(mut self, timeout: Duration) -> Self {
        self.auto_clear_timeout = Some(timeout);
        self
    }

    pub fn set_info(&mut self, message: String) {
        self.current_message = Some(StatusMessage::new(message, StatusType::Info));
    }

    pub fn set_success(&mut self, message: String) {
        self.current_message = Some(StatusMessage::new(message, StatusType::Success));
    }

    pub fn set_error(&mut self, message: String) {
        self.current_message = Some(StatusMessage::new(message, StatusType::Error));
    }

    pub fn set_loading(&mut self, message: String) {
        self.current_message = Some(StatusMessage::new(message, StatusType::Loading));
    }

    pub fn clear(&mut self) {
        self.current_message = None;
    }

    pub fn get_current(&self) -> Option<&StatusMessage> {
        self.current_message.as_ref()
    }

    /// Toasts expire; loading messages stay until replaced
    pub fn should_auto_clear(&self) -> bool {
        match (self.auto_clear_timeout, &self.current_message) {
            (Some(timeout), Some(message)) if message.status_type != StatusType::Loading => {
                let elapsed = Local::now().signed_duration_since(message.timestamp);
                elapsed.to_std().unwrap_or_default() > timeout
            }
            _ => false,
        }
    }

    pub fn tick(&mut self) {
        if self.should_auto_clear() {
            self.clear();
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let (content, style) = match &self.current_message {
            Some(message) => {
                let style = Styles::status(message.status_type);
                (format_message(message), style)
            }
            None => (self.hint.clone(), Styles::muted()),
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Styles::border(false));

        f.render_widget(Paragraph::new(content).style(style).block(block), area);
    }
}

fn format_message(message: &StatusMessage) -> String {
    let prefix = match message.status_type {
        StatusType::Info => "ℹ",
        StatusType::Success => "✓",
        StatusType::Error => "✗",
        StatusType::Loading => "⟳",
    };
    format!(
        "{} [{}] {}",
        prefix,
        message.timestamp.format("%H:%M:%S"),
        message.message
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_expires_but_loading_stays() {
        let mut status = StatusDisplay::new().with_auto_clear(Duration::from_secs(3));
        status.set_success("Birthday added".to_string());
        assert!(!status.should_auto_clear());

        if let Some(message) = status.current_message.as_mut() {
            message.timestamp = Local::now() - chrono::Duration::seconds(10);
        }
        status.tick();
        assert!(status.get_current().is_none());

        status.set_loading("Logging in...".to_string());
        if let Some(message) = status.current_message.as_mut() {
            message.timestamp = Local::now() - chrono::Duration::seconds(10);
        }
        status.tick();
        assert!(status.get_current().is_some());
    }
}
