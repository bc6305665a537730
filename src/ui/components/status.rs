use tui::{
    backend::Backend,
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

/// One-line message shown under the current screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub level: Level,
    pub message: String,
}

impl Status {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: Level::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == Level::Error
    }
}

pub fn render_status<B: Backend>(frame: &mut Frame<B>, area: Rect, status: Option<&Status>) {
    let (text, style) = match status {
        Some(status) if status.is_error() => (
            format!("Error: {}", status.message),
            Style::default().fg(Color::White).bg(Color::Red),
        ),
        Some(status) => (status.message.clone(), Style::default().fg(Color::Green)),
        None => (String::new(), Style::default()),
    };

    frame.render_widget(Paragraph::new(text).style(style), area);
}
