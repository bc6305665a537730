use crossterm::event::{KeyCode, KeyEvent};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::models::Record;

/// Field layout a record type supplies to the edit form
pub trait FormLayout: Record {
    /// Field labels, in display order
    fn labels() -> &'static [&'static str];

    fn field(&self, index: usize) -> Option<&str>;

    fn field_mut(&mut self, index: usize) -> Option<&mut String>;

    /// Empty draft used when the form adds a new record
    fn blank() -> Self;
}

pub enum FormAction<R> {
    Cancel,
    Save(R),
}

pub struct FormState<R> {
    draft: R,
    current_field: usize,
    editing: bool,
    /// Sequence number of the save job in flight, if any
    pending_save: Option<u64>,
    error: Option<String>,
}

impl<R: FormLayout> FormState<R> {
    pub fn new() -> Self {
        Self::from_existing(R::blank())
    }

    pub fn from_existing(record: R) -> Self {
        Self {
            draft: record,
            current_field: 0,
            editing: false,
            pending_save: None,
            error: None,
        }
    }

    pub fn draft(&self) -> &R {
        &self.draft
    }

    pub fn is_new(&self) -> bool {
        self.draft.is_new()
    }

    pub fn current_field(&self) -> usize {
        self.current_field
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
    }

    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % R::labels().len();
    }

    pub fn previous_field(&mut self) {
        let len = R::labels().len();
        self.current_field = (self.current_field + len - 1) % len;
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        let Some(field_value) = self.draft.field_mut(self.current_field) else {
            return;
        };

        match key {
            KeyCode::Char(c) => {
                field_value.push(c);
            }
            KeyCode::Backspace => {
                field_value.pop();
            }
            _ => {}
        }
    }

    /// Trim and validate the draft, returning the record to write
    pub fn prepare_save(&mut self) -> Option<R> {
        let record = self.draft.trimmed();
        match record.validate() {
            Ok(()) => {
                self.error = None;
                Some(record)
            }
            Err(message) => {
                self.error = Some(message);
                None
            }
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.pending_save.is_some()
    }

    /// True when `seq` is the save this form is waiting for
    pub fn is_waiting_for(&self, seq: u64) -> bool {
        self.pending_save == Some(seq)
    }

    pub fn submitted(&mut self, seq: u64) {
        self.pending_save = Some(seq);
    }

    pub fn submit_failed(&mut self, message: String) {
        self.pending_save = None;
        self.error = Some(message);
    }
}

impl<R: FormLayout> Default for FormState<R> {
    fn default() -> Self {
        Self::new()
    }
}

pub fn handle_key<R: FormLayout>(state: &mut FormState<R>, key: KeyEvent) -> Option<FormAction<R>> {
    match key.code {
        KeyCode::Esc => {
            if state.editing {
                state.toggle_editing();
            } else {
                return Some(FormAction::Cancel);
            }
        }
        KeyCode::Enter => {
            state.toggle_editing();
        }
        KeyCode::Tab => {
            state.next_field();
        }
        KeyCode::BackTab => {
            state.previous_field();
        }
        KeyCode::Up if !state.editing => {
            state.previous_field();
        }
        KeyCode::Down if !state.editing => {
            state.next_field();
        }
        KeyCode::Char('s') if !state.editing => {
            if !state.is_submitting() {
                return state.prepare_save().map(FormAction::Save);
            }
        }
        _ if state.editing => {
            state.edit_current_field(key.code);
        }
        _ => {}
    }

    None
}

pub fn render_form<B: Backend, R: FormLayout>(f: &mut Frame<B>, area: Rect, state: &FormState<R>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(area);

    let noun = R::KIND.to_string();
    let title_text = if state.is_new() {
        format!("New {}", noun.to_lowercase())
    } else {
        format!("Edit {} #{}", noun.to_lowercase(), state.draft.id())
    };

    let title = Paragraph::new(title_text)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let items: Vec<ListItem> = R::labels()
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let value = state.draft.field(i).unwrap_or_default();
            let focused = i == state.current_field;

            let content = if focused && state.editing {
                Spans::from(vec![
                    Span::styled(format!("{}: ", name), Style::default().fg(Color::Yellow)),
                    Span::styled(
                        format!("{}|", value),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ])
            } else {
                let style = if focused {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default()
                };

                Spans::from(vec![
                    Span::styled(format!("{}: ", name), style),
                    Span::raw(value.to_string()),
                ])
            };

            ListItem::new(content)
        })
        .collect();

    let form_list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("{} Details", noun)),
    );
    f.render_widget(form_list, chunks[1]);

    let (help_text, help_style) = if let Some(error) = &state.error {
        (error.clone(), Style::default().fg(Color::Red))
    } else if state.is_submitting() {
        ("Saving...".to_string(), Style::default().fg(Color::Gray))
    } else if state.editing {
        (
            "Enter - Finish field | Tab - Next field | Esc - Stop editing".to_string(),
            Style::default().fg(Color::Gray),
        )
    } else {
        (
            "Enter - Edit field | Up/Down - Navigate fields | S - Save | Esc - Cancel".to_string(),
            Style::default().fg(Color::Gray),
        )
    };

    let help = Paragraph::new(help_text)
        .style(help_style)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}
