use crossterm::event::{KeyCode, KeyEvent};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::models::Record;
use crate::ui::components::confirm::render_confirmation;

/// One table column of a list screen
pub struct Column {
    pub header: &'static str,
    pub width: Constraint,
}

/// Table layout a record type supplies to the list screen
pub trait ListLayout: Record {
    /// Column headers and widths, in display order
    fn columns() -> &'static [Column];

    /// Cell values for one row, matching `columns`
    fn cells(&self) -> Vec<String>;
}

pub enum ListAction<R> {
    Quit,
    SwitchScreen,
    Reload,
    New,
    Edit(R),
    Delete(R),
}

// Represents the state of a record list screen
pub struct ListState<R> {
    records: Vec<R>,
    table_state: TableState,
    /// Identity of the record the open delete dialog is asking about
    pending_delete: Option<i64>,
}

impl<R: Record> ListState<R> {
    pub fn new(records: Vec<R>) -> Self {
        let mut state = Self {
            records: Vec::new(),
            table_state: TableState::default(),
            pending_delete: None,
        };
        state.replace(records);
        state
    }

    /// Swap in a freshly read table
    ///
    /// The selected record stays selected if it is still present; otherwise the
    /// selection is clamped to the new bounds. An open delete dialog is closed
    /// when its record disappeared.
    pub fn replace(&mut self, records: Vec<R>) {
        let selected_id = self.selected().map(Record::id);
        self.records = records;

        let selected = match (self.table_state.selected(), self.records.len()) {
            (_, 0) => None,
            (Some(i), len) => selected_id
                .and_then(|id| self.position_of(id))
                .or(Some(i.min(len - 1))),
            (None, _) => Some(0),
        };
        self.table_state.select(selected);

        if let Some(id) = self.pending_delete {
            if self.position_of(id).is_none() {
                self.pending_delete = None;
            }
        }
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn next(&mut self) {
        if self.records.is_empty() {
            return;
        }

        let i = match self.table_state.selected() {
            Some(i) => {
                if i >= self.records.len() - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.records.is_empty() {
            return;
        }

        let i = match self.table_state.selected() {
            Some(i) => {
                if i == 0 {
                    self.records.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    /// Move the selection to the record with the given identity, if present
    pub fn select_id(&mut self, id: i64) {
        if let Some(i) = self.position_of(id) {
            self.table_state.select(Some(i));
        }
    }

    fn position_of(&self, id: i64) -> Option<usize> {
        self.records.iter().position(|r| r.id() == id)
    }

    pub fn selected(&self) -> Option<&R> {
        self.table_state.selected().and_then(|i| self.records.get(i))
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.table_state.selected()
    }

    pub fn is_confirming_delete(&self) -> bool {
        self.pending_delete.is_some()
    }

    /// Record the delete dialog is asking about, if it is still listed
    pub fn pending_delete(&self) -> Option<&R> {
        let id = self.pending_delete?;
        self.records.iter().find(|r| r.id() == id)
    }

    /// Open the delete dialog for the selected record
    pub fn ask_delete(&mut self) {
        self.pending_delete = self.selected().map(Record::id);
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }
}

pub fn handle_key<R: Record>(state: &mut ListState<R>, key: KeyEvent) -> Option<ListAction<R>> {
    if state.is_confirming_delete() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                let record = state.pending_delete().cloned();
                state.cancel_delete();
                return record.map(ListAction::Delete);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                state.cancel_delete();
            }
            _ => {}
        }
        return None;
    }

    match key.code {
        KeyCode::Char('q') => return Some(ListAction::Quit),
        KeyCode::Tab | KeyCode::BackTab => return Some(ListAction::SwitchScreen),
        KeyCode::Char('r') => return Some(ListAction::Reload),
        KeyCode::Char('n') => return Some(ListAction::New),
        KeyCode::Char('e') | KeyCode::Enter => {
            return state.selected().cloned().map(ListAction::Edit);
        }
        KeyCode::Char('d') | KeyCode::Delete => state.ask_delete(),
        KeyCode::Down | KeyCode::Char('j') => state.next(),
        KeyCode::Up | KeyCode::Char('k') => state.previous(),
        _ => {}
    }
    None
}

pub fn render_list<B: Backend, R: ListLayout>(
    frame: &mut Frame<B>,
    area: Rect,
    state: &mut ListState<R>,
    loading: bool,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(2)].as_ref())
        .split(area);

    let columns = R::columns();
    let widths: Vec<Constraint> = columns.iter().map(|c| c.width).collect();

    let header = Row::new(
        columns
            .iter()
            .map(|c| Cell::from(c.header).style(Style::default().add_modifier(Modifier::BOLD))),
    )
    .bottom_margin(1);

    let rows = state.records.iter().map(|record| Row::new(record.cells()));

    let title = if loading {
        format!("{} (loading...)", R::KIND.plural())
    } else {
        format!("{} ({})", R::KIND.plural(), state.records.len())
    };

    let table = Table::new(rows)
        .header(header)
        .block(Block::default().title(title).borders(Borders::ALL))
        .widths(&widths)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_stateful_widget(table, chunks[0], &mut state.table_state);

    let noun = R::KIND.to_string().to_lowercase();
    let buttons_text = if state.selected().is_some() {
        format!("<N> New {noun} | <E> Edit | <D> Delete | <R> Reload | <Tab> Switch list | <Q> Quit")
    } else {
        format!("<N> New {noun} | <R> Reload | <Tab> Switch list | <Q> Quit")
    };

    let buttons = Paragraph::new(buttons_text)
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));

    frame.render_widget(buttons, chunks[1]);

    if state.is_confirming_delete() {
        if let Some(record) = state.pending_delete() {
            let message = format!("Are you sure you want to delete {}?", record.label());
            render_confirmation(frame, area, "Confirm Delete", &message);
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;

    use super::*;
    use crate::models::Client;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn clients(n: i64) -> Vec<Client> {
        (1..=n)
            .map(|id| Client { id, name: format!("Client {id}") })
            .collect()
    }

    #[test]
    fn selection_wraps_around() {
        let mut state = ListState::new(clients(3));
        assert_eq!(state.selected_index(), Some(0));

        state.previous();
        assert_eq!(state.selected_index(), Some(2));
        state.next();
        assert_eq!(state.selected_index(), Some(0));
    }

    #[test]
    fn replace_clamps_selection() {
        let mut state = ListState::new(clients(5));
        state.select_id(5);
        assert_eq!(state.selected_index(), Some(4));

        state.replace(clients(2));
        assert_eq!(state.selected_index(), Some(1));

        state.replace(Vec::new());
        assert_eq!(state.selected_index(), None);
        assert!(state.selected().is_none());

        state.replace(clients(1));
        assert_eq!(state.selected_index(), Some(0));
    }

    #[test]
    fn delete_needs_confirmation() {
        let mut state = ListState::new(clients(2));
        state.next();

        assert!(handle_key(&mut state, key(KeyCode::Char('d'))).is_none());
        assert!(state.is_confirming_delete());

        // navigation is ignored while the dialog is open
        assert!(handle_key(&mut state, key(KeyCode::Down)).is_none());
        assert_eq!(state.selected_index(), Some(1));

        match handle_key(&mut state, key(KeyCode::Char('y'))) {
            Some(ListAction::Delete(client)) => assert_eq!(client.id, 2),
            _ => panic!("expected a delete action"),
        }
        assert!(!state.is_confirming_delete());
    }

    #[test]
    fn cancelling_confirmation_deletes_nothing() {
        let mut state = ListState::new(clients(1));
        handle_key(&mut state, key(KeyCode::Char('d')));

        assert!(handle_key(&mut state, key(KeyCode::Char('n'))).is_none());
        assert!(!state.is_confirming_delete());

        handle_key(&mut state, key(KeyCode::Char('d')));
        assert!(handle_key(&mut state, key(KeyCode::Esc)).is_none());
        assert!(!state.is_confirming_delete());
    }

    #[test]
    fn empty_list_offers_only_new() {
        let mut state: ListState<Client> = ListState::new(Vec::new());

        assert!(handle_key(&mut state, key(KeyCode::Char('e'))).is_none());
        assert!(handle_key(&mut state, key(KeyCode::Char('d'))).is_none());
        assert!(!state.is_confirming_delete());
        assert!(matches!(handle_key(&mut state, key(KeyCode::Char('n'))), Some(ListAction::New)));
    }

    #[test]
    fn replace_keeps_the_selected_record() {
        let mut state = ListState::new(clients(3));
        state.select_id(3);

        // a row above the selection goes away
        state.replace(vec![
            Client { id: 2, name: "Client 2".into() },
            Client { id: 3, name: "Client 3".into() },
        ]);

        assert_eq!(state.selected().map(|c| c.id), Some(3));
        assert_eq!(state.selected_index(), Some(1));
    }

    #[test]
    fn confirmed_delete_targets_the_record_shown_in_the_dialog() {
        let mut state = ListState::new(clients(3));
        state.select_id(2);
        handle_key(&mut state, key(KeyCode::Char('d')));

        state.replace(vec![
            Client { id: 2, name: "Client 2".into() },
            Client { id: 3, name: "Client 3".into() },
        ]);
        assert!(state.is_confirming_delete());

        match handle_key(&mut state, key(KeyCode::Char('y'))) {
            Some(ListAction::Delete(client)) => assert_eq!(client.id, 2),
            _ => panic!("expected a delete action"),
        }
    }

    #[test]
    fn dialog_closes_when_its_record_disappears() {
        let mut state = ListState::new(clients(3));
        state.select_id(2);
        handle_key(&mut state, key(KeyCode::Char('d')));

        state.replace(vec![
            Client { id: 1, name: "Client 1".into() },
            Client { id: 3, name: "Client 3".into() },
        ]);

        assert!(!state.is_confirming_delete());
        assert!(handle_key(&mut state, key(KeyCode::Char('y'))).is_none());
    }

    #[test]
    fn enter_edits_selected_record() {
        let mut state = ListState::new(clients(2));
        state.next();

        match handle_key(&mut state, key(KeyCode::Enter)) {
            Some(ListAction::Edit(client)) => assert_eq!(client.name, "Client 2"),
            _ => panic!("expected an edit action"),
        }
    }
}
