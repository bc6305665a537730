use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::Spans,
    widgets::{Block, Borders, Tabs},
    Frame,
};

use crate::db::{Database, Repository};
use crate::error::StoreError;
use crate::models::{Client, Employee, Record, RecordKind, Snapshot};
use crate::ui::components::status::{render_status, Status};
use crate::ui::form::{handle_key as handle_form_key, render_form, FormAction, FormLayout, FormState};
use crate::ui::list::{handle_key as handle_list_key, render_list, ListAction, ListLayout, ListState};
use crate::worker::{Action, Change, Outcome, Worker};

// Represents the current screen in the app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    List(RecordKind),
    Form(RecordKind),
}

impl Screen {
    pub fn kind(self) -> RecordKind {
        match self {
            Screen::List(kind) | Screen::Form(kind) => kind,
        }
    }
}

/// Screen change requested by a key press or a finished job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Nav {
    Stay,
    OpenForm,
    CloseForm,
    SwitchList,
    Quit,
}

/// List, open form and job bookkeeping for one record type
struct Section<R> {
    list: ListState<R>,
    form: Option<FormState<R>>,
    /// Read stamp of the newest snapshot shown in the list
    applied_stamp: u64,
    in_flight: usize,
}

impl<R> Section<R>
where
    R: ListLayout + FormLayout,
    Database: Repository<R>,
{
    fn new() -> Self {
        Self {
            list: ListState::new(Vec::new()),
            form: None,
            applied_stamp: 0,
            in_flight: 0,
        }
    }

    fn noun() -> String {
        R::KIND.to_string().to_lowercase()
    }

    fn reload(&mut self, worker: &mut Worker) {
        worker.load::<R>();
        self.in_flight += 1;
    }

    fn on_list_key(&mut self, worker: &mut Worker, key: KeyEvent, status: &mut Option<Status>) -> Nav {
        match handle_list_key(&mut self.list, key) {
            None => Nav::Stay,
            Some(ListAction::Quit) => Nav::Quit,
            Some(ListAction::SwitchScreen) => Nav::SwitchList,
            Some(ListAction::Reload) => {
                self.reload(worker);
                Nav::Stay
            }
            Some(ListAction::New) => {
                self.form = Some(FormState::new());
                Nav::OpenForm
            }
            Some(ListAction::Edit(record)) => {
                self.form = Some(FormState::from_existing(record));
                Nav::OpenForm
            }
            Some(ListAction::Delete(record)) => {
                worker.delete::<R>(record.id());
                self.in_flight += 1;
                *status = Some(Status::info(format!("Deleting {}...", record.label())));
                Nav::Stay
            }
        }
    }

    fn on_form_key(&mut self, worker: &mut Worker, key: KeyEvent) -> Nav {
        let Some(form) = self.form.as_mut() else {
            return Nav::CloseForm;
        };

        match handle_form_key(form, key) {
            None => Nav::Stay,
            Some(FormAction::Cancel) => {
                self.form = None;
                Nav::CloseForm
            }
            Some(FormAction::Save(record)) => {
                let seq = worker.save(record);
                form.submitted(seq);
                self.in_flight += 1;
                Nav::Stay
            }
        }
    }

    fn on_refreshed(
        &mut self,
        seq: u64,
        read_stamp: u64,
        change: Change,
        records: Vec<R>,
        status: &mut Option<Status>,
    ) -> Nav {
        self.in_flight = self.in_flight.saturating_sub(1);

        if read_stamp > self.applied_stamp {
            self.list.replace(records);
            self.applied_stamp = read_stamp;
        } else {
            tracing::debug!(
                kind = %R::KIND,
                seq,
                read_stamp,
                applied = self.applied_stamp,
                "dropping stale snapshot"
            );
        }

        match change {
            Change::Loaded => Nav::Stay,
            Change::Inserted(id) | Change::Updated(id) => {
                self.list.select_id(id);
                let verb = if matches!(change, Change::Inserted(_)) { "Added" } else { "Saved" };
                *status = Some(Status::info(format!("{verb} {} #{id}", Self::noun())));
                self.close_form_waiting_for(seq)
            }
            Change::Deleted(id) => {
                *status = Some(Status::info(format!("Deleted {} #{id}", Self::noun())));
                Nav::Stay
            }
        }
    }

    fn on_failed(
        &mut self,
        seq: u64,
        action: Action,
        committed: Option<Change>,
        error: StoreError,
        status: &mut Option<Status>,
    ) -> Nav {
        self.in_flight = self.in_flight.saturating_sub(1);
        let message = error.to_string();

        if committed.is_some() {
            // The write itself went through, so the form has nothing left to do
            *status = Some(Status::error(format!(
                "{} saved but reloading the list failed: {message}",
                R::KIND
            )));
            return self.close_form_waiting_for(seq);
        }

        let verb = match action {
            Action::Load => "load",
            Action::Save => "save",
            Action::Delete => "delete",
        };
        *status = Some(Status::error(format!("Could not {verb} {}: {message}", Self::noun())));

        if let Some(form) = self.form.as_mut() {
            if form.is_waiting_for(seq) {
                form.submit_failed(message);
            }
        }
        Nav::Stay
    }

    fn close_form_waiting_for(&mut self, seq: u64) -> Nav {
        if self.form.as_ref().is_some_and(|form| form.is_waiting_for(seq)) {
            self.form = None;
            Nav::CloseForm
        } else {
            Nav::Stay
        }
    }

    fn render<B: Backend>(&mut self, f: &mut Frame<B>, area: tui::layout::Rect, form_screen: bool) {
        let loading = self.in_flight > 0;
        match (&self.form, form_screen) {
            (Some(form), true) => render_form(f, area, form),
            _ => render_list(f, area, &mut self.list, loading),
        }
    }
}

// Main application state
pub struct AppState {
    worker: Worker,
    screen: Screen,
    clients: Section<Client>,
    employees: Section<Employee>,
    status: Option<Status>,
    should_quit: bool,
}

impl AppState {
    pub fn new(worker: Worker, start: RecordKind) -> Self {
        Self {
            worker,
            screen: Screen::List(start),
            clients: Section::new(),
            employees: Section::new(),
            status: None,
            should_quit: false,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Queue a fresh read of both tables
    pub fn load_all(&mut self) {
        self.employees.reload(&mut self.worker);
        self.clients.reload(&mut self.worker);
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.status.as_ref().is_some_and(|status| !status.is_error()) {
            self.status = None;
        }

        let kind = self.screen.kind();
        let nav = match self.screen {
            Screen::List(RecordKind::Client) => {
                self.clients.on_list_key(&mut self.worker, key, &mut self.status)
            }
            Screen::List(RecordKind::Employee) => {
                self.employees.on_list_key(&mut self.worker, key, &mut self.status)
            }
            Screen::Form(RecordKind::Client) => self.clients.on_form_key(&mut self.worker, key),
            Screen::Form(RecordKind::Employee) => self.employees.on_form_key(&mut self.worker, key),
        };

        if nav != Nav::Stay && self.status.as_ref().is_some_and(Status::is_error) {
            self.status = None;
        }
        self.navigate(kind, nav);
    }

    /// Fold a finished background job into the screens
    pub fn apply(&mut self, outcome: Outcome) {
        let kind = outcome.kind();
        let nav = match outcome {
            Outcome::Refreshed { seq, read_stamp, change, snapshot, .. } => match snapshot {
                Snapshot::Clients(records) => {
                    self.clients.on_refreshed(seq, read_stamp, change, records, &mut self.status)
                }
                Snapshot::Employees(records) => {
                    self.employees.on_refreshed(seq, read_stamp, change, records, &mut self.status)
                }
            },
            Outcome::Failed { kind, seq, action, committed, error } => {
                tracing::error!(%kind, seq, ?action, %error, "database operation failed");
                match kind {
                    RecordKind::Client => {
                        self.clients.on_failed(seq, action, committed, error, &mut self.status)
                    }
                    RecordKind::Employee => {
                        self.employees.on_failed(seq, action, committed, error, &mut self.status)
                    }
                }
            }
        };
        self.navigate(kind, nav);
    }

    /// Apply every outcome that has arrived since the last call
    pub fn drain_outcomes(&mut self) {
        while let Some(outcome) = self.worker.try_next() {
            self.apply(outcome);
        }
    }

    /// Wait for jobs still in flight so no write is cut off at exit
    pub async fn finish(&mut self, timeout: Duration) {
        let deadline = tokio::time::Instant::now() + timeout;

        while self.worker.pending() > 0 {
            match tokio::time::timeout_at(deadline, self.worker.next()).await {
                Ok(Some(outcome)) => self.apply(outcome),
                Ok(None) => break,
                Err(_) => {
                    tracing::warn!(pending = self.worker.pending(), "gave up waiting for background jobs");
                    break;
                }
            }
        }
    }

    fn navigate(&mut self, kind: RecordKind, nav: Nav) {
        match nav {
            Nav::Stay => {}
            Nav::OpenForm => self.screen = Screen::Form(kind),
            Nav::CloseForm => {
                if self.screen == Screen::Form(kind) {
                    self.screen = Screen::List(kind);
                }
            }
            Nav::SwitchList => {
                self.screen = match kind {
                    RecordKind::Client => Screen::List(RecordKind::Employee),
                    RecordKind::Employee => Screen::List(RecordKind::Client),
                };
            }
            Nav::Quit => self.should_quit = true,
        }
    }

    pub fn render<B: Backend>(&mut self, f: &mut Frame<B>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                [
                    Constraint::Length(3),
                    Constraint::Min(5),
                    Constraint::Length(1),
                ]
                .as_ref(),
            )
            .split(f.size());

        let titles = [RecordKind::Employee, RecordKind::Client]
            .iter()
            .map(|kind| Spans::from(kind.plural()))
            .collect();
        let selected = match self.screen.kind() {
            RecordKind::Employee => 0,
            RecordKind::Client => 1,
        };
        let tabs = Tabs::new(titles)
            .select(selected)
            .block(Block::default().title("Taqueria").borders(Borders::ALL))
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        f.render_widget(tabs, chunks[0]);

        match self.screen {
            Screen::List(RecordKind::Client) => self.clients.render(f, chunks[1], false),
            Screen::List(RecordKind::Employee) => self.employees.render(f, chunks[1], false),
            Screen::Form(RecordKind::Client) => self.clients.render(f, chunks[1], true),
            Screen::Form(RecordKind::Employee) => self.employees.render(f, chunks[1], true),
        }

        render_status(f, chunks[2], self.status.as_ref());
    }
}
