mod client;
mod employee;

use std::fmt;

pub use client::Client;
pub use employee::Employee;

/// The two kinds of records the application manages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Client,
    Employee,
}

impl RecordKind {
    pub fn plural(self) -> &'static str {
        match self {
            RecordKind::Client => "Clients",
            RecordKind::Employee => "Employees",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Client => f.write_str("Client"),
            RecordKind::Employee => f.write_str("Employee"),
        }
    }
}

/// A persisted row with a database-assigned identity
///
/// A draft that has not been inserted yet carries id `0`. Implementors compare
/// equal by identity alone.
pub trait Record: Clone + fmt::Debug + Send + Sync + 'static {
    const KIND: RecordKind;

    fn id(&self) -> i64;

    fn is_new(&self) -> bool {
        self.id() == 0
    }

    /// One-line description used in dialogs and status messages
    fn label(&self) -> String;

    /// Copy of the record with surrounding whitespace removed from every field
    fn trimmed(&self) -> Self;

    /// Check the fields that must be filled in before writing
    fn validate(&self) -> Result<(), String>;

    /// Wrap a freshly read table in the matching snapshot variant
    fn snapshot(records: Vec<Self>) -> Snapshot;
}

/// Full contents of one table after a re-read
#[derive(Debug, Clone)]
pub enum Snapshot {
    Clients(Vec<Client>),
    Employees(Vec<Employee>),
}

impl Snapshot {
    pub fn kind(&self) -> RecordKind {
        match self {
            Snapshot::Clients(_) => RecordKind::Client,
            Snapshot::Employees(_) => RecordKind::Employee,
        }
    }
}
