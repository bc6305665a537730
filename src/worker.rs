use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::db::{Database, Repository};
use crate::error::StoreError;
use crate::models::{Record, RecordKind, Snapshot};

/// What a job was asked to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Load,
    Save,
    Delete,
}

/// A write (or plain read) that completed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Loaded,
    Inserted(i64),
    Updated(i64),
    Deleted(i64),
}

/// Result of a background job, delivered back to the UI loop
#[derive(Debug)]
pub enum Outcome {
    Refreshed {
        kind: RecordKind,
        seq: u64,
        /// Taken right before the table was read; later reads get larger stamps
        read_stamp: u64,
        change: Change,
        snapshot: Snapshot,
    },
    Failed {
        kind: RecordKind,
        seq: u64,
        action: Action,
        /// Set when the write went through but the re-read afterwards failed
        committed: Option<Change>,
        error: StoreError,
    },
}

impl Outcome {
    pub fn kind(&self) -> RecordKind {
        match self {
            Outcome::Refreshed { kind, .. } | Outcome::Failed { kind, .. } => *kind,
        }
    }

    pub fn seq(&self) -> u64 {
        match self {
            Outcome::Refreshed { seq, .. } | Outcome::Failed { seq, .. } => *seq,
        }
    }
}

/// Runs database jobs on tokio tasks and hands their outcomes back
///
/// Every job ends by re-reading the whole table it touched. Jobs are numbered
/// in submission order, and each read is stamped from a shared counter just
/// before its query runs, so the receiver can drop a snapshot that was read
/// before one it already applied.
pub struct Worker {
    db: Database,
    tx: UnboundedSender<Outcome>,
    rx: UnboundedReceiver<Outcome>,
    next_seq: u64,
    reads: Arc<AtomicU64>,
    pending: usize,
}

impl Worker {
    pub fn new(db: Database) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            db,
            tx,
            rx,
            next_seq: 1,
            reads: Arc::new(AtomicU64::new(0)),
            pending: 0,
        }
    }

    /// Number of submitted jobs whose outcome has not been collected
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn load<R>(&mut self) -> u64
    where
        R: Record,
        Database: Repository<R>,
    {
        let seq = self.take_seq();
        let db = self.db.clone();
        let reads = Arc::clone(&self.reads);
        tracing::debug!(kind = %R::KIND, seq, "loading table");

        self.spawn(async move { refresh::<R>(&db, &reads, seq, Action::Load, Change::Loaded).await });
        seq
    }

    /// Insert a new record or update an existing one, then re-read the table
    pub fn save<R>(&mut self, record: R) -> u64
    where
        R: Record,
        Database: Repository<R>,
    {
        let seq = self.take_seq();
        let db = self.db.clone();
        let reads = Arc::clone(&self.reads);
        tracing::debug!(kind = %R::KIND, seq, id = record.id(), "saving record");

        self.spawn(async move {
            let written = if record.is_new() {
                Repository::<R>::insert(&db, &record)
                    .await
                    .map(Change::Inserted)
            } else {
                Repository::<R>::update(&db, &record)
                    .await
                    .map(|_| Change::Updated(record.id()))
            };

            match written {
                Ok(change) => refresh::<R>(&db, &reads, seq, Action::Save, change).await,
                Err(error) => Outcome::Failed {
                    kind: R::KIND,
                    seq,
                    action: Action::Save,
                    committed: None,
                    error,
                },
            }
        });
        seq
    }

    pub fn delete<R>(&mut self, id: i64) -> u64
    where
        R: Record,
        Database: Repository<R>,
    {
        let seq = self.take_seq();
        let db = self.db.clone();
        let reads = Arc::clone(&self.reads);
        tracing::debug!(kind = %R::KIND, seq, id, "deleting record");

        self.spawn(async move {
            match Repository::<R>::delete(&db, id).await {
                Ok(_) => refresh::<R>(&db, &reads, seq, Action::Delete, Change::Deleted(id)).await,
                Err(error) => Outcome::Failed {
                    kind: R::KIND,
                    seq,
                    action: Action::Delete,
                    committed: None,
                    error,
                },
            }
        });
        seq
    }

    /// Collect one finished outcome without waiting
    pub fn try_next(&mut self) -> Option<Outcome> {
        let outcome = self.rx.try_recv().ok()?;
        self.pending = self.pending.saturating_sub(1);
        Some(outcome)
    }

    /// Wait for the next outcome, or `None` when nothing is pending
    pub async fn next(&mut self) -> Option<Outcome> {
        if self.pending == 0 {
            return None;
        }
        let outcome = self.rx.recv().await?;
        self.pending -= 1;
        Some(outcome)
    }

    fn take_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn spawn<F>(&mut self, job: F)
    where
        F: Future<Output = Outcome> + Send + 'static,
    {
        let tx = self.tx.clone();
        self.pending += 1;

        tokio::spawn(async move {
            let outcome = job.await;
            if let Outcome::Failed { kind, seq, action, error, .. } = &outcome {
                tracing::warn!(%kind, seq, ?action, %error, "background job failed");
            }
            if tx.send(outcome).is_err() {
                tracing::debug!("outcome dropped, UI loop has stopped");
            }
        });
    }
}

async fn refresh<R>(
    db: &Database,
    reads: &AtomicU64,
    seq: u64,
    action: Action,
    change: Change,
) -> Outcome
where
    R: Record,
    Database: Repository<R>,
{
    let read_stamp = reads.fetch_add(1, Ordering::SeqCst) + 1;

    match Repository::<R>::list(db).await {
        Ok(records) => Outcome::Refreshed {
            kind: R::KIND,
            seq,
            read_stamp,
            change,
            snapshot: R::snapshot(records),
        },
        Err(error) => Outcome::Failed {
            kind: R::KIND,
            seq,
            action,
            committed: Some(change).filter(|change| *change != Change::Loaded),
            error,
        },
    }
}
