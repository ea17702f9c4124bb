//! One entity collection and the reconciliation of its operations
//!
//! Every operation starts with [`Slice::begin`], which hands out a [`Ticket`]
//! with a fresh generation number, and ends with [`Slice::resolve`]. Resolution
//! is synchronous, so two reconciliations never interleave.
//!
//! Staleness rules:
//! - a fetch-all older than an already applied fetch-all is discarded;
//! - an update older than an already applied mutation of the same record is
//!   discarded;
//! - mutations that resolved after a fetch-all was requested are replayed on
//!   top of that fetch's snapshot.

use std::collections::HashMap;
use std::future::Future;
use tracing::{debug, warn};

use super::errors::StoreError;
use crate::api::{ApiError, GENERIC_FAILURE};
use crate::models::{Birthday, User};

/// A record with a stable identifier
pub trait Entity: Clone {
    fn key(&self) -> &str;
}

impl Entity for Birthday {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Entity for User {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Kind of operation a ticket was issued for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    FetchAll,
    Create,
    Update(String),
    Delete(String),
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::FetchAll => "fetch",
            Operation::Create => "create",
            Operation::Update(_) => "update",
            Operation::Delete(_) => "delete",
        }
    }
}

/// Receipt for an in-flight operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    operation: Operation,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }
}

/// Server-confirmed result of an operation
#[derive(Debug, Clone)]
pub enum Outcome<T> {
    Fetched(Vec<T>),
    Created(T),
    Updated(T),
    Deleted(String),
}

/// What reconciliation did with a successful completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    Applied,
    /// Update or delete of a record the collection does not hold; nothing changed
    Missing,
    /// A newer completion already resolved; nothing changed
    Stale,
    /// The operation was cancelled (or already resolved); nothing changed
    Cancelled,
}

#[derive(Debug, Clone)]
enum Change<T> {
    /// Created: insert if absent from a snapshot
    Upsert(T),
    /// Updated: replace only if present
    Replace(T),
    Remove,
}

#[derive(Debug, Clone)]
struct JournalEntry<T> {
    generation: u64,
    /// Highest generation issued when this entry resolved
    resolved_at: u64,
    change: Change<T>,
}

#[derive(Debug)]
pub struct Slice<T> {
    name: &'static str,
    fallback_message: &'static str,
    items: Vec<T>,
    loading: bool,
    error: Option<String>,
    last_generation: u64,
    pending: HashMap<u64, Operation>,
    last_fetch: Option<u64>,
    journal: HashMap<String, JournalEntry<T>>,
}

impl<T: Entity> Slice<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fallback_message: GENERIC_FAILURE,
            items: Vec::new(),
            loading: false,
            error: None,
            last_generation: 0,
            pending: HashMap::new(),
            last_fetch: None,
            journal: HashMap::new(),
        }
    }

    /// Message surfaced when a failure carries no server text
    pub fn with_fallback_message(mut self, message: &'static str) -> Self {
        self.fallback_message = message;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.items.iter().find(|item| item.key() == key)
    }

    /// True while a fetch-all is in flight
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    /// Register the start of an operation
    pub fn begin(&mut self, operation: Operation) -> Ticket {
        self.last_generation += 1;
        let generation = self.last_generation;
        debug!("{}: begin {} #{}", self.name, operation.name(), generation);

        self.pending.insert(generation, operation.clone());
        self.error = None;
        self.refresh_loading();
        Ticket {
            generation,
            operation,
        }
    }

    /// Forget an in-flight operation; its completion will be ignored
    pub fn cancel(&mut self, generation: u64) {
        if self.pending.remove(&generation).is_some() {
            debug!("{}: cancelled #{}", self.name, generation);
        }
        self.refresh_loading();
    }

    /// Apply a completed operation to the collection
    pub fn resolve(
        &mut self,
        ticket: Ticket,
        result: Result<Outcome<T>, ApiError>,
    ) -> Result<Reconciled, StoreError> {
        let known = self.pending.remove(&ticket.generation).is_some();
        self.refresh_loading();
        if !known {
            debug!(
                "{}: ignoring completion of {} #{}",
                self.name,
                ticket.operation.name(),
                ticket.generation
            );
            return Ok(Reconciled::Cancelled);
        }

        match result {
            Ok(outcome) => {
                let reconciled = self.apply(ticket.generation, outcome);
                debug!(
                    "{}: {} #{} -> {:?}",
                    self.name,
                    ticket.operation.name(),
                    ticket.generation,
                    reconciled
                );
                Ok(reconciled)
            }
            Err(err) => {
                let message = err.user_message_or(self.fallback_message);
                warn!("{}: {} failed: {}", self.name, ticket.operation.name(), err);
                self.error = Some(message.clone());
                Err(StoreError::Failed {
                    operation: ticket.operation.name(),
                    message,
                })
            }
        }
    }

    /// Begin, await and resolve in one go, for callers that do one thing at a time
    pub async fn run<F>(&mut self, operation: Operation, call: F) -> Result<Reconciled, StoreError>
    where
        F: Future<Output = Result<Outcome<T>, ApiError>>,
    {
        let ticket = self.begin(operation);
        let result = call.await;
        self.resolve(ticket, result)
    }

    /// Drop everything, including in-flight bookkeeping
    pub fn clear(&mut self) {
        self.items.clear();
        self.pending.clear();
        self.journal.clear();
        self.last_fetch = None;
        self.error = None;
        self.refresh_loading();
    }

    fn refresh_loading(&mut self) {
        self.loading = self
            .pending
            .values()
            .any(|op| matches!(op, Operation::FetchAll));
    }

    fn apply(&mut self, generation: u64, outcome: Outcome<T>) -> Reconciled {
        match outcome {
            Outcome::Fetched(items) => self.apply_fetch(generation, items),
            Outcome::Created(entity) => {
                let key = entity.key().to_string();
                self.upsert(entity.clone());
                self.record(key, generation, Change::Upsert(entity));
                Reconciled::Applied
            }
            Outcome::Updated(entity) => {
                let key = entity.key().to_string();
                if self.is_superseded(&key, generation) || self.is_removed(&key) {
                    return Reconciled::Stale;
                }
                if !self.replace(entity.clone()) {
                    return Reconciled::Missing;
                }
                // an update of a record created in the same window keeps insert semantics
                let change = match self.journal.get(&key).map(|e| &e.change) {
                    Some(Change::Upsert(_)) => Change::Upsert(entity),
                    _ => Change::Replace(entity),
                };
                self.record(key, generation, change);
                Reconciled::Applied
            }
            Outcome::Deleted(key) => {
                let before = self.items.len();
                self.items.retain(|item| item.key() != key);
                let removed = self.items.len() != before;
                self.record(key, generation, Change::Remove);
                if removed {
                    Reconciled::Applied
                } else {
                    Reconciled::Missing
                }
            }
        }
    }

    fn apply_fetch(&mut self, generation: u64, items: Vec<T>) -> Reconciled {
        if matches!(self.last_fetch, Some(last) if last > generation) {
            return Reconciled::Stale;
        }

        self.items = items;
        self.last_fetch = Some(generation);

        // replay mutations the snapshot may predate, oldest first
        let mut replay: Vec<JournalEntry<T>> = self
            .journal
            .values()
            .filter(|entry| entry.resolved_at >= generation)
            .cloned()
            .collect();
        replay.sort_by_key(|entry| entry.generation);
        for entry in replay {
            match entry.change {
                Change::Upsert(entity) => self.upsert(entity),
                Change::Replace(entity) => {
                    self.replace(entity);
                }
                Change::Remove => {}
            }
        }
        let removed: Vec<String> = self
            .journal
            .iter()
            .filter(|(_, entry)| entry.resolved_at >= generation)
            .filter(|(_, entry)| matches!(entry.change, Change::Remove))
            .map(|(key, _)| key.clone())
            .collect();
        self.items.retain(|item| !removed.iter().any(|key| key == item.key()));

        // entries resolved before this fetch was requested are covered by it
        self.journal.retain(|_, entry| entry.resolved_at >= generation);
        Reconciled::Applied
    }

    fn is_superseded(&self, key: &str, generation: u64) -> bool {
        self.journal
            .get(key)
            .is_some_and(|entry| entry.generation > generation)
    }

    fn is_removed(&self, key: &str) -> bool {
        self.journal
            .get(key)
            .is_some_and(|entry| matches!(entry.change, Change::Remove))
    }

    /// A removal always lands in the journal, even over a newer update of the same record
    fn record(&mut self, key: String, generation: u64, change: Change<T>) {
        let newest = self.journal.get(&key).map(|entry| entry.generation);
        let generation = match (&change, newest) {
            (Change::Remove, Some(newest)) => newest.max(generation),
            (_, Some(newest)) if newest > generation => return,
            _ => generation,
        };
        self.journal.insert(
            key,
            JournalEntry {
                generation,
                resolved_at: self.last_generation,
                change,
            },
        );
    }

    fn upsert(&mut self, entity: T) {
        if !self.replace(entity.clone()) {
            self.items.push(entity);
        }
    }

    fn replace(&mut self, entity: T) -> bool {
        match self.items.iter_mut().find(|item| item.key() == entity.key()) {
            Some(slot) => {
                *slot = entity;
                true
            }
            None => false,
        }
    }
}
