//! Runs slice operations as background tasks and feeds their completions
//! back to the owning thread

use std::collections::HashMap;
use std::future::Future;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use super::errors::StoreError;
use super::slice::{Entity, Operation, Outcome, Reconciled, Slice, Ticket};
use crate::api::ApiError;

/// A finished operation waiting to be reconciled
#[derive(Debug)]
pub struct Completion<T> {
    pub ticket: Ticket,
    pub result: Result<Outcome<T>, ApiError>,
}

/// Handle to one in-flight operation; lets a view cancel what it started
#[derive(Debug, Clone)]
pub struct OperationHandle {
    ticket: Ticket,
    abort: AbortHandle,
}

impl OperationHandle {
    pub fn generation(&self) -> u64 {
        self.ticket.generation()
    }

    pub fn operation(&self) -> &Operation {
        self.ticket.operation()
    }
}

/// Per-slice task launcher
pub struct Dispatcher<T> {
    tx: mpsc::UnboundedSender<Completion<T>>,
    rx: mpsc::UnboundedReceiver<Completion<T>>,
    running: HashMap<u64, AbortHandle>,
}

impl<T: Entity + Send + 'static> Dispatcher<T> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx,
            running: HashMap::new(),
        }
    }

    /// Start `call` for `operation`; its completion arrives through [`Dispatcher::drain`]
    pub fn spawn<F>(&mut self, slice: &mut Slice<T>, operation: Operation, call: F) -> OperationHandle
    where
        F: Future<Output = Result<Outcome<T>, ApiError>> + Send + 'static,
    {
        let ticket = slice.begin(operation);
        let tx = self.tx.clone();
        let task_ticket = ticket.clone();

        let handle = tokio::spawn(async move {
            let result = call.await;
            // receiver only goes away with the dispatcher itself
            let _ = tx.send(Completion {
                ticket: task_ticket,
                result,
            });
        });

        let abort = handle.abort_handle();
        self.running.insert(ticket.generation(), abort.clone());
        OperationHandle { ticket, abort }
    }

    pub fn cancel(&mut self, slice: &mut Slice<T>, handle: &OperationHandle) {
        handle.abort.abort();
        self.running.remove(&handle.generation());
        slice.cancel(handle.generation());
    }

    /// Cancel everything still running, e.g. when the owning view goes away
    pub fn cancel_all(&mut self, slice: &mut Slice<T>) {
        for (generation, abort) in self.running.drain() {
            abort.abort();
            slice.cancel(generation);
        }
    }

    pub fn in_flight(&self) -> usize {
        self.running.len()
    }

    /// Reconcile every completion that has arrived so far, without waiting
    pub fn drain(&mut self, slice: &mut Slice<T>) -> Vec<(Ticket, Result<Reconciled, StoreError>)> {
        let mut resolved = Vec::new();
        while let Ok(completion) = self.rx.try_recv() {
            resolved.push(self.reconcile(slice, completion));
        }
        resolved
    }

    /// Wait for the next completion and reconcile it
    pub async fn next(&mut self, slice: &mut Slice<T>) -> Option<(Ticket, Result<Reconciled, StoreError>)> {
        let completion = self.rx.recv().await?;
        Some(self.reconcile(slice, completion))
    }

    fn reconcile(
        &mut self,
        slice: &mut Slice<T>,
        completion: Completion<T>,
    ) -> (Ticket, Result<Reconciled, StoreError>) {
        self.running.remove(&completion.ticket.generation());
        let ticket = completion.ticket.clone();
        let result = slice.resolve(completion.ticket, completion.result);
        (ticket, result)
    }
}

impl<T: Entity + Send + 'static> Default for Dispatcher<T> {
    fn default() -> Self {
        Self::new()
    }
}
