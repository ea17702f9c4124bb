//! Client-side mirror of the service's collections
//!
//! The [`Store`] owns one [`Slice`] per entity type. Each operation comes in
//! two flavours: an `async` method that runs and reconciles inline (used by the
//! CLI), and a `spawn_*` method that runs in the background and is reconciled
//! later by [`Store::poll`] on the thread that owns the store (used by the TUI).

pub mod dispatch;
pub mod errors;
pub mod slice;

use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use crate::api::{ApiError, BirthdayApi, PhotoUpload};
use crate::models::{Birthday, BirthdayPatch, NewBirthday, User};

pub use dispatch::{Dispatcher, OperationHandle};
pub use errors::StoreError;
pub use slice::{Entity, Operation, Outcome, Reconciled, Slice, Ticket};

/// Shown when loading the signed-in user fails without a server message
pub const USER_LOAD_FAILURE: &str = "Failed to load user";

/// Which slice a completion belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceKind {
    Birthdays,
    Users,
    CurrentUser,
}

/// A reconciled background completion, reported back to the UI
#[derive(Debug, Clone, PartialEq)]
pub struct StoreEvent {
    pub slice: SliceKind,
    pub ticket: Ticket,
    pub result: Result<Reconciled, StoreError>,
}

pub struct Store {
    api: Arc<dyn BirthdayApi>,
    birthdays: Slice<Birthday>,
    users: Slice<User>,
    current_user: Slice<User>,
    birthday_ops: Dispatcher<Birthday>,
    user_ops: Dispatcher<User>,
    current_user_ops: Dispatcher<User>,
}

impl Store {
    pub fn new(api: Arc<dyn BirthdayApi>) -> Self {
        Self {
            api,
            birthdays: Slice::new("birthdays"),
            users: Slice::new("users"),
            current_user: Slice::new("current_user").with_fallback_message(USER_LOAD_FAILURE),
            birthday_ops: Dispatcher::new(),
            user_ops: Dispatcher::new(),
            current_user_ops: Dispatcher::new(),
        }
    }

    pub fn api(&self) -> Arc<dyn BirthdayApi> {
        Arc::clone(&self.api)
    }

    pub fn birthdays(&self) -> &Slice<Birthday> {
        &self.birthdays
    }

    pub fn users(&self) -> &Slice<User> {
        &self.users
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.items().first()
    }

    pub fn current_user_slice(&self) -> &Slice<User> {
        &self.current_user
    }

    // Inline operations

    pub async fn fetch_birthdays(&mut self) -> Result<Reconciled, StoreError> {
        let api = self.api();
        self.birthdays
            .run(Operation::FetchAll, async move {
                api.list_birthdays().await.map(Outcome::Fetched)
            })
            .await
    }

    /// Create a record; returns the server's copy
    pub async fn create_birthday(&mut self, payload: NewBirthday) -> Result<Birthday, StoreError> {
        let ticket = self.birthdays.begin(Operation::Create);
        let result = self.api.create_birthday(&payload).await;
        settle(&mut self.birthdays, ticket, result, Outcome::Created)
    }

    /// Update a record; a record missing from the local collection is left alone
    pub async fn update_birthday(
        &mut self,
        id: &str,
        patch: BirthdayPatch,
    ) -> Result<Birthday, StoreError> {
        let ticket = self.birthdays.begin(Operation::Update(id.to_string()));
        let result = self.api.update_birthday(id, &patch).await;
        self.finish_update(ticket, result)
    }

    pub async fn update_wish(&mut self, id: &str, wish: &str) -> Result<Birthday, StoreError> {
        let ticket = self.birthdays.begin(Operation::Update(id.to_string()));
        let result = self.api.update_wish(id, wish).await;
        self.finish_update(ticket, result)
    }

    pub async fn upload_photo(&mut self, id: &str, path: PathBuf) -> Result<Birthday, StoreError> {
        let ticket = self.birthdays.begin(Operation::Update(id.to_string()));
        let api = self.api();
        let result = match PhotoUpload::from_path(&path).await {
            Ok(upload) => api.upload_photo(id, upload).await,
            Err(err) => Err(err),
        };
        self.finish_update(ticket, result)
    }

    pub async fn delete_birthday(&mut self, id: &str) -> Result<Reconciled, StoreError> {
        let api = self.api();
        let key = id.to_string();
        self.birthdays
            .run(Operation::Delete(key.clone()), async move {
                api.delete_birthday(&key).await.map(|_| Outcome::Deleted(key))
            })
            .await
    }

    pub async fn fetch_users(&mut self) -> Result<Reconciled, StoreError> {
        let api = self.api();
        self.users
            .run(Operation::FetchAll, async move {
                api.list_users().await.map(Outcome::Fetched)
            })
            .await
    }

    pub async fn fetch_current_user(&mut self) -> Result<Reconciled, StoreError> {
        let api = self.api();
        self.current_user
            .run(Operation::FetchAll, async move {
                api.current_user().await.map(|user| Outcome::Fetched(vec![user]))
            })
            .await
    }

    fn finish_update(
        &mut self,
        ticket: Ticket,
        result: Result<Birthday, ApiError>,
    ) -> Result<Birthday, StoreError> {
        settle(&mut self.birthdays, ticket, result, Outcome::Updated)
    }

    // Background operations

    pub fn spawn_fetch_birthdays(&mut self) -> OperationHandle {
        let api = self.api();
        self.birthday_ops
            .spawn(&mut self.birthdays, Operation::FetchAll, async move {
                api.list_birthdays().await.map(Outcome::Fetched)
            })
    }

    pub fn spawn_create_birthday(&mut self, payload: NewBirthday) -> OperationHandle {
        let api = self.api();
        self.birthday_ops
            .spawn(&mut self.birthdays, Operation::Create, async move {
                api.create_birthday(&payload).await.map(Outcome::Created)
            })
    }

    pub fn spawn_update_birthday(&mut self, id: &str, patch: BirthdayPatch) -> OperationHandle {
        let api = self.api();
        let key = id.to_string();
        self.birthday_ops.spawn(
            &mut self.birthdays,
            Operation::Update(key.clone()),
            async move { api.update_birthday(&key, &patch).await.map(Outcome::Updated) },
        )
    }

    pub fn spawn_update_wish(&mut self, id: &str, wish: String) -> OperationHandle {
        let api = self.api();
        let key = id.to_string();
        self.birthday_ops.spawn(
            &mut self.birthdays,
            Operation::Update(key.clone()),
            async move { api.update_wish(&key, &wish).await.map(Outcome::Updated) },
        )
    }

    pub fn spawn_upload_photo(&mut self, id: &str, path: PathBuf) -> OperationHandle {
        let api = self.api();
        let key = id.to_string();
        self.birthday_ops.spawn(
            &mut self.birthdays,
            Operation::Update(key.clone()),
            async move {
                let upload = PhotoUpload::from_path(&path).await?;
                api.upload_photo(&key, upload).await.map(Outcome::Updated)
            },
        )
    }

    pub fn spawn_delete_birthday(&mut self, id: &str) -> OperationHandle {
        let api = self.api();
        let key = id.to_string();
        self.birthday_ops.spawn(
            &mut self.birthdays,
            Operation::Delete(key.clone()),
            async move { api.delete_birthday(&key).await.map(|_| Outcome::Deleted(key)) },
        )
    }

    pub fn spawn_fetch_users(&mut self) -> OperationHandle {
        let api = self.api();
        self.user_ops
            .spawn(&mut self.users, Operation::FetchAll, async move {
                api.list_users().await.map(Outcome::Fetched)
            })
    }

    pub fn spawn_fetch_current_user(&mut self) -> OperationHandle {
        let api = self.api();
        self.current_user_ops
            .spawn(&mut self.current_user, Operation::FetchAll, async move {
                api.current_user().await.map(|user| Outcome::Fetched(vec![user]))
            })
    }

    /// Cancel one background operation started on the birthdays slice
    pub fn cancel_birthday_op(&mut self, handle: &OperationHandle) {
        self.birthday_ops.cancel(&mut self.birthdays, handle);
    }

    /// Reconcile every background completion that has arrived
    pub fn poll(&mut self) -> Vec<StoreEvent> {
        let mut events = Vec::new();
        let batches = [
            (SliceKind::Birthdays, self.birthday_ops.drain(&mut self.birthdays)),
            (SliceKind::Users, self.user_ops.drain(&mut self.users)),
            (
                SliceKind::CurrentUser,
                self.current_user_ops.drain(&mut self.current_user),
            ),
        ];
        for (slice, resolved) in batches {
            for (ticket, result) in resolved {
                events.push(StoreEvent {
                    slice,
                    ticket,
                    result,
                });
            }
        }
        events
    }

    /// Wait for the next background completion on the birthdays slice
    pub async fn next_birthday_event(&mut self) -> Option<StoreEvent> {
        let (ticket, result) = self.birthday_ops.next(&mut self.birthdays).await?;
        Some(StoreEvent {
            slice: SliceKind::Birthdays,
            ticket,
            result,
        })
    }

    pub fn in_flight(&self) -> usize {
        self.birthday_ops.in_flight() + self.user_ops.in_flight() + self.current_user_ops.in_flight()
    }

    /// Teardown: cancel everything in flight and forget all data
    pub fn reset(&mut self) {
        self.birthday_ops.cancel_all(&mut self.birthdays);
        self.user_ops.cancel_all(&mut self.users);
        self.current_user_ops.cancel_all(&mut self.current_user);
        self.birthdays.clear();
        self.users.clear();
        self.current_user.clear();
    }
}

/// Resolve an inline create/update and hand the server's copy back to the caller
fn settle(
    slice: &mut Slice<Birthday>,
    ticket: Ticket,
    result: Result<Birthday, ApiError>,
    outcome: fn(Birthday) -> Outcome<Birthday>,
) -> Result<Birthday, StoreError> {
    let operation = ticket.operation().name();
    match result {
        Ok(entity) => {
            if slice.resolve(ticket, Ok(outcome(entity.clone())))? == Reconciled::Missing {
                debug!("{} {} is not in the local collection; left unchanged", slice.name(), entity.id);
            }
            Ok(entity)
        }
        Err(err) => {
            let message = err.user_message();
            slice.resolve(ticket, Err(err))?;
            // only reached when the ticket was cancelled while the call ran
            Err(StoreError::Failed { operation, message })
        }
    }
}
