//! In-memory birthday service used by tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tokio::sync::oneshot;

use super::{ApiError, AuthApi, BirthdayApi, Photo, PhotoUpload};
use crate::models::{
    Birthday, BirthdayPatch, Credentials, LoginResponse, NewBirthday, Registration, Role, User,
};

#[derive(Default)]
pub struct FakeApi {
    birthdays: Mutex<Vec<Birthday>>,
    users: Mutex<Vec<User>>,
    photos: Mutex<HashMap<String, Vec<Vec<u8>>>>,
    next_id: AtomicU64,
    failure: Mutex<Option<(u16, Option<String>)>>,
    gates: Mutex<HashMap<&'static str, oneshot::Receiver<()>>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_birthdays(birthdays: Vec<Birthday>) -> Self {
        let api = Self::new();
        *api.birthdays.lock().unwrap() = birthdays;
        api
    }

    pub fn with_users(self, users: Vec<User>) -> Self {
        *self.users.lock().unwrap() = users;
        self
    }

    /// Server-side state, bypassing the client
    pub fn stored(&self) -> Vec<Birthday> {
        self.birthdays.lock().unwrap().clone()
    }

    /// Make the next call fail with this status and message
    pub fn fail_next(&self, status: u16, message: Option<&str>) {
        *self.failure.lock().unwrap() = Some((status, message.map(str::to_string)));
    }

    /// Block the next call of `method` until the returned sender fires
    pub fn hold(&self, method: &'static str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(method, rx);
        tx
    }

    async fn gate(&self, method: &'static str) {
        let gate = self.gates.lock().unwrap().remove(method);
        if let Some(rx) = gate {
            let _ = rx.await;
        }
    }

    fn check(&self) -> Result<(), ApiError> {
        match self.failure.lock().unwrap().take() {
            Some((status, message)) => Err(ApiError::Server { status, message }),
            None => Ok(()),
        }
    }

    fn not_found(id: &str) -> ApiError {
        ApiError::Server {
            status: 404,
            message: Some(format!("Birthday {} not found", id)),
        }
    }
}

pub fn birthday(id: &str, name: &str) -> Birthday {
    Birthday {
        id: id.to_string(),
        name: name.to_string(),
        age: 30,
        gender: "Female".to_string(),
        relationship: "friend".to_string(),
        contact: "5550000".to_string(),
        dob: "1994-01-01".to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        wish: None,
        photos: 0,
        image: None,
        created_by_name: None,
        created_by_email: None,
    }
}

pub fn user(id: &str, name: &str, role: Role) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        role,
    }
}

#[async_trait]
impl AuthApi for FakeApi {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        self.check()?;
        let users = self.users.lock().unwrap();
        let found = users.iter().find(|u| u.email == credentials.email);
        match found {
            Some(user) => Ok(LoginResponse {
                token: format!("token-{}", user.id),
                role: user.role,
            }),
            None => Err(ApiError::Server {
                status: 401,
                message: Some("Invalid email or password".to_string()),
            }),
        }
    }

    async fn register(&self, registration: &Registration) -> Result<(), ApiError> {
        self.check()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.users.lock().unwrap().push(User {
            id: format!("u{}", id),
            name: registration.name.clone(),
            email: registration.email.clone(),
            role: Role::User,
        });
        Ok(())
    }
}

#[async_trait]
impl BirthdayApi for FakeApi {
    async fn list_birthdays(&self) -> Result<Vec<Birthday>, ApiError> {
        self.check()?;
        // snapshot first, so a held fetch returns data older than later writes
        let snapshot = self.stored();
        self.gate("list").await;
        Ok(snapshot)
    }

    async fn create_birthday(&self, payload: &NewBirthday) -> Result<Birthday, ApiError> {
        self.gate("create").await;
        self.check()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let created = Birthday {
            id: format!("b{}", id),
            name: payload.name.clone(),
            age: payload.age,
            gender: payload.gender.clone(),
            relationship: payload.relationship.clone(),
            contact: payload.contact.clone(),
            dob: payload.dob.clone(),
            email: payload.email.clone(),
            ..birthday("", "")
        };
        self.birthdays.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update_birthday(&self, id: &str, patch: &BirthdayPatch) -> Result<Birthday, ApiError> {
        self.gate("update").await;
        self.check()?;
        let mut birthdays = self.birthdays.lock().unwrap();
        let record = birthdays
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| Self::not_found(id))?;
        if let Some(name) = &patch.name {
            record.name = name.clone();
        }
        if let Some(age) = patch.age {
            record.age = age;
        }
        if let Some(gender) = &patch.gender {
            record.gender = gender.clone();
        }
        if let Some(relationship) = &patch.relationship {
            record.relationship = relationship.clone();
        }
        if let Some(contact) = &patch.contact {
            record.contact = contact.clone();
        }
        if let Some(dob) = &patch.dob {
            record.dob = dob.clone();
        }
        if let Some(email) = &patch.email {
            record.email = email.clone();
        }
        Ok(record.clone())
    }

    async fn delete_birthday(&self, id: &str) -> Result<(), ApiError> {
        self.gate("delete").await;
        self.check()?;
        let mut birthdays = self.birthdays.lock().unwrap();
        let before = birthdays.len();
        birthdays.retain(|b| b.id != id);
        if birthdays.len() == before {
            return Err(Self::not_found(id));
        }
        Ok(())
    }

    async fn update_wish(&self, id: &str, wish: &str) -> Result<Birthday, ApiError> {
        self.check()?;
        let mut birthdays = self.birthdays.lock().unwrap();
        let record = birthdays
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| Self::not_found(id))?;
        record.wish = Some(wish.to_string());
        Ok(record.clone())
    }

    async fn upload_photo(&self, id: &str, photo: PhotoUpload) -> Result<Birthday, ApiError> {
        self.check()?;
        let mut birthdays = self.birthdays.lock().unwrap();
        let record = birthdays
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| Self::not_found(id))?;
        let mut photos = self.photos.lock().unwrap();
        let stored = photos.entry(id.to_string()).or_default();
        stored.push(photo.bytes);
        record.photos = stored.len();
        Ok(record.clone())
    }

    async fn fetch_photo(&self, id: &str, index: usize) -> Result<Photo, ApiError> {
        self.check()?;
        let photos = self.photos.lock().unwrap();
        let bytes = photos
            .get(id)
            .and_then(|p| p.get(index))
            .cloned()
            .ok_or_else(|| Self::not_found(id))?;
        Ok(Photo {
            content_type: Some("image/png".to_string()),
            bytes,
        })
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        self.check()?;
        self.users
            .lock()
            .unwrap()
            .first()
            .cloned()
            .ok_or(ApiError::Server {
                status: 401,
                message: None,
            })
    }

    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.check()?;
        Ok(self.users.lock().unwrap().clone())
    }

    async fn user_count(&self) -> Result<u64, ApiError> {
        self.check()?;
        Ok(self.users.lock().unwrap().len() as u64)
    }
}
