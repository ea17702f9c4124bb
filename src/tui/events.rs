//! Messages flowing into the app: screen requests and finished background work

use std::path::PathBuf;

use crate::models::{BirthdayPatch, Credentials, LoginResponse, NewBirthday, Registration};

/// What a screen asks the app to do after handling a key
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenAction {
    /// No action taken
    None,
    Quit,
    SetStatus(String),
    SetError(String),

    Login(Credentials),
    Register(Registration),

    CreateBirthday(NewBirthday),
    UpdateBirthday { id: String, patch: BirthdayPatch },
    DeleteBirthday(String),
    SaveWish { id: String, wish: String },
    UploadPhoto { id: String, path: PathBuf },
    SavePhotos { id: String, count: usize },
}

/// Background work that does not go through the store
#[derive(Debug)]
pub enum AppEvent {
    /// Login finished; the error is the message to show
    LoginFinished(Result<LoginResponse, String>),
    RegisterFinished { email: String, result: Result<(), String> },
    /// Total number of accounts, for the admin panel
    UserCount(Result<u64, String>),
    PhotosSaved(Result<Vec<PathBuf>, String>),
}
