//! Birthday service collaborator
//!
//! The store and the front ends only see the [`AuthApi`] and [`BirthdayApi`]
//! traits; [`HttpApi`] is the reqwest-backed implementation.

pub mod errors;
pub mod http;

#[cfg(test)]
pub mod fake;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::models::{
    Birthday, BirthdayPatch, Credentials, LoginResponse, NewBirthday, Registration, User,
};

pub use errors::{ApiError, GENERIC_FAILURE};
pub use http::HttpApi;

/// Unauthenticated account endpoints
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError>;

    async fn register(&self, registration: &Registration) -> Result<(), ApiError>;
}

/// Endpoints that require a bearer token
#[async_trait]
pub trait BirthdayApi: Send + Sync {
    async fn list_birthdays(&self) -> Result<Vec<Birthday>, ApiError>;

    async fn create_birthday(&self, payload: &NewBirthday) -> Result<Birthday, ApiError>;

    async fn update_birthday(&self, id: &str, patch: &BirthdayPatch) -> Result<Birthday, ApiError>;

    async fn delete_birthday(&self, id: &str) -> Result<(), ApiError>;

    async fn update_wish(&self, id: &str, wish: &str) -> Result<Birthday, ApiError>;

    async fn upload_photo(&self, id: &str, photo: PhotoUpload) -> Result<Birthday, ApiError>;

    /// Raw bytes of the `index`-th photo of a record
    async fn fetch_photo(&self, id: &str, index: usize) -> Result<Photo, ApiError>;

    async fn current_user(&self) -> Result<User, ApiError>;

    async fn list_users(&self) -> Result<Vec<User>, ApiError>;

    async fn user_count(&self) -> Result<u64, ApiError>;
}

/// An image file about to be attached to a record
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl PhotoUpload {
    pub async fn from_path(path: &Path) -> Result<Self, ApiError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("photo")
            .to_string();
        let content_type = content_type_for(path).to_string();
        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }
}

/// A downloaded photo; opaque bytes plus whatever type the server declared
#[derive(Debug, Clone)]
pub struct Photo {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Photo {
    pub fn extension(&self) -> &str {
        match self.content_type.as_deref() {
            Some("image/png") => "png",
            Some("image/gif") => "gif",
            Some("image/webp") => "webp",
            Some("image/jpeg") | Some("image/jpg") => "jpg",
            _ => "bin",
        }
    }
}

/// Download the given photos of a record concurrently and write them into `dir`
/// as `<id>-<index>.<ext>`; returns the written paths in index order
pub async fn save_photos(
    api: &dyn BirthdayApi,
    id: &str,
    indices: &[usize],
    dir: &Path,
) -> Result<Vec<PathBuf>, ApiError> {
    let downloads = indices.iter().map(|index| api.fetch_photo(id, *index));
    let photos = futures::future::try_join_all(downloads).await?;

    tokio::fs::create_dir_all(dir).await?;
    let mut written = Vec::with_capacity(photos.len());
    for (index, photo) in indices.iter().zip(photos) {
        let path = dir.join(format!("{}-{}.{}", id, index, photo.extension()));
        tokio::fs::write(&path, &photo.bytes).await?;
        debug!("Saved photo {} of {} to {}", index, id, path.display());
        written.push(path);
    }
    Ok(written)
}

fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_photo_upload_from_path() {
        let mut file = tempfile::Builder::new().suffix(".JPG").tempfile().unwrap();
        file.write_all(b"\xff\xd8\xff").unwrap();

        let upload = PhotoUpload::from_path(file.path()).await.unwrap();
        assert_eq!(upload.content_type, "image/jpeg");
        assert_eq!(upload.bytes, b"\xff\xd8\xff".to_vec());
        assert!(upload.file_name.ends_with(".JPG"));
    }

    #[tokio::test]
    async fn test_save_photos_writes_each_index() {
        use crate::api::fake::{birthday, FakeApi};

        let api = FakeApi::with_birthdays(vec![birthday("a", "Alice")]);
        for bytes in [b"one".to_vec(), b"two".to_vec()] {
            let upload = PhotoUpload {
                file_name: "p.png".to_string(),
                content_type: "image/png".to_string(),
                bytes,
            };
            api.upload_photo("a", upload).await.unwrap();
        }

        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("photos");
        let written = save_photos(&api, "a", &[0, 1], &target).await.unwrap();
        assert_eq!(written, vec![target.join("a-0.png"), target.join("a-1.png")]);
        assert_eq!(std::fs::read(&written[1]).unwrap(), b"two".to_vec());

        assert!(save_photos(&api, "a", &[5], &target).await.is_err());
    }

    #[test]
    fn test_photo_extension() {
        let photo = Photo {
            content_type: Some("image/png".to_string()),
            bytes: Vec::new(),
        };
        assert_eq!(photo.extension(), "png");
        let unknown = Photo {
            content_type: None,
            bytes: Vec::new(),
        };
        assert_eq!(unknown.extension(), "bin");
    }
}
