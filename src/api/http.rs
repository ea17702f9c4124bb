use async_trait::async_trait;
use reqwest::{multipart, Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use super::{ApiError, AuthApi, BirthdayApi, Photo, PhotoUpload};
use crate::config::Config;
use crate::models::{
    Birthday, BirthdayPatch, Credentials, LoginResponse, NewBirthday, Registration, User,
};
use crate::session::Session;

/// reqwest client for the birthday service
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
    session: Session,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: u64,
}

impl HttpApi {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(config.http.user_agent.clone())
            .timeout(config.http_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            session: config.session(),
        })
    }

    /// Same client, carrying a different session
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> Result<RequestBuilder, ApiError> {
        let token = self.session.token().ok_or(ApiError::MissingToken)?;
        Ok(builder.bearer_auth(token))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        debug!("{} {}", status.as_u16(), response.url().path());

        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        let err = server_error(status, &body);
        warn!("Request failed: {}", err);
        Err(err)
    }

    async fn json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = self.send(builder).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Build a server error from a failed response, keeping the body's `message` if any
fn server_error(status: StatusCode, body: &[u8]) -> ApiError {
    let message = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty());
    ApiError::Server {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl AuthApi for HttpApi {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        debug!("Logging in as {}", credentials.email);
        self.json(self.client.post(self.url("/auth/login")).json(credentials))
            .await
    }

    async fn register(&self, registration: &Registration) -> Result<(), ApiError> {
        debug!("Registering {}", registration.email);
        self.send(self.client.post(self.url("/auth/register")).json(registration))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl BirthdayApi for HttpApi {
    async fn list_birthdays(&self) -> Result<Vec<Birthday>, ApiError> {
        self.json(self.authorized(self.client.get(self.url("/birthday")))?)
            .await
    }

    async fn create_birthday(&self, payload: &NewBirthday) -> Result<Birthday, ApiError> {
        self.json(self.authorized(self.client.post(self.url("/birthday")).json(payload))?)
            .await
    }

    async fn update_birthday(&self, id: &str, patch: &BirthdayPatch) -> Result<Birthday, ApiError> {
        let url = self.url(&format!("/birthday/{}", id));
        self.json(self.authorized(self.client.put(url).json(patch))?)
            .await
    }

    async fn delete_birthday(&self, id: &str) -> Result<(), ApiError> {
        let url = self.url(&format!("/birthday/{}", id));
        self.send(self.authorized(self.client.delete(url))?).await?;
        Ok(())
    }

    async fn update_wish(&self, id: &str, wish: &str) -> Result<Birthday, ApiError> {
        let url = self.url(&format!("/birthday/{}/wish", id));
        self.json(self.authorized(self.client.patch(url).json(&json!({ "wish": wish })))?)
            .await
    }

    async fn upload_photo(&self, id: &str, photo: PhotoUpload) -> Result<Birthday, ApiError> {
        let url = self.url(&format!("/birthday/{}/image", id));
        debug!("Uploading {} ({} bytes) to {}", photo.file_name, photo.bytes.len(), id);
        let part = multipart::Part::bytes(photo.bytes)
            .file_name(photo.file_name)
            .mime_str(&photo.content_type)?;
        let form = multipart::Form::new().part("image", part);
        self.json(self.authorized(self.client.patch(url).multipart(form))?)
            .await
    }

    async fn fetch_photo(&self, id: &str, index: usize) -> Result<Photo, ApiError> {
        let url = self.url(&format!("/birthday/{}/image/{}", id, index));
        let response = self.send(self.authorized(self.client.get(url))?).await?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string());
        let bytes = response.bytes().await?.to_vec();
        Ok(Photo {
            content_type,
            bytes,
        })
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        self.json(self.authorized(self.client.get(self.url("/users/me")))?)
            .await
    }

    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.json(self.authorized(self.client.get(self.url("/users")))?)
            .await
    }

    async fn user_count(&self) -> Result<u64, ApiError> {
        let response: CountResponse = self
            .json(self.authorized(self.client.get(self.url("/users/count")))?)
            .await?;
        Ok(response.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("http://localhost:5000/api/", "/birthday"),
            "http://localhost:5000/api/birthday"
        );
        assert_eq!(join_url("http://h/api", "users/me"), "http://h/api/users/me");
    }

    #[test]
    fn test_server_error_reads_message() {
        let err = server_error(StatusCode::BAD_REQUEST, br#"{"message":"Invalid email or password"}"#);
        assert_eq!(err.user_message(), "Invalid email or password");

        let err = server_error(StatusCode::INTERNAL_SERVER_ERROR, b"<html>oops</html>");
        match err {
            ApiError::Server { status, message } => {
                assert_eq!(status, 500);
                assert!(message.is_none());
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_token_fails_before_sending() {
        let config = Config::default();
        let api = HttpApi::new(&config).unwrap().with_session(Session::anonymous());
        let err = api.list_birthdays().await.unwrap_err();
        assert!(matches!(err, ApiError::MissingToken));
    }
}
