//! Explicit authentication context handed to the API client and to role-aware views

use crate::models::{LoginResponse, Role};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    token: Option<String>,
    role: Role,
}

impl Session {
    pub fn new(token: &str, role: Role) -> Self {
        Self {
            token: Some(token.to_string()),
            role,
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl From<LoginResponse> for Session {
    fn from(response: LoginResponse) -> Self {
        Self::new(&response.token, response.role)
    }
}
