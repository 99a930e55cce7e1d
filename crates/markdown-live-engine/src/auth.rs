//! Who is editing.
//!
//! Autosave only persists when [`AuthProvider::current_user`] returns a user.
//! [`LocalAuth`] is the single-machine implementation used by the CLI.

use crate::models::UserId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Authentication provider unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user_name: String,
}

impl Credentials {
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
        }
    }
}

pub trait AuthProvider {
    fn current_user(&self) -> Option<&UserId>;

    fn sign_in(&mut self, credentials: Credentials) -> Result<UserId, AuthError>;

    fn sign_out(&mut self);
}

/// Accepts any non-blank user name
#[derive(Debug, Clone, Default)]
pub struct LocalAuth {
    user: Option<UserId>,
}

impl LocalAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start already signed in as `user_name`
    pub fn signed_in(user_name: &str) -> Result<Self, AuthError> {
        let mut auth = Self::new();
        auth.sign_in(Credentials::new(user_name))?;
        Ok(auth)
    }
}

impl AuthProvider for LocalAuth {
    fn current_user(&self) -> Option<&UserId> {
        self.user.as_ref()
    }

    fn sign_in(&mut self, credentials: Credentials) -> Result<UserId, AuthError> {
        let name = credentials.user_name.trim();
        if name.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }
        let user = UserId::new(name);
        log::info!("Signed in as {user}");
        self.user = Some(user.clone());
        Ok(user)
    }

    fn sign_out(&mut self) {
        if let Some(user) = self.user.take() {
            log::info!("Signed out {user}");
        }
    }
}
