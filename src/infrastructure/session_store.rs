use crate::infrastructure::error::InfraError;
use std::sync::Mutex;

/// Holds the bearer token of the signed-in user for the lifetime of the process.
pub trait SessionStore: Send + Sync {
    fn save_token(&self, token: &str) -> Result<(), InfraError>;
    fn load_token(&self) -> Result<Option<String>, InfraError>;
    fn clear_token(&self) -> Result<(), InfraError>;
}

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    token: Mutex<Option<String>>,
}

impl InMemorySessionStore {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl SessionStore for InMemorySessionStore {
    fn save_token(&self, token: &str) -> Result<(), InfraError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(InfraError::Validation("session token must not be empty".to_string()));
        }
        let mut guard = self
            .token
            .lock()
            .map_err(|error| InfraError::InvalidConfig(format!("session lock poisoned: {error}")))?;
        *guard = Some(token.to_string());
        Ok(())
    }

    fn load_token(&self) -> Result<Option<String>, InfraError> {
        let guard = self
            .token
            .lock()
            .map_err(|error| InfraError::InvalidConfig(format!("session lock poisoned: {error}")))?;
        Ok(guard.clone())
    }

    fn clear_token(&self) -> Result<(), InfraError> {
        let mut guard = self
            .token
            .lock()
            .map_err(|error| InfraError::InvalidConfig(format!("session lock poisoned: {error}")))?;
        *guard = None;
        Ok(())
    }
}
