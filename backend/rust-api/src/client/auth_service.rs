use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use super::storage::{KeyValueStore, StorageError};
use crate::models::{Credentials, StoredUser, User};

pub const USERS_KEY: &str = "espagnol_facile_users";
pub const SESSION_KEY: &str = "espagnol_facile_session";

pub const DUPLICATE_EMAIL: &str = "Un utilisateur avec cet email existe déjà.";
pub const INVALID_CREDENTIALS: &str = "Email ou mot de passe invalide.";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{}", DUPLICATE_EMAIL)]
    DuplicateEmail,
    #[error("{}", INVALID_CREDENTIALS)]
    InvalidCredentials,
    #[error("Veuillez saisir un email valide et un mot de passe.")]
    Validation(#[from] validator::ValidationErrors),
    #[error("Erreur de stockage : {0}")]
    Storage(#[from] StorageError),
    #[error("Erreur de chiffrement du mot de passe : {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("Données utilisateur corrompues : {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Local account registry and session pointer kept in a [`KeyValueStore`].
pub struct AuthService {
    store: Arc<dyn KeyValueStore>,
    hash_cost: u32,
}

impl AuthService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_hash_cost(store, bcrypt::DEFAULT_COST)
    }

    pub fn with_hash_cost(store: Arc<dyn KeyValueStore>, hash_cost: u32) -> Self {
        Self { store, hash_cost }
    }

    fn users(&self) -> Result<BTreeMap<String, StoredUser>, AuthError> {
        match self.store.get(USERS_KEY) {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(BTreeMap::new()),
        }
    }

    fn save_users(&self, users: &BTreeMap<String, StoredUser>) -> Result<(), AuthError> {
        let raw = serde_json::to_string(users)?;
        self.store.set(USERS_KEY, &raw)?;
        Ok(())
    }

    fn start_session(&self, user: &User) -> Result<(), AuthError> {
        let raw = serde_json::to_string(user)?;
        self.store.set(SESSION_KEY, &raw)?;
        Ok(())
    }

    /// Registers a new account and logs it in.
    pub fn signup(&self, credentials: &Credentials) -> Result<User, AuthError> {
        credentials.validate()?;

        let mut users = self.users()?;
        if users.contains_key(&credentials.email) {
            return Err(AuthError::DuplicateEmail);
        }

        let stored = StoredUser {
            id: format!("user_{}", Uuid::new_v4().simple()),
            email: credentials.email.clone(),
            password_hash: bcrypt::hash(&credentials.password, self.hash_cost)?,
        };
        let user = User::from(&stored);
        users.insert(stored.email.clone(), stored);
        self.save_users(&users)?;
        self.start_session(&user)?;

        tracing::info!("New account registered: {}", user.id);
        Ok(user)
    }

    pub fn login(&self, credentials: &Credentials) -> Result<User, AuthError> {
        let users = self.users()?;
        let Some(stored) = users.get(&credentials.email) else {
            return Err(AuthError::InvalidCredentials);
        };

        if !bcrypt::verify(&credentials.password, &stored.password_hash)? {
            tracing::debug!("Rejected login for {}", stored.id);
            return Err(AuthError::InvalidCredentials);
        }

        let user = User::from(stored);
        self.start_session(&user)?;
        Ok(user)
    }

    pub fn logout(&self) -> Result<(), AuthError> {
        self.store.remove(SESSION_KEY)?;
        Ok(())
    }

    /// Logged-in user, if the session pointer holds a readable record.
    pub fn current_user(&self) -> Option<User> {
        let raw = self.store.get(SESSION_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!("Ignoring unreadable session record: {}", e);
                None
            }
        }
    }
}
