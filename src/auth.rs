//! In-memory session tokens for the single configured account.
//!
//! Tokens never expire and are forgotten on restart. The store has its own
//! lock; it shares nothing with the catalog or the scan gate.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rand::Rng;
use rand::distributions::Alphanumeric;
use tracing::info;

use crate::config::AuthSettings;

const TOKEN_LEN: usize = 32;

pub struct TokenStore {
    credentials: AuthSettings,
    tokens: Mutex<HashSet<String>>,
}

impl TokenStore {
    pub fn new(credentials: AuthSettings) -> Self {
        Self {
            credentials,
            tokens: Mutex::new(HashSet::new()),
        }
    }

    fn tokens(&self) -> MutexGuard<'_, HashSet<String>> {
        self.tokens.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Issue a fresh token if the credentials match the configured pair.
    pub fn login(&self, username: &str, password: &str) -> Option<String> {
        if self.credentials.username.is_empty()
            || username != self.credentials.username
            || password != self.credentials.password
        {
            return None;
        }

        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LEN)
            .map(char::from)
            .collect();
        self.tokens().insert(token.clone());
        info!(user = username, "issued session token");
        Some(token)
    }

    pub fn is_valid(&self, token: &str) -> bool {
        !token.is_empty() && self.tokens().contains(token)
    }

    pub fn revoke(&self, token: &str) -> bool {
        self.tokens().remove(token)
    }

    pub fn active_sessions(&self) -> usize {
        self.tokens().len()
    }
}
