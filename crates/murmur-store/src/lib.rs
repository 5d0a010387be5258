pub mod error;
pub mod queries;
pub mod seed;

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::info;

use murmur_types::models::{Message, User};

pub use error::{Result, StoreError};

/// Behaviour switches for [`Store`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreOptions {
    /// Remove a deleted message's id from its owner's `message_ids`.
    /// Off by default: the list is left stale, as existing clients expect.
    pub prune_on_delete: bool,
}

/// Both collections, always locked together.
#[derive(Debug, Default)]
pub struct Tables {
    pub users: HashMap<String, User>,
    pub messages: HashMap<String, Message>,
}

/// In-memory users and messages. Lives as long as the process.
pub struct Store {
    tables: Mutex<Tables>,
    options: StoreOptions,
}

impl Store {
    pub fn empty(options: StoreOptions) -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            options,
        }
    }

    /// A store holding the two demo users and their first messages.
    pub fn seeded(options: StoreOptions) -> Self {
        let store = Self {
            tables: Mutex::new(seed::tables()),
            options,
        };
        info!(
            users = seed::USERS.len(),
            messages = seed::MESSAGES.len(),
            "Store seeded"
        );
        store
    }

    pub fn options(&self) -> StoreOptions {
        self.options
    }

    pub fn with_tables<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Tables) -> Result<T>,
    {
        let tables = self.tables.lock().map_err(|_| StoreError::LockPoisoned)?;
        f(&tables)
    }

    pub fn with_tables_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Tables) -> Result<T>,
    {
        let mut tables = self.tables.lock().map_err(|_| StoreError::LockPoisoned)?;
        f(&mut tables)
    }
}
