use tracing::debug;
use uuid::Uuid;

use murmur_types::models::{Message, User};

use crate::{Result, Store, StoreError};

impl Store {
    // -- Users --

    pub fn user(&self, id: &str) -> Result<Option<User>> {
        self.with_tables(|t| Ok(t.users.get(id).cloned()))
    }

    /// All users, in no particular order.
    pub fn users(&self) -> Result<Vec<User>> {
        self.with_tables(|t| Ok(t.users.values().cloned().collect()))
    }

    /// Insert or replace a user.
    pub fn insert_user(&self, user: User) -> Result<()> {
        self.with_tables_mut(|t| {
            t.users.insert(user.id.clone(), user);
            Ok(())
        })
    }

    // -- Messages --

    pub fn message(&self, id: &str) -> Result<Option<Message>> {
        self.with_tables(|t| Ok(t.messages.get(id).cloned()))
    }

    /// All messages, in no particular order.
    pub fn messages(&self) -> Result<Vec<Message>> {
        self.with_tables(|t| Ok(t.messages.values().cloned().collect()))
    }

    /// Messages owned by `user_id`, found by scanning rather than through
    /// the user's `message_ids`.
    pub fn messages_by_user(&self, user_id: &str) -> Result<Vec<Message>> {
        self.with_tables(|t| {
            Ok(t.messages
                .values()
                .filter(|m| m.user_id == user_id)
                .cloned()
                .collect())
        })
    }

    /// Store a new message under a fresh id and record it on its author.
    pub fn create_message(&self, author_id: &str, text: &str) -> Result<Message> {
        self.with_tables_mut(|t| {
            let author = t
                .users
                .get_mut(author_id)
                .ok_or_else(|| StoreError::UnknownUser(author_id.to_string()))?;

            let message = Message {
                id: Uuid::new_v4().to_string(),
                text: text.to_string(),
                user_id: author_id.to_string(),
            };
            author.message_ids.push(message.id.clone());
            t.messages.insert(message.id.clone(), message.clone());

            debug!(id = %message.id, author = author_id, "message created");
            Ok(message)
        })
    }

    /// Remove a message. Returns false if there was nothing to remove.
    pub fn delete_message(&self, id: &str) -> Result<bool> {
        let prune = self.options.prune_on_delete;
        self.with_tables_mut(|t| {
            let Some(message) = t.messages.remove(id) else {
                return Ok(false);
            };

            if prune {
                if let Some(owner) = t.users.get_mut(&message.user_id) {
                    owner.message_ids.retain(|mid| mid != id);
                }
            }

            debug!(id, pruned = prune, "message deleted");
            Ok(true)
        })
    }
}
