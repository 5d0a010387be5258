use murmur_types::models::{Message, User};

use crate::Tables;

/// (id, username, owned message ids)
pub const USERS: &[(&str, &str, &[&str])] = &[
    ("1", "Robin Wieruch", &["1"]),
    ("2", "Dave Davids", &["2"]),
];

/// (id, text, owner id)
pub const MESSAGES: &[(&str, &str, &str)] = &[
    ("1", "Hello World", "1"),
    ("2", "By World", "2"),
];

/// The message re-announced to subscribers when someone new subscribes.
pub const SEED_MESSAGE_ID: &str = "1";

pub fn tables() -> Tables {
    let mut tables = Tables::default();

    for &(id, username, message_ids) in USERS {
        let mut user = User::new(id, username);
        user.message_ids = message_ids.iter().map(|id| id.to_string()).collect();
        tables.users.insert(user.id.clone(), user);
    }

    for &(id, text, user_id) in MESSAGES {
        tables.messages.insert(
            id.to_string(),
            Message {
                id: id.to_string(),
                text: text.to_string(),
                user_id: user_id.to_string(),
            },
        );
    }

    tables
}
