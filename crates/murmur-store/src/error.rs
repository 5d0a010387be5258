use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown user: {0}")]
    UnknownUser(String),

    #[error("store lock poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, StoreError>;
