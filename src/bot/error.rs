use thiserror::Error;

use crate::db::store::StoreError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Discord API error: {0}")]
    Serenity(#[from] serenity::Error),

    #[error("No member record found for user {0}")]
    RecordNotFound(u64),

    #[error("{0}")]
    Custom(String),
}

impl Error {
    pub fn custom<S: Into<String>>(msg: S) -> Self {
        Error::Custom(msg.into())
    }
}
