use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Entry not found: {0}")]
    EntryNotFound(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}
