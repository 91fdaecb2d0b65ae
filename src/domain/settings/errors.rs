//! Settings errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("storage error")]
    Sql(#[from] sqlx::Error),
}
