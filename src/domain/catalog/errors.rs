//! Catalog errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("storage error")]
    Sql(#[from] sqlx::Error),
}
