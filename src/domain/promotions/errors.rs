//! Promotions errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromotionsError {
    #[error("storage error")]
    Sql(#[from] sqlx::Error),
}
