//! Tax setting reader.

use async_trait::async_trait;
use mockall::automock;
use rust_decimal::Decimal;
use sqlx::{Postgres, Row, query};

use crate::{
    database::Db,
    domain::settings::{errors::SettingsError, models::TaxConfig},
};

const GET_TAX_SETTING_SQL: &str = include_str!("sql/get_tax_setting.sql");

#[derive(Debug, Clone)]
pub struct PgTaxSettingReader {
    db: Db,
}

impl PgTaxSettingReader {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TaxSettingReader for PgTaxSettingReader {
    async fn get_tax_config(&self) -> Result<TaxConfig, SettingsError> {
        let mut tx = self.db.begin().await?;

        let row = query::<Postgres>(GET_TAX_SETTING_SQL)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;

        // A missing settings row means tax was never configured.
        let Some(row) = row else {
            return Ok(TaxConfig::disabled());
        };

        Ok(TaxConfig {
            enabled: row.try_get("enabled").map_err(SettingsError::from)?,
            rate: row
                .try_get::<Decimal, _>("rate")
                .map_err(SettingsError::from)?,
        })
    }
}

#[automock]
#[async_trait]
pub trait TaxSettingReader: Send + Sync {
    /// Fetch the configured tax rate; disabled when absent.
    async fn get_tax_config(&self) -> Result<TaxConfig, SettingsError>;
}
