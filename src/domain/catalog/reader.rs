//! Catalog reader.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::catalog::{
        errors::CatalogError,
        models::{Product, ProductUuid, ProductVariant, VariantUuid},
        repository::PgCatalogRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgCatalogReader {
    db: Db,
    repository: PgCatalogRepository,
}

impl PgCatalogReader {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCatalogRepository::new(),
        }
    }
}

#[async_trait]
impl CatalogReader for PgCatalogReader {
    async fn get_product(&self, product: ProductUuid) -> Result<Option<Product>, CatalogError> {
        let mut tx = self.db.begin().await?;

        let product = self.repository.get_product(&mut tx, product).await?;

        tx.commit().await?;

        Ok(product)
    }

    async fn get_variant(
        &self,
        variant: VariantUuid,
    ) -> Result<Option<ProductVariant>, CatalogError> {
        let mut tx = self.db.begin().await?;

        let variant = self.repository.get_variant(&mut tx, variant).await?;

        tx.commit().await?;

        Ok(variant)
    }
}

#[automock]
#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// Retrieve a single product by id, `None` when missing or deleted.
    async fn get_product(&self, product: ProductUuid) -> Result<Option<Product>, CatalogError>;

    /// Retrieve a single variant by id, `None` when missing or deleted.
    async fn get_variant(
        &self,
        variant: VariantUuid,
    ) -> Result<Option<ProductVariant>, CatalogError>;
}
