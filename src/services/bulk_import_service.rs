// ============================================================================
// Bulk Import Service - turn spreadsheet rows into catalog products
// ============================================================================
//
// Rows are handled strictly in order. Each row is normalized and validated
// without touching storage, then checked for a slug collision, then has its
// category and sub-category resolved (created on first sight), and is finally
// inserted under a fresh id from the `products` sequence.
//
// A failing row is recorded in the result with the original cells and the
// reason, and the run moves on. Only a lost connection to the store ends the
// whole run early.
//
// ============================================================================

use crate::middleware::error_handling::{AppError, Result};
use crate::models::bulk_import::{ImportResult, RawRow};
use crate::models::catalog::{
    Category, CreateCategoryRequest, CreateProductRequest, CreateSubCategoryRequest, SubCategory,
};
use crate::repositories::catalog_store::{
    CatalogStore, CATEGORY_SEQUENCE, PRODUCT_SEQUENCE, SUB_CATEGORY_SEQUENCE,
};
use crate::services::row_normalizer_service::{
    CategorySource, ProductDraft, RowNormalizerService, RowOutcome,
};
use crate::utils::{sanitize_for_log, slugify};
use validator::Validate;

pub const DUPLICATE_SLUG_MESSAGE: &str = "Product with this slug already exists";

pub struct BulkImportService<'a, S: CatalogStore> {
    store: &'a S,
}

impl<'a, S: CatalogStore> BulkImportService<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Import every row. `total` counts all rows, blank ones included.
    pub async fn import_rows(&self, rows: &[RawRow]) -> Result<ImportResult> {
        let mut result = ImportResult::new(rows.len());

        tracing::info!("Starting bulk import of {} rows", rows.len());

        for (idx, raw) in rows.iter().enumerate() {
            let draft = match RowNormalizerService::prepare(raw) {
                RowOutcome::Blank => continue,
                RowOutcome::Invalid(message) => {
                    tracing::warn!("Row {} rejected: {}", idx + 1, sanitize_for_log(&message));
                    result.record_failure(raw.clone(), message);
                    continue;
                }
                RowOutcome::Valid(draft) => draft,
            };

            match self.import_row(draft).await {
                Ok((name, id)) => {
                    tracing::debug!("Row {} imported as product {}", idx + 1, id);
                    result.record_success(name, id);
                }
                Err(e) if Self::is_store_unavailable(&e) => {
                    tracing::error!("Bulk import aborted at row {}: {}", idx + 1, e);
                    return Err(e);
                }
                Err(e) => {
                    let message = Self::failure_message(&e);
                    tracing::warn!("Row {} failed: {}", idx + 1, sanitize_for_log(&message));
                    result.record_failure(raw.clone(), message);
                }
            }
        }

        tracing::info!(
            "Bulk import finished: {} total, {} successful, {} failed",
            result.total,
            result.successful,
            result.failed
        );

        Ok(result)
    }

    async fn import_row(&self, draft: ProductDraft) -> Result<(String, i64)> {
        if self.store.product_slug_exists(&draft.slug).await? {
            return Err(AppError::Conflict(DUPLICATE_SLUG_MESSAGE.to_string()));
        }

        let (category_id, sub_category_id) = match &draft.category {
            CategorySource::Unassigned => (None, None),
            CategorySource::Explicit { category_id, sub_category_id } => (Some(*category_id), *sub_category_id),
            CategorySource::Named { category, sub_category } => {
                let category = self.resolve_category(category).await?;
                let sub_category_id = match sub_category {
                    Some(name) => Some(self.resolve_sub_category(category.id, name).await?.id),
                    None => None,
                };
                (Some(category.id), sub_category_id)
            }
        };

        let request = CreateProductRequest {
            id: self.store.next_sequence(PRODUCT_SEQUENCE).await?,
            name: draft.name,
            slug: draft.slug,
            description: draft.description,
            price: draft.price,
            category_id,
            sub_category_id,
            zodiac_sign: draft.zodiac_sign,
            image_url: draft.image_url,
            is_bestseller: draft.is_bestseller,
            tags: draft.tags,
            stock: draft.stock,
        };
        request.validate()?;

        let product = self.store.create_product(&request).await?;

        Ok((product.name, product.id))
    }

    /// Find by case-insensitive name, or create with the next category id
    async fn resolve_category(&self, name: &str) -> Result<Category> {
        if let Some(category) = self.store.find_category_by_name(name).await? {
            return Ok(category);
        }

        let request = CreateCategoryRequest {
            id: self.store.next_sequence(CATEGORY_SEQUENCE).await?,
            name: name.to_string(),
            slug: slugify(name),
        };

        match self.store.create_category(&request).await {
            Ok(category) => {
                tracing::info!("Created category {} ({})", category.id, sanitize_for_log(&category.name));
                Ok(category)
            }
            // Another import created it first
            Err(e) if e.is_unique_violation() => self
                .store
                .find_category_by_name(name)
                .await?
                .ok_or_else(|| AppError::Conflict(format!("Category slug already in use: {}", request.slug))),
            Err(e) => Err(e),
        }
    }

    async fn resolve_sub_category(&self, category_id: i64, name: &str) -> Result<SubCategory> {
        if let Some(sub_category) = self.store.find_sub_category_by_name(category_id, name).await? {
            return Ok(sub_category);
        }

        let request = CreateSubCategoryRequest {
            id: self.store.next_sequence(SUB_CATEGORY_SEQUENCE).await?,
            category_id,
            name: name.to_string(),
            slug: slugify(name),
        };

        match self.store.create_sub_category(&request).await {
            Ok(sub_category) => {
                tracing::info!(
                    "Created sub-category {} ({}) under category {}",
                    sub_category.id,
                    sanitize_for_log(&sub_category.name),
                    category_id
                );
                Ok(sub_category)
            }
            Err(e) if e.is_unique_violation() => self
                .store
                .find_sub_category_by_name(category_id, name)
                .await?
                .ok_or_else(|| AppError::Conflict(format!("Sub-category slug already in use: {}", request.slug))),
            Err(e) => Err(e),
        }
    }

    /// Reason text shown in failedList
    fn failure_message(error: &AppError) -> String {
        match error {
            AppError::Conflict(message)
            | AppError::BadRequest(message)
            | AppError::InvalidInput(message)
            | AppError::NotFound(message) => message.clone(),
            other => other.to_string(),
        }
    }

    /// Errors that say nothing about the row itself: the pool or connection is gone
    fn is_store_unavailable(error: &AppError) -> bool {
        matches!(
            error,
            AppError::Database(
                sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) | sqlx::Error::Tls(_)
            )
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Service<'a> = BulkImportService<'a, crate::repositories::catalog_store::PgCatalogStore>;

    #[test]
    fn test_conflict_message_has_no_prefix() {
        let message = Service::failure_message(&AppError::Conflict(DUPLICATE_SLUG_MESSAGE.to_string()));
        assert_eq!(message, "Product with this slug already exists");
    }

    #[test]
    fn test_other_errors_keep_display_text() {
        let message = Service::failure_message(&AppError::Database(sqlx::Error::RowNotFound));
        assert!(message.starts_with("Database error"));
    }

    #[test]
    fn test_pool_errors_abort_the_run() {
        assert!(Service::is_store_unavailable(&AppError::Database(sqlx::Error::PoolTimedOut)));
        assert!(!Service::is_store_unavailable(&AppError::Database(sqlx::Error::RowNotFound)));
        assert!(!Service::is_store_unavailable(&AppError::Conflict("x".to_string())));
    }
}
