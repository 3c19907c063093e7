use std::future::Future;
use sqlx::PgPool;
use crate::models::catalog::{
    Category, CreateCategoryRequest, CreateProductRequest, CreateSubCategoryRequest, Product, SubCategory,
};
use crate::middleware::error_handling::Result;
use super::{CategoryRepository, ProductRepository, SequenceRepository};

pub const PRODUCT_SEQUENCE: &str = "products";
pub const CATEGORY_SEQUENCE: &str = "categories";
pub const SUB_CATEGORY_SEQUENCE: &str = "sub_categories";

/// Storage operations the bulk importer needs: a named id sequence plus
/// lookups and inserts for categories, sub-categories and products.
///
/// Passed explicitly to the import service so a run never depends on
/// process-wide state.
pub trait CatalogStore: Send + Sync {
    /// Atomically increment the named counter and return its new value
    fn next_sequence(&self, counter: &str) -> impl Future<Output = Result<i64>> + Send;

    /// Case-insensitive exact match on category name
    fn find_category_by_name(&self, name: &str) -> impl Future<Output = Result<Option<Category>>> + Send;

    fn create_category(&self, request: &CreateCategoryRequest) -> impl Future<Output = Result<Category>> + Send;

    /// Case-insensitive exact match on sub-category name under `category_id`
    fn find_sub_category_by_name(
        &self,
        category_id: i64,
        name: &str,
    ) -> impl Future<Output = Result<Option<SubCategory>>> + Send;

    fn create_sub_category(
        &self,
        request: &CreateSubCategoryRequest,
    ) -> impl Future<Output = Result<SubCategory>> + Send;

    fn product_slug_exists(&self, slug: &str) -> impl Future<Output = Result<bool>> + Send;

    fn create_product(&self, request: &CreateProductRequest) -> impl Future<Output = Result<Product>> + Send;
}

/// PostgreSQL-backed catalog store
pub struct PgCatalogStore {
    sequences: SequenceRepository,
    categories: CategoryRepository,
    products: ProductRepository,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            sequences: SequenceRepository::new(pool.clone()),
            categories: CategoryRepository::new(pool.clone()),
            products: ProductRepository::new(pool),
        }
    }
}

impl CatalogStore for PgCatalogStore {
    async fn next_sequence(&self, counter: &str) -> Result<i64> {
        self.sequences.next(counter).await
    }

    async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>> {
        self.categories.find_by_name(name).await
    }

    async fn create_category(&self, request: &CreateCategoryRequest) -> Result<Category> {
        self.categories.create(request).await
    }

    async fn find_sub_category_by_name(&self, category_id: i64, name: &str) -> Result<Option<SubCategory>> {
        self.categories.find_sub_category_by_name(category_id, name).await
    }

    async fn create_sub_category(&self, request: &CreateSubCategoryRequest) -> Result<SubCategory> {
        self.categories.create_sub_category(request).await
    }

    async fn product_slug_exists(&self, slug: &str) -> Result<bool> {
        self.products.slug_exists(slug).await
    }

    async fn create_product(&self, request: &CreateProductRequest) -> Result<Product> {
        self.products.create(request).await
    }
}
