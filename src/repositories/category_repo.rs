use sqlx::{query_as, PgPool};
use crate::models::catalog::{Category, CreateCategoryRequest, CreateSubCategoryRequest, SubCategory};
use crate::middleware::error_handling::Result;

pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Case-insensitive exact name match
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Category>> {
        let category = query_as::<_, Category>(
            "SELECT id, name, slug, created_at FROM categories WHERE LOWER(name) = LOWER($1)"
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    pub async fn create(&self, request: &CreateCategoryRequest) -> Result<Category> {
        let category = query_as::<_, Category>(
            r#"
            INSERT INTO categories (id, name, slug)
            VALUES ($1, $2, $3)
            RETURNING id, name, slug, created_at
            "#
        )
        .bind(request.id)
        .bind(&request.name)
        .bind(&request.slug)
        .fetch_one(&self.pool)
        .await?;

        Ok(category)
    }

    /// Case-insensitive exact name match scoped to one parent category
    pub async fn find_sub_category_by_name(&self, category_id: i64, name: &str) -> Result<Option<SubCategory>> {
        let sub_category = query_as::<_, SubCategory>(
            r#"
            SELECT id, category_id, name, slug, created_at
            FROM sub_categories
            WHERE category_id = $1 AND LOWER(name) = LOWER($2)
            "#
        )
        .bind(category_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sub_category)
    }

    pub async fn create_sub_category(&self, request: &CreateSubCategoryRequest) -> Result<SubCategory> {
        let sub_category = query_as::<_, SubCategory>(
            r#"
            INSERT INTO sub_categories (id, category_id, name, slug)
            VALUES ($1, $2, $3, $4)
            RETURNING id, category_id, name, slug, created_at
            "#
        )
        .bind(request.id)
        .bind(request.category_id)
        .bind(&request.name)
        .bind(&request.slug)
        .fetch_one(&self.pool)
        .await?;

        Ok(sub_category)
    }

    pub async fn list(&self) -> Result<Vec<Category>> {
        let categories = query_as::<_, Category>(
            "SELECT id, name, slug, created_at FROM categories ORDER BY name ASC"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    pub async fn list_sub_categories(&self) -> Result<Vec<SubCategory>> {
        let sub_categories = query_as::<_, SubCategory>(
            "SELECT id, category_id, name, slug, created_at FROM sub_categories ORDER BY name ASC"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(sub_categories)
    }
}
