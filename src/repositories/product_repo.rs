use sqlx::{query, query_as, PgPool, Row};
use crate::models::catalog::{CreateProductRequest, ListProductsRequest, Product};
use crate::middleware::error_handling::Result;

const PRODUCT_COLUMNS: &str = "id, name, slug, description, price, category_id, sub_category_id, zodiac_sign, image_url, is_bestseller, tags, stock, created_at";

pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: &CreateProductRequest) -> Result<Product> {
        let sql = format!(
            r#"
            INSERT INTO products (id, name, slug, description, price, category_id, sub_category_id, zodiac_sign, image_url, is_bestseller, tags, stock)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        );

        let product = query_as::<_, Product>(&sql)
            .bind(request.id)
            .bind(&request.name)
            .bind(&request.slug)
            .bind(&request.description)
            .bind(request.price)
            .bind(request.category_id)
            .bind(request.sub_category_id)
            .bind(&request.zodiac_sign)
            .bind(&request.image_url)
            .bind(request.is_bestseller)
            .bind(&request.tags)
            .bind(request.stock)
            .fetch_one(&self.pool)
            .await?;

        Ok(product)
    }

    pub async fn slug_exists(&self, slug: &str) -> Result<bool> {
        let row = query("SELECT EXISTS(SELECT 1 FROM products WHERE slug = $1) as exists")
            .bind(slug)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.try_get::<bool, _>("exists").unwrap_or(false))
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>> {
        let sql = format!("SELECT {} FROM products WHERE slug = $1", PRODUCT_COLUMNS);

        let product = query_as::<_, Product>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    pub async fn list(&self, request: &ListProductsRequest) -> Result<Vec<Product>> {
        let limit = request.limit.unwrap_or(50).min(100);
        let offset = request.offset.unwrap_or(0);

        let mut sql = format!("SELECT {} FROM products WHERE 1=1", PRODUCT_COLUMNS);
        let mut param_count = 1;

        if request.category_id.is_some() {
            sql.push_str(&format!(" AND category_id = ${}", param_count));
            param_count += 1;
        }

        if request.sub_category_id.is_some() {
            sql.push_str(&format!(" AND sub_category_id = ${}", param_count));
        }

        sql.push_str(" ORDER BY id DESC");
        sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset));

        let mut query_builder = query_as::<_, Product>(&sql);

        if let Some(category_id) = request.category_id {
            query_builder = query_builder.bind(category_id);
        }

        if let Some(sub_category_id) = request.sub_category_id {
            query_builder = query_builder.bind(sub_category_id);
        }

        let products = query_builder.fetch_all(&self.pool).await?;

        Ok(products)
    }
}
