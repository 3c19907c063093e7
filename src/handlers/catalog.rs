use std::collections::HashMap;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use validator::Validate;
use crate::{
    config::AppConfig,
    middleware::error_handling::{AppError, Result},
    models::catalog::{CategoryResponse, ListProductsRequest, ProductResponse, SubCategoryResponse},
    repositories::{CategoryRepository, ProductRepository},
};

/// GET /api/categories
/// Every category with its sub-categories, both sorted by name
pub async fn list_categories(State(config): State<AppConfig>) -> Result<Json<Vec<CategoryResponse>>> {
    let repo = CategoryRepository::new(config.database_pool.clone());

    let categories = repo.list().await?;
    let mut sub_categories: HashMap<i64, Vec<SubCategoryResponse>> = HashMap::new();
    for sub in repo.list_sub_categories().await? {
        sub_categories.entry(sub.category_id).or_default().push(sub.into());
    }

    let response = categories
        .into_iter()
        .map(|category| CategoryResponse {
            sub_categories: sub_categories.remove(&category.id).unwrap_or_default(),
            id: category.id,
            name: category.name,
            slug: category.slug,
        })
        .collect();

    Ok(Json(response))
}

/// GET /api/products?category_id=&sub_category_id=&limit=&offset=
pub async fn list_products(
    State(config): State<AppConfig>,
    Query(request): Query<ListProductsRequest>,
) -> Result<Json<Vec<ProductResponse>>> {
    request.validate()?;

    let repo = ProductRepository::new(config.database_pool.clone());
    let products = repo.list(&request).await?;

    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}

/// GET /api/products/:slug
pub async fn get_product_by_slug(
    State(config): State<AppConfig>,
    Path(slug): Path<String>,
) -> Result<Json<ProductResponse>> {
    let repo = ProductRepository::new(config.database_pool.clone());

    let product = repo
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    Ok(Json(product.into()))
}
