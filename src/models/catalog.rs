use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

pub fn validate_positive_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price <= Decimal::ZERO {
        return Err(ValidationError::new("positive_price"));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SubCategory {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: Decimal,
    pub category_id: Option<i64>,
    pub sub_category_id: Option<i64>,
    pub zodiac_sign: String,
    pub image_url: String,
    pub is_bestseller: bool,
    pub tags: Vec<String>,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateCategoryRequest {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone)]
pub struct CreateSubCategoryRequest {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub slug: String,
}

/// Product document as handed to the store. The id comes from the `products`
/// sequence before this is built.
#[derive(Debug, Clone, Validate)]
pub struct CreateProductRequest {
    pub id: i64,
    #[validate(length(min = 1, message = "Product name required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Product slug required"))]
    pub slug: String,
    pub description: String,
    #[validate(custom(function = validate_positive_price))]
    pub price: Decimal,
    pub category_id: Option<i64>,
    pub sub_category_id: Option<i64>,
    pub zodiac_sign: String,
    pub image_url: String,
    pub is_bestseller: bool,
    pub tags: Vec<String>,
    pub stock: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ListProductsRequest {
    pub category_id: Option<i64>,
    pub sub_category_id: Option<i64>,
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<i64>,
    #[validate(range(min = 0, message = "Offset cannot be negative"))]
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize, Clone)]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: Decimal,
    pub category_id: Option<i64>,
    pub sub_category_id: Option<i64>,
    pub zodiac_sign: String,
    pub image_url: String,
    pub is_bestseller: bool,
    pub tags: Vec<String>,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            slug: product.slug,
            description: product.description,
            price: product.price,
            category_id: product.category_id,
            sub_category_id: product.sub_category_id,
            zodiac_sign: product.zodiac_sign,
            image_url: product.image_url,
            is_bestseller: product.is_bestseller,
            tags: product.tags,
            stock: product.stock,
            created_at: product.created_at,
        }
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct SubCategoryResponse {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

impl From<SubCategory> for SubCategoryResponse {
    fn from(sub: SubCategory) -> Self {
        Self {
            id: sub.id,
            name: sub.name,
            slug: sub.slug,
        }
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct CategoryResponse {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub sub_categories: Vec<SubCategoryResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn product_request(price: Decimal) -> CreateProductRequest {
        CreateProductRequest {
            id: 1,
            name: "Widget".to_string(),
            slug: "widget".to_string(),
            description: String::new(),
            price,
            category_id: None,
            sub_category_id: None,
            zodiac_sign: "Aries".to_string(),
            image_url: String::new(),
            is_bestseller: false,
            tags: vec![],
            stock: 0,
        }
    }

    #[test]
    fn test_positive_price_accepted() {
        assert!(product_request(dec!(1999)).validate().is_ok());
    }

    #[test]
    fn test_zero_price_rejected() {
        assert!(product_request(dec!(0)).validate().is_err());
    }

    #[test]
    fn test_product_response_keeps_tags() {
        let product = Product {
            id: 7,
            name: "Moonstone Ring".to_string(),
            slug: "moonstone-ring".to_string(),
            description: String::new(),
            price: dec!(450.5),
            category_id: Some(1),
            sub_category_id: Some(2),
            zodiac_sign: "Cancer".to_string(),
            image_url: String::new(),
            is_bestseller: true,
            tags: vec!["silver".to_string(), "gift".to_string()],
            stock: 3,
            created_at: Utc::now(),
        };
        let response: ProductResponse = product.into();
        assert_eq!(response.tags, vec!["silver", "gift"]);
        assert_eq!(response.price, dec!(450.5));
    }
}
