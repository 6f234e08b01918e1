//! Product catalog routes.

use std::cmp::Ordering;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;

use bazaar_core::{CategoryId, Price, ProductId};

use super::{paginate, require_non_blank};
use crate::error::{AppError, Result};
use crate::extract::{JsonBody, PathParams, QueryParams};
use crate::models::{Page, Product};
use crate::state::AppState;

const DEFAULT_LIMIT: usize = 10;

/// Create the product routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list).post(create))
        .route("/products/{id}", get(show).patch(update).delete(delete))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Name,
    Price,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProductsQuery {
    /// Case-insensitive substring of name or description.
    pub name: Option<String>,
    pub category_id: Option<CategoryId>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort_by: Option<SortField>,
    pub order: Option<SortOrder>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl ListProductsQuery {
    fn matches(&self, product: &Product) -> bool {
        if let Some(needle) = self.name.as_deref().filter(|n| !n.is_empty()) {
            let needle = needle.to_lowercase();
            if !product.name.to_lowercase().contains(&needle)
                && !product.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        if let Some(category_id) = self.category_id.as_ref().filter(|c| !c.as_str().is_empty()) {
            if &product.category_id != category_id {
                return false;
            }
        }
        let price = product.price.amount();
        if self.min_price.is_some_and(|min| price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| price > max) {
            return false;
        }
        true
    }

    fn compare(&self, a: &Product, b: &Product) -> Ordering {
        let ordering = match self.sort_by {
            Some(SortField::Name) => a.name.cmp(&b.name),
            Some(SortField::Price) => a.price.cmp(&b.price),
            Some(SortField::CreatedAt) => a.created_at.cmp(&b.created_at),
            None => Ordering::Equal,
        };
        match self.order.unwrap_or_default() {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub stock: u32,
    pub category_id: CategoryId,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub stock: Option<u32>,
    pub category_id: Option<CategoryId>,
    pub image_urls: Option<Vec<String>>,
}

fn not_found() -> AppError {
    AppError::NotFound("Product not found".to_string())
}

/// Highest unit price accepted from clients, in cents (1,000,000,000.00).
const MAX_PRICE_CENTS: i64 = 100_000_000_000;

/// Reject prices above [`MAX_PRICE_CENTS`] so that order totals stay small.
fn require_listable_price(price: Price) -> Result<()> {
    let max = Decimal::new(MAX_PRICE_CENTS, 2);
    if price.amount() > max {
        return Err(AppError::Validation(format!("price must be at most {max}")));
    }
    Ok(())
}

/// List products with filters, sorting and pagination.
async fn list(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListProductsQuery>,
) -> Json<Page<Product>> {
    let mut products: Vec<Product> = state
        .store()
        .products()
        .into_iter()
        .filter(|p| query.matches(p))
        .collect();

    // stable, so unsorted requests keep creation order
    if query.sort_by.is_some() {
        products.sort_by(|a, b| query.compare(a, b));
    }

    Json(paginate(products, query.limit, query.offset, DEFAULT_LIMIT))
}

async fn show(
    State(state): State<AppState>,
    PathParams(id): PathParams<ProductId>,
) -> Result<Json<Product>> {
    state.store().product(&id).map(Json).ok_or_else(not_found)
}

async fn create(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    require_non_blank("name", &request.name)?;
    require_listable_price(request.price)?;

    let now = Utc::now();
    let product = state.store().create_product(Product {
        id: ProductId::generate(),
        name: request.name,
        description: request.description,
        price: request.price,
        stock: request.stock,
        category_id: request.category_id,
        image_urls: request.image_urls,
        created_at: now,
        updated_at: now,
    });

    tracing::info!(product_id = %product.id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update(
    State(state): State<AppState>,
    PathParams(id): PathParams<ProductId>,
    JsonBody(request): JsonBody<UpdateProductRequest>,
) -> Result<Json<Product>> {
    let mut product = state.store().product(&id).ok_or_else(not_found)?;

    if let Some(name) = request.name {
        require_non_blank("name", &name)?;
        product.name = name;
    }
    if let Some(description) = request.description {
        product.description = description;
    }
    if let Some(price) = request.price {
        require_listable_price(price)?;
        product.price = price;
    }
    if let Some(stock) = request.stock {
        product.stock = stock;
    }
    if let Some(category_id) = request.category_id {
        product.category_id = category_id;
    }
    if let Some(image_urls) = request.image_urls {
        product.image_urls = image_urls;
    }
    product.updated_at = Utc::now();

    state
        .store()
        .update_product(product)
        .map(Json)
        .ok_or_else(not_found)
}

async fn delete(
    State(state): State<AppState>,
    PathParams(id): PathParams<ProductId>,
) -> Result<StatusCode> {
    state.store().delete_product(&id).ok_or_else(not_found)?;
    tracing::info!(product_id = %id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(name: &str, description: &str, cents: i64, category: &str) -> Product {
        let now = Utc::now();
        Product {
            id: ProductId::new(name),
            name: name.to_owned(),
            description: description.to_owned(),
            price: Price::from_cents(cents).unwrap(),
            stock: 1,
            category_id: CategoryId::new(category),
            image_urls: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_price_bound() {
        let at_max = Price::from_cents(MAX_PRICE_CENTS).unwrap();
        assert!(require_listable_price(at_max).is_ok());

        let over = Price::from_cents(MAX_PRICE_CENTS + 1).unwrap();
        let err = require_listable_price(over).unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::ValidationError);

        let huge: Price = serde_json::from_str("50000000000000000000000000000").unwrap();
        assert!(require_listable_price(huge).is_err());
    }

    #[test]
    fn test_name_filter_matches_description_case_insensitive() {
        let query = ListProductsQuery {
            name: Some("TITANIUM".to_owned()),
            ..Default::default()
        };
        assert!(query.matches(&product("iPhone", "Latest iPhone with titanium design", 100, "c")));
        assert!(!query.matches(&product("T-Shirt", "Cotton", 100, "c")));
    }

    #[test]
    fn test_price_range_is_inclusive() {
        let query = ListProductsQuery {
            min_price: Some(Decimal::new(1000, 2)),
            max_price: Some(Decimal::new(2000, 2)),
            ..Default::default()
        };
        assert!(query.matches(&product("a", "", 1000, "c")));
        assert!(query.matches(&product("b", "", 2000, "c")));
        assert!(!query.matches(&product("c", "", 2001, "c")));
        assert!(!query.matches(&product("d", "", 999, "c")));
    }

    #[test]
    fn test_category_filter() {
        let query = ListProductsQuery {
            category_id: Some(CategoryId::new("laptops")),
            ..Default::default()
        };
        assert!(query.matches(&product("a", "", 1, "laptops")));
        assert!(!query.matches(&product("b", "", 1, "phones")));
    }

    #[test]
    fn test_sort_price_desc() {
        let query = ListProductsQuery {
            sort_by: Some(SortField::Price),
            order: Some(SortOrder::Desc),
            ..Default::default()
        };
        let mut items = vec![
            product("a", "", 100, "c"),
            product("b", "", 300, "c"),
            product("c", "", 200, "c"),
        ];
        items.sort_by(|a, b| query.compare(a, b));
        let names: Vec<_> = items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["b", "c", "a"]);
    }

    #[test]
    fn test_query_parses_camel_case() {
        let query: ListProductsQuery = serde_json::from_value(serde_json::json!({
            "sortBy": "createdAt",
            "order": "desc",
            "categoryId": "x"
        }))
        .unwrap();
        assert_eq!(query.sort_by, Some(SortField::CreatedAt));
        assert_eq!(query.order, Some(SortOrder::Desc));
    }
}
