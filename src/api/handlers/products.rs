//! Product CRUD request handlers.

use axum::{Json, extract::State, http::StatusCode};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::PRODUCT_TAG;
use crate::api::dto::{ErrorResponse, ProductRequest, ProductResponse};
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::utils::validate::{ApiPath, ValidatedJson};

/// Creates product-related routes.
///
/// Routes:
/// - GET /        - List products
/// - POST /       - Create a product
/// - GET /{id}    - Get product by ID
/// - PUT /{id}    - Replace product fields
/// - DELETE /{id} - Soft-delete a product
pub fn product_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_products, create_product))
        .routes(routes!(get_product, update_product, delete_product))
}

/// GET /api/v1/products - List all products
#[utoipa::path(
    get,
    path = "/",
    tag = PRODUCT_TAG,
    responses(
        (status = 200, description = "All products that have not been deleted", body = Vec<ProductResponse>),
        (status = 500, description = "Store error", body = ErrorResponse)
    )
)]
async fn list_products(State(state): State<AppState>) -> AppResult<Json<Vec<ProductResponse>>> {
    let products = state.services.products.get_all_products().await?;
    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}

/// POST /api/v1/products - Create a product
#[utoipa::path(
    post,
    path = "/",
    tag = PRODUCT_TAG,
    request_body = ProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid request body or field values", body = ErrorResponse),
        (status = 500, description = "Store error", body = ErrorResponse)
    )
)]
async fn create_product(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ProductRequest>,
) -> AppResult<(StatusCode, Json<ProductResponse>)> {
    let price = req.decimal_price()?;
    let product = state
        .services
        .products
        .create_product(req.name, price, req.stock)
        .await?;
    Ok((StatusCode::CREATED, Json(ProductResponse::from(product))))
}

/// GET /api/v1/products/{id} - Get product by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = PRODUCT_TAG,
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 400, description = "Invalid product ID", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
async fn get_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<ProductResponse>> {
    let product = state
        .services
        .products
        .get_product(id)
        .await?
        .ok_or_else(|| AppError::not_found_by_id("product", id))?;
    Ok(Json(ProductResponse::from(product)))
}

/// PUT /api/v1/products/{id} - Replace name, price and stock
#[utoipa::path(
    put,
    path = "/{id}",
    tag = PRODUCT_TAG,
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    request_body = ProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Invalid product ID or request body", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
async fn update_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ValidatedJson(req): ValidatedJson<ProductRequest>,
) -> AppResult<Json<ProductResponse>> {
    let price = req.decimal_price()?;
    let product = state
        .services
        .products
        .update_product(id, req.name, price, req.stock)
        .await?;
    Ok(Json(ProductResponse::from(product)))
}

/// DELETE /api/v1/products/{id} - Soft-delete a product
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = PRODUCT_TAG,
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 400, description = "Invalid product ID", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
async fn delete_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<StatusCode> {
    state.services.products.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
