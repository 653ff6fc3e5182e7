use utoipa::OpenApi;

pub const USER_TAG: &str = "Users";
pub const PRODUCT_TAG: &str = "Products";
pub const HEALTH_TAG: &str = "Health";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stockroom",
        description = "CRUD API for users and products",
    ),
    components(
        schemas(
            crate::api::dto::ErrorResponse,
        )
    ),
    tags(
        (name = USER_TAG, description = "User registration and lookup"),
        (name = PRODUCT_TAG, description = "Product catalogue management"),
        (name = HEALTH_TAG, description = "Health check endpoints"),
    )
)]
pub struct ApiDoc;
