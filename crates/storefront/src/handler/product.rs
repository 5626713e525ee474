use crate::{
    middleware::{
        admin::admin_middleware,
        jwt::auth_middleware,
        validate::{SimpleValidatedJson, SimpleValidatedPath},
    },
    state::AppState,
};
use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use shared::{
    abstract_trait::{DynProductCommandService, DynProductQueryService},
    domain::{
        requests::{CreateProductRequest, UpdateProductRequest},
        responses::{ListResponse, ProductResponse},
    },
    errors::{ErrorResponse, HttpError},
};
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/products",
    tag = "Product",
    responses(
        (status = 200, description = "Active products, newest first", body = ListResponse<ProductResponse>)
    )
)]
pub async fn get_products(
    Extension(service): Extension<DynProductQueryService>,
) -> Result<impl IntoResponse, HttpError> {
    let products = service.find_active().await?;
    Ok(Json(ListResponse::from(products)))
}

#[utoipa::path(
    get,
    path = "/products/{id}",
    tag = "Product",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product details", body = ProductResponse),
        (status = 400, description = "Malformed product id", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
pub async fn get_product(
    Extension(service): Extension<DynProductQueryService>,
    SimpleValidatedPath(id): SimpleValidatedPath<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let product = service.find_by_id(id).await?;
    Ok(Json(product))
}

#[utoipa::path(
    post,
    path = "/products",
    tag = "Product",
    security(("bearer_auth" = [])),
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Insufficient permissions", body = ErrorResponse)
    )
)]
pub async fn create_product(
    Extension(service): Extension<DynProductCommandService>,
    SimpleValidatedJson(body): SimpleValidatedJson<CreateProductRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let product = service.create_product(&body).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

#[utoipa::path(
    put,
    path = "/products/{id}",
    tag = "Product",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Insufficient permissions", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
pub async fn update_product(
    Extension(service): Extension<DynProductCommandService>,
    SimpleValidatedPath(id): SimpleValidatedPath<Uuid>,
    SimpleValidatedJson(body): SimpleValidatedJson<UpdateProductRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let product = service.update_product(id, &body).await?;
    Ok(Json(product))
}

#[utoipa::path(
    delete,
    path = "/products/{id}",
    tag = "Product",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Product deactivated"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Insufficient permissions", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
pub async fn delete_product(
    Extension(service): Extension<DynProductCommandService>,
    SimpleValidatedPath(id): SimpleValidatedPath<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    service.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn product_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    let services = &app_state.di_container.product_service;

    let public = OpenApiRouter::new()
        .route("/products", get(get_products))
        .route("/products/{id}", get(get_product));

    let admin = OpenApiRouter::new()
        .route("/products", post(create_product))
        .route(
            "/products/{id}",
            axum::routing::put(update_product).delete(delete_product),
        )
        .route_layer(middleware::from_fn(admin_middleware))
        .route_layer(middleware::from_fn(auth_middleware));

    public
        .merge(admin)
        .layer(Extension(services.query.clone()))
        .layer(Extension(services.command.clone()))
        .layer(Extension(app_state.jwt_config.clone()))
}
