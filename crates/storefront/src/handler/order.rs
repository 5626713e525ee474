use crate::{
    middleware::{jwt::auth_middleware, validate::SimpleValidatedJson},
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
    abstract_trait::{DynOrderCommandService, DynOrderQueryService},
    domain::{
        identity::AuthUser,
        requests::PlaceOrderRequest,
        responses::{ListResponse, OrderResponse},
    },
    errors::{ErrorResponse, HttpError},
};
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

#[utoipa::path(
    post,
    path = "/orders",
    tag = "Order",
    security(("bearer_auth" = [])),
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = OrderResponse),
        (status = 400, description = "Invalid order: empty, mixed currencies or insufficient stock", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "One or more products not found", body = ErrorResponse),
        (status = 409, description = "Concurrent update, please retry", body = ErrorResponse)
    )
)]
pub async fn place_order(
    Extension(service): Extension<DynOrderCommandService>,
    Extension(user): Extension<AuthUser>,
    SimpleValidatedJson(body): SimpleValidatedJson<PlaceOrderRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let order = service.place_order(user.id, &body).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

#[utoipa::path(
    get,
    path = "/orders/me",
    tag = "Order",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Order history, newest first", body = ListResponse<OrderResponse>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn get_my_orders(
    Extension(service): Extension<DynOrderQueryService>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, HttpError> {
    let orders = service.list_orders(user.id).await?;
    Ok(Json(ListResponse::from(orders)))
}

pub fn order_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .route("/orders", post(place_order))
        .route("/orders/me", get(get_my_orders))
        .route_layer(middleware::from_fn(auth_middleware))
        .layer(Extension(app_state.di_container.order_service.command.clone()))
        .layer(Extension(app_state.di_container.order_service.query.clone()))
        .layer(Extension(app_state.jwt_config.clone()))
}
