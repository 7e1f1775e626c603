use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::reviews::{CreateReviewRequest, ReviewList, UpdateReviewRequest},
    error::AppResult,
    models::Review,
    response::ApiResponse,
    routes::params::Pagination,
    services::review_service,
    state::AppState,
};

// Nested under /products/{product_id}; path params accumulate through the
// nest, so detail handlers extract (product_id, id).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_reviews).post(create_review))
        .route(
            "/{review_id}",
            get(get_review).put(update_review).delete(delete_review),
        )
}

#[utoipa::path(
    get,
    path = "/api/products/{product_id}/reviews",
    params(
        ("product_id" = Uuid, Path, description = "Parent product ID"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "List reviews for one product", body = ApiResponse<ReviewList>)
    ),
    tag = "Reviews"
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<ReviewList>>> {
    let resp = review_service::list_reviews(&state, product_id, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/products/{product_id}/reviews",
    params(
        ("product_id" = Uuid, Path, description = "Parent product ID")
    ),
    request_body = CreateReviewRequest,
    responses(
        (status = 200, description = "Create a review for one product", body = ApiResponse<Review>),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Product not found"),
    ),
    tag = "Reviews"
)]
pub async fn create_review(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<CreateReviewRequest>,
) -> AppResult<Json<ApiResponse<Review>>> {
    let resp = review_service::create_review(&state, product_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{product_id}/reviews/{id}",
    params(
        ("product_id" = Uuid, Path, description = "Parent product ID"),
        ("id" = Uuid, Path, description = "Review ID"),
    ),
    responses(
        (status = 200, description = "Get review", body = ApiResponse<Review>),
        (status = 404, description = "Review not found under this product"),
    ),
    tag = "Reviews"
)]
pub async fn get_review(
    State(state): State<AppState>,
    Path((product_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<Review>>> {
    let resp = review_service::get_review(&state, product_id, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/products/{product_id}/reviews/{id}",
    params(
        ("product_id" = Uuid, Path, description = "Parent product ID"),
        ("id" = Uuid, Path, description = "Review ID"),
    ),
    request_body = UpdateReviewRequest,
    responses(
        (status = 200, description = "Updated review", body = ApiResponse<Review>),
        (status = 404, description = "Review not found under this product"),
    ),
    tag = "Reviews"
)]
pub async fn update_review(
    State(state): State<AppState>,
    Path((product_id, id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateReviewRequest>,
) -> AppResult<Json<ApiResponse<Review>>> {
    let resp = review_service::update_review(&state, product_id, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/products/{product_id}/reviews/{id}",
    params(
        ("product_id" = Uuid, Path, description = "Parent product ID"),
        ("id" = Uuid, Path, description = "Review ID"),
    ),
    responses(
        (status = 200, description = "Deleted review", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Review not found under this product"),
    ),
    tag = "Reviews"
)]
pub async fn delete_review(
    State(state): State<AppState>,
    Path((product_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = review_service::delete_review(&state, product_id, id).await?;
    Ok(Json(resp))
}
