use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::reviews::{CreateReviewRequest, ReviewList, UpdateReviewRequest},
    entity::{
        reviews::{ActiveModel, Column, Entity as Reviews, Model as ReviewModel},
        Products,
    },
    error::{AppError, AppResult},
    models::Review,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

pub async fn list_reviews(
    state: &AppState,
    product_id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<ReviewList>> {
    let (page, limit, offset) = pagination.normalize();
    let finder = Reviews::find()
        .filter(Column::ProductId.eq(product_id))
        .order_by_asc(Column::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(review_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Reviews", ReviewList { items }, Some(meta)))
}

pub async fn create_review(
    state: &AppState,
    product_id: Uuid,
    payload: CreateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    validate_email(&payload.reviewer_email)?;

    // A review must always reference an existing product.
    let product = Products::find_by_id(product_id).one(&state.orm).await?;
    if product.is_none() {
        return Err(AppError::NotFound);
    }

    let review = ActiveModel {
        id: Set(Uuid::new_v4()),
        rating: Set(payload.rating),
        comment: Set(payload.comment),
        reviewer_name: Set(payload.reviewer_name),
        reviewer_email: Set(payload.reviewer_email),
        product_id: Set(product_id),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        "review_create",
        Some("reviews"),
        Some(serde_json::json!({ "product_id": product_id, "review_id": review.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Review created",
        review_from_entity(review),
        Some(Meta::empty()),
    ))
}

pub async fn get_review(
    state: &AppState,
    product_id: Uuid,
    id: Uuid,
) -> AppResult<ApiResponse<Review>> {
    let review = find_scoped(state, product_id, id).await?;
    Ok(ApiResponse::success("Review", review_from_entity(review), None))
}

pub async fn update_review(
    state: &AppState,
    product_id: Uuid,
    id: Uuid,
    payload: UpdateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    let existing = find_scoped(state, product_id, id).await?;

    let mut active: ActiveModel = existing.into();
    if let Some(rating) = payload.rating {
        active.rating = Set(rating);
    }
    if let Some(comment) = payload.comment {
        active.comment = Set(comment);
    }
    if let Some(reviewer_name) = payload.reviewer_name {
        active.reviewer_name = Set(reviewer_name);
    }
    if let Some(reviewer_email) = payload.reviewer_email {
        validate_email(&reviewer_email)?;
        active.reviewer_email = Set(reviewer_email);
    }

    let review = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        "review_update",
        Some("reviews"),
        Some(serde_json::json!({ "product_id": product_id, "review_id": review.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Updated",
        review_from_entity(review),
        Some(Meta::empty()),
    ))
}

pub async fn delete_review(
    state: &AppState,
    product_id: Uuid,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = Reviews::delete_many()
        .filter(
            Condition::all()
                .add(Column::Id.eq(id))
                .add(Column::ProductId.eq(product_id)),
        )
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        "review_delete",
        Some("reviews"),
        Some(serde_json::json!({ "product_id": product_id, "review_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

// Single-review operations match on the parent product id as well as the
// review id, so a review reached through the wrong product is Not Found.
async fn find_scoped(state: &AppState, product_id: Uuid, id: Uuid) -> AppResult<ReviewModel> {
    let review = Reviews::find()
        .filter(
            Condition::all()
                .add(Column::Id.eq(id))
                .add(Column::ProductId.eq(product_id)),
        )
        .one(&state.orm)
        .await?;

    match review {
        Some(r) => Ok(r),
        None => Err(AppError::NotFound),
    }
}

fn validate_email(email: &str) -> AppResult<()> {
    if !email.contains('@') || email.trim().is_empty() {
        return Err(AppError::BadRequest(
            "reviewer_email must be a valid email address".into(),
        ));
    }
    Ok(())
}

pub(crate) fn review_from_entity(model: ReviewModel) -> Review {
    Review {
        rating: model.rating,
        comment: model.comment,
        reviewer_name: model.reviewer_name,
        reviewer_email: model.reviewer_email,
    }
}
