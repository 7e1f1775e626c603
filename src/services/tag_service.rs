use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::products::TagRef,
    dto::tags::{CreateTagRequest, TagList, UpdateTagRequest},
    entity::tags::{ActiveModel, Column, Entity as Tags, Model as TagModel},
    error::{AppError, AppResult},
    models::Tag,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

pub async fn list_tags(state: &AppState, pagination: Pagination) -> AppResult<ApiResponse<TagList>> {
    let (page, limit, offset) = pagination.normalize();
    let finder = Tags::find().order_by_asc(Column::Name);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(tag_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Tags", TagList { items }, Some(meta)))
}

pub async fn get_tag(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Tag>> {
    let tag = Tags::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(tag_from_entity);
    let tag = match tag {
        Some(t) => t,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Tag", tag, None))
}

pub async fn create_tag(
    state: &AppState,
    payload: CreateTagRequest,
) -> AppResult<ApiResponse<Tag>> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".into()));
    }

    let tag = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        "tag_create",
        Some("tags"),
        Some(serde_json::json!({ "tag_id": tag.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Tag created",
        tag_from_entity(tag),
        Some(Meta::empty()),
    ))
}

pub async fn update_tag(
    state: &AppState,
    id: Uuid,
    payload: UpdateTagRequest,
) -> AppResult<ApiResponse<Tag>> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".into()));
    }

    let existing = Tags::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(t) => t,
        None => return Err(AppError::NotFound),
    };

    let mut active: ActiveModel = existing.into();
    active.name = Set(payload.name);
    let tag = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        "tag_update",
        Some("tags"),
        Some(serde_json::json!({ "tag_id": tag.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Updated",
        tag_from_entity(tag),
        Some(Meta::empty()),
    ))
}

// Membership rows cascade in the database; products themselves survive.
pub async fn delete_tag(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = Tags::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        "tag_delete",
        Some("tags"),
        Some(serde_json::json!({ "tag_id": id })),
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

/// Resolve one tag reference from a product payload: by id (must exist) or
/// by name (get-or-create). The name path is select-then-insert; two racing
/// requests for the same new name can both insert.
pub async fn resolve_tag_ref<C: ConnectionTrait>(conn: &C, tag_ref: &TagRef) -> AppResult<TagModel> {
    if let Some(id) = tag_ref.id {
        return Tags::find_by_id(id)
            .one(conn)
            .await?
            .ok_or_else(|| AppError::BadRequest(format!("tag {id} does not exist")));
    }

    let name = match tag_ref.name.as_ref().filter(|n| !n.trim().is_empty()) {
        Some(n) => n,
        None => return Err(AppError::BadRequest("tag reference needs an id or a name".into())),
    };

    if let Some(existing) = Tags::find()
        .filter(Column::Name.eq(name.clone()))
        .one(conn)
        .await?
    {
        return Ok(existing);
    }

    let tag = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.clone()),
    }
    .insert(conn)
    .await?;

    Ok(tag)
}

pub(crate) fn tag_from_entity(model: TagModel) -> Tag {
    Tag {
        id: model.id,
        name: model.name,
    }
}
