use sea_orm::{
    ActiveModelTrait, ConnectionTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::products::{CreateProductRequest, ProductList, UpdateProductRequest},
    entity::{
        dimensions::{ActiveModel as DimensionActive, Model as DimensionModel},
        meta_info::{ActiveModel as MetaInfoActive, Model as MetaInfoModel},
        product_tags::ActiveModel as ProductTagActive,
        products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
        reviews::Column as ReviewCol,
        tags::Column as TagCol,
        Dimensions, MetaInfo as MetaInfos, Reviews, Tags,
    },
    error::{AppError, AppResult},
    models::{Dimension, MetaInfo, Product, Tag},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::{review_service, tag_service},
    state::AppState,
};

pub async fn list_products(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = pagination.normalize();
    let finder = Products::find().order_by_asc(Column::Title);

    let total = finder.clone().count(&state.orm).await? as i64;

    let models = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let mut items = Vec::with_capacity(models.len());
    for model in models {
        items.push(product_response(&state.orm, model).await?);
    }

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(meta),
    ))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let model = Products::find_by_id(id).one(&state.orm).await?;
    let model = match model {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let product = product_response(&state.orm, model).await?;
    Ok(ApiResponse::success("Product", product, None))
}

pub async fn create_product(
    state: &AppState,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let txn = state.orm.begin().await?;

    let id = Uuid::new_v4();
    let product = ActiveModel {
        id: Set(id),
        title: Set(payload.title),
        description: Set(payload.description),
        category: Set(payload.category),
        price: Set(payload.price),
        discount_percentage: Set(payload.discount_percentage),
        rating: Set(payload.rating),
        stock: Set(payload.stock),
        brand: Set(payload.brand),
        sku: Set(payload.sku),
        weight: Set(payload.weight),
        warranty_information: Set(payload.warranty_information),
        shipping_information: Set(payload.shipping_information),
        availability_status: Set(payload.availability_status),
        return_policy: Set(payload.return_policy),
        minimum_order_quantity: Set(payload.minimum_order_quantity),
        images: Set(serde_json::json!(payload.images)),
        thumbnail: Set(payload.thumbnail),
    }
    .insert(&txn)
    .await?;

    let mut tags: Vec<Tag> = Vec::new();
    for tag_ref in &payload.tags {
        let tag = tag_service::resolve_tag_ref(&txn, tag_ref).await?;
        if tags.iter().any(|t| t.id == tag.id) {
            continue;
        }
        ProductTagActive {
            product_id: Set(product.id),
            tag_id: Set(tag.id),
        }
        .insert(&txn)
        .await?;
        tags.push(tag_service::tag_from_entity(tag));
    }

    let dimensions = match payload.dimensions {
        Some(input) => {
            let row = DimensionActive {
                id: Set(Uuid::new_v4()),
                width: Set(input.width),
                height: Set(input.height),
                depth: Set(input.depth),
                product_id: Set(Some(product.id)),
            }
            .insert(&txn)
            .await?;
            Some(dimension_from_entity(row))
        }
        None => None,
    };

    let meta_info = match payload.meta_info {
        Some(input) => {
            let row = MetaInfoActive {
                id: Set(Uuid::new_v4()),
                barcode: Set(input.barcode),
                qr_code: Set(input.qr_code),
                product_id: Set(Some(product.id)),
                created_at: NotSet,
                updated_at: NotSet,
            }
            .insert(&txn)
            .await?;
            Some(meta_info_from_entity(row))
        }
        None => None,
    };

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        "product_create",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let product = product_from_parts(product, tags, dimensions, meta_info, Vec::new());
    Ok(ApiResponse::success(
        "Product created",
        product,
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let existing = Products::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let mut active: ActiveModel = existing.into();
    if let Some(title) = payload.title {
        active.title = Set(title);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(category) = payload.category {
        active.category = Set(category);
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(discount_percentage) = payload.discount_percentage {
        active.discount_percentage = Set(discount_percentage);
    }
    if let Some(rating) = payload.rating {
        active.rating = Set(rating);
    }
    if let Some(stock) = payload.stock {
        active.stock = Set(stock);
    }
    if let Some(brand) = payload.brand {
        active.brand = Set(brand);
    }
    if let Some(sku) = payload.sku {
        active.sku = Set(sku);
    }
    if let Some(weight) = payload.weight {
        active.weight = Set(weight);
    }
    if let Some(warranty_information) = payload.warranty_information {
        active.warranty_information = Set(warranty_information);
    }
    if let Some(shipping_information) = payload.shipping_information {
        active.shipping_information = Set(shipping_information);
    }
    if let Some(availability_status) = payload.availability_status {
        active.availability_status = Set(availability_status);
    }
    if let Some(return_policy) = payload.return_policy {
        active.return_policy = Set(return_policy);
    }
    if let Some(minimum_order_quantity) = payload.minimum_order_quantity {
        active.minimum_order_quantity = Set(minimum_order_quantity);
    }
    if let Some(images) = payload.images {
        active.images = Set(serde_json::json!(images));
    }
    if let Some(thumbnail) = payload.thumbnail {
        active.thumbnail = Set(thumbnail);
    }

    let model = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        "product_update",
        Some("products"),
        Some(serde_json::json!({ "product_id": model.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let product = product_response(&state.orm, model).await?;
    Ok(ApiResponse::success("Updated", product, Some(Meta::empty())))
}

// Dimension, review and meta-info rows cascade in the database; membership
// rows go away while tag rows stay.
pub async fn delete_product(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = Products::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        "product_delete",
        Some("products"),
        Some(serde_json::json!({ "product_id": id })),
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

/// Load the related rows for one product and assemble the nested wire shape.
async fn product_response<C: ConnectionTrait>(conn: &C, model: ProductModel) -> AppResult<Product> {
    let tags = model
        .find_related(Tags)
        .order_by_asc(TagCol::Name)
        .all(conn)
        .await?
        .into_iter()
        .map(tag_service::tag_from_entity)
        .collect();

    let dimensions = model
        .find_related(Dimensions)
        .one(conn)
        .await?
        .map(dimension_from_entity);

    let meta_info = model
        .find_related(MetaInfos)
        .one(conn)
        .await?
        .map(meta_info_from_entity);

    let reviews = model
        .find_related(Reviews)
        .order_by_asc(ReviewCol::CreatedAt)
        .all(conn)
        .await?
        .into_iter()
        .map(review_service::review_from_entity)
        .collect();

    Ok(product_from_parts(model, tags, dimensions, meta_info, reviews))
}

fn product_from_parts(
    model: ProductModel,
    tags: Vec<Tag>,
    dimensions: Option<Dimension>,
    meta_info: Option<MetaInfo>,
    reviews: Vec<crate::models::Review>,
) -> Product {
    Product {
        id: model.id,
        title: model.title,
        description: model.description,
        category: model.category,
        price: model.price,
        discount_percentage: model.discount_percentage,
        rating: model.rating,
        stock: model.stock,
        tags,
        brand: model.brand,
        sku: model.sku,
        weight: model.weight,
        warranty_information: model.warranty_information,
        shipping_information: model.shipping_information,
        availability_status: model.availability_status,
        return_policy: model.return_policy,
        minimum_order_quantity: model.minimum_order_quantity,
        images: serde_json::from_value(model.images).unwrap_or_default(),
        thumbnail: model.thumbnail,
        dimensions,
        meta_info,
        reviews,
    }
}

fn dimension_from_entity(model: DimensionModel) -> Dimension {
    Dimension {
        width: model.width,
        height: model.height,
        depth: model.depth,
    }
}

fn meta_info_from_entity(model: MetaInfoModel) -> MetaInfo {
    MetaInfo {
        barcode: model.barcode,
        qr_code: model.qr_code,
    }
}
