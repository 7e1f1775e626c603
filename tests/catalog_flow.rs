use axum_catalog_api::{
    db::{create_orm_conn, create_pool},
    dto::products::{
        CreateProductRequest, DimensionsInput, MetaInfoInput, TagRef, UpdateProductRequest,
    },
    dto::reviews::CreateReviewRequest,
    dto::tags::{CreateTagRequest, UpdateTagRequest},
    entity::{dimensions, meta_info, reviews},
    error::AppError,
    services::{product_service, review_service, tag_service},
    state::AppState,
};
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

// Tests share one database, so each flow works with its own rows: unique
// skus and tag names, no global counts.
async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url =
        match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
            Ok(url) => url,
            Err(_) => {
                eprintln!(
                    "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
                );
                return Ok(None);
            }
        };

    let pool = create_pool(&database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    let orm = create_orm_conn(&database_url).await?;

    Ok(Some(AppState { pool, orm }))
}

fn product_payload(sku: &str, tags: Vec<TagRef>) -> CreateProductRequest {
    CreateProductRequest {
        title: "Ceramic Mug".into(),
        description: "A mug for testing".into(),
        category: "kitchen".into(),
        price: dec!(49.99),
        discount_percentage: dec!(5.25),
        rating: 4.6,
        stock: 12,
        tags,
        brand: "Testware".into(),
        sku: sku.to_string(),
        weight: 1.5,
        warranty_information: "1 month warranty".into(),
        shipping_information: "Ships in 1-2 business days".into(),
        availability_status: "In Stock".into(),
        return_policy: "30 days return policy".into(),
        minimum_order_quantity: 1,
        images: vec!["https://cdn.example.com/mug/1.png".into()],
        thumbnail: "https://cdn.example.com/mug/thumbnail.png".into(),
        dimensions: None,
        meta_info: None,
    }
}

fn tag_by_name(name: &str) -> TagRef {
    TagRef {
        id: None,
        name: Some(name.to_string()),
    }
}

// Tag resolution, nested creation, round trip and cascade delete in one flow.
#[tokio::test]
async fn product_create_tag_resolution_and_cascade() -> anyhow::Result<()> {
    let state = match setup_state().await? {
        Some(s) => s,
        None => return Ok(()),
    };

    let suffix = Uuid::new_v4().simple().to_string();
    let summer = format!("summer-{suffix}");
    let sale = format!("sale-{suffix}");

    // Create with two new tag names plus nested dimensions and meta info.
    let mut payload = product_payload(&format!("SKU-A-{suffix}"), vec![
        tag_by_name(&summer),
        tag_by_name(&sale),
    ]);
    payload.dimensions = Some(DimensionsInput {
        width: 1.0,
        height: 2.0,
        depth: 3.0,
    });
    payload.meta_info = Some(MetaInfoInput {
        barcode: 9164035109868,
        qr_code: "https://cdn.example.com/qr/9164035109868.png".into(),
    });

    let created = product_service::create_product(&state, payload)
        .await?
        .data
        .expect("created product");

    assert_eq!(created.tags.len(), 2);
    let summer_id = created
        .tags
        .iter()
        .find(|t| t.name == summer)
        .expect("summer tag attached")
        .id;
    assert!(created.tags.iter().any(|t| t.name == sale));
    let dims = created.dimensions.as_ref().expect("dimensions attached");
    assert_eq!((dims.width, dims.height, dims.depth), (1.0, 2.0, 3.0));
    assert_eq!(
        created.meta_info.as_ref().expect("meta info attached").barcode,
        9164035109868
    );
    assert!(created.reviews.is_empty());

    // Exactly one tag row exists for the new name.
    let count = axum_catalog_api::entity::Tags::find()
        .filter(axum_catalog_api::entity::tags::Column::Name.eq(summer.clone()))
        .count(&state.orm)
        .await?;
    assert_eq!(count, 1);

    // A second product with the same name reuses the tag.
    let second = product_service::create_product(
        &state,
        product_payload(&format!("SKU-B-{suffix}"), vec![tag_by_name(&summer)]),
    )
    .await?
    .data
    .expect("second product");
    assert_eq!(second.tags.len(), 1);
    assert_eq!(second.tags[0].id, summer_id);

    let count = axum_catalog_api::entity::Tags::find()
        .filter(axum_catalog_api::entity::tags::Column::Name.eq(summer.clone()))
        .count(&state.orm)
        .await?;
    assert_eq!(count, 1, "get-or-create must not duplicate the tag");

    // Attaching by id works and creates nothing.
    let third = product_service::create_product(
        &state,
        product_payload(&format!("SKU-C-{suffix}"), vec![TagRef {
            id: Some(summer_id),
            name: None,
        }]),
    )
    .await?
    .data
    .expect("third product");
    assert_eq!(third.tags[0].id, summer_id);

    // Unknown tag id is a referential failure.
    let err = product_service::create_product(
        &state,
        product_payload(&format!("SKU-D-{suffix}"), vec![TagRef {
            id: Some(Uuid::new_v4()),
            name: None,
        }]),
    )
    .await
    .expect_err("unknown tag id must fail");
    assert!(matches!(err, AppError::BadRequest(_)));

    // A reference with neither id nor name is rejected.
    let err = product_service::create_product(
        &state,
        product_payload(&format!("SKU-E-{suffix}"), vec![TagRef {
            id: None,
            name: None,
        }]),
    )
    .await
    .expect_err("empty tag reference must fail");
    assert!(matches!(err, AppError::BadRequest(_)));

    // Round trip: scalars come back unchanged, nested objects render.
    let fetched = product_service::get_product(&state, created.id)
        .await?
        .data
        .expect("fetched product");
    assert_eq!(fetched.title, created.title);
    assert_eq!(fetched.description, created.description);
    assert_eq!(fetched.category, created.category);
    assert_eq!(fetched.price, dec!(49.99));
    assert_eq!(fetched.discount_percentage, dec!(5.25));
    assert_eq!(fetched.rating, 4.6);
    assert_eq!(fetched.stock, 12);
    assert_eq!(fetched.brand, created.brand);
    assert_eq!(fetched.sku, created.sku);
    assert_eq!(fetched.weight, 1.5);
    assert_eq!(fetched.warranty_information, created.warranty_information);
    assert_eq!(fetched.shipping_information, created.shipping_information);
    assert_eq!(fetched.availability_status, created.availability_status);
    assert_eq!(fetched.return_policy, created.return_policy);
    assert_eq!(fetched.minimum_order_quantity, 1);
    assert_eq!(fetched.images, created.images);
    assert_eq!(fetched.thumbnail, created.thumbnail);
    assert!(fetched.dimensions.is_some());
    assert!(fetched.meta_info.is_some());

    // Omitted nested objects render as null.
    let fetched_second = product_service::get_product(&state, second.id)
        .await?
        .data
        .expect("second product fetched");
    assert!(fetched_second.dimensions.is_none());
    assert!(fetched_second.meta_info.is_none());

    // Partial update touches only the provided scalars.
    let updated = product_service::update_product(&state, second.id, UpdateProductRequest {
        price: Some(dec!(10.00)),
        stock: Some(5),
        title: None,
        description: None,
        category: None,
        discount_percentage: None,
        rating: None,
        brand: None,
        sku: None,
        weight: None,
        warranty_information: None,
        shipping_information: None,
        availability_status: None,
        return_policy: None,
        minimum_order_quantity: None,
        images: None,
        thumbnail: None,
    })
    .await?
    .data
    .expect("updated product");
    assert_eq!(updated.price, dec!(10.00));
    assert_eq!(updated.stock, 5);
    assert_eq!(updated.title, second.title);

    // A review rides along so the cascade covers all three child tables.
    review_service::create_review(&state, created.id, CreateReviewRequest {
        rating: 5,
        comment: "Great mug".into(),
        reviewer_name: "Ana".into(),
        reviewer_email: "ana@example.com".into(),
    })
    .await?;

    product_service::delete_product(&state, created.id).await?;

    let dim_rows = dimensions::Entity::find()
        .filter(dimensions::Column::ProductId.eq(Some(created.id)))
        .count(&state.orm)
        .await?;
    let meta_rows = meta_info::Entity::find()
        .filter(meta_info::Column::ProductId.eq(Some(created.id)))
        .count(&state.orm)
        .await?;
    let review_rows = reviews::Entity::find()
        .filter(reviews::Column::ProductId.eq(created.id))
        .count(&state.orm)
        .await?;
    assert_eq!((dim_rows, meta_rows, review_rows), (0, 0, 0));

    // Tags outlive the product.
    let summer_tag = tag_service::get_tag(&state, summer_id)
        .await?
        .data
        .expect("summer tag still present");
    assert_eq!(summer_tag.name, summer);

    let err = product_service::get_product(&state, created.id)
        .await
        .expect_err("deleted product is gone");
    assert!(matches!(err, AppError::NotFound));

    Ok(())
}

#[tokio::test]
async fn tag_crud_and_membership_cleanup() -> anyhow::Result<()> {
    let state = match setup_state().await? {
        Some(s) => s,
        None => return Ok(()),
    };

    let suffix = Uuid::new_v4().simple().to_string();

    let err = tag_service::create_tag(&state, CreateTagRequest { name: "  ".into() })
        .await
        .expect_err("blank name must fail");
    assert!(matches!(err, AppError::BadRequest(_)));

    let tag = tag_service::create_tag(&state, CreateTagRequest {
        name: format!("clearance-{suffix}"),
    })
    .await?
    .data
    .expect("created tag");

    let renamed = tag_service::update_tag(&state, tag.id, UpdateTagRequest {
        name: format!("outlet-{suffix}"),
    })
    .await?
    .data
    .expect("renamed tag");
    assert_eq!(renamed.name, format!("outlet-{suffix}"));

    // Deleting a tag detaches it from products without touching them.
    let product = product_service::create_product(
        &state,
        product_payload(&format!("SKU-T-{suffix}"), vec![TagRef {
            id: Some(tag.id),
            name: None,
        }]),
    )
    .await?
    .data
    .expect("tagged product");
    assert_eq!(product.tags.len(), 1);

    tag_service::delete_tag(&state, tag.id).await?;

    let fetched = product_service::get_product(&state, product.id)
        .await?
        .data
        .expect("product survives tag deletion");
    assert!(fetched.tags.is_empty());

    let err = tag_service::get_tag(&state, tag.id)
        .await
        .expect_err("deleted tag is gone");
    assert!(matches!(err, AppError::NotFound));

    Ok(())
}
