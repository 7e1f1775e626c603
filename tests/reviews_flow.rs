use axum_catalog_api::{
    db::{create_orm_conn, create_pool},
    dto::products::CreateProductRequest,
    dto::reviews::{CreateReviewRequest, UpdateReviewRequest},
    entity::reviews,
    error::AppError,
    routes::params::Pagination,
    services::{product_service, review_service},
    state::AppState,
};
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

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

async fn create_product(state: &AppState, sku: &str) -> anyhow::Result<Uuid> {
    let product = product_service::create_product(state, CreateProductRequest {
        title: "Desk Lamp".into(),
        description: "A lamp for testing".into(),
        category: "lighting".into(),
        price: dec!(24.50),
        discount_percentage: dec!(0.00),
        rating: 4.1,
        stock: 30,
        tags: Vec::new(),
        brand: "Testware".into(),
        sku: sku.to_string(),
        weight: 0.9,
        warranty_information: "1 month warranty".into(),
        shipping_information: "Ships in 1-2 business days".into(),
        availability_status: "In Stock".into(),
        return_policy: "30 days return policy".into(),
        minimum_order_quantity: 1,
        images: Vec::new(),
        thumbnail: "https://cdn.example.com/lamp/thumbnail.png".into(),
        dimensions: None,
        meta_info: None,
    })
    .await?
    .data
    .expect("created product");
    Ok(product.id)
}

fn review_payload(name: &str, comment: &str) -> CreateReviewRequest {
    CreateReviewRequest {
        rating: 4,
        comment: comment.to_string(),
        reviewer_name: name.to_string(),
        reviewer_email: format!("{name}@example.com"),
    }
}

fn default_page() -> Pagination {
    Pagination {
        page: None,
        per_page: None,
    }
}

// Listing is scoped to the parent product; detail operations enforce the
// parent-id match as well.
#[tokio::test]
async fn nested_reviews_are_scoped_to_parent_product() -> anyhow::Result<()> {
    let state = match setup_state().await? {
        Some(s) => s,
        None => return Ok(()),
    };

    let suffix = Uuid::new_v4().simple().to_string();
    let product_p = create_product(&state, &format!("SKU-P-{suffix}")).await?;
    let product_q = create_product(&state, &format!("SKU-Q-{suffix}")).await?;

    review_service::create_review(&state, product_p, review_payload("ana", "solid lamp")).await?;
    review_service::create_review(&state, product_p, review_payload("ben", "bright enough"))
        .await?;
    review_service::create_review(&state, product_q, review_payload("cho", "flickers a bit"))
        .await?;

    // Malformed email is a validation failure.
    let err = review_service::create_review(&state, product_p, CreateReviewRequest {
        rating: 1,
        comment: "bad".into(),
        reviewer_name: "dee".into(),
        reviewer_email: "not-an-email".into(),
    })
    .await
    .expect_err("invalid email must fail");
    assert!(matches!(err, AppError::BadRequest(_)));

    // A review cannot be created under a product that does not exist.
    let err = review_service::create_review(
        &state,
        Uuid::new_v4(),
        review_payload("eve", "ghost product"),
    )
    .await
    .expect_err("missing parent must fail");
    assert!(matches!(err, AppError::NotFound));

    let listed = review_service::list_reviews(&state, product_p, default_page()).await?;
    assert_eq!(listed.meta.as_ref().and_then(|m| m.total), Some(2));
    let items = listed.data.expect("review list").items;
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|r| r.reviewer_name != "cho"));

    // Row ids for detail operations come straight from the table; the wire
    // shape does not expose them.
    let p_review_ids: Vec<Uuid> = reviews::Entity::find()
        .filter(reviews::Column::ProductId.eq(product_p))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(p_review_ids.len(), 2);

    // Reaching P's review through Q is Not Found.
    let err = review_service::get_review(&state, product_q, p_review_ids[0])
        .await
        .expect_err("wrong parent must not resolve");
    assert!(matches!(err, AppError::NotFound));

    let review = review_service::get_review(&state, product_p, p_review_ids[0])
        .await?
        .data
        .expect("review under correct parent");
    assert_eq!(review.rating, 4);

    let updated = review_service::update_review(
        &state,
        product_p,
        p_review_ids[0],
        UpdateReviewRequest {
            rating: Some(2),
            comment: Some("changed my mind".into()),
            reviewer_name: None,
            reviewer_email: None,
        },
    )
    .await?
    .data
    .expect("updated review");
    assert_eq!(updated.rating, 2);
    assert_eq!(updated.comment, "changed my mind");

    let err = review_service::delete_review(&state, product_q, p_review_ids[1])
        .await
        .expect_err("wrong parent must not delete");
    assert!(matches!(err, AppError::NotFound));

    review_service::delete_review(&state, product_p, p_review_ids[1]).await?;
    let listed = review_service::list_reviews(&state, product_p, default_page()).await?;
    assert_eq!(listed.meta.as_ref().and_then(|m| m.total), Some(1));

    // Deleting the product removes its remaining reviews.
    product_service::delete_product(&state, product_p).await?;
    let remaining = reviews::Entity::find()
        .filter(reviews::Column::ProductId.eq(product_p))
        .count(&state.orm)
        .await?;
    assert_eq!(remaining, 0);

    Ok(())
}
