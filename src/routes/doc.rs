use utoipa::{OpenApi, openapi::OpenApi as OpenApiSpec};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        products::{CreateProductRequest, DimensionsInput, MetaInfoInput, ProductList, TagRef, UpdateProductRequest},
        reviews::{CreateReviewRequest, ReviewList, UpdateReviewRequest},
        tags::{CreateTagRequest, TagList, UpdateTagRequest},
    },
    models::{Dimension, MetaInfo, Product, Review, Tag},
    response::{ApiResponse, Meta},
    routes::{health, params, products, reviews, tags},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        products::list_products,
        products::create_product,
        products::get_product,
        products::update_product,
        products::delete_product,
        reviews::list_reviews,
        reviews::create_review,
        reviews::get_review,
        reviews::update_review,
        reviews::delete_review,
        tags::list_tags,
        tags::create_tag,
        tags::get_tag,
        tags::update_tag,
        tags::delete_tag,
    ),
    components(
        schemas(
            Product,
            Tag,
            Dimension,
            MetaInfo,
            Review,
            CreateProductRequest,
            UpdateProductRequest,
            TagRef,
            DimensionsInput,
            MetaInfoInput,
            ProductList,
            CreateReviewRequest,
            UpdateReviewRequest,
            ReviewList,
            CreateTagRequest,
            UpdateTagRequest,
            TagList,
            params::Pagination,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<Tag>,
            ApiResponse<TagList>,
            ApiResponse<Review>,
            ApiResponse<ReviewList>
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Products", description = "Product catalog endpoints"),
        (name = "Reviews", description = "Review endpoints nested under a product"),
        (name = "Tags", description = "Tag endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
