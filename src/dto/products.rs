use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Product;

/// Reference to a tag on product creation: an existing id, or a name to
/// get-or-create.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TagRef {
    pub id: Option<Uuid>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DimensionsInput {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MetaInfoInput {
    pub barcode: i64,
    pub qr_code: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub title: String,
    pub description: String,
    pub category: String,
    #[schema(value_type = f64)]
    pub price: Decimal,
    #[schema(value_type = f64)]
    pub discount_percentage: Decimal,
    pub rating: f64,
    pub stock: i32,
    #[serde(default)]
    pub tags: Vec<TagRef>,
    pub brand: String,
    pub sku: String,
    pub weight: f64,
    pub warranty_information: String,
    pub shipping_information: String,
    pub availability_status: String,
    pub return_policy: String,
    pub minimum_order_quantity: i32,
    #[serde(default)]
    pub images: Vec<String>,
    pub thumbnail: String,
    pub dimensions: Option<DimensionsInput>,
    pub meta_info: Option<MetaInfoInput>,
}

// Scalars only; tags, dimensions, meta_info and reviews are written on the
// creation path.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    #[schema(value_type = f64)]
    pub price: Option<Decimal>,
    #[schema(value_type = f64)]
    pub discount_percentage: Option<Decimal>,
    pub rating: Option<f64>,
    pub stock: Option<i32>,
    pub brand: Option<String>,
    pub sku: Option<String>,
    pub weight: Option<f64>,
    pub warranty_information: Option<String>,
    pub shipping_information: Option<String>,
    pub availability_status: Option<String>,
    pub return_policy: Option<String>,
    pub minimum_order_quantity: Option<i32>,
    pub images: Option<Vec<String>>,
    pub thumbnail: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}
