use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Dimension {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MetaInfo {
    pub barcode: i64,
    pub qr_code: String,
}

// Review rows carry an id and timestamp in the database; the wire shape
// exposes neither.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Review {
    pub rating: i32,
    pub comment: String,
    pub reviewer_name: String,
    pub reviewer_email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    #[schema(value_type = f64)]
    pub price: Decimal,
    #[schema(value_type = f64)]
    pub discount_percentage: Decimal,
    pub rating: f64,
    pub stock: i32,
    pub tags: Vec<Tag>,
    pub brand: String,
    pub sku: String,
    pub weight: f64,
    pub warranty_information: String,
    pub shipping_information: String,
    pub availability_status: String,
    pub return_policy: String,
    pub minimum_order_quantity: i32,
    pub images: Vec<String>,
    pub thumbnail: String,
    pub dimensions: Option<Dimension>,
    pub meta_info: Option<MetaInfo>,
    pub reviews: Vec<Review>,
}
