use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub discount_percentage: Decimal,
    pub rating: f64,
    pub stock: i32,
    pub brand: String,
    pub sku: String,
    pub weight: f64,
    pub warranty_information: String,
    pub shipping_information: String,
    pub availability_status: String,
    pub return_policy: String,
    pub minimum_order_quantity: i32,
    pub images: Json,
    pub thumbnail: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::dimensions::Entity")]
    Dimensions,
    #[sea_orm(has_many = "super::meta_info::Entity")]
    MetaInfo,
    #[sea_orm(has_many = "super::reviews::Entity")]
    Reviews,
    #[sea_orm(has_many = "super::product_tags::Entity")]
    ProductTags,
}

impl Related<super::dimensions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Dimensions.def()
    }
}

impl Related<super::meta_info::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MetaInfo.def()
    }
}

impl Related<super::reviews::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl Related<super::tags::Entity> for Entity {
    fn to() -> RelationDef {
        super::product_tags::Relation::Tags.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::product_tags::Relation::Products.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
