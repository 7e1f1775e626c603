pub mod audit_logs;
pub mod dimensions;
pub mod meta_info;
pub mod product_tags;
pub mod products;
pub mod reviews;
pub mod tags;

pub use audit_logs::Entity as AuditLogs;
pub use dimensions::Entity as Dimensions;
pub use meta_info::Entity as MetaInfo;
pub use product_tags::Entity as ProductTags;
pub use products::Entity as Products;
pub use reviews::Entity as Reviews;
pub use tags::Entity as Tags;
