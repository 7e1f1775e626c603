pub mod product_service;
pub mod review_service;
pub mod tag_service;
