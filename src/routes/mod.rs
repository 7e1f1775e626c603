use axum::Router;

use crate::state::AppState;

pub mod doc;
pub mod health;
pub mod params;
pub mod products;
pub mod reviews;
pub mod tags;

// Build the API router without binding state; it is provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/products", products::router())
        .nest("/products/{product_id}/reviews", reviews::router())
        .nest("/tags", tags::router())
}
