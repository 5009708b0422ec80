use super::{controllers, middleware, models};
use axum::{
    middleware::from_fn,
    routing::{get, put, Router},
};
use tower_http::trace::TraceLayer;

#[rustfmt::skip]
pub fn get_routes() -> Router<models::AppState> {
    let api = Router::new()
        .route("/properties", get(controllers::list_properties).post(controllers::create_property))
        .route("/properties/:id", put(controllers::update_property).delete(controllers::delete_property))
        .route("/rent-records", get(controllers::list_rent_records).post(controllers::upsert_rent_record))
        .route("/export/excel", get(controllers::export_excel))
        .layer(from_fn(middleware::no_store));

    Router::new()
        .route("/ping", get(controllers::pong))
        .nest("/api", api)
}

pub fn app(state: models::AppState) -> Router {
    get_routes()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
