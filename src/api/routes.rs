use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;
use crate::middleware::{make_span_with_request_id, request_id_middleware};

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", api_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
}

/// Routes under /api
fn api_routes() -> Router<AppState> {
    Router::new()
        // Outfits
        .route("/outfits/suggest", get(handlers::suggest_outfits))
        .route("/outfits/log", post(handlers::log_outfit))
        .route("/outfits/history", get(handlers::outfit_history))
        .route("/outfits/:id/rating", post(handlers::rate_outfit))
        // Style profile
        .route(
            "/profile",
            get(handlers::get_profile).delete(handlers::reset_profile),
        )
        .route("/profile/stats", get(handlers::profile_stats))
        .route("/profile/favorite-colors", get(handlers::favorite_colors))
        .route("/profile/formality", get(handlers::formality_distribution))
        .route("/profile/feedback-tags", get(handlers::feedback_tags))
        // Wardrobe
        .route(
            "/clothes",
            get(handlers::list_clothes).post(handlers::create_clothing),
        )
        .route("/clothes/forgotten", get(handlers::forgotten_clothes))
        .route(
            "/clothes/:id",
            get(handlers::get_clothing)
                .put(handlers::update_clothing)
                .delete(handlers::delete_clothing),
        )
        .route("/clothes/:id/laundry", post(handlers::toggle_laundry))
        .route("/clothes/:id/favorite", post(handlers::toggle_favorite))
        .route("/stats", get(handlers::wardrobe_stats))
        .route("/clear-all", delete(handlers::clear_all))
        // Weather
        .route("/weather", get(handlers::current_weather))
}
