use crate::api::handlers;
use crate::api::state::AppState;
use crate::core::BrowserTrait;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn router<B: BrowserTrait>(state: AppState<B>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::<B>))
        .route(
            "/api/booking/start-search",
            post(handlers::start_search::<B>),
        )
        .route(
            "/api/booking/available-rooms/:session_id",
            get(handlers::available_rooms::<B>),
        )
        .route("/api/booking/select-room", post(handlers::select_room::<B>))
        .route(
            "/api/booking/fill-personal-data",
            post(handlers::fill_personal_data::<B>),
        )
        .route(
            "/api/booking/complete-booking",
            post(handlers::complete_booking::<B>),
        )
        .route(
            "/api/booking/session/:session_id/status",
            get(handlers::session_status::<B>),
        )
        .route(
            "/api/booking/session/:session_id",
            delete(handlers::delete_session::<B>),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
