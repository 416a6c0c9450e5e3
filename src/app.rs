use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/today", post(handlers::submit_today))
        .route("/api/today", get(handlers::get_today).post(handlers::update_today))
        .route("/api/entries", get(handlers::get_entries))
        .route("/api/weeks", get(handlers::get_weeks))
        .route("/api/summary", get(handlers::get_summary))
        .route("/chart/trend.svg", get(handlers::trend_chart))
        .route("/chart/week.svg", get(handlers::week_chart))
        .route("/export/csv", get(handlers::export_csv))
        .route("/export/pdf", get(handlers::export_pdf))
        .with_state(state)
}
