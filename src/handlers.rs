use crate::chart::{TREND_TITLE, render_macro_chart, weekly_title};
use crate::errors::AppError;
use crate::export::{
    PDF_ENABLE_HINT, PdfExport, csv_filename, pdf_filename, summary_to_csv, summary_to_pdf,
};
use crate::models::{MacroEntry, MacroInput, TodayResponse, WeekOption, WeekQuery, WeeklySummary};
use crate::state::AppState;
use crate::stats::{available_weeks, parse_week, summarize, week_entries, week_key, week_label, week_options};
use crate::ui::{Dashboard, render_index};
use axum::{
    extract::{Query, State},
    http::header,
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

/// Urlencoded body of the no-script entry form.
#[derive(Debug, Deserialize)]
pub struct TodayForm {
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
    pub week: Option<String>,
}

pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<WeekQuery>,
) -> Result<Html<String>, AppError> {
    let log = state.log.lock().await;
    let entries = log.entries();
    let week = selected_week(&query, entries, log.today())?;
    let summary = summarize(entries, week);
    let trend_svg = render_macro_chart(TREND_TITLE, entries).map_err(AppError::internal)?;
    let week_svg = render_macro_chart(&weekly_title(&week_label(week)), &week_entries(entries, week))
        .map_err(AppError::internal)?;

    Ok(Html(render_index(&Dashboard {
        today: log.today_entry(),
        weeks: week_options(entries),
        selected_week: week,
        summary,
        trend_svg,
        week_svg,
        pdf: state.pdf,
    })))
}

pub async fn get_today(State(state): State<AppState>) -> Json<TodayResponse> {
    let log = state.log.lock().await;
    Json(log.today_entry().into())
}

pub async fn update_today(
    State(state): State<AppState>,
    Json(payload): Json<MacroInput>,
) -> Result<Json<TodayResponse>, AppError> {
    let updated = apply_update(&state, payload).await?;
    Ok(Json(updated.into()))
}

pub async fn submit_today(
    State(state): State<AppState>,
    Form(form): Form<TodayForm>,
) -> Result<Redirect, AppError> {
    apply_update(
        &state,
        MacroInput {
            protein: form.protein,
            carbs: form.carbs,
            fat: form.fat,
        },
    )
    .await?;

    let target = form
        .week
        .as_deref()
        .and_then(parse_week)
        .map(|week| format!("/?week={week}"))
        .unwrap_or_else(|| "/".to_string());
    Ok(Redirect::to(&target))
}

pub async fn get_entries(State(state): State<AppState>) -> Json<Vec<MacroEntry>> {
    let log = state.log.lock().await;
    Json(log.entries().to_vec())
}

pub async fn get_weeks(State(state): State<AppState>) -> Json<Vec<WeekOption>> {
    let log = state.log.lock().await;
    Json(week_options(log.entries()))
}

pub async fn get_summary(
    State(state): State<AppState>,
    Query(query): Query<WeekQuery>,
) -> Result<Json<WeeklySummary>, AppError> {
    let (summary, _) = weekly_view(&state, &query).await?;
    Ok(Json(summary))
}

pub async fn trend_chart(State(state): State<AppState>) -> Result<Response, AppError> {
    let log = state.log.lock().await;
    let svg = render_macro_chart(TREND_TITLE, log.entries()).map_err(AppError::internal)?;
    Ok(svg_response(svg))
}

pub async fn week_chart(
    State(state): State<AppState>,
    Query(query): Query<WeekQuery>,
) -> Result<Response, AppError> {
    let log = state.log.lock().await;
    let week = selected_week(&query, log.entries(), log.today())?;
    let svg = render_macro_chart(
        &weekly_title(&week_label(week)),
        &week_entries(log.entries(), week),
    )
    .map_err(AppError::internal)?;
    Ok(svg_response(svg))
}

pub async fn export_csv(
    State(state): State<AppState>,
    Query(query): Query<WeekQuery>,
) -> Result<Response, AppError> {
    let (summary, week) = weekly_view(&state, &query).await?;
    let body = summary_to_csv(&summary)?;
    Ok(attachment("text/csv; charset=utf-8", &csv_filename(week), body))
}

pub async fn export_pdf(
    State(state): State<AppState>,
    Query(query): Query<WeekQuery>,
) -> Result<Response, AppError> {
    let (summary, week) = weekly_view(&state, &query).await?;
    match summary_to_pdf(&summary, &week_label(week), state.pdf)? {
        PdfExport::Document(body) => Ok(attachment("application/pdf", &pdf_filename(week), body)),
        PdfExport::Unavailable => Err(AppError::unavailable(PDF_ENABLE_HINT)),
    }
}

async fn apply_update(state: &AppState, input: MacroInput) -> Result<MacroEntry, AppError> {
    let mut log = state.log.lock().await;
    Ok(log.update_today(input.clamped()).await?)
}

async fn weekly_view(
    state: &AppState,
    query: &WeekQuery,
) -> Result<(WeeklySummary, NaiveDate), AppError> {
    let log = state.log.lock().await;
    let week = selected_week(query, log.entries(), log.today())?;
    Ok((summarize(log.entries(), week), week))
}

/// Explicit `?week=` wins; otherwise the most recent logged week.
fn selected_week(
    query: &WeekQuery,
    entries: &[MacroEntry],
    today: NaiveDate,
) -> Result<NaiveDate, AppError> {
    match query.week.as_deref().map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => parse_week(raw)
            .map(week_key)
            .ok_or_else(|| AppError::bad_request("week must be a YYYY-MM-DD date")),
        None => Ok(available_weeks(entries)
            .first()
            .copied()
            .unwrap_or_else(|| week_key(today))),
    }
}

fn svg_response(svg: String) -> Response {
    ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response()
}

fn attachment(content_type: &str, filename: &str, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}
