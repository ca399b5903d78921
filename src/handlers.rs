use crate::errors::AppError;
use crate::identity::new_tip;
use crate::models::{
    AddTipRequest, LeaderboardEntry, MeResponse, SetNameRequest, StatsQuery, StatsResponse,
    TipRecord, TipsQuery, TodayResponse,
};
use crate::state::AppState;
use crate::stats::build_stats;
use crate::store::TipStore;
use crate::ui::render_index;
use crate::validation::{validate_amount, validate_name};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, Redirect},
};
use chrono::Local;
use tracing::info;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let store = state.store.lock().await;
    let today = today_summary(&store);
    let display_name = state.user.display_name(store.user_name());
    Html(render_index(&today, store.leaderboard(), &display_name))
}

pub async fn get_today(State(state): State<AppState>) -> Json<TodayResponse> {
    let store = state.store.lock().await;
    Json(today_summary(&store))
}

pub async fn list_tips(
    State(state): State<AppState>,
    Query(query): Query<TipsQuery>,
) -> Json<Vec<TipRecord>> {
    let store = state.store.lock().await;
    let tips = match query.date.as_deref() {
        Some(date) => store.query_by_date(date).into_iter().cloned().collect(),
        None => store.tips().to_vec(),
    };
    Json(tips)
}

pub async fn add_tip(
    State(state): State<AppState>,
    Json(payload): Json<AddTipRequest>,
) -> Result<(StatusCode, Json<TipRecord>), AppError> {
    let amount = validate_amount(payload.amount)?;
    let record = record_tip(&state, amount).await;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn quick_add(
    State(state): State<AppState>,
    Path(amount): Path<i64>,
) -> Result<Redirect, AppError> {
    let amount = validate_amount(amount)?;
    record_tip(&state, amount).await;
    Ok(Redirect::to("/"))
}

pub async fn delete_tip(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let mut store = state.store.lock().await;
    if store.remove_record(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(format!("no tip with id {id}")))
    }
}

pub async fn clear_tips(State(state): State<AppState>) -> StatusCode {
    state.store.lock().await.clear_all();
    StatusCode::NO_CONTENT
}

pub async fn get_leaderboard(State(state): State<AppState>) -> Json<Vec<LeaderboardEntry>> {
    let store = state.store.lock().await;
    Json(store.leaderboard().to_vec())
}

pub async fn get_stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Json<StatsResponse> {
    let store = state.store.lock().await;
    Json(build_stats(store.tips(), query.range))
}

pub async fn get_me(State(state): State<AppState>) -> Json<MeResponse> {
    let store = state.store.lock().await;
    Json(me_response(&state, &store))
}

pub async fn set_name(
    State(state): State<AppState>,
    Json(payload): Json<SetNameRequest>,
) -> Result<Json<MeResponse>, AppError> {
    let name = validate_name(&payload.name)?;
    let mut store = state.store.lock().await;
    store.set_user_name(name);
    Ok(Json(me_response(&state, &store)))
}

pub async fn reset_name(State(state): State<AppState>) -> Json<MeResponse> {
    let mut store = state.store.lock().await;
    store.reset_user_name();
    Json(me_response(&state, &store))
}

async fn record_tip(state: &AppState, amount: u64) -> TipRecord {
    let mut store = state.store.lock().await;
    let record = new_tip(&state.user, store.user_name(), amount, Local::now());
    store.add_record(record.clone());
    info!(id = %record.id, amount, "tip added");
    record
}

fn today_summary(store: &TipStore) -> TodayResponse {
    let date = today_string();
    let mut tips: Vec<TipRecord> = store.query_by_date(&date).into_iter().cloned().collect();
    tips.reverse();
    TodayResponse {
        total_amount: tips.iter().map(|tip| tip.amount).sum(),
        tip_count: tips.len() as u64,
        contributors: store.leaderboard().len(),
        date,
        tips,
    }
}

fn me_response(state: &AppState, store: &TipStore) -> MeResponse {
    MeResponse {
        id: state.user.id,
        display_name: state.user.display_name(store.user_name()),
        saved_name: store.user_name().to_string(),
        username: state.user.username.clone(),
    }
}

fn today_string() -> String {
    Local::now().date_naive().to_string()
}
