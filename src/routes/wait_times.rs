use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use tracing::info;

use crate::errors::AppError;
use crate::models::HistoryRecord;
use crate::services::wait_times::{self, WaitTimesView};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_wait_times))
        .route("/park/:park_id", get(get_by_park))
        .route("/type/:entity_type", get(get_by_type))
}

async fn get_wait_times(State(state): State<AppState>) -> Result<Json<WaitTimesView>, AppError> {
    info!("GET /wait-times - Assembling wait times view");
    let view =
        wait_times::get_wait_times(state.store.as_ref(), state.config.park_utc_offset).await?;
    Ok(Json(view))
}

async fn get_by_park(
    Path(park_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<HistoryRecord>>, AppError> {
    info!("GET /wait-times/park/{} - Getting park history", park_id);
    let records = wait_times::get_by_park(state.store.as_ref(), &park_id).await?;
    Ok(Json(records))
}

async fn get_by_type(
    Path(entity_type): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<HistoryRecord>>, AppError> {
    info!("GET /wait-times/type/{} - Getting type history", entity_type);
    let records = wait_times::get_by_type(state.store.as_ref(), &entity_type).await?;
    Ok(Json(records))
}
