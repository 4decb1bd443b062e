use crate::errors::AppError;
use crate::models::{DayRecord, FieldPatch, MealWriteRequest, WriteResponse};
use crate::state::AppState;
use crate::storage::{load_store, persist_store};
use crate::store::{merge, window};
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use chrono::{Local, NaiveDate};
use tracing::info;

pub async fn get_meals(State(state): State<AppState>) -> Result<Json<Vec<DayRecord>>, AppError> {
    let store = load_store(&state.data_path)
        .await
        .map_err(|err| AppError::storage("Failed to load data", err))?;

    Ok(Json(window(&store, today())))
}

pub async fn post_meals(
    State(state): State<AppState>,
    payload: Result<Json<MealWriteRequest>, JsonRejection>,
) -> Result<Json<WriteResponse>, AppError> {
    let Json(payload) = payload.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    let patch = payload
        .validate()
        .map_err(|err| AppError::bad_request(err.to_string()))?;

    apply_patch(&state, &patch).await?;
    Ok(Json(WriteResponse { success: true }))
}

async fn apply_patch(state: &AppState, patch: &FieldPatch) -> Result<(), AppError> {
    let _guard = state.writes.lock().await;

    let store = load_store(&state.data_path)
        .await
        .map_err(|err| AppError::storage("Failed to save data", err))?;
    let store = merge(store, patch);
    persist_store(&state.data_path, &store)
        .await
        .map_err(|err| AppError::storage("Failed to save data", err))?;

    info!(
        date = %patch.date,
        meal = %patch.meal,
        value = %patch.status,
        breakfast_time = patch.breakfast_time.as_deref().unwrap_or(""),
        "meal updated"
    );
    Ok(())
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
