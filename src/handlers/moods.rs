use axum::{
    extract::{Query, State},
    Json,
};

use crate::error::AppResult;
use crate::models::mood::{MoodsQuery, MoodsResponse, SaveMoodRequest, SaveMoodResponse};
use crate::storage::orchestrator::DEFAULT_RECENT_LIMIT;
use crate::AppState;

pub async fn save_mood(
    State(state): State<AppState>,
    Json(body): Json<SaveMoodRequest>,
) -> AppResult<Json<SaveMoodResponse>> {
    let recorded = state.store.record_mood(&body.user, &body.weather).await?;

    Ok(Json(SaveMoodResponse {
        success: true,
        mood: recorded.record,
        backend: recorded.backend,
        notification_sent: recorded.notification_sent,
    }))
}

/// Read path is best-effort: backend outages yield an empty list, not a 5xx.
pub async fn get_moods(
    State(state): State<AppState>,
    Query(query): Query<MoodsQuery>,
) -> Json<MoodsResponse> {
    let limit = query.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    let moods = state.store.list_recent(limit).await;

    Json(MoodsResponse {
        success: true,
        moods,
    })
}
