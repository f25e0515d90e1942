use axum::{extract::State, http::HeaderMap, Json};
use chrono::{Duration, Local, NaiveDate};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::models::mood::{MoodUser, ALL_USERS};
use crate::AppState;

#[derive(Debug, Serialize)]
struct DeliveryResult {
    user: &'static str,
    device: &'static str,
    success: bool,
}

/// Cron-triggered: if nobody posted a mood in the last 3 days, nudge both
/// users. Guarded by the shared `CRON_SECRET` bearer token.
pub async fn reminder(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Json<Value>> {
    if !authorized(&headers, state.config.cron_secret.as_deref()) {
        return Err(AppError::Unauthorized);
    }

    let cutoff = reminder_cutoff(Local::now().date_naive());
    let recent = state.store.recent_since(cutoff).await;

    if !recent.is_empty() {
        return Ok(Json(json!({
            "message": "No reminder needed",
            "reason": "Recent moods found",
            "count": recent.len(),
        })));
    }

    let notifier = state.store.notifier();
    let mut results = Vec::with_capacity(ALL_USERS.len());
    for user in ALL_USERS {
        let success = notifier.send_reminder(user).await;
        results.push(delivery_result(user, success));
    }
    let sent = results.iter().filter(|r| r.success).count();

    tracing::info!(sent, total = results.len(), "Reminders sent (3+ days without mood)");
    Ok(Json(json!({
        "message": "Reminders sent (3+ days without mood)",
        "sent": sent,
        "total": results.len(),
        "results": results,
    })))
}

/// Manual smoke test for the delivery pipeline; no store involved.
pub async fn test_reminder(State(state): State<AppState>) -> Json<Value> {
    let notifier = state.store.notifier();
    let mut results = Vec::with_capacity(ALL_USERS.len());
    for user in ALL_USERS {
        let success = notifier.send_test(user).await;
        results.push(delivery_result(user, success));
    }
    let sent = results.iter().filter(|r| r.success).count();

    Json(json!({
        "message": "Test reminder sent",
        "sent": sent,
        "total": results.len(),
        "results": results,
    }))
}

fn delivery_result(user: MoodUser, success: bool) -> DeliveryResult {
    DeliveryResult {
        user: user.display_name(),
        device: user.device(),
        success,
    }
}

fn reminder_cutoff(today: NaiveDate) -> NaiveDate {
    today - Duration::days(3)
}

/// Strict bearer match. An unset secret rejects everyone rather than
/// degrading to an open endpoint.
fn authorized(headers: &HeaderMap, secret: Option<&str>) -> bool {
    let Some(secret) = secret else {
        return false;
    };
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {secret}"))
        .unwrap_or(false)
}
