//! Backend selection and the per-day uniqueness invariant.
//!
//! Every call picks its backend fresh: try the remote store, demote to the
//! local fallback on any failure. The duplicate check and the insert always
//! run against the same backend within one call; checking one store and
//! writing the other could violate uniqueness without anyone noticing.

use chrono::{Local, NaiveDate, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::mood::{Backend, MoodRecord, MoodUser, NewMood, Weather};
use crate::notify::Notifier;
use crate::storage::fallback::FallbackStore;
use crate::storage::remote::RemoteStore;

pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Outcome of a successful `record_mood` call: the persisted record, which
/// store took it, and whether the side-effect notification went out.
#[derive(Debug)]
pub struct RecordedMood {
    pub record: MoodRecord,
    pub backend: Backend,
    pub notification_sent: bool,
}

pub struct MoodStore {
    config: Arc<Config>,
    client: reqwest::Client,
    fallback: FallbackStore,
    notifier: Arc<Notifier>,
    // One lock per user closes the check-then-insert race for a
    // (user, date) key within this process.
    write_locks: [Mutex<()>; 2],
}

impl MoodStore {
    pub fn new(
        config: Arc<Config>,
        client: reqwest::Client,
        fallback: FallbackStore,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            config,
            client,
            fallback,
            notifier,
            write_locks: [Mutex::new(()), Mutex::new(())],
        }
    }

    /// Records one mood for today. Validation runs before any backend is
    /// touched; a duplicate on whichever backend serves the call is final
    /// (no cross-backend retry); a notifier failure never turns a
    /// successful save into an error.
    pub async fn record_mood(&self, user: &str, weather: &str) -> AppResult<RecordedMood> {
        let user: MoodUser = user
            .parse()
            .map_err(|()| AppError::Validation("Invalid user".into()))?;
        let weather: Weather = weather
            .parse()
            .map_err(|()| AppError::Validation("Invalid weather".into()))?;

        // Server clock, never client-supplied.
        let today = Local::now().date_naive();
        let new = NewMood {
            user,
            weather,
            date: today,
            created_at: Utc::now(),
        };

        let (record, backend) = {
            let _guard = self.write_locks[user.index()].lock().await;

            let remote_result = match RemoteStore::connect(&self.config, &self.client).await {
                Some(remote) => match remote.exists_for(user, today).await {
                    // The remote is authoritative when reachable: a
                    // duplicate there is final, no fall-through.
                    Ok(true) => {
                        return Err(AppError::Duplicate("Mood already shared today".into()))
                    }
                    Ok(false) => match remote.insert(&new).await {
                        Ok(record) => Some(record),
                        Err(e) => {
                            tracing::warn!(error = %e, %user, "Remote insert failed, demoting to fallback");
                            None
                        }
                    },
                    Err(e) => {
                        tracing::warn!(error = %e, %user, "Remote existence check failed, demoting to fallback");
                        None
                    }
                },
                None => None,
            };

            match remote_result {
                Some(record) => (record, Backend::Remote),
                None => (self.record_to_fallback(user, today, new)?, Backend::Fallback),
            }
        };

        let notification_sent = self.notifier.send_mood(user, weather).await;

        tracing::info!(%user, %weather, backend = ?backend, notification_sent, "Mood recorded");
        Ok(RecordedMood {
            record,
            backend,
            notification_sent,
        })
    }

    fn record_to_fallback(
        &self,
        user: MoodUser,
        today: NaiveDate,
        new: NewMood,
    ) -> AppResult<MoodRecord> {
        let mut data = self.fallback.load();
        if data.exists_for(user, today) {
            return Err(AppError::Duplicate("Mood already shared today".into()));
        }
        let record = data.append(new);
        if !self.fallback.save(&data) {
            return Err(AppError::Persistence(
                "Fallback store rejected the write".into(),
            ));
        }
        Ok(record)
    }

    /// Most recent records, `created_at` descending. Best-effort: both
    /// backends unusable yields an empty list, never an error.
    pub async fn list_recent(&self, limit: usize) -> Vec<MoodRecord> {
        if let Some(remote) = RemoteStore::connect(&self.config, &self.client).await {
            match remote.recent(limit).await {
                Ok(moods) => return moods,
                Err(e) => {
                    tracing::warn!(error = %e, "Remote read failed, demoting to fallback");
                }
            }
        }

        let mut moods = self.fallback.load().moods;
        moods.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        moods.truncate(limit);
        moods
    }

    /// Records dated on or after `cutoff`, same backend selection as
    /// `list_recent`. Used by the reminder path.
    pub async fn recent_since(&self, cutoff: NaiveDate) -> Vec<MoodRecord> {
        if let Some(remote) = RemoteStore::connect(&self.config, &self.client).await {
            match remote.since(cutoff).await {
                Ok(moods) => return moods,
                Err(e) => {
                    tracing::warn!(error = %e, "Remote read failed, demoting to fallback");
                }
            }
        }

        self.fallback
            .load()
            .moods
            .into_iter()
            .filter(|m| m.date >= cutoff)
            .collect()
    }

    /// True when the remote store is currently reachable. Readiness
    /// reporting only; the write path makes its own per-call decision.
    pub async fn remote_reachable(&self) -> bool {
        RemoteStore::connect(&self.config, &self.client)
            .await
            .is_some()
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn startup_reset(&self) {
        if self.config.clear_fallback_on_start {
            self.fallback.clear();
        }
    }
}
