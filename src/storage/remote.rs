//! Adapter over the remote relational backend (Supabase's REST query
//! interface). Same semantic surface as the fallback store, but every
//! operation can fail; the orchestrator turns those failures into demotion.

use chrono::NaiveDate;
use reqwest::StatusCode;
use std::time::Duration;

use crate::config::Config;
use crate::models::mood::{MoodRecord, MoodUser, NewMood};

/// Internal-only failure signal. Never surfaced to HTTP callers directly;
/// any variant means "treat the remote as unavailable for this call".
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("Remote request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote returned status {0}")]
    Status(StatusCode),

    #[error("Remote insert returned no rows")]
    EmptyInsert,
}

#[derive(Clone)]
pub struct RemoteStore {
    client: reqwest::Client,
    moods_url: String,
    api_key: String,
    timeout: Duration,
}

impl RemoteStore {
    /// Attempts to build a usable handle. Missing credentials and a failed
    /// read probe are treated identically: no handle, and the caller carries
    /// on with the fallback store. The decision is made fresh per call,
    /// never cached.
    pub async fn connect(config: &Config, client: &reqwest::Client) -> Option<Self> {
        let (url, key) = match (&config.supabase_url, &config.supabase_anon_key) {
            (Some(url), Some(key)) => (url, key),
            _ => {
                tracing::debug!("Remote store not configured");
                return None;
            }
        };

        let store = Self {
            client: client.clone(),
            moods_url: format!("{}/rest/v1/moods", url.trim_end_matches('/')),
            api_key: key.clone(),
            timeout: Duration::from_secs(config.remote_timeout_secs),
        };

        match store.probe().await {
            Ok(()) => Some(store),
            Err(e) => {
                tracing::warn!(error = %e, "Remote store unreachable");
                None
            }
        }
    }

    /// Lightweight reachability check: a one-row select.
    async fn probe(&self) -> Result<(), RemoteError> {
        let response = self
            .get(&[("select", "id"), ("limit", "1")])
            .send()
            .await?;
        ensure_success(response.status())?;
        Ok(())
    }

    pub async fn exists_for(
        &self,
        user: MoodUser,
        date: NaiveDate,
    ) -> Result<bool, RemoteError> {
        let user_filter = format!("eq.{user}");
        let date_filter = format!("eq.{date}");
        let response = self
            .get(&[
                ("select", "*"),
                ("user", user_filter.as_str()),
                ("date", date_filter.as_str()),
            ])
            .send()
            .await?;
        ensure_success(response.status())?;

        let rows: Vec<MoodRecord> = response.json().await?;
        Ok(!rows.is_empty())
    }

    /// Insert-with-echo. The backend assigns the id; an empty echo counts as
    /// failure even when the status is a success.
    pub async fn insert(&self, new: &NewMood) -> Result<MoodRecord, RemoteError> {
        let response = self
            .client
            .post(&self.moods_url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Prefer", "return=representation")
            .json(new)
            .timeout(self.timeout)
            .send()
            .await?;
        ensure_success(response.status())?;

        let mut rows: Vec<MoodRecord> = response.json().await?;
        if rows.is_empty() {
            return Err(RemoteError::EmptyInsert);
        }
        Ok(rows.remove(0))
    }

    /// Most recent records, `created_at` descending.
    pub async fn recent(&self, limit: usize) -> Result<Vec<MoodRecord>, RemoteError> {
        let limit = limit.to_string();
        let response = self
            .get(&[
                ("select", "*"),
                ("order", "created_at.desc"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;
        ensure_success(response.status())?;
        Ok(response.json().await?)
    }

    /// All records dated on or after `cutoff`.
    pub async fn since(&self, cutoff: NaiveDate) -> Result<Vec<MoodRecord>, RemoteError> {
        let date_filter = format!("gte.{cutoff}");
        let response = self
            .get(&[("select", "*"), ("date", date_filter.as_str())])
            .send()
            .await?;
        ensure_success(response.status())?;
        Ok(response.json().await?)
    }

    // Every remote call carries its own bound so outage detection is
    // timeout-bound regardless of how the shared client was built.
    fn get(&self, query: &[(&str, &str)]) -> reqwest::RequestBuilder {
        self.client
            .get(&self.moods_url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .query(query)
            .timeout(self.timeout)
    }
}

fn ensure_success(status: StatusCode) -> Result<(), RemoteError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(RemoteError::Status(status))
    }
}
