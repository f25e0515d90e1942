//! Pushover delivery. Fire-and-forget with a boolean outcome: failures are
//! logged and absorbed here, never raised into the persistence path.

use std::time::Duration;

use crate::config::Config;
use crate::models::mood::{MoodUser, Weather};

const PUSHOVER_URL: &str = "https://api.pushover.net/1/messages.json";

const REMINDER_MESSAGE: &str = "🌤️ Cela fait plus de 3 jours sans nouvelles de vos météos intérieures !\n\nN'oubliez pas de partager comment vous vous sentez aujourd'hui. 💙";

const TEST_MESSAGE: &str = "🧪 TEST - N'oubliez pas de partager votre météo intérieure aujourd'hui !\n\nRendez-vous sur votre Moodcast pour dire comment vous vous sentez. 💙";

pub struct Notifier {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
    credentials: Option<(String, String)>,
}

impl Notifier {
    pub fn new(config: &Config, client: reqwest::Client) -> Self {
        let credentials = match (&config.pushover_api_token, &config.pushover_user_key) {
            (Some(token), Some(key)) => Some((token.clone(), key.clone())),
            _ => {
                tracing::info!("Pushover not configured, notifications disabled");
                None
            }
        };
        Self {
            client,
            url: PUSHOVER_URL.into(),
            timeout: Duration::from_secs(config.notify_timeout_secs),
            credentials,
        }
    }

    #[cfg(test)]
    fn with_url(mut self, url: &str) -> Self {
        self.url = url.into();
        self
    }

    /// Tells the other user a mood was posted. Plain message, default
    /// priority and sound.
    pub async fn send_mood(&self, user: MoodUser, weather: Weather) -> bool {
        self.deliver(
            user,
            &mood_message(user, weather),
            "Moodcast - Nouvelle météo",
            None,
        )
        .await
    }

    /// Reminds one user after 3+ silent days. High priority.
    pub async fn send_reminder(&self, user: MoodUser) -> bool {
        self.deliver(
            user,
            REMINDER_MESSAGE,
            "Moodcast - Rappel de météo (3+ jours)",
            Some(1),
        )
        .await
    }

    pub async fn send_test(&self, user: MoodUser) -> bool {
        let title = format!("TEST - Moodcast Rappel pour {}", user.display_name());
        self.deliver(user, TEST_MESSAGE, &title, Some(0)).await
    }

    async fn deliver(
        &self,
        user: MoodUser,
        message: &str,
        title: &str,
        priority: Option<i32>,
    ) -> bool {
        let Some((token, user_key)) = &self.credentials else {
            return false;
        };

        let priority = priority.map(|p| p.to_string());
        let mut form = vec![
            ("token", token.as_str()),
            ("user", user_key.as_str()),
            ("message", message),
            ("title", title),
            ("device", user.device()),
        ];
        // Only the reminder paths escalate with an explicit priority and
        // sound; mood notifications carry the bare message.
        if let Some(p) = priority.as_deref() {
            form.push(("priority", p));
            form.push(("sound", "pushover"));
        }

        match self
            .client
            .post(&self.url)
            .form(&form)
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                tracing::debug!(%user, device = user.device(), "Notification delivered");
                true
            }
            Ok(response) => {
                tracing::warn!(%user, status = %response.status(), "Pushover rejected notification");
                false
            }
            Err(e) => {
                tracing::warn!(%user, error = %e, "Pushover request failed");
                false
            }
        }
    }
}

fn mood_message(user: MoodUser, weather: Weather) -> String {
    format!(
        "{} a une météo {} {} aujourd'hui !",
        user.display_name(),
        weather.emoji(),
        weather.phrase()
    )
}
