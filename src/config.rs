use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,

    // Remote store (Supabase REST). Both must be present for the remote
    // path to be attempted at all.
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub remote_timeout_secs: u64,

    // Pushover delivery. Absent credentials mean notifications report false.
    pub pushover_api_token: Option<String>,
    pub pushover_user_key: Option<String>,
    pub notify_timeout_secs: u64,

    // Shared secret for the cron reminder endpoint. Unset means the
    // endpoint rejects every caller.
    pub cron_secret: Option<String>,

    pub fallback_path: PathBuf,
    pub clear_fallback_on_start: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".into())
                .parse()
                .expect("PORT must be a number"),

            supabase_url: env::var("SUPABASE_URL").ok().filter(|s| !s.is_empty()),
            supabase_anon_key: env::var("SUPABASE_ANON_KEY")
                .ok()
                .filter(|s| !s.is_empty()),
            remote_timeout_secs: env::var("REMOTE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".into())
                .parse()
                .unwrap_or(10),

            pushover_api_token: env::var("PUSHOVER_API_TOKEN")
                .ok()
                .filter(|s| !s.is_empty()),
            pushover_user_key: env::var("PUSHOVER_USER_KEY")
                .ok()
                .filter(|s| !s.is_empty()),
            notify_timeout_secs: env::var("NOTIFY_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".into())
                .parse()
                .unwrap_or(10),

            cron_secret: env::var("CRON_SECRET").ok().filter(|s| !s.is_empty()),

            fallback_path: env::var("FALLBACK_PATH")
                .unwrap_or_else(|_| "data/moods.json".into())
                .into(),
            clear_fallback_on_start: env::var("FALLBACK_CLEAR_ON_START")
                .unwrap_or_else(|_| "true".into())
                .parse()
                .unwrap_or(true),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
