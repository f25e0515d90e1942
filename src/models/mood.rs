use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two people this service exists for. Closed set; anything else is a
/// validation error, never a new row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MoodUser {
    Clemence,
    Franklin,
}

pub const ALL_USERS: [MoodUser; 2] = [MoodUser::Clemence, MoodUser::Franklin];

impl MoodUser {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoodUser::Clemence => "clemence",
            MoodUser::Franklin => "franklin",
        }
    }

    /// Name shown in notification messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            MoodUser::Clemence => "Clémence",
            MoodUser::Franklin => "Franklin",
        }
    }

    /// Pushover device the user's notifications are delivered to.
    pub fn device(&self) -> &'static str {
        match self {
            MoodUser::Clemence => "iphoneF",
            MoodUser::Franklin => "iphone",
        }
    }

    /// Stable index, used for the per-user write locks.
    pub fn index(&self) -> usize {
        match self {
            MoodUser::Clemence => 0,
            MoodUser::Franklin => 1,
        }
    }
}

impl FromStr for MoodUser {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "clemence" => Ok(MoodUser::Clemence),
            "franklin" => Ok(MoodUser::Franklin),
            _ => Err(()),
        }
    }
}

impl fmt::Display for MoodUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The nine weather codes a mood can be expressed as.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    Sunny,
    PartlySunny,
    Cloudy,
    Overcast,
    Rainy,
    Stormy,
    Snowy,
    Windy,
    Foggy,
}

impl Weather {
    pub fn as_str(&self) -> &'static str {
        match self {
            Weather::Sunny => "sunny",
            Weather::PartlySunny => "partly_sunny",
            Weather::Cloudy => "cloudy",
            Weather::Overcast => "overcast",
            Weather::Rainy => "rainy",
            Weather::Stormy => "stormy",
            Weather::Snowy => "snowy",
            Weather::Windy => "windy",
            Weather::Foggy => "foggy",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Weather::Sunny => "☀️",
            Weather::PartlySunny => "🌤️",
            Weather::Cloudy => "☁️",
            Weather::Overcast => "🌫️",
            Weather::Rainy => "🌧️",
            Weather::Stormy => "⛈️",
            Weather::Snowy => "❄️",
            Weather::Windy => "💨",
            Weather::Foggy => "🌁",
        }
    }

    /// French phrase completing "une météo ...".
    pub fn phrase(&self) -> &'static str {
        match self {
            Weather::Sunny => "ensoleillée",
            Weather::PartlySunny => "avec éclaircies",
            Weather::Cloudy => "nuageuse",
            Weather::Overcast => "couverte",
            Weather::Rainy => "pluvieuse",
            Weather::Stormy => "orageuse",
            Weather::Snowy => "neigeuse",
            Weather::Windy => "venteuse",
            Weather::Foggy => "brumeuse",
        }
    }
}

impl FromStr for Weather {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sunny" => Ok(Weather::Sunny),
            "partly_sunny" => Ok(Weather::PartlySunny),
            "cloudy" => Ok(Weather::Cloudy),
            "overcast" => Ok(Weather::Overcast),
            "rainy" => Ok(Weather::Rainy),
            "stormy" => Ok(Weather::Stormy),
            "snowy" => Ok(Weather::Snowy),
            "windy" => Ok(Weather::Windy),
            "foggy" => Ok(Weather::Foggy),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One mood entry. Immutable once created; `id` is assigned by whichever
/// backend persisted it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoodRecord {
    pub id: i64,
    pub user: MoodUser,
    pub weather: Weather,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// A record before the backend has assigned its id.
#[derive(Debug, Clone, Serialize)]
pub struct NewMood {
    pub user: MoodUser,
    pub weather: Weather,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl NewMood {
    pub fn with_id(self, id: i64) -> MoodRecord {
        MoodRecord {
            id,
            user: self.user,
            weather: self.weather,
            date: self.date,
            created_at: self.created_at,
        }
    }
}

/// Which store produced a record.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Remote,
    Fallback,
}

#[derive(Debug, Deserialize)]
pub struct SaveMoodRequest {
    pub user: String,
    pub weather: String,
}

#[derive(Debug, Serialize)]
pub struct SaveMoodResponse {
    pub success: bool,
    pub mood: MoodRecord,
    pub backend: Backend,
    #[serde(rename = "notificationSent")]
    pub notification_sent: bool,
}

#[derive(Debug, Deserialize)]
pub struct MoodsQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct MoodsResponse {
    pub success: bool,
    pub moods: Vec<MoodRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    pub const ALL_WEATHER: [Weather; 9] = [
        Weather::Sunny,
        Weather::PartlySunny,
        Weather::Cloudy,
        Weather::Overcast,
        Weather::Rainy,
        Weather::Stormy,
        Weather::Snowy,
        Weather::Windy,
        Weather::Foggy,
    ];

    // ── enum parsing ─────────────────────────────────────────────────────

    #[test]
    fn test_user_parse_known() {
        assert_eq!("clemence".parse::<MoodUser>(), Ok(MoodUser::Clemence));
        assert_eq!("franklin".parse::<MoodUser>(), Ok(MoodUser::Franklin));
    }

    #[test]
    fn test_user_parse_unknown_rejected() {
        assert!("bob".parse::<MoodUser>().is_err());
        assert!("Clemence".parse::<MoodUser>().is_err());
        assert!("".parse::<MoodUser>().is_err());
    }

    #[test]
    fn test_weather_parse_roundtrips_all_codes() {
        for w in ALL_WEATHER {
            assert_eq!(w.as_str().parse::<Weather>(), Ok(w));
        }
    }

    #[test]
    fn test_weather_parse_unknown_rejected() {
        assert!("tornado".parse::<Weather>().is_err());
        assert!("SUNNY".parse::<Weather>().is_err());
    }

    // ── mapping tables ───────────────────────────────────────────────────

    #[test]
    fn test_weather_tables_nonempty_for_all_codes() {
        for w in ALL_WEATHER {
            assert!(!w.emoji().is_empty(), "missing emoji for {w}");
            assert!(!w.phrase().is_empty(), "missing phrase for {w}");
        }
    }

    #[test]
    fn test_user_tables() {
        assert_eq!(MoodUser::Clemence.display_name(), "Clémence");
        assert_eq!(MoodUser::Clemence.device(), "iphoneF");
        assert_eq!(MoodUser::Franklin.display_name(), "Franklin");
        assert_eq!(MoodUser::Franklin.device(), "iphone");
    }

    #[test]
    fn test_user_indexes_distinct() {
        assert_ne!(MoodUser::Clemence.index(), MoodUser::Franklin.index());
        for u in ALL_USERS {
            assert!(u.index() < ALL_USERS.len());
        }
    }

    // ── serialization ────────────────────────────────────────────────────

    #[test]
    fn test_record_serializes_with_wire_names() {
        let record = MoodRecord {
            id: 3,
            user: MoodUser::Clemence,
            weather: Weather::PartlySunny,
            date: NaiveDate::from_ymd_opt(2026, 8, 30).unwrap(),
            created_at: "2026-08-30T09:15:00Z".parse().unwrap(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["user"], "clemence");
        assert_eq!(json["weather"], "partly_sunny");
        assert_eq!(json["date"], "2026-08-30");
    }

    #[test]
    fn test_backend_tag_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Backend::Remote).unwrap(), "remote");
        assert_eq!(serde_json::to_value(Backend::Fallback).unwrap(), "fallback");
    }

    #[test]
    fn test_save_response_uses_notification_sent_camel_case() {
        let resp = SaveMoodResponse {
            success: true,
            mood: MoodRecord {
                id: 1,
                user: MoodUser::Franklin,
                weather: Weather::Rainy,
                date: NaiveDate::from_ymd_opt(2026, 8, 30).unwrap(),
                created_at: Utc::now(),
            },
            backend: Backend::Fallback,
            notification_sent: false,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["notificationSent"], false);
        assert!(json.get("notification_sent").is_none());
    }
}
