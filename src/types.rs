use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One game as returned by the upstream API. Every field is optional since
/// each source spells and nests things differently.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RawGameRecord {
    #[serde(
        rename = "GameID",
        alias = "gameId",
        alias = "id",
        default,
        deserialize_with = "id_string"
    )]
    pub game_id: Option<String>,
    #[serde(
        rename = "HomeTeam",
        alias = "home_team",
        alias = "hTeam",
        default,
        deserialize_with = "team_name"
    )]
    pub home_team: Option<String>,
    #[serde(
        rename = "AwayTeam",
        alias = "away_team",
        alias = "visitor_team",
        alias = "vTeam",
        default,
        deserialize_with = "team_name"
    )]
    pub away_team: Option<String>,
    #[serde(
        rename = "Status",
        alias = "status",
        alias = "statusNum",
        default,
        deserialize_with = "status_text"
    )]
    pub status: Option<String>,
    #[serde(
        rename = "DateTimeUTC",
        alias = "datetime",
        alias = "startTimeUTC",
        default
    )]
    pub date_time_utc: Option<String>,
    #[serde(
        rename = "HomeTeamScore",
        alias = "home_team_score",
        default,
        deserialize_with = "score"
    )]
    pub home_score: Option<u32>,
    #[serde(
        rename = "AwayTeamScore",
        alias = "visitor_team_score",
        alias = "away_team_score",
        default,
        deserialize_with = "score"
    )]
    pub away_score: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamRecord {
    #[serde(rename = "fullName", alias = "full_name")]
    pub full_name: String,
    #[serde(rename = "tricode", alias = "abbreviation")]
    pub tricode: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameStatus {
    Scheduled,
    InProgress,
    Final,
    Unknown(String),
}

impl GameStatus {
    pub fn label(&self) -> &str {
        match self {
            GameStatus::Scheduled => "Scheduled",
            GameStatus::InProgress => "In Progress",
            GameStatus::Final => "Final",
            GameStatus::Unknown(raw) => raw,
        }
    }
}

impl From<&str> for GameStatus {
    fn from(raw: &str) -> Self {
        let key: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "final" | "f/ot" | "closed" | "complete" | "completed" => GameStatus::Final,
            "scheduled" | "pregame" | "created" => GameStatus::Scheduled,
            "inprogress" | "live" | "halftime" | "ot" | "1stqtr" | "2ndqtr" | "3rdqtr"
            | "4thqtr" => GameStatus::InProgress,
            // Some sources report a not-yet-started game by its tip-off time.
            _ if chrono::DateTime::parse_from_rfc3339(raw.trim()).is_ok() => GameStatus::Scheduled,
            _ => GameStatus::Unknown(raw.trim().to_owned()),
        }
    }
}

fn id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

const TEAM_NAME_KEYS: &[&str] = &[
    "full_name",
    "name",
    "fullName",
    "abbreviation",
    "tricode",
    "triCode",
];

fn team_name<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Object(team) => TEAM_NAME_KEYS
            .iter()
            .find_map(|k| team.get(*k).and_then(Value::as_str))
            .map(str::to_owned),
        _ => None,
    })
}

/// Scoreboard feeds report status as a number: 1 scheduled, 2 live, 3 final.
fn status_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(match n.as_u64() {
            Some(1) => "Scheduled".to_owned(),
            Some(2) => "InProgress".to_owned(),
            Some(3) => "Final".to_owned(),
            _ => n.to_string(),
        }),
        _ => None,
    })
}

fn score<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| *f >= 0.0 && f.fract() == 0.0)
                    .map(|f| f as u64)
            })
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}
