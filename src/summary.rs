use chrono::{Duration, NaiveDateTime};
use thiserror::Error;

use crate::types::{GameStatus, RawGameRecord};

pub const LOCAL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const LOCAL_ZONE_LABEL: &str = "MMT";

const UTC_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("missing required field {0}")]
    MissingField(&'static str),
    #[error("unparseable start time {0:?}")]
    Timestamp(String),
}

/// Flat record written to the game table, keyed by `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedGameItem {
    pub id: String,
    pub summary: String,
    pub status: String,
    pub home_team: String,
    pub away_team: String,
    pub home_score: u32,
    pub away_score: u32,
    pub timestamp: String,
}

#[derive(Debug, Clone)]
pub struct FormattedGame {
    pub summary: String,
    pub item: NormalizedGameItem,
}

/// Myanmar Standard Time, applied as a fixed offset rather than a zone lookup.
pub fn mmt_offset() -> Duration {
    Duration::hours(6) + Duration::minutes(30)
}

/// Parse `YYYY-MM-DDTHH:MM:SS[.f][Z]` as UTC and shift it to local time.
pub fn localize(utc: &str) -> Result<NaiveDateTime, FormatError> {
    let trimmed = utc.trim();
    let naive = trimmed.strip_suffix('Z').unwrap_or(trimmed);

    NaiveDateTime::parse_from_str(naive, UTC_INPUT_FORMAT)
        .map(|t| t + mmt_offset())
        .map_err(|_| FormatError::Timestamp(utc.to_owned()))
}

fn required<'a>(field: &'a Option<String>, name: &'static str) -> Result<&'a str, FormatError> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(FormatError::MissingField(name))
}

fn score_line(status: &GameStatus, away: u32, home: u32) -> Option<String> {
    match status {
        GameStatus::Final => Some(format!("Final Score: {away} - {home}")),
        GameStatus::InProgress => Some(format!("Current Score: {away} - {home}")),
        GameStatus::Scheduled | GameStatus::Unknown(_) => None,
    }
}

pub fn format_game(game: &RawGameRecord) -> Result<FormattedGame, FormatError> {
    let id = required(&game.game_id, "game id")?;
    let home = required(&game.home_team, "home team")?;
    let away = required(&game.away_team, "away team")?;
    let status = GameStatus::from(required(&game.status, "status")?);
    let start = localize(required(&game.date_time_utc, "start time")?)?;

    let home_score = game.home_score.unwrap_or(0);
    let away_score = game.away_score.unwrap_or(0);
    let timestamp = start.format(LOCAL_TIME_FORMAT).to_string();

    let mut lines = vec![
        format!("Game Status: {}", status.label()),
        format!("{away} vs {home}"),
        format!("Start Time: {timestamp} ({LOCAL_ZONE_LABEL})"),
    ];
    lines.extend(score_line(&status, away_score, home_score));
    let summary = lines.join("\n");

    Ok(FormattedGame {
        item: NormalizedGameItem {
            id: id.to_owned(),
            summary: summary.clone(),
            status: status.label().to_owned(),
            home_team: home.to_owned(),
            away_team: away.to_owned(),
            home_score,
            away_score,
            timestamp,
        },
        summary,
    })
}
