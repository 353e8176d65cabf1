use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, trace, warn};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::{ApiConfig, SecretString};
use crate::types::{RawGameRecord, TeamRecord};

const USER_AGENT: &str = concat!("nbalerts/", env!("CARGO_PKG_VERSION"));

/// The JSON envelope the upstream API wraps its list in.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum ResponseShape {
    /// `[ {...}, ... ]`
    #[default]
    Flat,
    /// `{ "league": { "standard": [ ... ] } }`
    League,
    /// `{ "data": [ ... ] }`
    Data,
}

impl ResponseShape {
    /// Pull the list out of its envelope. A body that doesn't match the shape yields nothing.
    pub fn extract(&self, body: Value) -> Vec<Value> {
        let list = match self {
            ResponseShape::Flat => Some(body),
            ResponseShape::League => body
                .get("league")
                .and_then(|l| l.get("standard"))
                .cloned(),
            ResponseShape::Data => body.get("data").cloned(),
        };

        match list {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        }
    }
}

impl FromStr for ResponseShape {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flat" => Ok(ResponseShape::Flat),
            "league" => Ok(ResponseShape::League),
            "data" => Ok(ResponseShape::Data),
            other => Err(anyhow!(
                "unknown response shape {other:?}, expected flat, league or data"
            )),
        }
    }
}

/// Deserialize each element on its own so one bad entry doesn't sink the list.
fn parse_list<T: DeserializeOwned>(
    body: &str,
    shape: ResponseShape,
    prepare: fn(&mut Value),
) -> Result<Vec<T>> {
    let value: Value = serde_json::from_str(body).context("Malformed JSON response")?;

    let items = shape
        .extract(value)
        .into_iter()
        .enumerate()
        .filter_map(|(idx, mut item)| {
            prepare(&mut item);
            match serde_json::from_value(item) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    warn!("Skipping unreadable entry {idx}: {e}");
                    None
                }
            }
        })
        .collect();

    Ok(items)
}

/// Scoreboard feeds nest each side's score inside its team object.
fn lift_team_scores(game: &mut Value) {
    let Some(game) = game.as_object_mut() else {
        return;
    };

    let sides: [(&str, &[&str]); 2] = [
        ("hTeam", &["HomeTeamScore", "home_team_score"]),
        ("vTeam", &["AwayTeamScore", "visitor_team_score", "away_team_score"]),
    ];

    for (team_key, score_keys) in sides {
        if score_keys.iter().any(|k| game.contains_key(*k)) {
            continue;
        }
        let nested = game
            .get(team_key)
            .and_then(|team| team.get("score"))
            .cloned();
        if let Some(score) = nested {
            game.insert(score_keys[0].to_owned(), score);
        }
    }
}

pub fn parse_games(body: &str, shape: ResponseShape) -> Result<Vec<RawGameRecord>> {
    parse_list(body, shape, lift_team_scores)
}

pub fn parse_teams(body: &str) -> Result<Vec<TeamRecord>> {
    parse_list(body, ResponseShape::League, |_| {})
}

/// Anything that can produce today's games. Failures degrade to an empty list.
#[async_trait]
pub trait GameSource: Send + Sync {
    async fn games_on(&self, date: NaiveDate) -> Vec<RawGameRecord>;
}

pub struct SportsApi {
    client: Client,
    endpoint: String,
    key: SecretString,
    shape: ResponseShape,
    teams_url: String,
}

impl SportsApi {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_owned(),
            key: SecretString::new(config.key.expose()),
            shape: config.shape,
            teams_url: config.teams_url.clone(),
        })
    }

    pub fn shape(&self) -> ResponseShape {
        self.shape
    }

    fn games_url(&self, date: NaiveDate) -> String {
        format!("{}/{}", self.endpoint, date.format("%Y-%m-%d"))
    }

    /// reqwest errors embed the request URL, which carries the API key, so it is stripped.
    async fn get_text(&self, req: reqwest::RequestBuilder) -> Result<String> {
        let response = req
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Request failed")?;
        let response = response
            .error_for_status()
            .map_err(reqwest::Error::without_url)
            .context("Unsuccessful response status")?;
        let body = response
            .text()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to read body")?;
        trace!("{body}");
        Ok(body)
    }

    /// Raw body of the games-by-date query.
    pub async fn query_games(&self, date: NaiveDate) -> Result<String> {
        debug!("Querying games for {date}");
        let url = Url::parse_with_params(&self.games_url(date), &[("key", self.key.expose())])
            .context("Invalid games endpoint")?;
        self.get_text(self.client.get(url))
            .await
            .with_context(|| format!("Failed to query games for {date}"))
    }

    pub async fn query_teams(&self) -> Result<String> {
        debug!("Querying teams from {}", self.teams_url);
        self.get_text(self.client.get(&self.teams_url))
            .await
            .context("Failed to query teams")
    }
}

#[async_trait]
impl GameSource for SportsApi {
    async fn games_on(&self, date: NaiveDate) -> Vec<RawGameRecord> {
        let games = self
            .query_games(date)
            .await
            .and_then(|body| parse_games(&body, self.shape));

        match games {
            Ok(games) => {
                debug!("Fetched {} games for {date}", games.len());
                games
            }
            Err(e) => {
                warn!("Treating {date} as having no games: {e:#}");
                Vec::new()
            }
        }
    }
}
