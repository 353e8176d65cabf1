use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::{error, info, warn};
use serde::Serialize;

use crate::publish::Publisher;
use crate::sportsdata::GameSource;
use crate::store::{GameStore, StoreError};
use crate::summary::format_game;
use crate::types::RawGameRecord;

pub const GAMES_SUBJECT: &str = "NBA Game Updates";
pub const NO_GAMES_MESSAGE: &str = "No NBA games scheduled for today.";
pub const SUMMARY_SEPARATOR: &str = "\n---\n";
pub const SUCCESS_BODY: &str = "Notification sent successfully!";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResponse {
    pub status_code: u16,
    pub body: String,
}

impl HandlerResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status_code: 200,
            body: body.into(),
        }
    }

    pub fn error(body: impl Into<String>) -> Self {
        Self {
            status_code: 500,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Per-record outcomes of one run. None of these fail the run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub formatted: usize,
    pub skipped: usize,
    pub stored: usize,
    pub store_failures: usize,
    pub causes: Vec<String>,
}

/// Format every record, upserting each success when a store is configured.
pub async fn process_games(
    games: &[RawGameRecord],
    store: Option<&dyn GameStore>,
) -> (Vec<String>, BatchReport) {
    let mut summaries = Vec::with_capacity(games.len());
    let mut report = BatchReport::default();

    for (idx, game) in games.iter().enumerate() {
        let formatted = match format_game(game) {
            Ok(formatted) => formatted,
            Err(e) => {
                warn!(
                    "Skipping game {} (entry {idx}): {e}",
                    game.game_id.as_deref().unwrap_or("?")
                );
                report.skipped += 1;
                report.causes.push(e.to_string());
                continue;
            }
        };
        report.formatted += 1;

        if let Some(store) = store {
            match store.upsert(&formatted.item).await {
                Ok(()) => report.stored += 1,
                Err(e) => {
                    match &e {
                        StoreError::Throughput(_) => {
                            warn!("Throttled storing game {}: {e}", formatted.item.id)
                        }
                        StoreError::MissingTable(_) => {
                            error!("Cannot store game {}: {e}", formatted.item.id)
                        }
                        StoreError::Other(_) => {
                            error!("Unexpected error storing game {}: {e}", formatted.item.id)
                        }
                    }
                    report.store_failures += 1;
                    report.causes.push(e.to_string());
                }
            }
        }

        summaries.push(formatted.summary);
    }

    (summaries, report)
}

/// The message body for a set of summaries, falling back to the no-games notice.
pub fn compose_message(summaries: &[String]) -> String {
    if summaries.is_empty() {
        NO_GAMES_MESSAGE.to_owned()
    } else {
        summaries.join(SUMMARY_SEPARATOR)
    }
}

async fn try_notify(
    games: &[RawGameRecord],
    publisher: &dyn Publisher,
    store: Option<&dyn GameStore>,
) -> Result<BatchReport> {
    if games.is_empty() {
        info!("No games found, sending notice");
        publisher
            .publish(GAMES_SUBJECT, NO_GAMES_MESSAGE)
            .await
            .context("Error publishing notification")?;
        return Ok(BatchReport::default());
    }

    let (summaries, report) = process_games(games, store).await;
    info!(
        "Formatted {} of {} games ({} stored, {} store failures)",
        report.formatted,
        games.len(),
        report.stored,
        report.store_failures
    );

    publisher
        .publish(GAMES_SUBJECT, &compose_message(&summaries))
        .await
        .context("Error publishing notification")?;

    Ok(report)
}

/// Format, store and publish an already-fetched list of games.
pub async fn notify(
    games: &[RawGameRecord],
    publisher: &dyn Publisher,
    store: Option<&dyn GameStore>,
) -> HandlerResponse {
    match try_notify(games, publisher, store).await {
        Ok(report) => {
            if report.skipped > 0 {
                info!("Skipped {} games: {:?}", report.skipped, report.causes);
            }
            HandlerResponse::ok(SUCCESS_BODY)
        }
        Err(e) => {
            error!("{e:#}");
            HandlerResponse::error(format!("{e:#}"))
        }
    }
}

/// One scheduled run: fetch the given day's games, then [`notify`].
pub async fn run(
    source: &dyn GameSource,
    publisher: &dyn Publisher,
    store: Option<&dyn GameStore>,
    date: NaiveDate,
) -> HandlerResponse {
    let games = source.games_on(date).await;
    notify(&games, publisher, store).await
}
