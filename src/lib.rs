use anyhow::Result;
use chrono::NaiveDate;
use jluszcz_rust_utils::cache::{dated_cache_path, try_cached_query};
use log::{LevelFilter, trace};

use crate::sportsdata::{SportsApi, parse_games, parse_teams};
use crate::types::{RawGameRecord, TeamRecord};

pub mod config;
pub mod handler;
pub mod publish;
pub mod sportsdata;
pub mod store;
pub mod summary;
pub mod teams;
pub mod types;

pub const APP_NAME: &str = "nbalerts";

pub fn set_up_logger(calling_module: &str, verbose: bool) -> Result<()> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(LevelFilter::Warn)
        .filter_module(APP_NAME, level)
        .filter_module(calling_module, level)
        .try_init()?;

    Ok(())
}

pub fn install_crypto_provider() {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
}

pub async fn games(api: &SportsApi, date: NaiveDate, use_cache: bool) -> Result<Vec<RawGameRecord>> {
    let cache_path = dated_cache_path(&format!("games-{date}"));

    let response = try_cached_query(use_cache, &cache_path, || api.query_games(date)).await?;
    trace!("{response}");

    parse_games(&response, api.shape())
}

pub async fn teams(api: &SportsApi, use_cache: bool) -> Result<Vec<TeamRecord>> {
    let cache_path = dated_cache_path("teams");

    let response = try_cached_query(use_cache, &cache_path, || api.query_teams()).await?;
    trace!("{response}");

    parse_teams(&response)
}
