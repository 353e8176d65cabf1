use anyhow::{Context, Result, anyhow};
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_sns::config::Region;
use std::env;

use crate::sportsdata::ResponseShape;

pub const DEFAULT_API_ENDPOINT: &str = "https://api.sportsdata.io/v3/nba/scores/json/GamesByDate";
pub const DEFAULT_TEAMS_URL: &str = "https://data.nba.net/data/10s/prod/v1/2023/teams.json";

pub const API_ENDPOINT_VAR: &str = "NBA_API_ENDPOINT";
pub const API_KEY_VAR: &str = "NBA_API_KEY";
pub const API_SHAPE_VAR: &str = "NBA_API_SHAPE";
pub const TEAMS_URL_VAR: &str = "NBA_TEAMS_URL";
pub const TOPIC_ARN_VAR: &str = "SNS_TOPIC_ARN";
pub const TABLE_NAME_VAR: &str = "DYNAMODB_TABLE";
pub const REGION_VAR: &str = "AWS_REGION";

pub struct SecretString(String);

impl SecretString {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

/// Settings for the upstream sports-data API.
#[derive(Debug)]
pub struct ApiConfig {
    pub endpoint: String,
    pub key: SecretString,
    pub shape: ResponseShape,
    pub teams_url: String,
}

impl ApiConfig {
    /// A missing or blank key is a configuration error; absent optional settings take defaults.
    pub fn new(
        endpoint: Option<String>,
        key: Option<String>,
        shape: Option<String>,
        teams_url: Option<String>,
    ) -> Result<Self> {
        let key = key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .map(SecretString)
            .ok_or_else(|| anyhow!("--api-key or {API_KEY_VAR} is required"))?;

        let shape = match shape {
            Some(s) => s.parse().with_context(|| format!("Invalid {API_SHAPE_VAR}"))?,
            None => ResponseShape::default(),
        };

        Ok(Self {
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_string()),
            key,
            shape,
            teams_url: teams_url.unwrap_or_else(|| DEFAULT_TEAMS_URL.to_string()),
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(
            optional_var(API_ENDPOINT_VAR),
            optional_var(API_KEY_VAR),
            optional_var(API_SHAPE_VAR),
            optional_var(TEAMS_URL_VAR),
        )
    }
}

/// Everything a scheduled run needs, loaded once at process start.
#[derive(Debug)]
pub struct Config {
    pub api: ApiConfig,
    pub topic_arn: String,
    pub table_name: Option<String>,
    pub region: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let api = ApiConfig::from_env()?;

        let topic_arn =
            env::var(TOPIC_ARN_VAR).with_context(|| format!("{TOPIC_ARN_VAR} env var not set"))?;

        Ok(Self {
            api,
            topic_arn,
            table_name: optional_var(TABLE_NAME_VAR),
            region: optional_var(REGION_VAR),
        })
    }

    pub async fn aws_config(&self) -> SdkConfig {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &self.region {
            loader = loader.region(Region::new(region.clone()));
        }
        loader.load().await
    }
}

/// Unset and blank variables are both treated as absent.
fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_secret_string_display_redacted() {
        let secret = SecretString::new("hunter2");
        assert_eq!(secret.to_string(), "[REDACTED]");
        assert_eq!(format!("{secret:?}"), "[REDACTED]");
        assert_eq!(secret.expose(), "hunter2");
    }

    #[test]
    fn test_api_config_debug_hides_key() {
        let config = ApiConfig {
            endpoint: DEFAULT_API_ENDPOINT.to_string(),
            key: SecretString::new("hunter2"),
            shape: ResponseShape::Flat,
            teams_url: DEFAULT_TEAMS_URL.to_string(),
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_api_config_requires_key() {
        let e = ApiConfig::new(None, None, None, None).unwrap_err();
        assert!(e.to_string().contains(API_KEY_VAR));
    }

    #[test]
    fn test_api_config_rejects_blank_key() {
        assert!(ApiConfig::new(None, Some("   ".to_owned()), None, None).is_err());
    }

    #[test]
    fn test_api_config_defaults() {
        let config = ApiConfig::new(None, Some("k".to_owned()), None, None).unwrap();
        assert_eq!(config.endpoint, DEFAULT_API_ENDPOINT);
        assert_eq!(config.teams_url, DEFAULT_TEAMS_URL);
        assert_eq!(config.shape, ResponseShape::Flat);
        assert_eq!(config.key.expose(), "k");
    }

    #[test]
    fn test_api_config_bad_shape() {
        assert!(ApiConfig::new(None, Some("k".to_owned()), Some("xml".to_owned()), None).is_err());
    }

    #[test]
    fn test_optional_var_unset() {
        assert_eq!(optional_var("NBALERTS_TEST_DEFINITELY_UNSET"), None);
    }
}
