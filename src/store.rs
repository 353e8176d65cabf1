use std::collections::HashMap;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::types::AttributeValue;
use log::debug;
use thiserror::Error;

use crate::summary::NormalizedGameItem;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("throughput exceeded writing to {0}")]
    Throughput(String),
    #[error("table {0} not found")]
    MissingTable(String),
    #[error("{0}")]
    Other(String),
}

/// Insert-or-overwrite storage for game items, keyed by `NormalizedGameItem::id`.
#[async_trait]
pub trait GameStore: Send + Sync {
    async fn upsert(&self, item: &NormalizedGameItem) -> Result<(), StoreError>;
}

pub struct DynamoStore {
    client: aws_sdk_dynamodb::Client,
    table_name: String,
}

impl DynamoStore {
    pub fn new(sdk_config: &SdkConfig, table_name: impl Into<String>) -> Self {
        Self {
            client: aws_sdk_dynamodb::Client::new(sdk_config),
            table_name: table_name.into(),
        }
    }
}

fn item_attributes(item: &NormalizedGameItem) -> HashMap<String, AttributeValue> {
    HashMap::from([
        ("ID".to_owned(), AttributeValue::S(item.id.clone())),
        ("Summary".to_owned(), AttributeValue::S(item.summary.clone())),
        ("Status".to_owned(), AttributeValue::S(item.status.clone())),
        ("HomeTeam".to_owned(), AttributeValue::S(item.home_team.clone())),
        ("AwayTeam".to_owned(), AttributeValue::S(item.away_team.clone())),
        (
            "HomeScore".to_owned(),
            AttributeValue::N(item.home_score.to_string()),
        ),
        (
            "AwayScore".to_owned(),
            AttributeValue::N(item.away_score.to_string()),
        ),
        ("Timestamp".to_owned(), AttributeValue::S(item.timestamp.clone())),
    ])
}

fn classify(table_name: &str, err: PutItemError) -> StoreError {
    match err {
        PutItemError::ProvisionedThroughputExceededException(_) => {
            StoreError::Throughput(table_name.to_owned())
        }
        PutItemError::ResourceNotFoundException(_) => {
            StoreError::MissingTable(table_name.to_owned())
        }
        other => StoreError::Other(other.to_string()),
    }
}

#[async_trait]
impl GameStore for DynamoStore {
    async fn upsert(&self, item: &NormalizedGameItem) -> Result<(), StoreError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item_attributes(item)))
            .send()
            .await
            .map_err(|e| classify(&self.table_name, e.into_service_error()))?;

        debug!("Stored game {} in {}", item.id, self.table_name);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use aws_sdk_dynamodb::types::error::{
        ProvisionedThroughputExceededException, ResourceNotFoundException,
    };

    fn make_item() -> NormalizedGameItem {
        NormalizedGameItem {
            id: "1".to_owned(),
            summary: "Game Status: Final".to_owned(),
            status: "Final".to_owned(),
            home_team: "Lakers".to_owned(),
            away_team: "Celtics".to_owned(),
            home_score: 100,
            away_score: 98,
            timestamp: "2024-01-01 06:30:00".to_owned(),
        }
    }

    #[test]
    fn test_item_attributes() {
        let attrs = item_attributes(&make_item());
        assert_eq!(attrs.len(), 8);
        assert_eq!(attrs["ID"], AttributeValue::S("1".to_owned()));
        assert_eq!(attrs["HomeTeam"], AttributeValue::S("Lakers".to_owned()));
        assert_eq!(attrs["AwayTeam"], AttributeValue::S("Celtics".to_owned()));
        assert_eq!(attrs["HomeScore"], AttributeValue::N("100".to_owned()));
        assert_eq!(attrs["AwayScore"], AttributeValue::N("98".to_owned()));
        assert_eq!(
            attrs["Timestamp"],
            AttributeValue::S("2024-01-01 06:30:00".to_owned())
        );
    }

    #[test]
    fn test_classify_throughput() {
        let err = PutItemError::ProvisionedThroughputExceededException(
            ProvisionedThroughputExceededException::builder()
                .message("slow down")
                .build(),
        );
        assert!(matches!(
            classify("games", err),
            StoreError::Throughput(table) if table == "games"
        ));
    }

    #[test]
    fn test_classify_missing_table() {
        let err = PutItemError::ResourceNotFoundException(
            ResourceNotFoundException::builder()
                .message("no such table")
                .build(),
        );
        assert!(matches!(
            classify("games", err),
            StoreError::MissingTable(table) if table == "games"
        ));
    }

    #[test]
    fn test_store_error_display() {
        assert_eq!(
            StoreError::MissingTable("games".to_owned()).to_string(),
            "table games not found"
        );
    }
}
