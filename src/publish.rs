use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::SdkConfig;
use log::debug;

#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, subject: &str, message: &str) -> Result<()>;
}

/// Publishes to a single SNS topic.
pub struct SnsPublisher {
    client: aws_sdk_sns::Client,
    topic_arn: String,
}

impl SnsPublisher {
    pub fn new(sdk_config: &SdkConfig, topic_arn: impl Into<String>) -> Self {
        Self {
            client: aws_sdk_sns::Client::new(sdk_config),
            topic_arn: topic_arn.into(),
        }
    }
}

#[async_trait]
impl Publisher for SnsPublisher {
    async fn publish(&self, subject: &str, message: &str) -> Result<()> {
        let output = self
            .client
            .publish()
            .topic_arn(&self.topic_arn)
            .subject(subject)
            .message(message)
            .send()
            .await
            .with_context(|| format!("SNS publish to {} failed", self.topic_arn))?;

        debug!(
            "Published {:?} to {} as message {}",
            subject,
            self.topic_arn,
            output.message_id().unwrap_or("<none>")
        );

        Ok(())
    }
}
