use anyhow::Result;
use log::{error, info};

use crate::handler::{HandlerResponse, SUCCESS_BODY};
use crate::publish::Publisher;
use crate::types::TeamRecord;

pub const TEAMS_SUBJECT: &str = "NBA Team Updates";
pub const TEAMS_HEADER: &str = "NBA Teams:";

pub fn team_digest(teams: &[TeamRecord]) -> String {
    let mut lines = Vec::with_capacity(teams.len() + 1);
    lines.push(TEAMS_HEADER.to_owned());
    lines.extend(
        teams
            .iter()
            .map(|t| format!("{} ({})", t.full_name, t.tricode)),
    );
    lines.join("\n")
}

/// Publish the team directory. Only a failed retrieval is reported as a bad gateway; an
/// empty directory is published as-is.
pub async fn publish_teams(
    teams: Result<Vec<TeamRecord>>,
    publisher: &dyn Publisher,
) -> HandlerResponse {
    let teams = match teams {
        Ok(teams) => teams,
        Err(e) => {
            error!("Failed to retrieve teams: {e:#}");
            return HandlerResponse {
                status_code: 502,
                body: "Failed to retrieve data".to_owned(),
            };
        }
    };

    match publisher.publish(TEAMS_SUBJECT, &team_digest(&teams)).await {
        Ok(()) => {
            info!("Published {} teams", teams.len());
            HandlerResponse::ok(SUCCESS_BODY)
        }
        Err(e) => {
            error!("Error publishing team directory: {e:#}");
            HandlerResponse::error(format!("Error publishing notification: {e:#}"))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingPublisher {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl Publisher for RecordingPublisher {
        async fn publish(&self, subject: &str, message: &str) -> Result<()> {
            self.sent
                .lock()
                .unwrap()
                .push((subject.to_owned(), message.to_owned()));
            Ok(())
        }
    }

    struct BrokenPublisher;

    #[async_trait]
    impl Publisher for BrokenPublisher {
        async fn publish(&self, _subject: &str, _message: &str) -> Result<()> {
            Err(anyhow!("access denied"))
        }
    }

    fn make_team(full_name: &str, tricode: &str) -> TeamRecord {
        TeamRecord {
            full_name: full_name.to_owned(),
            tricode: tricode.to_owned(),
        }
    }

    #[test]
    fn test_team_digest() {
        let teams = vec![
            make_team("Atlanta Hawks", "ATL"),
            make_team("Boston Celtics", "BOS"),
        ];
        assert_eq!(
            team_digest(&teams),
            "NBA Teams:\nAtlanta Hawks (ATL)\nBoston Celtics (BOS)"
        );
    }

    #[test]
    fn test_team_digest_empty() {
        assert_eq!(team_digest(&[]), "NBA Teams:");
    }

    #[tokio::test]
    async fn test_publish_teams() {
        let publisher = RecordingPublisher::default();
        let teams = vec![make_team("Brooklyn Nets", "BKN")];

        let response = publish_teams(Ok(teams), &publisher).await;

        assert_eq!(response.status_code, 200);
        let sent = publisher.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, TEAMS_SUBJECT);
        assert_eq!(sent[0].1, "NBA Teams:\nBrooklyn Nets (BKN)");
    }

    #[tokio::test]
    async fn test_publish_teams_empty_directory() {
        let publisher = RecordingPublisher::default();

        let response = publish_teams(Ok(Vec::new()), &publisher).await;

        assert_eq!(response.status_code, 200);
        let sent = publisher.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1, TEAMS_HEADER);
    }

    #[tokio::test]
    async fn test_publish_teams_retrieval_failure_is_bad_gateway() {
        let publisher = RecordingPublisher::default();

        let response = publish_teams(Err(anyhow!("503 Service Unavailable")), &publisher).await;

        assert_eq!(response.status_code, 502);
        assert_eq!(response.body, "Failed to retrieve data");
        assert!(publisher.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_publish_teams_failure() {
        let teams = vec![make_team("Brooklyn Nets", "BKN")];

        let response = publish_teams(Ok(teams), &BrokenPublisher).await;

        assert_eq!(response.status_code, 500);
        assert!(response.body.contains("access denied"));
    }
}
