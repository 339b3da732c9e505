use crate::error::Result;
use crate::models::result::ResultSubmission;
use crate::services::result_service::{NewResult, ResultService};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Receives finished-session results. Implementations must return
/// immediately; delivery happens in the background and its failure never
/// reaches the session.
#[cfg_attr(test, mockall::automock)]
pub trait ResultSink: Send + Sync {
    fn dispatch(&self, submission: ResultSubmission);
}

#[derive(Clone)]
pub struct RecorderService {
    result_service: ResultService,
    client: Client,
    webhook_url: Option<String>,
}

impl RecorderService {
    pub fn new(result_service: ResultService, webhook_url: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            result_service,
            client,
            webhook_url,
        }
    }

    pub async fn persist(&self, submission: &ResultSubmission) -> Result<()> {
        if submission.user_id.is_none() {
            debug!(subject = %submission.subject, level = %submission.level, "Anonymous result not persisted");
            return Ok(());
        }
        let stored = self
            .result_service
            .create_result(NewResult::from_submission(submission)?)
            .await?;
        info!(result_id = %stored.id, score = stored.score, "Quiz result saved");
        Ok(())
    }

    pub async fn forward(&self, submission: &ResultSubmission) -> Result<()> {
        let Some(url) = &self.webhook_url else {
            return Ok(());
        };
        self.client
            .post(url)
            .json(submission)
            .send()
            .await?
            .error_for_status()?;
        debug!(url = %url, "Quiz result forwarded");
        Ok(())
    }
}

impl ResultSink for RecorderService {
    fn dispatch(&self, submission: ResultSubmission) {
        let recorder = self.clone();
        tokio::spawn(async move {
            if let Err(e) = recorder.persist(&submission).await {
                warn!(error = ?e, subject = %submission.subject, "Failed to save quiz result");
            }
            if let Err(e) = recorder.forward(&submission).await {
                warn!(error = ?e, "Failed to forward quiz result");
            }
        });
    }
}
