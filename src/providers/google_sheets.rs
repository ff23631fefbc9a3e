use async_trait::async_trait;

use super::{post_json, Provider, ProviderKind};
use crate::config::GoogleSheetsConfig;
use crate::error::RelayError;
use crate::submission::SubmissionPayload;

/// Spreadsheet webhook (an Apps Script web app). Receives the payload as-is.
#[derive(Debug, Clone)]
pub struct GoogleSheets {
    endpoint: reqwest::Url,
}

impl GoogleSheets {
    pub fn from_config(config: &GoogleSheetsConfig) -> Result<Self, RelayError> {
        if config.endpoint.is_empty() {
            return Err(RelayError::Config(
                "Google Sheets endpoint is not configured.".to_string(),
            ));
        }

        let endpoint = reqwest::Url::parse(&config.endpoint)
            .map_err(|e| RelayError::Config(format!("Invalid Google Sheets endpoint: {e}")))?;

        Ok(Self { endpoint })
    }
}

#[async_trait]
impl Provider for GoogleSheets {
    fn kind(&self) -> ProviderKind {
        ProviderKind::GoogleSheets
    }

    async fn submit(
        &self,
        client: &reqwest::Client,
        payload: &SubmissionPayload,
    ) -> Result<(), RelayError> {
        post_json(client, self.kind(), self.endpoint.clone(), payload).await
    }
}
