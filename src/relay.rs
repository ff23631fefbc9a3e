use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::config::FormsConfig;
use crate::error::RelayError;
use crate::providers::{Provider, SelectedProvider};
use crate::submission::{normalize, FormSource, SubmissionPayload};

/// Success, or the typed reason a submission was not delivered.
pub type SubmissionOutcome = Result<(), RelayError>;

/// Normalizes submitted forms and delivers them to the configured provider.
///
/// The configuration is fixed at construction. Cloning is cheap and clones
/// share the HTTP connection pool.
#[derive(Debug, Clone)]
pub struct FormRelay {
    forms: Arc<FormsConfig>,
    client: reqwest::Client,
}

impl FormRelay {
    pub fn new(forms: FormsConfig, timeout: Option<Duration>) -> Result<Self, RelayError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| RelayError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self::with_client(forms, client))
    }

    pub fn with_client(forms: FormsConfig, client: reqwest::Client) -> Self {
        Self {
            forms: Arc::new(forms),
            client,
        }
    }

    /// Deliver one payload. Configuration problems are reported before any
    /// request is made; there is exactly one attempt otherwise.
    pub async fn dispatch(&self, payload: &SubmissionPayload) -> SubmissionOutcome {
        let provider = SelectedProvider::from_config(&self.forms).inspect_err(|e| {
            tracing::error!("Cannot relay {} submission: {e:?}", payload.form_type());
        })?;

        let id = Uuid::now_v7();
        let kind = provider.kind();
        tracing::debug!(
            "Relaying submission {id} (form={}, page={}, fields={}) via {kind}",
            payload.form_type(),
            payload.page(),
            payload.len()
        );

        match provider.submit(&self.client, payload).await {
            Ok(()) => {
                tracing::info!("Submission {id} delivered via {kind}");
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Submission {id} failed via {kind}: {e:?}");
                Err(e)
            }
        }
    }

    /// Normalize `form` as submitted from `location`, then dispatch it.
    pub async fn submit<F: FormSource + ?Sized>(&self, form: &F, location: &str) -> SubmissionOutcome {
        let payload = normalize(form, location);
        self.dispatch(&payload).await
    }
}
