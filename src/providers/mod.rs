pub mod emailjs;
pub mod firebase;
pub mod google_sheets;

use async_trait::async_trait;
use serde::Serialize;

use crate::config::FormsConfig;
use crate::error::RelayError;
use crate::submission::SubmissionPayload;

pub use emailjs::EmailJs;
pub use firebase::Firebase;
pub use google_sheets::GoogleSheets;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    GoogleSheets,
    Firebase,
    EmailJs,
}

impl ProviderKind {
    pub fn tag(&self) -> &'static str {
        match self {
            ProviderKind::GoogleSheets => "google-sheets",
            ProviderKind::Firebase => "firebase",
            ProviderKind::EmailJs => "emailjs",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "google-sheets" => Some(ProviderKind::GoogleSheets),
            "firebase" => Some(ProviderKind::Firebase),
            "emailjs" => Some(ProviderKind::EmailJs),
            _ => None,
        }
    }

    pub(crate) fn failure_message(&self) -> &'static str {
        match self {
            ProviderKind::GoogleSheets => "Failed to submit to Google Sheets.",
            ProviderKind::Firebase => "Failed to submit to Firebase.",
            ProviderKind::EmailJs => "Failed to send through EmailJS.",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// A backend a submission can be delivered to. One attempt per call.
#[async_trait]
pub trait Provider: Send + Sync {
    fn kind(&self) -> ProviderKind;
    async fn submit(
        &self,
        client: &reqwest::Client,
        payload: &SubmissionPayload,
    ) -> Result<(), RelayError>;
}

/// The provider chosen by configuration, already validated.
#[derive(Debug, Clone)]
pub enum SelectedProvider {
    GoogleSheets(GoogleSheets),
    Firebase(Firebase),
    EmailJs(EmailJs),
}

impl SelectedProvider {
    /// Resolve the configured provider tag and check its required settings.
    /// Never touches the network.
    pub fn from_config(config: &FormsConfig) -> Result<Self, RelayError> {
        let tag = config.provider_tag();
        let kind =
            ProviderKind::from_tag(tag).ok_or_else(|| RelayError::UnknownProvider(tag.to_string()))?;

        match kind {
            ProviderKind::GoogleSheets => {
                GoogleSheets::from_config(&config.google_sheets).map(SelectedProvider::GoogleSheets)
            }
            ProviderKind::Firebase => {
                Firebase::from_config(&config.firebase).map(SelectedProvider::Firebase)
            }
            ProviderKind::EmailJs => EmailJs::from_config(&config.emailjs).map(SelectedProvider::EmailJs),
        }
    }

    fn inner(&self) -> &dyn Provider {
        match self {
            SelectedProvider::GoogleSheets(p) => p,
            SelectedProvider::Firebase(p) => p,
            SelectedProvider::EmailJs(p) => p,
        }
    }
}

#[async_trait]
impl Provider for SelectedProvider {
    fn kind(&self) -> ProviderKind {
        self.inner().kind()
    }

    async fn submit(
        &self,
        client: &reqwest::Client,
        payload: &SubmissionPayload,
    ) -> Result<(), RelayError> {
        self.inner().submit(client, payload).await
    }
}

/// POST a JSON body and treat any 2xx as delivered. The response body is
/// never read.
pub(crate) async fn post_json<B: Serialize + Sync + ?Sized>(
    client: &reqwest::Client,
    kind: ProviderKind,
    url: reqwest::Url,
    body: &B,
) -> Result<(), RelayError> {
    let resp = client
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(|e| RelayError::transport(kind, None, format!("{kind} request failed: {e}")))?;

    let status = resp.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(RelayError::transport(
            kind,
            Some(status.as_u16()),
            format!("{kind} responded with {status}"),
        ))
    }
}
