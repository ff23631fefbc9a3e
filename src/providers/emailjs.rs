use async_trait::async_trait;
use serde::ser::{Serialize, SerializeMap, Serializer};

use super::{post_json, Provider, ProviderKind};
use crate::config::{EmailJsConfig, DEFAULT_EMAILJS_ENDPOINT, DEFAULT_TO_EMAIL};
use crate::error::RelayError;
use crate::submission::SubmissionPayload;

const TO_EMAIL: &str = "to_email";

/// EmailJS `email/send`: the payload becomes the template parameters.
#[derive(Debug, Clone)]
pub struct EmailJs {
    endpoint: reqwest::Url,
    service_id: String,
    template_id: String,
    public_key: String,
    to_email: String,
}

impl EmailJs {
    pub fn from_config(config: &EmailJsConfig) -> Result<Self, RelayError> {
        if config.service_id.is_empty() || config.template_id.is_empty() || config.public_key.is_empty() {
            return Err(RelayError::Config(
                "EmailJS configuration is incomplete.".to_string(),
            ));
        }

        let endpoint = config
            .endpoint
            .as_deref()
            .filter(|e| !e.is_empty())
            .unwrap_or(DEFAULT_EMAILJS_ENDPOINT);
        let endpoint = reqwest::Url::parse(endpoint)
            .map_err(|e| RelayError::Config(format!("Invalid EmailJS endpoint: {e}")))?;

        let to_email = config
            .to_email
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TO_EMAIL)
            .to_string();

        Ok(Self {
            endpoint,
            service_id: config.service_id.clone(),
            template_id: config.template_id.clone(),
            public_key: config.public_key.clone(),
            to_email,
        })
    }

    pub fn envelope<'a>(&'a self, payload: &'a SubmissionPayload) -> Envelope<'a> {
        Envelope {
            service_id: &self.service_id,
            template_id: &self.template_id,
            user_id: &self.public_key,
            template_params: TemplateParams {
                payload,
                to_email: &self.to_email,
            },
        }
    }
}

#[async_trait]
impl Provider for EmailJs {
    fn kind(&self) -> ProviderKind {
        ProviderKind::EmailJs
    }

    async fn submit(
        &self,
        client: &reqwest::Client,
        payload: &SubmissionPayload,
    ) -> Result<(), RelayError> {
        let envelope = self.envelope(payload);
        post_json(client, self.kind(), self.endpoint.clone(), &envelope).await
    }
}

#[derive(serde::Serialize)]
pub struct Envelope<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: TemplateParams<'a>,
}

/// Payload fields followed by `to_email`, which wins over a field of the
/// same name.
struct TemplateParams<'a> {
    payload: &'a SubmissionPayload,
    to_email: &'a str,
}

impl Serialize for TemplateParams<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (name, value) in self.payload.iter().filter(|(name, _)| *name != TO_EMAIL) {
            map.serialize_entry(name, value)?;
        }
        map.serialize_entry(TO_EMAIL, self.to_email)?;
        map.end()
    }
}
