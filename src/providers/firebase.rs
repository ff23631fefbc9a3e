use async_trait::async_trait;
use serde::ser::{Serialize, SerializeMap, Serializer};

use super::{post_json, Provider, ProviderKind};
use crate::config::{FirebaseConfig, DEFAULT_FIREBASE_BASE_URL};
use crate::error::RelayError;
use crate::submission::SubmissionPayload;

/// Firestore REST `createDocument` on a single collection.
#[derive(Debug, Clone)]
pub struct Firebase {
    documents_url: reqwest::Url,
}

impl Firebase {
    pub fn from_config(config: &FirebaseConfig) -> Result<Self, RelayError> {
        if config.api_key.is_empty() || config.project_id.is_empty() || config.collection.is_empty() {
            return Err(RelayError::Config(
                "Firebase configuration is incomplete.".to_string(),
            ));
        }

        let base = config
            .base_url
            .as_deref()
            .filter(|b| !b.is_empty())
            .unwrap_or(DEFAULT_FIREBASE_BASE_URL)
            .trim_end_matches('/');

        let mut documents_url = reqwest::Url::parse(&format!(
            "{base}/projects/{}/databases/(default)/documents/{}",
            config.project_id, config.collection
        ))
        .map_err(|e| RelayError::Config(format!("Invalid Firebase URL: {e}")))?;
        documents_url
            .query_pairs_mut()
            .append_pair("key", &config.api_key);

        Ok(Self { documents_url })
    }
}

#[async_trait]
impl Provider for Firebase {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Firebase
    }

    async fn submit(
        &self,
        client: &reqwest::Client,
        payload: &SubmissionPayload,
    ) -> Result<(), RelayError> {
        let document = Document::new(payload);
        post_json(client, self.kind(), self.documents_url.clone(), &document).await
    }
}

/// `{"fields": {name: {"stringValue": value}, ...}}`
#[derive(serde::Serialize)]
pub struct Document<'a> {
    fields: StringFields<'a>,
}

impl<'a> Document<'a> {
    pub fn new(payload: &'a SubmissionPayload) -> Self {
        Self {
            fields: StringFields(payload),
        }
    }
}

struct StringFields<'a>(&'a SubmissionPayload);

#[derive(serde::Serialize)]
struct StringValue<'a> {
    #[serde(rename = "stringValue")]
    string_value: &'a str,
}

impl Serialize for StringFields<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in self.0.iter() {
            map.serialize_entry(name, &StringValue { string_value: value })?;
        }
        map.end()
    }
}
