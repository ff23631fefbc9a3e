use serde::ser::{Serialize, SerializeMap, Serializer};

pub const FORM_TYPE: &str = "formType";
pub const PAGE: &str = "page";
pub const CREATED_AT: &str = "createdAt";

/// Flat, ordered field-name to string mapping sent to a provider.
///
/// Built only by [`super::normalize`]; read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionPayload {
    entries: Vec<(String, String)>,
}

impl SubmissionPayload {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// A repeated name keeps its original position and takes the new value.
    pub(crate) fn insert(&mut self, name: &str, value: String) {
        match self.entries.iter_mut().find(|(k, _)| k == name) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn form_type(&self) -> &str {
        self.get(FORM_TYPE).unwrap_or_default()
    }

    pub fn page(&self) -> &str {
        self.get(PAGE).unwrap_or_default()
    }

    pub fn created_at(&self) -> &str {
        self.get(CREATED_AT).unwrap_or_default()
    }
}

impl Serialize for SubmissionPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}
