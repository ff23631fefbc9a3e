pub mod honeypot;
pub mod metadata;
pub mod normalize;
pub mod parser;
pub mod payload;

pub use normalize::{normalize, normalize_at};
pub use payload::SubmissionPayload;

/// Anything that can be read as a submitted form: an identity marker plus
/// its field values in document order.
pub trait FormSource {
    fn marker(&self) -> Option<&str>;
    fn field_values(&self) -> Vec<(&str, &str)>;
}

/// A form that arrived over HTTP rather than from a bound in-memory form.
#[derive(Debug, Clone, Default)]
pub struct IncomingForm {
    pub marker: Option<String>,
    pub fields: Vec<(String, String)>,
}

impl IncomingForm {
    pub fn new(marker: Option<String>, fields: Vec<(String, String)>) -> Self {
        Self { marker, fields }
    }

    pub fn without_field(mut self, name: &str) -> Self {
        self.fields.retain(|(k, _)| k != name);
        self
    }
}

impl FormSource for IncomingForm {
    fn marker(&self) -> Option<&str> {
        self.marker.as_deref()
    }

    fn field_values(&self) -> Vec<(&str, &str)> {
        self.fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}
