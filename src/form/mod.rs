pub mod binding;
pub mod machine;

use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::submission::FormSource;
use machine::ViewModel;

pub use binding::{BindingRegistry, BoundForm};
pub use machine::{SubmissionMachine, SubmissionState};

/// Stable identity of a form for the lifetime of its page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormId(Uuid);

impl FormId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for FormId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for FormId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A named control. `default_value` is what `Form::reset` restores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub value: String,
    pub default_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitControl {
    pub label: String,
    pub disabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Feedback line shown under a form after a submission settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

pub type SharedForm = Arc<Mutex<Form>>;

/// In-memory form: identity marker, fields in document order, an optional
/// submit control and at most one notice.
#[derive(Debug, Clone, Default)]
pub struct Form {
    id: FormId,
    marker: Option<String>,
    fields: Vec<FormField>,
    submit: Option<SubmitControl>,
    notice: Option<Notice>,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the form as relay-eligible under the given form type.
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    /// Add a field whose initial value is also its default.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        self.fields.push(FormField {
            name: name.into(),
            default_value: value.clone(),
            value,
        });
        self
    }

    pub fn with_submit(mut self, label: impl Into<String>) -> Self {
        self.submit = Some(SubmitControl {
            label: label.into(),
            disabled: false,
        });
        self
    }

    pub fn shared(self) -> SharedForm {
        Arc::new(Mutex::new(self))
    }

    pub fn id(&self) -> FormId {
        self.id
    }

    pub fn marker(&self) -> Option<&str> {
        self.marker.as_deref()
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    pub fn submit_control(&self) -> Option<&SubmitControl> {
        self.submit.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Set the first field named `name`. Returns false if there is none.
    pub fn set_field(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(field) => {
                field.value = value.into();
                true
            }
            None => false,
        }
    }

    /// Put every field back to its default value.
    pub fn reset(&mut self) {
        for field in &mut self.fields {
            field.value.clone_from(&field.default_value);
        }
    }

    pub(crate) fn apply(&mut self, view: &ViewModel) {
        if let Some(submit) = &mut self.submit {
            submit.disabled = view.submit_disabled;
            submit.label.clone_from(&view.submit_label);
        }
        self.notice.clone_from(&view.notice);
    }
}

impl FormSource for Form {
    fn marker(&self) -> Option<&str> {
        self.marker.as_deref()
    }

    fn field_values(&self) -> Vec<(&str, &str)> {
        self.fields
            .iter()
            .map(|f| (f.name.as_str(), f.value.as_str()))
            .collect()
    }
}
