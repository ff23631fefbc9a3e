use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::Mutex;

use super::machine::{SubmissionMachine, SubmissionState, DEFAULT_SUBMIT_LABEL};
use super::{FormId, SharedForm};
use crate::relay::{FormRelay, SubmissionOutcome};
use crate::submission::normalize;

/// A form wired to the relay, carrying its own submission machine.
pub struct BoundForm {
    id: FormId,
    form: SharedForm,
    default_label: String,
    machine: Mutex<SubmissionMachine>,
}

impl BoundForm {
    pub fn id(&self) -> FormId {
        self.id
    }

    pub async fn state(&self) -> SubmissionState {
        self.machine.lock().await.state()
    }

    /// Run one submission from `location` through the relay.
    ///
    /// Returns `None` without dispatching when a submission from this form is
    /// already in flight. Failures are rendered on the form and returned, never
    /// raised further.
    pub async fn submit(&self, relay: &FormRelay, location: &str) -> Option<SubmissionOutcome> {
        let payload = {
            let mut machine = self.machine.lock().await;
            if let Err(e) = machine.begin() {
                tracing::debug!("Ignoring submit on form {}: {e}", self.id);
                return None;
            }
            let mut form = self.form.lock().await;
            form.apply(&machine.project(&self.default_label));
            normalize(&*form, location)
        };

        let outcome = relay.dispatch(&payload).await;

        let mut machine = self.machine.lock().await;
        let mut form = self.form.lock().await;
        // Only this call moves the machine out of Submitting.
        if let Err(e) = machine.finish(&outcome) {
            tracing::error!("Form {} state machine out of step: {e}", self.id);
        }
        if outcome.is_ok() {
            form.reset();
        }
        form.apply(&machine.project(&self.default_label));

        if let Err(e) = machine.settle() {
            tracing::error!("Form {} state machine out of step: {e}", self.id);
        }
        form.apply(&machine.project(&self.default_label));

        Some(outcome)
    }
}

/// Forms already bound, keyed by identity. Binding is idempotent.
#[derive(Default)]
pub struct BindingRegistry {
    bound: DashMap<FormId, Arc<BoundForm>>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a marked form. Returns true only the first time a given form is bound.
    pub async fn bind(&self, form: &SharedForm) -> bool {
        let (id, default_label) = {
            let form = form.lock().await;
            if form.marker().is_none() {
                return false;
            }
            let label = form
                .submit_control()
                .map(|s| s.label.as_str())
                .filter(|l| !l.is_empty())
                .unwrap_or(DEFAULT_SUBMIT_LABEL)
                .to_string();
            (form.id(), label)
        };

        match self.bound.entry(id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(BoundForm {
                    id,
                    form: form.clone(),
                    default_label,
                    machine: Mutex::new(SubmissionMachine::new()),
                }));
                tracing::debug!("Bound form {id}");
                true
            }
        }
    }

    /// Bind every eligible form in `forms`, returning how many were new.
    pub async fn scan(&self, forms: &[SharedForm]) -> usize {
        let mut newly_bound = 0;
        for form in forms {
            if self.bind(form).await {
                newly_bound += 1;
            }
        }
        newly_bound
    }

    pub fn get(&self, id: FormId) -> Option<Arc<BoundForm>> {
        self.bound.get(&id).map(|entry| entry.value().clone())
    }

    pub fn is_bound(&self, id: FormId) -> bool {
        self.bound.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.bound.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }
}
