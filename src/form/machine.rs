use super::{Notice, NoticeKind};
use crate::relay::SubmissionOutcome;

pub const DEFAULT_SUBMIT_LABEL: &str = "Submit";
pub const SENDING_LABEL: &str = "Sending...";
pub const SUCCESS_TEXT: &str = "Thank you. Your submission was sent successfully.";
pub const FALLBACK_ERROR_TEXT: &str = "Submission failed. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: SubmissionState,
    pub event: &'static str,
}

impl std::fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cannot {} while {:?}", self.event, self.from)
    }
}

impl std::error::Error for InvalidTransition {}

/// What a form should look like for a given machine state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel {
    pub submit_disabled: bool,
    pub submit_label: String,
    pub notice: Option<Notice>,
}

/// `Idle -> Submitting -> {Succeeded, Failed} -> Idle`.
///
/// The last notice survives the return to `Idle` and is only replaced when
/// the next attempt settles.
#[derive(Debug, Clone)]
pub struct SubmissionMachine {
    state: SubmissionState,
    notice: Option<Notice>,
}

impl Default for SubmissionMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionMachine {
    pub fn new() -> Self {
        Self {
            state: SubmissionState::Idle,
            notice: None,
        }
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn begin(&mut self) -> Result<(), InvalidTransition> {
        self.transition("begin", SubmissionState::Idle, SubmissionState::Submitting)
    }

    pub fn succeed(&mut self) -> Result<(), InvalidTransition> {
        self.transition("succeed", SubmissionState::Submitting, SubmissionState::Succeeded)?;
        self.notice = Some(Notice {
            kind: NoticeKind::Success,
            text: SUCCESS_TEXT.to_string(),
        });
        Ok(())
    }

    /// An empty `reason` falls back to the generic failure text.
    pub fn fail(&mut self, reason: &str) -> Result<(), InvalidTransition> {
        self.transition("fail", SubmissionState::Submitting, SubmissionState::Failed)?;
        let text = if reason.is_empty() {
            FALLBACK_ERROR_TEXT
        } else {
            reason
        };
        self.notice = Some(Notice {
            kind: NoticeKind::Error,
            text: text.to_string(),
        });
        Ok(())
    }

    pub fn finish(&mut self, outcome: &SubmissionOutcome) -> Result<(), InvalidTransition> {
        match outcome {
            Ok(()) => self.succeed(),
            Err(e) => self.fail(&e.to_string()),
        }
    }

    pub fn settle(&mut self) -> Result<(), InvalidTransition> {
        match self.state {
            SubmissionState::Succeeded | SubmissionState::Failed => {
                self.state = SubmissionState::Idle;
                Ok(())
            }
            from => Err(InvalidTransition {
                from,
                event: "settle",
            }),
        }
    }

    /// Render the current state. `label` is the submit control's original text.
    pub fn project(&self, label: &str) -> ViewModel {
        let submitting = self.state == SubmissionState::Submitting;
        ViewModel {
            submit_disabled: submitting,
            submit_label: if submitting { SENDING_LABEL } else { label }.to_string(),
            notice: self.notice.clone(),
        }
    }

    fn transition(
        &mut self,
        event: &'static str,
        from: SubmissionState,
        to: SubmissionState,
    ) -> Result<(), InvalidTransition> {
        if self.state != from {
            return Err(InvalidTransition {
                from: self.state,
                event,
            });
        }
        self.state = to;
        Ok(())
    }
}
