use serde::{Deserialize, Serialize};

use crate::error::{RequestError, SubmitError, UnknownField};
use crate::form::{Field, StudentInput, StudentSubmission};
use crate::models::PredictionResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    Loading,
    Success,
    Error,
}

/// Identifies one submission. A completion only lands if its ticket is
/// still the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Everything the form shows, in one serializable value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormState {
    pub input: StudentInput,
    pub result: Option<PredictionResult>,
    pub loading: bool,
    pub error: Option<String>,
    #[serde(default)]
    generation: u64,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Loading
        } else if self.error.is_some() {
            Phase::Error
        } else if self.result.is_some() {
            Phase::Success
        } else {
            Phase::Idle
        }
    }

    pub fn update_field(&mut self, field: Field, value: impl Into<String>) {
        self.input.set(field, value);
    }

    pub fn update_named_field(&mut self, name: &str, value: impl Into<String>) -> Result<(), UnknownField> {
        let field: Field = name.parse()?;
        self.update_field(field, value);
        Ok(())
    }

    /// Idle/Success/Error -> Loading. Invalid input leaves the state as it was.
    pub fn begin_submit(&mut self) -> Result<(Ticket, StudentSubmission), SubmitError> {
        if self.loading {
            return Err(SubmitError::InFlight);
        }
        let submission = self.input.validate()?;

        self.generation += 1;
        self.loading = true;
        self.error = None;
        self.result = None;
        Ok((Ticket(self.generation), submission))
    }

    /// Loading -> Success or Error. Returns false when the ticket was
    /// superseded by a reset and the outcome was dropped.
    pub fn complete(&mut self, ticket: Ticket, outcome: Result<PredictionResult, RequestError>) -> bool {
        if !self.loading || ticket.0 != self.generation {
            log::debug!("dropping stale prediction outcome for submission {}", ticket.0);
            return false;
        }

        self.loading = false;
        match outcome {
            Ok(result) => {
                self.result = Some(result);
                self.error = None;
            }
            Err(err) => {
                log::error!("prediction request failed: {err}");
                self.result = None;
                self.error = Some(err.user_message().to_string());
            }
        }
        true
    }

    /// Any state -> Idle.
    pub fn reset(&mut self) {
        self.input = StudentInput::default();
        self.result = None;
        self.error = None;
        self.loading = false;
        self.generation += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ValidationError, REQUEST_FAILED_MESSAGE};
    use crate::form::sample_input;
    use crate::models::{RiskColor, RiskLevel};
    use std::collections::BTreeMap;

    fn filled() -> FormState {
        FormState {
            input: sample_input(),
            ..FormState::new()
        }
    }

    fn low_risk() -> PredictionResult {
        PredictionResult {
            risk_level: RiskLevel::Low,
            color: RiskColor::Green,
            status: "On Track".to_string(),
            score: 87.0,
            breakdown: BTreeMap::from([("attendanceScore".to_string(), 95.0)]),
            insights: vec![],
            recommendations: vec!["Keep it up".to_string()],
        }
    }

    #[test]
    fn starts_idle() {
        let state = FormState::new();
        assert_eq!(state.phase(), Phase::Idle);
        assert!(state.input.is_empty());
    }

    #[test]
    fn successful_cycle() {
        let mut state = filled();
        let (ticket, submission) = state.begin_submit().unwrap();
        assert_eq!(state.phase(), Phase::Loading);
        assert_eq!(submission.roll_number, "21/CSE/001");

        assert!(state.complete(ticket, Ok(low_risk())));
        assert_eq!(state.phase(), Phase::Success);
        assert_eq!(state.result, Some(low_risk()));
        assert_eq!(state.error, None);
    }

    #[test]
    fn failed_cycle_exposes_generic_message() {
        let mut state = filled();
        let (ticket, _) = state.begin_submit().unwrap();
        state.complete(ticket, Err(RequestError::Status(503)));

        assert_eq!(state.phase(), Phase::Error);
        assert_eq!(state.result, None);
        assert_eq!(state.error.as_deref(), Some(REQUEST_FAILED_MESSAGE));
    }

    #[test]
    fn resubmitting_clears_previous_outcome() {
        let mut state = filled();
        let (ticket, _) = state.begin_submit().unwrap();
        state.complete(ticket, Err(RequestError::Transport("refused".into())));

        state.begin_submit().unwrap();
        assert_eq!(state.phase(), Phase::Loading);
        assert_eq!(state.error, None);
        assert_eq!(state.result, None);
    }

    #[test]
    fn second_submit_while_loading_is_rejected() {
        let mut state = filled();
        state.begin_submit().unwrap();
        assert_eq!(state.begin_submit().unwrap_err(), SubmitError::InFlight);
        assert_eq!(state.phase(), Phase::Loading);
    }

    #[test]
    fn invalid_input_does_not_change_phase() {
        let mut state = filled();
        state.update_field(Field::Attendance, "150");
        let err = state.begin_submit().unwrap_err();
        assert!(matches!(err, SubmitError::Validation(ValidationError::OutOfRange { .. })));
        assert_eq!(state.phase(), Phase::Idle);
    }

    #[test]
    fn reset_returns_to_idle_from_every_phase() {
        let mut success = filled();
        let (ticket, _) = success.begin_submit().unwrap();
        success.complete(ticket, Ok(low_risk()));

        let mut error = filled();
        let (ticket, _) = error.begin_submit().unwrap();
        error.complete(ticket, Err(RequestError::Status(500)));

        let mut loading = filled();
        loading.begin_submit().unwrap();

        for mut state in [FormState::new(), filled(), success, error, loading] {
            state.reset();
            assert_eq!(state.phase(), Phase::Idle);
            assert!(state.input.is_empty());
            assert_eq!(state.result, None);
            assert_eq!(state.error, None);
        }
    }

    #[test]
    fn completion_after_reset_is_ignored() {
        let mut state = filled();
        let (stale, _) = state.begin_submit().unwrap();
        state.reset();
        assert!(!state.complete(stale, Ok(low_risk())));
        assert_eq!(state.phase(), Phase::Idle);

        state.input = sample_input();
        let (current, _) = state.begin_submit().unwrap();
        assert!(!state.complete(stale, Ok(low_risk())));
        assert_eq!(state.phase(), Phase::Loading);
        assert!(state.complete(current, Ok(low_risk())));
        assert_eq!(state.phase(), Phase::Success);
    }

    #[test]
    fn update_named_field_rejects_unknown_names() {
        let mut state = FormState::new();
        state.update_named_field("labWork", "77").unwrap();
        assert_eq!(state.input.lab_work, "77");
        assert_eq!(
            state.update_named_field("cgpa", "9"),
            Err(UnknownField("cgpa".to_string()))
        );
    }

    #[test]
    fn state_serializes_with_all_four_parts() {
        let value = serde_json::to_value(filled()).unwrap();
        for key in ["input", "result", "loading", "error"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["input"]["studentName"], "Jane Doe");
    }
}
