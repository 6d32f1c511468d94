use crate::client::PredictionApi;
use crate::error::{Result, SubmitError, UnknownField};
use crate::form::{Field, StudentInput};
use crate::models::PredictionResult;
use crate::state::{FormState, Phase};

/// Owns the form state and drives it through one request/response cycle
/// per submit.
pub struct FormAdapter<A> {
    api: A,
    state: FormState,
}

impl<A: PredictionApi> FormAdapter<A> {
    pub fn new(api: A) -> Self {
        Self::with_state(api, FormState::new())
    }

    pub fn with_state(api: A, state: FormState) -> Self {
        Self { api, state }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn update_field(&mut self, name: &str, value: impl Into<String>) -> std::result::Result<(), UnknownField> {
        self.state.update_named_field(name, value)
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.state.update_field(field, value);
    }

    /// Types a whole record into the form, one field at a time.
    pub fn fill(&mut self, input: &StudentInput) {
        for field in Field::ALL {
            self.set(field, input.get(field));
        }
    }

    /// Validates, sends one prediction request and records the outcome.
    ///
    /// Request failures are stored on the state as the generic message and
    /// also returned so callers can report them.
    pub async fn submit(&mut self) -> Result<PredictionResult> {
        let (ticket, submission) = self.state.begin_submit()?;
        let outcome = self.api.predict(&submission).await;
        self.state.complete(ticket, outcome.clone());
        outcome.map_err(SubmitError::Request)
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }

    pub fn into_state(self) -> FormState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RequestError, ValidationError, REQUEST_FAILED_MESSAGE};
    use crate::form::{sample_input, StudentSubmission};
    use crate::models::{RiskColor, RiskLevel};
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    struct StubApi {
        reply: std::result::Result<PredictionResult, RequestError>,
        calls: RefCell<Vec<StudentSubmission>>,
    }

    impl StubApi {
        fn replying(reply: std::result::Result<PredictionResult, RequestError>) -> Self {
            Self {
                reply,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl PredictionApi for StubApi {
        async fn predict(&self, submission: &StudentSubmission) -> std::result::Result<PredictionResult, RequestError> {
            self.calls.borrow_mut().push(submission.clone());
            self.reply.clone()
        }
    }

    fn on_track() -> PredictionResult {
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

    fn filled(api: StubApi) -> FormAdapter<StubApi> {
        let mut adapter = FormAdapter::new(api);
        adapter.fill(&sample_input());
        adapter
    }

    #[actix_web::test]
    async fn submit_sends_one_request_and_stores_result() {
        let mut adapter = filled(StubApi::replying(Ok(on_track())));

        let result = adapter.submit().await.unwrap();
        assert_eq!(result, on_track());
        assert_eq!(adapter.state().result.as_ref(), Some(&result));
        assert_eq!(adapter.phase(), Phase::Success);
        assert_eq!(adapter.api().calls.borrow().len(), 1);
        assert_eq!(adapter.api().calls.borrow()[0].mid_sem2, 85.0);
    }

    #[actix_web::test]
    async fn failed_request_moves_to_error() {
        let mut adapter = filled(StubApi::replying(Err(RequestError::Status(500))));

        let err = adapter.submit().await.unwrap_err();
        assert_eq!(err, SubmitError::Request(RequestError::Status(500)));
        assert_eq!(adapter.phase(), Phase::Error);
        assert_eq!(adapter.state().result, None);
        assert_eq!(adapter.state().error.as_deref(), Some(REQUEST_FAILED_MESSAGE));
    }

    #[actix_web::test]
    async fn invalid_form_never_reaches_the_api() {
        let mut adapter = filled(StubApi::replying(Ok(on_track())));
        adapter.update_field("extracurricular", "").unwrap();

        let err = adapter.submit().await.unwrap_err();
        assert_eq!(
            err,
            SubmitError::Validation(ValidationError::MissingField(Field::Extracurricular))
        );
        assert!(adapter.api().calls.borrow().is_empty());
        assert_eq!(adapter.phase(), Phase::Idle);
    }

    #[actix_web::test]
    async fn retry_after_error_is_allowed() {
        let mut adapter = filled(StubApi::replying(Err(RequestError::Transport("refused".into()))));
        assert!(adapter.submit().await.is_err());
        assert!(adapter.submit().await.is_err());
        assert_eq!(adapter.api().calls.borrow().len(), 2);
    }

    #[actix_web::test]
    async fn restored_loading_state_rejects_submit() {
        let mut state = FormState::new();
        state.input = sample_input();
        state.begin_submit().unwrap();

        let mut adapter = FormAdapter::with_state(StubApi::replying(Ok(on_track())), state);
        assert_eq!(adapter.submit().await.unwrap_err(), SubmitError::InFlight);
        assert!(adapter.api().calls.borrow().is_empty());
    }

    #[actix_web::test]
    async fn reset_after_success_clears_everything() {
        let mut adapter = filled(StubApi::replying(Ok(on_track())));
        adapter.submit().await.unwrap();
        adapter.reset();

        let state = adapter.into_state();
        assert_eq!(state.phase(), Phase::Idle);
        assert!(state.input.is_empty());
        assert_eq!(state.result, None);
        assert_eq!(state.error, None);
    }
}
