use thiserror::Error;

use crate::form::Field;

/// The only failure text a user ever sees for a prediction request.
pub const REQUEST_FAILED_MESSAGE: &str = "Failed to get prediction. Please try again.";

/// Rejected before anything is sent over the network.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{} is required", .0.label())]
    MissingField(Field),
    #[error("{} must be a number, got {value:?}", .field.label())]
    NotANumber { field: Field, value: String },
    #[error("{} must be between 0 and 100, got {value}", .field.label())]
    OutOfRange { field: Field, value: f64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown form field `{0}`")]
pub struct UnknownField(pub String);

/// Network failure, non-2xx status or an unreadable body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("request to prediction service failed: {0}")]
    Transport(String),
    #[error("prediction service answered with status {0}")]
    Status(u16),
    #[error("could not decode prediction service response: {0}")]
    Decode(String),
}

impl RequestError {
    pub fn user_message(&self) -> &'static str {
        REQUEST_FAILED_MESSAGE
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("a prediction request is already in flight")]
    InFlight,
    #[error(transparent)]
    Request(#[from] RequestError),
}

pub type Result<T> = std::result::Result<T, SubmitError>;
