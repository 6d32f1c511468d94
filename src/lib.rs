//! Student Performance Prediction System.
//!
//! The form adapter ([`adapter`], [`state`], [`form`]) turns nine form fields
//! into a `POST /api/predict` request and the response into displayable
//! state. [`server`] hosts the prediction service the adapter talks to.

pub mod adapter;
pub mod client;
pub mod config;
pub mod error;
pub mod form;
pub mod models;
pub mod presentation;
pub mod scoring;
pub mod server;
pub mod state;

pub use adapter::FormAdapter;
pub use client::{PredictionApi, PredictionClient};
pub use error::{RequestError, SubmitError, ValidationError};
pub use form::{Field, StudentInput, StudentSubmission};
pub use models::PredictionResult;
pub use state::{FormState, Phase};
