use actix_web::{http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use chrono::Utc;
use serde_json::Value;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::config::ServerConfig;
use crate::form::{Field, StudentSubmission};
use crate::models::{
    ApiError, HealthStatus, PredictionRecord, RiskLevel, Statistics, StudentRecords,
};
use crate::scoring::{round2, PerformancePredictor};

/// Shared by every worker through `web::Data`.
#[derive(Default)]
pub struct ServiceState {
    predictor: PerformancePredictor,
    records: RwLock<Vec<PredictionRecord>>,
}

#[derive(Debug, PartialEq)]
enum PayloadError {
    Missing(Field),
    Invalid { field: Field, value: String },
}

impl PayloadError {
    fn status(&self) -> StatusCode {
        match self {
            PayloadError::Missing(_) => StatusCode::BAD_REQUEST,
            PayloadError::Invalid { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            PayloadError::Missing(field) => format!("Missing required field: {}", field.key()),
            PayloadError::Invalid { field, value } => {
                format!("could not convert {} to float: {value}", field.key())
            }
        }
    }
}

/// Metrics may arrive as JSON numbers or as numeric strings.
fn parse_payload(body: &Value) -> Result<StudentSubmission, PayloadError> {
    let lookup = |field: Field| body.get(field.key()).ok_or(PayloadError::Missing(field));

    for field in Field::ALL {
        lookup(field)?;
    }

    let text = |field: Field| -> Result<String, PayloadError> {
        let value = lookup(field)?;
        Ok(value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string()))
    };
    let metric = |field: Field| -> Result<f64, PayloadError> {
        let value = lookup(field)?;
        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        parsed
            .filter(|v| v.is_finite())
            .ok_or_else(|| PayloadError::Invalid {
                field,
                value: value.to_string(),
            })
    };

    Ok(StudentSubmission {
        student_name: text(Field::StudentName)?,
        roll_number: text(Field::RollNumber)?,
        attendance: metric(Field::Attendance)?,
        mid_sem1: metric(Field::MidSem1)?,
        mid_sem2: metric(Field::MidSem2)?,
        assignments: metric(Field::Assignments)?,
        quizzes: metric(Field::Quizzes)?,
        lab_work: metric(Field::LabWork)?,
        extracurricular: metric(Field::Extracurricular)?,
    })
}

pub fn statistics(records: &[PredictionRecord]) -> Statistics {
    if records.is_empty() {
        return Statistics {
            total_predictions: 0,
            risk_distribution: BTreeMap::new(),
            average_score: 0.0,
        };
    }

    let mut risk_distribution: BTreeMap<String, usize> = RiskLevel::KNOWN
        .iter()
        .map(|level| (level.to_string(), 0))
        .collect();
    let mut total_score = 0.0;

    for record in records {
        *risk_distribution
            .entry(record.prediction.risk_level.to_string())
            .or_insert(0) += 1;
        total_score += record.prediction.score;
    }

    Statistics {
        total_predictions: records.len(),
        risk_distribution,
        average_score: round2(total_score / records.len() as f64),
    }
}

// Health check endpoint
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthStatus {
        status: "healthy".to_string(),
        message: "Student Performance Prediction System is running".to_string(),
        timestamp: Utc::now(),
    })
}

// Prediction endpoint
async fn predict(state: web::Data<ServiceState>, body: web::Json<Value>) -> HttpResponse {
    let submission = match parse_payload(&body) {
        Ok(submission) => submission,
        Err(err) => {
            log::warn!("rejected prediction request: {}", err.message());
            return HttpResponse::build(err.status()).json(ApiError::new(err.message()));
        }
    };

    let result = state.predictor.predict(&submission);
    log::info!(
        "predicted {} ({}) for roll number {}",
        result.risk_level,
        result.score,
        submission.roll_number
    );

    state.records.write().await.push(PredictionRecord {
        timestamp: Utc::now(),
        student_name: submission.student_name,
        roll_number: submission.roll_number,
        prediction: result.clone(),
    });

    HttpResponse::Ok().json(result)
}

async fn get_students(state: web::Data<ServiceState>) -> HttpResponse {
    let records = state.records.read().await;
    HttpResponse::Ok().json(StudentRecords {
        total: records.len(),
        records: records.clone(),
    })
}

async fn get_student(state: web::Data<ServiceState>, roll_number: web::Path<String>) -> HttpResponse {
    let records = state.records.read().await;
    match records.iter().find(|r| r.roll_number == *roll_number) {
        Some(record) => HttpResponse::Ok().json(record),
        None => HttpResponse::NotFound().json(ApiError::new("Student not found")),
    }
}

async fn get_statistics(state: web::Data<ServiceState>) -> HttpResponse {
    let records = state.records.read().await;
    HttpResponse::Ok().json(statistics(&records))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health_check))
            .route("/predict", web::post().to(predict))
            .route("/students", web::get().to(get_students))
            .route("/student/{roll_number}", web::get().to(get_student))
            .route("/statistics", web::get().to(get_statistics)),
    );
}

pub async fn run(config: ServerConfig) -> std::io::Result<()> {
    let state = web::Data::new(ServiceState::default());

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    });
    if let Some(workers) = config.workers {
        server = server.workers(workers);
    }

    log::info!(
        "Starting prediction service on http://{}:{}",
        config.host,
        config.port
    );
    server.bind((config.host.as_str(), config.port))?.run().await
}
