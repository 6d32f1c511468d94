use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
    /// Anything the service sends that is not one of the four tiers.
    Other(String),
}

impl RiskLevel {
    pub const KNOWN: [RiskLevel; 4] = [
        RiskLevel::Low,
        RiskLevel::Moderate,
        RiskLevel::High,
        RiskLevel::Critical,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            RiskLevel::Low => "Low Risk",
            RiskLevel::Moderate => "Moderate Risk",
            RiskLevel::High => "High Risk",
            RiskLevel::Critical => "Critical Risk",
            RiskLevel::Other(other) => other,
        }
    }
}

impl From<String> for RiskLevel {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Low Risk" => RiskLevel::Low,
            "Moderate Risk" => RiskLevel::Moderate,
            "High Risk" => RiskLevel::High,
            "Critical Risk" => RiskLevel::Critical,
            _ => RiskLevel::Other(value),
        }
    }
}

impl From<RiskLevel> for String {
    fn from(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RiskColor {
    Green,
    Yellow,
    Orange,
    Red,
    Other(String),
}

impl RiskColor {
    pub fn as_str(&self) -> &str {
        match self {
            RiskColor::Green => "green",
            RiskColor::Yellow => "yellow",
            RiskColor::Orange => "orange",
            RiskColor::Red => "red",
            RiskColor::Other(other) => other,
        }
    }
}

impl From<String> for RiskColor {
    fn from(value: String) -> Self {
        match value.as_str() {
            "green" => RiskColor::Green,
            "yellow" => RiskColor::Yellow,
            "orange" => RiskColor::Orange,
            "red" => RiskColor::Red,
            _ => RiskColor::Other(value),
        }
    }
}

impl From<RiskColor> for String {
    fn from(color: RiskColor) -> Self {
        match color {
            RiskColor::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

/// Response body of `POST /api/predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub risk_level: RiskLevel,
    pub color: RiskColor,
    pub status: String,
    pub score: f64,
    pub breakdown: BTreeMap<String, f64>,
    #[serde(default)]
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub timestamp: DateTime<Utc>,
    pub student_name: String,
    pub roll_number: String,
    pub prediction: PredictionResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecords {
    pub total: usize,
    pub records: Vec<PredictionRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_predictions: usize,
    pub risk_distribution: BTreeMap<String, usize>,
    pub average_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}
