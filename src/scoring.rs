use ndarray::{arr1, Array1};
use std::collections::BTreeMap;

use crate::form::StudentSubmission;
use crate::models::{PredictionResult, RiskColor, RiskLevel};

#[derive(Debug, Clone)]
struct Weights {
    attendance: f64,
    exams: f64,
    assignments: f64,
    quizzes: f64,
    lab_work: f64,
    extracurricular: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            attendance: 0.25,
            exams: 0.30,
            assignments: 0.15,
            quizzes: 0.10,
            lab_work: 0.15,
            extracurricular: 0.05,
        }
    }
}

impl Weights {
    fn as_array(&self) -> Array1<f64> {
        arr1(&[
            self.attendance,
            self.exams,
            self.assignments,
            self.quizzes,
            self.lab_work,
            self.extracurricular,
        ])
    }
}

/// Breakdown keys, in the same order as the weight vector.
const COMPONENTS: [&str; 6] = [
    "attendance",
    "exams",
    "assignments",
    "quizzes",
    "labWork",
    "extracurricular",
];

struct Tier {
    floor: f64,
    level: RiskLevel,
    status: &'static str,
    color: RiskColor,
    recommendations: &'static [&'static str],
}

fn tiers() -> [Tier; 4] {
    [
        Tier {
            floor: 75.0,
            level: RiskLevel::Low,
            status: "Excellent Performance",
            color: RiskColor::Green,
            recommendations: &[
                "Continue maintaining good attendance",
                "Keep up the excellent work",
                "Consider mentoring struggling students",
                "Participate in advanced projects",
            ],
        },
        Tier {
            floor: 60.0,
            level: RiskLevel::Moderate,
            status: "Needs Improvement",
            color: RiskColor::Yellow,
            recommendations: &[
                "Improve attendance to above 85%",
                "Focus on assignment submissions",
                "Attend extra classes for weak subjects",
                "Form study groups with peers",
                "Review exam preparation strategies",
            ],
        },
        Tier {
            floor: 45.0,
            level: RiskLevel::High,
            status: "At Risk of Failing",
            color: RiskColor::Orange,
            recommendations: &[
                "Immediate intervention required",
                "Meet with academic advisor within 48 hours",
                "Attend all classes and tutorials",
                "Submit all pending assignments",
                "Consider peer tutoring programs",
                "Create a structured study schedule",
            ],
        },
        Tier {
            floor: f64::NEG_INFINITY,
            level: RiskLevel::Critical,
            status: "Severe Risk of Failure",
            color: RiskColor::Red,
            recommendations: &[
                "URGENT: Schedule meeting with HOD immediately",
                "Enroll in remedial classes",
                "Complete all pending work immediately",
                "Consider academic counseling",
                "Parents/Guardian meeting recommended",
                "May need to consider course withdrawal options",
            ],
        },
    ]
}

fn tier_for(score: f64) -> Tier {
    let [low, moderate, high, critical] = tiers();
    [low, moderate, high]
        .into_iter()
        .find(|tier| score >= tier.floor)
        .unwrap_or(critical)
}

/// Rounds to two decimals from the exact binary value, ties to even, so a
/// stored `59.995` (really 59.99499..) lands on 59.99 and not 60.0.
pub fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Weighted performance model behind `/api/predict`.
#[derive(Debug, Clone, Default)]
pub struct PerformancePredictor {
    weights: Weights,
}

impl PerformancePredictor {
    fn features(student: &StudentSubmission) -> Array1<f64> {
        arr1(&[
            student.attendance,
            exam_average(student),
            student.assignments,
            student.quizzes,
            student.lab_work,
            student.extracurricular,
        ])
    }

    pub fn predict(&self, student: &StudentSubmission) -> PredictionResult {
        let contributions = Self::features(student) * self.weights.as_array();
        // Left to right, so the total carries the same rounding error as a
        // plain running sum.
        let score = round2(contributions.iter().fold(0.0, |total, value| total + value));

        let breakdown: BTreeMap<String, f64> = COMPONENTS
            .iter()
            .zip(contributions.iter())
            .map(|(name, value)| (name.to_string(), round2(*value)))
            .collect();

        let tier = tier_for(score);

        PredictionResult {
            risk_level: tier.level,
            color: tier.color,
            status: tier.status.to_string(),
            score,
            breakdown,
            insights: insights(student),
            recommendations: tier.recommendations.iter().map(|r| r.to_string()).collect(),
        }
    }
}

fn exam_average(student: &StudentSubmission) -> f64 {
    (student.mid_sem1 + student.mid_sem2) / 2.0
}

fn insights(student: &StudentSubmission) -> Vec<String> {
    let mut insights = Vec::new();
    if student.attendance < 75.0 {
        insights.push("⚠️ Low attendance detected - Major concern".to_string());
    }
    if exam_average(student) < 50.0 {
        insights.push("⚠️ Poor exam performance - Needs immediate attention".to_string());
    }
    if student.assignments < 70.0 {
        insights.push("⚠️ Assignment completion needs improvement".to_string());
    }
    if student.lab_work < 70.0 {
        insights.push("⚠️ Lab work performance is below average".to_string());
    }
    insights
}
