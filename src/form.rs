use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{UnknownField, ValidationError};

pub const METRIC_MIN: f64 = 0.0;
pub const METRIC_MAX: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    StudentName,
    RollNumber,
    Attendance,
    MidSem1,
    MidSem2,
    Assignments,
    Quizzes,
    LabWork,
    Extracurricular,
}

impl Field {
    /// Canonical order, also the order in which missing fields are reported.
    pub const ALL: [Field; 9] = [
        Field::StudentName,
        Field::RollNumber,
        Field::Attendance,
        Field::MidSem1,
        Field::MidSem2,
        Field::Assignments,
        Field::Quizzes,
        Field::LabWork,
        Field::Extracurricular,
    ];

    /// Key used on the wire and as the form input name.
    pub fn key(self) -> &'static str {
        match self {
            Field::StudentName => "studentName",
            Field::RollNumber => "rollNumber",
            Field::Attendance => "attendance",
            Field::MidSem1 => "midSem1",
            Field::MidSem2 => "midSem2",
            Field::Assignments => "assignments",
            Field::Quizzes => "quizzes",
            Field::LabWork => "labWork",
            Field::Extracurricular => "extracurricular",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::StudentName => "Student Name",
            Field::RollNumber => "Roll Number",
            Field::Attendance => "Attendance (%)",
            Field::MidSem1 => "Mid-Sem 1 (%)",
            Field::MidSem2 => "Mid-Sem 2 (%)",
            Field::Assignments => "Assignments (%)",
            Field::Quizzes => "Quizzes (%)",
            Field::LabWork => "Lab Work (%)",
            Field::Extracurricular => "Extracurricular (%)",
        }
    }

    pub fn is_metric(self) -> bool {
        !matches!(self, Field::StudentName | Field::RollNumber)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.key() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// Form contents exactly as typed. Every field starts empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentInput {
    pub student_name: String,
    pub roll_number: String,
    pub attendance: String,
    pub mid_sem1: String,
    pub mid_sem2: String,
    pub assignments: String,
    pub quizzes: String,
    pub lab_work: String,
    pub extracurricular: String,
}

impl StudentInput {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::StudentName => &self.student_name,
            Field::RollNumber => &self.roll_number,
            Field::Attendance => &self.attendance,
            Field::MidSem1 => &self.mid_sem1,
            Field::MidSem2 => &self.mid_sem2,
            Field::Assignments => &self.assignments,
            Field::Quizzes => &self.quizzes,
            Field::LabWork => &self.lab_work,
            Field::Extracurricular => &self.extracurricular,
        }
    }

    fn slot(&mut self, field: Field) -> &mut String {
        match field {
            Field::StudentName => &mut self.student_name,
            Field::RollNumber => &mut self.roll_number,
            Field::Attendance => &mut self.attendance,
            Field::MidSem1 => &mut self.mid_sem1,
            Field::MidSem2 => &mut self.mid_sem2,
            Field::Assignments => &mut self.assignments,
            Field::Quizzes => &mut self.quizzes,
            Field::LabWork => &mut self.lab_work,
            Field::Extracurricular => &mut self.extracurricular,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        *self.slot(field) = value.into();
    }

    pub fn is_empty(&self) -> bool {
        Field::ALL.into_iter().all(|field| self.get(field).is_empty())
    }

    /// Applies the same constraints the form inputs enforce (required,
    /// numeric, 0-100) and coerces the metrics to numbers.
    pub fn validate(&self) -> Result<StudentSubmission, ValidationError> {
        for field in Field::ALL {
            if self.get(field).is_empty() {
                return Err(ValidationError::MissingField(field));
            }
        }

        Ok(StudentSubmission {
            student_name: self.student_name.clone(),
            roll_number: self.roll_number.clone(),
            attendance: parse_metric(Field::Attendance, &self.attendance)?,
            mid_sem1: parse_metric(Field::MidSem1, &self.mid_sem1)?,
            mid_sem2: parse_metric(Field::MidSem2, &self.mid_sem2)?,
            assignments: parse_metric(Field::Assignments, &self.assignments)?,
            quizzes: parse_metric(Field::Quizzes, &self.quizzes)?,
            lab_work: parse_metric(Field::LabWork, &self.lab_work)?,
            extracurricular: parse_metric(Field::Extracurricular, &self.extracurricular)?,
        })
    }
}

pub fn parse_metric(field: Field, raw: &str) -> Result<f64, ValidationError> {
    let value: f64 = raw
        .trim()
        .parse()
        .ok()
        .filter(|v: &f64| v.is_finite())
        .ok_or_else(|| ValidationError::NotANumber {
            field,
            value: raw.to_string(),
        })?;

    if !(METRIC_MIN..=METRIC_MAX).contains(&value) {
        return Err(ValidationError::OutOfRange { field, value });
    }
    Ok(value)
}

/// Request body for `POST /api/predict`.
///
/// Metrics are coerced before they leave the adapter, so the service always
/// receives JSON numbers rather than the raw text captured by the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSubmission {
    pub student_name: String,
    pub roll_number: String,
    pub attendance: f64,
    pub mid_sem1: f64,
    pub mid_sem2: f64,
    pub assignments: f64,
    pub quizzes: f64,
    pub lab_work: f64,
    pub extracurricular: f64,
}

#[cfg(test)]
pub(crate) fn sample_input() -> StudentInput {
    StudentInput {
        student_name: "Jane Doe".to_string(),
        roll_number: "21/CSE/001".to_string(),
        attendance: "95".to_string(),
        mid_sem1: "80".to_string(),
        mid_sem2: "85".to_string(),
        assignments: "90".to_string(),
        quizzes: "88".to_string(),
        lab_work: "92".to_string(),
        extracurricular: "70".to_string(),
    }
}
