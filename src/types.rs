use std::{fmt, str::FromStr};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row};

/// Storage and CSV format of `TuitionPayment::payment_date`.
pub const PAYMENT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: String,
    pub major: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Professor {
    pub id: String,
    pub name: String,
    pub email: String,
    pub department: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub credits: i64,
    pub professor_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Enrollment {
    pub id: i64,
    pub student_id: String,
    pub course_id: i64,
    pub grade: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Paid,
    Pending,
    Overdue,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 3] = [PaymentStatus::Paid, PaymentStatus::Pending, PaymentStatus::Overdue];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "paid",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Overdue => "overdue",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Overdue => "Overdue",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown payment status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for PaymentStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "paid" => Ok(PaymentStatus::Paid),
            "pending" => Ok(PaymentStatus::Pending),
            "overdue" => Ok(PaymentStatus::Overdue),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuitionPayment {
    pub id: i64,
    pub student_id: String,
    pub course_id: i64,
    pub amount_paid: f64,
    pub payment_date: NaiveDateTime,
    pub status: PaymentStatus,
}

pub fn format_payment_date(dt: &NaiveDateTime) -> String {
    dt.format(PAYMENT_DATE_FORMAT).to_string()
}

/// Accepts any fractional precision, including none.
pub fn parse_payment_date(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
}

impl<'r> sqlx::FromRow<'r, SqliteRow> for TuitionPayment {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let raw_date: String = row.try_get("payment_date")?;
        let payment_date = parse_payment_date(&raw_date).map_err(|e| sqlx::Error::ColumnDecode {
            index: "payment_date".to_string(),
            source: Box::new(e),
        })?;
        let raw_status: String = row.try_get("status")?;
        let status = raw_status.parse::<PaymentStatus>().map_err(|e| sqlx::Error::ColumnDecode {
            index: "status".to_string(),
            source: Box::new(e),
        })?;
        Ok(Self {
            id: row.try_get("id")?,
            student_id: row.try_get("student_id")?,
            course_id: row.try_get("course_id")?,
            amount_paid: row.try_get("amount_paid")?,
            payment_date,
            status,
        })
    }
}

// Insert payloads: rows before the store assigns a key.

#[derive(Debug, Clone, PartialEq)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub major: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProfessor {
    pub name: String,
    pub email: String,
    pub department: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCourse {
    pub name: String,
    pub code: String,
    pub credits: i64,
    pub professor_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewEnrollment {
    pub student_id: String,
    pub course_id: i64,
    pub grade: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPayment {
    pub student_id: String,
    pub course_id: i64,
    pub amount_paid: f64,
    pub status: PaymentStatus,
}

/// One `<option>` of a select field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

impl Choice {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self { value: value.into(), label: label.into() }
    }
}
