//! Column mapping between records and their CSV export/import files.

use chrono::NaiveDateTime;

use crate::csv::{self, CsvError, CsvWriter};
use crate::types::{
    format_payment_date, parse_payment_date, Course, Enrollment, PaymentStatus, Professor, Student, TuitionPayment,
};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ImportError {
    #[error(transparent)]
    Csv(#[from] CsvError),
    #[error("row {row}: column '{column}' is not a valid integer: '{value}'")]
    InvalidInteger { row: usize, column: &'static str, value: String },
    #[error("row {row}: column '{column}' is not a valid number: '{value}'")]
    InvalidNumber { row: usize, column: &'static str, value: String },
    #[error("row {row}: payment date '{value}' does not match YYYY-MM-DD HH:MM:SS.ffffff")]
    InvalidDate { row: usize, value: String },
    #[error("row {row}: unknown payment status '{value}'")]
    InvalidStatus { row: usize, value: String },
}

/// A record type with a fixed CSV layout.
pub trait CsvRecord: Sized {
    /// Download name, e.g. `students.csv`.
    const FILE_NAME: &'static str;
    const HEADER: &'static [&'static str];
    /// Shorter rows are skipped on import.
    const MIN_COLUMNS: usize;

    fn to_fields(&self) -> Vec<String>;

    /// Builds a record from one data row. `row` is the 1-based data row number and
    /// `now` stands in for missing timestamps.
    fn from_fields(fields: &[String], row: usize, now: NaiveDateTime) -> Result<Self, ImportError>;
}

fn int_field(fields: &[String], idx: usize, column: &'static str, row: usize) -> Result<i64, ImportError> {
    let raw = fields[idx].trim();
    raw.parse::<i64>().map_err(|_| ImportError::InvalidInteger { row, column, value: raw.to_string() })
}

fn float_field(fields: &[String], idx: usize, column: &'static str, row: usize) -> Result<f64, ImportError> {
    let raw = fields[idx].trim();
    raw.parse::<f64>().map_err(|_| ImportError::InvalidNumber { row, column, value: raw.to_string() })
}

/// Renders an amount with at least one decimal, e.g. `60.0`.
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 && amount.abs() < 1e15 {
        format!("{:.1}", amount)
    } else {
        format!("{}", amount)
    }
}

impl CsvRecord for Student {
    const FILE_NAME: &'static str = "students.csv";
    const HEADER: &'static [&'static str] = &["ID", "Name", "Email", "Major"];
    const MIN_COLUMNS: usize = 4;

    fn to_fields(&self) -> Vec<String> {
        vec![self.id.clone(), self.name.clone(), self.email.clone(), self.major.clone()]
    }

    fn from_fields(f: &[String], _row: usize, _now: NaiveDateTime) -> Result<Self, ImportError> {
        Ok(Student { id: f[0].clone(), name: f[1].clone(), email: f[2].clone(), major: f[3].clone() })
    }
}

impl CsvRecord for Professor {
    const FILE_NAME: &'static str = "professors.csv";
    const HEADER: &'static [&'static str] = &["ID", "Name", "Email", "Department"];
    const MIN_COLUMNS: usize = 4;

    fn to_fields(&self) -> Vec<String> {
        vec![self.id.clone(), self.name.clone(), self.email.clone(), self.department.clone()]
    }

    fn from_fields(f: &[String], _row: usize, _now: NaiveDateTime) -> Result<Self, ImportError> {
        Ok(Professor { id: f[0].clone(), name: f[1].clone(), email: f[2].clone(), department: f[3].clone() })
    }
}

impl CsvRecord for Course {
    const FILE_NAME: &'static str = "courses.csv";
    const HEADER: &'static [&'static str] = &["ID", "Name", "Code", "Credits", "Professor ID"];
    const MIN_COLUMNS: usize = 5;

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.code.clone(),
            self.credits.to_string(),
            self.professor_id.clone(),
        ]
    }

    fn from_fields(f: &[String], row: usize, _now: NaiveDateTime) -> Result<Self, ImportError> {
        Ok(Course {
            id: int_field(f, 0, "ID", row)?,
            name: f[1].clone(),
            code: f[2].clone(),
            credits: int_field(f, 3, "Credits", row)?,
            professor_id: f[4].clone(),
        })
    }
}

impl CsvRecord for Enrollment {
    const FILE_NAME: &'static str = "enrollments.csv";
    const HEADER: &'static [&'static str] = &["ID", "Student ID", "Course ID", "Grade"];
    const MIN_COLUMNS: usize = 4;

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.student_id.clone(),
            self.course_id.to_string(),
            self.grade.clone().unwrap_or_default(),
        ]
    }

    fn from_fields(f: &[String], row: usize, _now: NaiveDateTime) -> Result<Self, ImportError> {
        Ok(Enrollment {
            id: int_field(f, 0, "ID", row)?,
            student_id: f[1].clone(),
            course_id: int_field(f, 2, "Course ID", row)?,
            grade: if f[3].is_empty() { None } else { Some(f[3].clone()) },
        })
    }
}

impl CsvRecord for TuitionPayment {
    const FILE_NAME: &'static str = "payments.csv";
    const HEADER: &'static [&'static str] =
        &["ID", "Student ID", "Course ID", "Amount Paid", "Payment Date", "Status"];
    const MIN_COLUMNS: usize = 6;

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.student_id.clone(),
            self.course_id.to_string(),
            format_amount(self.amount_paid),
            format_payment_date(&self.payment_date),
            self.status.to_string(),
        ]
    }

    fn from_fields(f: &[String], row: usize, now: NaiveDateTime) -> Result<Self, ImportError> {
        let raw_date = f[4].trim();
        let payment_date = if raw_date.is_empty() {
            now
        } else {
            parse_payment_date(raw_date).map_err(|_| ImportError::InvalidDate { row, value: raw_date.to_string() })?
        };
        let status = f[5]
            .trim()
            .parse::<PaymentStatus>()
            .map_err(|e| ImportError::InvalidStatus { row, value: e.0 })?;
        Ok(TuitionPayment {
            id: int_field(f, 0, "ID", row)?,
            student_id: f[1].clone(),
            course_id: int_field(f, 2, "Course ID", row)?,
            amount_paid: float_field(f, 3, "Amount Paid", row)?,
            payment_date,
            status,
        })
    }
}

/// Renders `records` as a CSV document with the record's header row.
pub fn export<R: CsvRecord>(records: &[R]) -> String {
    let mut w = CsvWriter::new();
    w.write_row(R::HEADER.iter().copied());
    for record in records {
        w.write_row(record.to_fields());
    }
    w.finish()
}

/// Parses an uploaded CSV document. The first row is the header and is skipped
/// without checking its contents; rows shorter than `R::MIN_COLUMNS` are ignored.
/// Any malformed field fails the whole document.
pub fn parse_import<R: CsvRecord>(text: &str, now: NaiveDateTime) -> Result<Vec<R>, ImportError> {
    let rows = csv::parse(text)?;
    let mut records = Vec::with_capacity(rows.len().saturating_sub(1));
    for (idx, fields) in rows.iter().enumerate().skip(1) {
        if fields.len() < R::MIN_COLUMNS {
            tracing::debug!("Skipping short row {} in {} ({} columns)", idx, R::FILE_NAME, fields.len());
            continue;
        }
        records.push(R::from_fields(fields, idx, now)?);
    }
    Ok(records)
}
