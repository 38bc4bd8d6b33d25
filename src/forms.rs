//! Per-entity form input and validation.
//!
//! Every form deserializes from `application/x-www-form-urlencoded` with all fields as
//! strings, so a malformed number is reported next to its field instead of rejecting
//! the whole request. `validate` returns the typed insert payload or the list of
//! field errors to show when the form is re-rendered.

use serde::{Deserialize, Serialize};

use crate::transfer::format_amount;
use crate::types::{
    Choice, Course, Enrollment, NewCourse, NewEnrollment, NewPayment, NewProfessor, NewStudent, PaymentStatus,
    Professor, Student, TuitionPayment,
};

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str = "Not a valid choice.";
pub const INVALID_INTEGER: &str = "Not a valid integer value.";
pub const INVALID_DECIMAL: &str = "Not a valid decimal value.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

pub type FieldErrors = Vec<FieldError>;

/// Collects field errors while pulling typed values out of raw input.
#[derive(Default)]
struct Checker {
    errors: FieldErrors,
}

impl Checker {
    fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError { field: field.to_string(), message: message.into() });
    }

    /// Required text of `min..=max` characters.
    fn text(&mut self, field: &str, raw: &str, min: usize, max: usize) -> String {
        let value = raw.trim();
        if value.is_empty() {
            self.fail(field, REQUIRED);
            return String::new();
        }
        let len = value.chars().count();
        if len < min || len > max {
            self.fail(field, format!("Field must be between {} and {} characters long.", min, max));
        }
        value.to_string()
    }

    /// Optional text of at most `max` characters; empty input is `None`.
    fn optional_text(&mut self, field: &str, raw: &str, max: usize) -> Option<String> {
        let value = raw.trim();
        if value.is_empty() {
            return None;
        }
        if value.chars().count() > max {
            self.fail(field, format!("Field cannot be longer than {} characters.", max));
        }
        Some(value.to_string())
    }

    /// Required non-zero integer.
    fn integer(&mut self, field: &str, raw: &str) -> i64 {
        let value = raw.trim();
        if value.is_empty() {
            self.fail(field, REQUIRED);
            return 0;
        }
        match value.parse::<i64>() {
            Ok(0) => {
                self.fail(field, REQUIRED);
                0
            }
            Ok(n) => n,
            Err(_) => {
                self.fail(field, INVALID_INTEGER);
                0
            }
        }
    }

    /// Required non-zero finite decimal.
    fn amount(&mut self, field: &str, raw: &str) -> f64 {
        let value = raw.trim();
        if value.is_empty() {
            self.fail(field, REQUIRED);
            return 0.0;
        }
        match value.parse::<f64>() {
            Ok(n) if !n.is_finite() => {
                self.fail(field, INVALID_DECIMAL);
                0.0
            }
            Ok(n) if n == 0.0 => {
                self.fail(field, REQUIRED);
                0.0
            }
            Ok(n) => n,
            Err(_) => {
                self.fail(field, INVALID_DECIMAL);
                0.0
            }
        }
    }

    /// Required value that must be one of `choices`.
    fn choice(&mut self, field: &str, raw: &str, choices: &[Choice]) -> String {
        let value = raw.trim();
        if value.is_empty() {
            self.fail(field, REQUIRED);
            return String::new();
        }
        if !choices.iter().any(|c| c.value == value) {
            self.fail(field, INVALID_CHOICE);
        }
        value.to_string()
    }

    /// Required choice whose value is an integer key.
    fn int_choice(&mut self, field: &str, raw: &str, choices: &[Choice]) -> i64 {
        let before = self.errors.len();
        let value = self.choice(field, raw, choices);
        if self.errors.len() > before {
            return 0;
        }
        match value.parse::<i64>() {
            Ok(n) => n,
            Err(_) => {
                self.fail(field, INVALID_CHOICE);
                0
            }
        }
    }

    fn finish<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self.errors)
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentForm {
    pub name: String,
    pub email: String,
    pub major: String,
}

impl StudentForm {
    pub fn from_record(s: &Student) -> Self {
        Self { name: s.name.clone(), email: s.email.clone(), major: s.major.clone() }
    }

    pub fn validate(&self) -> Result<NewStudent, FieldErrors> {
        let mut c = Checker::default();
        let name = c.text("name", &self.name, 1, 100);
        let email = c.text("email", &self.email, 1, 100);
        let major = c.text("major", &self.major, 1, 100);
        c.finish(NewStudent { name, email, major })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfessorForm {
    pub name: String,
    pub email: String,
    pub department: String,
}

impl ProfessorForm {
    pub fn from_record(p: &Professor) -> Self {
        Self { name: p.name.clone(), email: p.email.clone(), department: p.department.clone() }
    }

    pub fn validate(&self) -> Result<NewProfessor, FieldErrors> {
        let mut c = Checker::default();
        let name = c.text("name", &self.name, 1, 100);
        let email = c.text("email", &self.email, 1, 100);
        let department = c.text("department", &self.department, 1, 100);
        c.finish(NewProfessor { name, email, department })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseForm {
    pub name: String,
    pub code: String,
    pub credits: String,
    pub professor_id: String,
}

impl Default for CourseForm {
    fn default() -> Self {
        Self { name: String::new(), code: String::new(), credits: "3".to_string(), professor_id: String::new() }
    }
}

impl CourseForm {
    pub fn from_record(c: &Course) -> Self {
        Self {
            name: c.name.clone(),
            code: c.code.clone(),
            credits: c.credits.to_string(),
            professor_id: c.professor_id.clone(),
        }
    }

    pub fn validate(&self, professors: &[Choice]) -> Result<NewCourse, FieldErrors> {
        let mut c = Checker::default();
        let name = c.text("name", &self.name, 1, 100);
        let code = c.text("code", &self.code, 1, 20);
        let credits = c.integer("credits", &self.credits);
        let professor_id = c.choice("professor_id", &self.professor_id, professors);
        c.finish(NewCourse { name, code, credits, professor_id })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrollmentForm {
    pub student_id: String,
    pub course_id: String,
    pub grade: String,
}

impl EnrollmentForm {
    pub fn from_record(e: &Enrollment) -> Self {
        Self {
            student_id: e.student_id.clone(),
            course_id: e.course_id.to_string(),
            grade: e.grade.clone().unwrap_or_default(),
        }
    }

    pub fn validate(&self, students: &[Choice], courses: &[Choice]) -> Result<NewEnrollment, FieldErrors> {
        let mut c = Checker::default();
        let student_id = c.choice("student_id", &self.student_id, students);
        let course_id = c.int_choice("course_id", &self.course_id, courses);
        let grade = c.optional_text("grade", &self.grade, 2);
        c.finish(NewEnrollment { student_id, course_id, grade })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentForm {
    pub student_id: String,
    pub course_id: String,
    pub amount_paid: String,
    pub status: String,
}

impl Default for PaymentForm {
    fn default() -> Self {
        Self {
            student_id: String::new(),
            course_id: String::new(),
            amount_paid: String::new(),
            status: PaymentStatus::Paid.as_str().to_string(),
        }
    }
}

impl PaymentForm {
    pub fn from_record(p: &TuitionPayment) -> Self {
        Self {
            student_id: p.student_id.clone(),
            course_id: p.course_id.to_string(),
            amount_paid: format_amount(p.amount_paid),
            status: p.status.as_str().to_string(),
        }
    }

    pub fn status_choices() -> Vec<Choice> {
        PaymentStatus::ALL.iter().map(|s| Choice::new(s.as_str(), s.label())).collect()
    }

    pub fn validate(&self, students: &[Choice], courses: &[Choice]) -> Result<NewPayment, FieldErrors> {
        let mut c = Checker::default();
        let student_id = c.choice("student_id", &self.student_id, students);
        let course_id = c.int_choice("course_id", &self.course_id, courses);
        let amount_paid = c.amount("amount_paid", &self.amount_paid);
        let status = c.choice("status", &self.status, &Self::status_choices());
        let status = status.parse::<PaymentStatus>().unwrap_or_default();
        c.finish(NewPayment { student_id, course_id, amount_paid, status })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(errors: &FieldErrors) -> Vec<&str> {
        errors.iter().map(|e| e.field.as_str()).collect()
    }

    #[test]
    fn student_form_accepts_trimmed_values() {
        let form = StudentForm { name: "  Ann ".into(), email: "ann@x.edu".into(), major: "CS".into() };
        let new = form.validate().unwrap();
        assert_eq!(new.name, "Ann");
        assert_eq!(new.major, "CS");
    }

    #[test]
    fn student_form_reports_every_missing_field() {
        let errors = StudentForm::default().validate().unwrap_err();
        assert_eq!(fields(&errors), vec!["name", "email", "major"]);
        assert!(errors.iter().all(|e| e.message == REQUIRED));
    }

    #[test]
    fn professor_form_enforces_length() {
        let form = ProfessorForm { name: "x".repeat(101), email: "p@u.edu".into(), department: "Math".into() };
        let errors = form.validate().unwrap_err();
        assert_eq!(fields(&errors), vec!["name"]);
        assert!(errors[0].message.contains("between 1 and 100"));
    }

    #[test]
    fn course_form_checks_code_credits_and_professor() {
        let professors = vec![Choice::new("i0001", "Dr. Smith")];
        let form = CourseForm {
            name: "Intro".into(),
            code: "C".repeat(21),
            credits: "three".into(),
            professor_id: "i0009".into(),
        };
        let errors = form.validate(&professors).unwrap_err();
        assert_eq!(fields(&errors), vec!["code", "credits", "professor_id"]);
        assert_eq!(errors[1].message, INVALID_INTEGER);
        assert_eq!(errors[2].message, INVALID_CHOICE);

        let ok = CourseForm { code: "CS101".into(), professor_id: "i0001".into(), name: "Intro".into(), ..Default::default() };
        let new = ok.validate(&professors).unwrap();
        assert_eq!(new.credits, 3);
    }

    #[test]
    fn zero_credits_count_as_missing() {
        let professors = vec![Choice::new("i0001", "Dr. Smith")];
        let form = CourseForm {
            name: "Intro".into(),
            code: "CS101".into(),
            credits: "0".into(),
            professor_id: "i0001".into(),
        };
        let errors = form.validate(&professors).unwrap_err();
        assert_eq!(errors[0].message, REQUIRED);
    }

    #[test]
    fn enrollment_grade_is_optional_but_bounded() {
        let students = vec![Choice::new("s0001", "Ann")];
        let courses = vec![Choice::new("1", "Intro")];
        let form = EnrollmentForm { student_id: "s0001".into(), course_id: "1".into(), grade: String::new() };
        assert_eq!(form.validate(&students, &courses).unwrap().grade, None);

        let form = EnrollmentForm { grade: "B+".into(), ..form };
        assert_eq!(form.validate(&students, &courses).unwrap().grade.as_deref(), Some("B+"));

        let form = EnrollmentForm { grade: "A++".into(), ..form };
        let errors = form.validate(&students, &courses).unwrap_err();
        assert_eq!(fields(&errors), vec!["grade"]);
    }

    #[test]
    fn payment_form_requires_known_status_and_amount() {
        let students = vec![Choice::new("s0001", "Ann")];
        let courses = vec![Choice::new("4", "Intro (CS101)")];
        let form = PaymentForm {
            student_id: "s0001".into(),
            course_id: "4".into(),
            amount_paid: "60".into(),
            status: "pending".into(),
        };
        let new = form.validate(&students, &courses).unwrap();
        assert_eq!(new.amount_paid, 60.0);
        assert_eq!(new.status, PaymentStatus::Pending);

        let bad = PaymentForm { status: "refunded".into(), amount_paid: String::new(), ..form.clone() };
        let errors = bad.validate(&students, &courses).unwrap_err();
        assert_eq!(fields(&errors), vec!["amount_paid", "status"]);

        let bad = PaymentForm { amount_paid: "sixty".into(), ..form };
        let errors = bad.validate(&students, &courses).unwrap_err();
        assert_eq!(errors[0].message, INVALID_DECIMAL);
    }

    #[test]
    fn payment_edit_form_keeps_fractional_amount() {
        let payment = TuitionPayment {
            id: 7,
            student_id: "s0001".into(),
            course_id: 4,
            amount_paid: 60.5,
            payment_date: chrono::NaiveDate::from_ymd_opt(2024, 9, 1).unwrap().and_hms_opt(8, 0, 0).unwrap(),
            status: PaymentStatus::Paid,
        };
        let form = PaymentForm::from_record(&payment);
        assert_eq!(form.amount_paid, "60.5");

        let students = vec![Choice::new("s0001", "Ann")];
        let courses = vec![Choice::new("4", "Intro (CS101)")];
        assert_eq!(form.validate(&students, &courses).unwrap().amount_paid, 60.5);

        let whole = PaymentForm::from_record(&TuitionPayment { amount_paid: 60.0, ..payment });
        assert_eq!(whole.amount_paid, "60.0");
        assert_eq!(whole.validate(&students, &courses).unwrap().amount_paid, 60.0);
    }
}
