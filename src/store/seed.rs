//! Demo records for an empty database.

use chrono::NaiveDateTime;
use sqlx::SqliteConnection;
use tracing::info;

use super::{courses, enrollments, payments, professors, students};
use crate::error::AppResult;
use crate::types::{NewCourse, NewEnrollment, NewPayment, NewProfessor, NewStudent, PaymentStatus};

const PROFESSORS: [(&str, &str, &str); 3] = [
    ("Dr. John Smith", "john.smith@university.edu", "Computer Science"),
    ("Dr. Jane Doe", "jane.doe@university.edu", "Mathematics"),
    ("Dr. Bob Johnson", "bob.johnson@university.edu", "Physics"),
];

const STUDENTS: [(&str, &str, &str); 4] = [
    ("Alice Wilson", "alice.wilson@student.edu", "Computer Science"),
    ("Charlie Brown", "charlie.brown@student.edu", "Mathematics"),
    ("Diana Prince", "diana.prince@student.edu", "Physics"),
    ("Eve Adams", "eve.adams@student.edu", "Computer Science"),
];

/// (name, code, credits, index into PROFESSORS)
const COURSES: [(&str, &str, i64, usize); 5] = [
    ("Introduction to Programming", "CS101", 3, 0),
    ("Calculus I", "MATH101", 4, 1),
    ("Physics Fundamentals", "PHYS101", 3, 2),
    ("Data Structures", "CS201", 3, 0),
    ("Linear Algebra", "MATH201", 3, 1),
];

/// (student index, course index, grade, payment status)
const ENROLLMENTS: [(usize, usize, &str, PaymentStatus); 7] = [
    (0, 0, "A", PaymentStatus::Paid),
    (0, 3, "B+", PaymentStatus::Paid),
    (1, 1, "A-", PaymentStatus::Paid),
    (1, 4, "B", PaymentStatus::Pending),
    (2, 2, "A", PaymentStatus::Paid),
    (3, 0, "B", PaymentStatus::Overdue),
    (3, 3, "A-", PaymentStatus::Paid),
];

const FEE_PER_CREDIT: f64 = 20.0;

/// Fills an empty database with sample professors, students, courses, enrollments
/// and one payment per enrollment. Returns `false` and writes nothing when students
/// or professors already exist. Run it inside a transaction so a failure leaves
/// no partial data.
pub async fn seed(conn: &mut SqliteConnection, now: NaiveDateTime) -> AppResult<bool> {
    let existing = sqlx::query_scalar::<_, i64>("SELECT (SELECT COUNT(*) FROM students) + (SELECT COUNT(*) FROM professors)")
        .fetch_one(&mut *conn)
        .await?;
    if existing > 0 {
        info!("Skipping sample data: database already holds {} people", existing);
        return Ok(false);
    }

    let mut professor_ids = Vec::with_capacity(PROFESSORS.len());
    for (name, email, department) in PROFESSORS {
        let new = NewProfessor { name: name.to_string(), email: email.to_string(), department: department.to_string() };
        professor_ids.push(professors::create(conn, &new).await?.id);
    }

    let mut student_ids = Vec::with_capacity(STUDENTS.len());
    for (name, email, major) in STUDENTS {
        let new = NewStudent { name: name.to_string(), email: email.to_string(), major: major.to_string() };
        student_ids.push(students::create(conn, &new).await?.id);
    }

    let mut course_rows = Vec::with_capacity(COURSES.len());
    for (name, code, credits, professor) in COURSES {
        let new = NewCourse {
            name: name.to_string(),
            code: code.to_string(),
            credits,
            professor_id: professor_ids[professor].clone(),
        };
        course_rows.push(courses::create(conn, &new).await?);
    }

    for (student, course, grade, status) in ENROLLMENTS {
        let course = &course_rows[course];
        let student_id = student_ids[student].clone();
        let enrollment =
            NewEnrollment { student_id: student_id.clone(), course_id: course.id, grade: Some(grade.to_string()) };
        enrollments::create(conn, &enrollment).await?;

        let payment = NewPayment {
            student_id,
            course_id: course.id,
            amount_paid: course.credits as f64 * FEE_PER_CREDIT,
            status,
        };
        payments::create(conn, &payment, now).await?;
    }

    info!(
        "Seeded {} professors, {} students, {} courses, {} enrollments",
        professor_ids.len(),
        student_ids.len(),
        course_rows.len(),
        ENROLLMENTS.len()
    );
    Ok(true)
}
