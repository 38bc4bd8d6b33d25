use sqlx::SqliteConnection;

use super::{check_policy, count_text, ids, non_zero, Dependents};
use crate::config::DeletePolicy;
use crate::error::{AppResult, OptionExt};
use crate::types::{NewStudent, Student};

pub async fn list(conn: &mut SqliteConnection) -> AppResult<Vec<Student>> {
    let rows = sqlx::query_as::<_, Student>("SELECT id, name, email, major FROM students ORDER BY id")
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows)
}

pub async fn get(conn: &mut SqliteConnection, id: &str) -> AppResult<Option<Student>> {
    let row = sqlx::query_as::<_, Student>("SELECT id, name, email, major FROM students WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

pub async fn find(conn: &mut SqliteConnection, id: &str) -> AppResult<Student> {
    get(conn, id).await?.ok_or_not_found("Student")
}

/// Inserts a new student under a freshly allocated id.
pub async fn create(conn: &mut SqliteConnection, new: &NewStudent) -> AppResult<Student> {
    let id = ids::allocate(conn, ids::IdKind::Student).await?;
    let student = Student {
        id,
        name: new.name.clone(),
        email: new.email.clone(),
        major: new.major.clone(),
    };
    insert(conn, &student).await?;
    Ok(student)
}

/// Inserts a student with the id it already carries.
pub async fn insert(conn: &mut SqliteConnection, student: &Student) -> AppResult<()> {
    sqlx::query("INSERT INTO students (id, name, email, major) VALUES (?1, ?2, ?3, ?4)")
        .bind(&student.id)
        .bind(&student.name)
        .bind(&student.email)
        .bind(&student.major)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn update(conn: &mut SqliteConnection, id: &str, new: &NewStudent) -> AppResult<Student> {
    let mut student = find(conn, id).await?;
    student.name = new.name.clone();
    student.email = new.email.clone();
    student.major = new.major.clone();
    sqlx::query("UPDATE students SET name = ?2, email = ?3, major = ?4 WHERE id = ?1")
        .bind(&student.id)
        .bind(&student.name)
        .bind(&student.email)
        .bind(&student.major)
        .execute(&mut *conn)
        .await?;
    Ok(student)
}

pub async fn dependents(conn: &mut SqliteConnection, id: &str) -> AppResult<Dependents> {
    let enrollments = count_text(conn, "enrollments", "student_id", id).await?;
    let payments = count_text(conn, "tuition_payments", "student_id", id).await?;
    Ok(non_zero([("enrollments", enrollments), ("payments", payments)]))
}

pub async fn delete(conn: &mut SqliteConnection, id: &str, policy: DeletePolicy) -> AppResult<()> {
    let student = find(conn, id).await?;
    let deps = dependents(conn, &student.id).await?;
    check_policy(policy, "Student", &student.id, &deps)?;
    if policy == DeletePolicy::Cascade {
        sqlx::query("DELETE FROM enrollments WHERE student_id = ?1")
            .bind(&student.id)
            .execute(&mut *conn)
            .await?;
        sqlx::query("DELETE FROM tuition_payments WHERE student_id = ?1")
            .bind(&student.id)
            .execute(&mut *conn)
            .await?;
    }
    sqlx::query("DELETE FROM students WHERE id = ?1")
        .bind(&student.id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
