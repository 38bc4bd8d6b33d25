use sqlx::SqliteConnection;

use crate::error::{AppResult, OptionExt};
use crate::types::{Enrollment, NewEnrollment};

pub async fn list(conn: &mut SqliteConnection) -> AppResult<Vec<Enrollment>> {
    let rows = sqlx::query_as::<_, Enrollment>(
        "SELECT id, student_id, course_id, grade FROM enrollments ORDER BY id",
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}

pub async fn get(conn: &mut SqliteConnection, id: i64) -> AppResult<Option<Enrollment>> {
    let row = sqlx::query_as::<_, Enrollment>(
        "SELECT id, student_id, course_id, grade FROM enrollments WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row)
}

pub async fn find(conn: &mut SqliteConnection, id: i64) -> AppResult<Enrollment> {
    get(conn, id).await?.ok_or_not_found("Enrollment")
}

pub async fn create(conn: &mut SqliteConnection, new: &NewEnrollment) -> AppResult<Enrollment> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO enrollments (student_id, course_id, grade) VALUES (?1, ?2, ?3) RETURNING id",
    )
    .bind(&new.student_id)
    .bind(new.course_id)
    .bind(new.grade.as_deref())
    .fetch_one(&mut *conn)
    .await?;
    Ok(Enrollment {
        id,
        student_id: new.student_id.clone(),
        course_id: new.course_id,
        grade: new.grade.clone(),
    })
}

pub async fn insert(conn: &mut SqliteConnection, enrollment: &Enrollment) -> AppResult<()> {
    sqlx::query("INSERT INTO enrollments (id, student_id, course_id, grade) VALUES (?1, ?2, ?3, ?4)")
        .bind(enrollment.id)
        .bind(&enrollment.student_id)
        .bind(enrollment.course_id)
        .bind(enrollment.grade.as_deref())
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn update(conn: &mut SqliteConnection, id: i64, new: &NewEnrollment) -> AppResult<Enrollment> {
    let mut enrollment = find(conn, id).await?;
    enrollment.student_id = new.student_id.clone();
    enrollment.course_id = new.course_id;
    enrollment.grade = new.grade.clone();
    sqlx::query("UPDATE enrollments SET student_id = ?2, course_id = ?3, grade = ?4 WHERE id = ?1")
        .bind(enrollment.id)
        .bind(&enrollment.student_id)
        .bind(enrollment.course_id)
        .bind(enrollment.grade.as_deref())
        .execute(&mut *conn)
        .await?;
    Ok(enrollment)
}

/// Nothing references an enrollment, so there is no policy to apply.
pub async fn delete(conn: &mut SqliteConnection, id: i64) -> AppResult<()> {
    let enrollment = find(conn, id).await?;
    sqlx::query("DELETE FROM enrollments WHERE id = ?1")
        .bind(enrollment.id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
