use sqlx::SqliteConnection;

use super::{check_policy, count_int, non_zero, Dependents};
use crate::config::DeletePolicy;
use crate::error::{AppResult, OptionExt};
use crate::types::{Course, NewCourse};

const COLUMNS: &str = "id, name, code, credits, professor_id";

pub async fn list(conn: &mut SqliteConnection) -> AppResult<Vec<Course>> {
    let sql = format!("SELECT {} FROM courses ORDER BY id", COLUMNS);
    let rows = sqlx::query_as::<_, Course>(&sql).fetch_all(&mut *conn).await?;
    Ok(rows)
}

pub async fn get(conn: &mut SqliteConnection, id: i64) -> AppResult<Option<Course>> {
    let sql = format!("SELECT {} FROM courses WHERE id = ?1", COLUMNS);
    let row = sqlx::query_as::<_, Course>(&sql).bind(id).fetch_optional(&mut *conn).await?;
    Ok(row)
}

pub async fn find(conn: &mut SqliteConnection, id: i64) -> AppResult<Course> {
    get(conn, id).await?.ok_or_not_found("Course")
}

pub async fn create(conn: &mut SqliteConnection, new: &NewCourse) -> AppResult<Course> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO courses (name, code, credits, professor_id) VALUES (?1, ?2, ?3, ?4) RETURNING id",
    )
    .bind(&new.name)
    .bind(&new.code)
    .bind(new.credits)
    .bind(&new.professor_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(Course {
        id,
        name: new.name.clone(),
        code: new.code.clone(),
        credits: new.credits,
        professor_id: new.professor_id.clone(),
    })
}

pub async fn insert(conn: &mut SqliteConnection, course: &Course) -> AppResult<()> {
    sqlx::query("INSERT INTO courses (id, name, code, credits, professor_id) VALUES (?1, ?2, ?3, ?4, ?5)")
        .bind(course.id)
        .bind(&course.name)
        .bind(&course.code)
        .bind(course.credits)
        .bind(&course.professor_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn update(conn: &mut SqliteConnection, id: i64, new: &NewCourse) -> AppResult<Course> {
    let mut course = find(conn, id).await?;
    course.name = new.name.clone();
    course.code = new.code.clone();
    course.credits = new.credits;
    course.professor_id = new.professor_id.clone();
    sqlx::query("UPDATE courses SET name = ?2, code = ?3, credits = ?4, professor_id = ?5 WHERE id = ?1")
        .bind(course.id)
        .bind(&course.name)
        .bind(&course.code)
        .bind(course.credits)
        .bind(&course.professor_id)
        .execute(&mut *conn)
        .await?;
    Ok(course)
}

pub async fn dependents(conn: &mut SqliteConnection, id: i64) -> AppResult<Dependents> {
    let enrollments = count_int(conn, "enrollments", "course_id", id).await?;
    let payments = count_int(conn, "tuition_payments", "course_id", id).await?;
    Ok(non_zero([("enrollments", enrollments), ("payments", payments)]))
}

pub async fn delete(conn: &mut SqliteConnection, id: i64, policy: DeletePolicy) -> AppResult<()> {
    let course = find(conn, id).await?;
    let deps = dependents(conn, course.id).await?;
    check_policy(policy, "Course", &course.id.to_string(), &deps)?;
    if policy == DeletePolicy::Cascade {
        sqlx::query("DELETE FROM enrollments WHERE course_id = ?1")
            .bind(course.id)
            .execute(&mut *conn)
            .await?;
        sqlx::query("DELETE FROM tuition_payments WHERE course_id = ?1")
            .bind(course.id)
            .execute(&mut *conn)
            .await?;
    }
    sqlx::query("DELETE FROM courses WHERE id = ?1")
        .bind(course.id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
