use sqlx::SqliteConnection;

use super::{check_policy, count_text, ids, Dependents};
use crate::config::DeletePolicy;
use crate::error::{AppResult, OptionExt};
use crate::types::{NewProfessor, Professor};

pub async fn list(conn: &mut SqliteConnection) -> AppResult<Vec<Professor>> {
    let rows = sqlx::query_as::<_, Professor>(
        "SELECT id, name, email, department FROM professors ORDER BY id",
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}

pub async fn get(conn: &mut SqliteConnection, id: &str) -> AppResult<Option<Professor>> {
    let row = sqlx::query_as::<_, Professor>(
        "SELECT id, name, email, department FROM professors WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row)
}

pub async fn find(conn: &mut SqliteConnection, id: &str) -> AppResult<Professor> {
    get(conn, id).await?.ok_or_not_found("Professor")
}

pub async fn create(conn: &mut SqliteConnection, new: &NewProfessor) -> AppResult<Professor> {
    let id = ids::allocate(conn, ids::IdKind::Professor).await?;
    let professor = Professor {
        id,
        name: new.name.clone(),
        email: new.email.clone(),
        department: new.department.clone(),
    };
    insert(conn, &professor).await?;
    Ok(professor)
}

pub async fn insert(conn: &mut SqliteConnection, professor: &Professor) -> AppResult<()> {
    sqlx::query("INSERT INTO professors (id, name, email, department) VALUES (?1, ?2, ?3, ?4)")
        .bind(&professor.id)
        .bind(&professor.name)
        .bind(&professor.email)
        .bind(&professor.department)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn update(conn: &mut SqliteConnection, id: &str, new: &NewProfessor) -> AppResult<Professor> {
    let mut professor = find(conn, id).await?;
    professor.name = new.name.clone();
    professor.email = new.email.clone();
    professor.department = new.department.clone();
    sqlx::query("UPDATE professors SET name = ?2, email = ?3, department = ?4 WHERE id = ?1")
        .bind(&professor.id)
        .bind(&professor.name)
        .bind(&professor.email)
        .bind(&professor.department)
        .execute(&mut *conn)
        .await?;
    Ok(professor)
}

pub async fn dependents(conn: &mut SqliteConnection, id: &str) -> AppResult<Dependents> {
    let courses = count_text(conn, "courses", "professor_id", id).await?;
    Ok(if courses > 0 { vec![("courses", courses)] } else { Vec::new() })
}

pub async fn delete(conn: &mut SqliteConnection, id: &str, policy: DeletePolicy) -> AppResult<()> {
    let professor = find(conn, id).await?;
    let deps = dependents(conn, &professor.id).await?;
    check_policy(policy, "Professor", &professor.id, &deps)?;
    if policy == DeletePolicy::Cascade {
        let course_ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM courses WHERE professor_id = ?1")
            .bind(&professor.id)
            .fetch_all(&mut *conn)
            .await?;
        for course_id in course_ids {
            super::courses::delete(conn, course_id, DeletePolicy::Cascade).await?;
        }
    }
    sqlx::query("DELETE FROM professors WHERE id = ?1")
        .bind(&professor.id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
