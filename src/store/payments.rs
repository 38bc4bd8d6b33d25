use chrono::NaiveDateTime;
use sqlx::SqliteConnection;

use crate::error::{AppResult, OptionExt};
use crate::types::{format_payment_date, NewPayment, TuitionPayment};

const COLUMNS: &str = "id, student_id, course_id, amount_paid, payment_date, status";

pub async fn list(conn: &mut SqliteConnection) -> AppResult<Vec<TuitionPayment>> {
    let sql = format!("SELECT {} FROM tuition_payments ORDER BY id", COLUMNS);
    let rows = sqlx::query_as::<_, TuitionPayment>(&sql).fetch_all(&mut *conn).await?;
    Ok(rows)
}

pub async fn get(conn: &mut SqliteConnection, id: i64) -> AppResult<Option<TuitionPayment>> {
    let sql = format!("SELECT {} FROM tuition_payments WHERE id = ?1", COLUMNS);
    let row = sqlx::query_as::<_, TuitionPayment>(&sql).bind(id).fetch_optional(&mut *conn).await?;
    Ok(row)
}

pub async fn find(conn: &mut SqliteConnection, id: i64) -> AppResult<TuitionPayment> {
    get(conn, id).await?.ok_or_not_found("Payment")
}

/// Records a payment dated `paid_at`.
pub async fn create(conn: &mut SqliteConnection, new: &NewPayment, paid_at: NaiveDateTime) -> AppResult<TuitionPayment> {
    let id: i64 = sqlx::query_scalar(
        r#"INSERT INTO tuition_payments (student_id, course_id, amount_paid, payment_date, status)
           VALUES (?1, ?2, ?3, ?4, ?5) RETURNING id"#,
    )
    .bind(&new.student_id)
    .bind(new.course_id)
    .bind(new.amount_paid)
    .bind(format_payment_date(&paid_at))
    .bind(new.status.as_str())
    .fetch_one(&mut *conn)
    .await?;
    Ok(TuitionPayment {
        id,
        student_id: new.student_id.clone(),
        course_id: new.course_id,
        amount_paid: new.amount_paid,
        payment_date: paid_at,
        status: new.status,
    })
}

pub async fn insert(conn: &mut SqliteConnection, payment: &TuitionPayment) -> AppResult<()> {
    sqlx::query(
        r#"INSERT INTO tuition_payments (id, student_id, course_id, amount_paid, payment_date, status)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
    )
    .bind(payment.id)
    .bind(&payment.student_id)
    .bind(payment.course_id)
    .bind(payment.amount_paid)
    .bind(format_payment_date(&payment.payment_date))
    .bind(payment.status.as_str())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Overwrites the editable fields; the payment date is kept.
pub async fn update(conn: &mut SqliteConnection, id: i64, new: &NewPayment) -> AppResult<TuitionPayment> {
    let mut payment = find(conn, id).await?;
    payment.student_id = new.student_id.clone();
    payment.course_id = new.course_id;
    payment.amount_paid = new.amount_paid;
    payment.status = new.status;
    sqlx::query(
        "UPDATE tuition_payments SET student_id = ?2, course_id = ?3, amount_paid = ?4, status = ?5 WHERE id = ?1",
    )
    .bind(payment.id)
    .bind(&payment.student_id)
    .bind(payment.course_id)
    .bind(payment.amount_paid)
    .bind(payment.status.as_str())
    .execute(&mut *conn)
    .await?;
    Ok(payment)
}

pub async fn delete(conn: &mut SqliteConnection, id: i64) -> AppResult<()> {
    let payment = find(conn, id).await?;
    sqlx::query("DELETE FROM tuition_payments WHERE id = ?1")
        .bind(payment.id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
