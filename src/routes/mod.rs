//! HTTP route handlers.
//!
//! - `students`, `professors`, `courses`, `enrollments`, `payments`: list, add, edit,
//!   delete, CSV export and CSV import for each record type
//! - `gallery`: image listing, upload and download
//! - `health`: liveness, readiness, metrics and version endpoints
//! - `home`: landing page

pub mod courses;
pub mod enrollments;
pub mod gallery;
pub mod health;
pub mod home;
pub mod payments;
pub mod professors;
pub mod students;

use axum::{
    body::Bytes,
    extract::Multipart,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use sqlx::SqliteConnection;

use crate::{
    error::{AppError, AppResult},
    state::AppState,
    store,
    transfer::{self, CsvRecord},
    types::Choice,
};

/// Routes mounted under `/university`.
pub fn university_router() -> Router<AppState> {
    Router::new()
        .route("/", get(home::index))
        .route("/students", get(students::list))
        .route("/students/add", get(students::add_form).post(students::add))
        .route("/students/edit/{id}", get(students::edit_form).post(students::edit))
        .route("/students/delete/{id}", get(students::delete))
        .route("/students/export", get(students::export))
        .route("/students/import", get(students::import_form).post(students::import))
        .route("/professors", get(professors::list))
        .route("/professors/add", get(professors::add_form).post(professors::add))
        .route("/professors/edit/{id}", get(professors::edit_form).post(professors::edit))
        .route("/professors/delete/{id}", get(professors::delete))
        .route("/professors/export", get(professors::export))
        .route("/professors/import", get(professors::import_form).post(professors::import))
        .route("/courses", get(courses::list))
        .route("/courses/add", get(courses::add_form).post(courses::add))
        .route("/courses/edit/{id}", get(courses::edit_form).post(courses::edit))
        .route("/courses/delete/{id}", get(courses::delete))
        .route("/courses/export", get(courses::export))
        .route("/courses/import", get(courses::import_form).post(courses::import))
        .route("/enrollments", get(enrollments::list))
        .route("/enrollments/add", get(enrollments::add_form).post(enrollments::add))
        .route("/enrollments/edit/{id}", get(enrollments::edit_form).post(enrollments::edit))
        .route("/enrollments/delete/{id}", get(enrollments::delete))
        .route("/enrollments/export", get(enrollments::export))
        .route("/enrollments/import", get(enrollments::import_form).post(enrollments::import))
        .route("/payments", get(payments::list))
        .route("/payments/add", get(payments::add_form).post(payments::add))
        .route("/payments/edit/{id}", get(payments::edit_form).post(payments::edit))
        .route("/payments/delete/{id}", get(payments::delete))
        .route("/payments/export", get(payments::export))
        .route("/payments/import", get(payments::import_form).post(payments::import))
        .route("/gallery", get(gallery::index))
        .route("/gallery/upload/{category}", post(gallery::upload))
        .route("/gallery/download/{category}/{filename}", get(gallery::download))
}

/// Builds a `text/csv` attachment response.
pub(crate) fn csv_attachment(file_name: &str, body: String) -> Response {
    let mut response = body.into_response();
    response.headers_mut().insert(header::CONTENT_TYPE, HeaderValue::from_static("text/csv; charset=utf-8"));
    let disposition = format!("attachment; filename={}", file_name);
    if let Ok(header_val) = HeaderValue::from_str(&disposition) {
        response.headers_mut().insert(header::CONTENT_DISPOSITION, header_val);
    }
    response
}

/// Exports `records` and counts the data rows.
pub(crate) fn export_response<R: CsvRecord>(state: &AppState, records: &[R]) -> Response {
    state.metrics.add_exported(records.len() as u64);
    tracing::info!("Exported {} rows to {}", records.len(), R::FILE_NAME);
    csv_attachment(R::FILE_NAME, transfer::export(records))
}

/// The multipart field named `file`, as `(file name, bytes)`.
pub(crate) async fn file_field(multipart: &mut Multipart) -> AppResult<Option<(String, Bytes)>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await?;
            return Ok(Some((file_name, bytes)));
        }
    }
    Ok(None)
}

/// Reads and parses an uploaded CSV. `Ok(None)` means no file was submitted.
pub(crate) async fn read_import<R: CsvRecord>(multipart: &mut Multipart) -> AppResult<Option<Vec<R>>> {
    let bytes = match file_field(multipart).await? {
        Some((name, bytes)) if !(name.is_empty() && bytes.is_empty()) => bytes,
        _ => return Ok(None),
    };
    let text = String::from_utf8(bytes.to_vec())
        .map_err(|_| AppError::BadRequest(format!("{} upload is not valid UTF-8", R::FILE_NAME)))?;
    let now = chrono::Local::now().naive_local();
    let records = transfer::parse_import::<R>(&text, now).map_err(|e| AppError::BadRequest(e.to_string()))?;
    Ok(Some(records))
}

pub(crate) async fn professor_choices(conn: &mut SqliteConnection) -> AppResult<Vec<Choice>> {
    let professors = store::professors::list(conn).await?;
    Ok(professors.into_iter().map(|p| Choice::new(p.id, p.name)).collect())
}

pub(crate) async fn student_choices(conn: &mut SqliteConnection) -> AppResult<Vec<Choice>> {
    let students = store::students::list(conn).await?;
    Ok(students.into_iter().map(|s| Choice::new(s.id, s.name)).collect())
}

/// Course options; `with_code` labels them `"<name> (<code>)"`.
pub(crate) async fn course_choices(conn: &mut SqliteConnection, with_code: bool) -> AppResult<Vec<Choice>> {
    let courses = store::courses::list(conn).await?;
    Ok(courses
        .into_iter()
        .map(|c| {
            let label = if with_code { format!("{} ({})", c.name, c.code) } else { c.name };
            Choice::new(c.id.to_string(), label)
        })
        .collect())
}
