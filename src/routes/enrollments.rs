use axum::{
    extract::{Multipart, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use sqlx::SqliteConnection;
use tracing::{debug, info};

use crate::{
    error::AppResult,
    forms::{EnrollmentForm, FieldError, REQUIRED},
    state::AppState,
    store,
    transfer::CsvRecord,
    types::{Choice, Enrollment},
    views::{FieldView, FormPage, ImportPage, ListPage, ListRow},
};

const ENTITY: &str = "enrollments";
const LIST_URL: &str = "/university/enrollments";

struct Choices {
    students: Vec<Choice>,
    courses: Vec<Choice>,
}

impl Choices {
    async fn load(conn: &mut SqliteConnection) -> AppResult<Self> {
        Ok(Self {
            students: super::student_choices(conn).await?,
            courses: super::course_choices(conn, false).await?,
        })
    }
}

fn form_page(title: &str, action: String, form: &EnrollmentForm, choices: &Choices, errors: &[FieldError]) -> FormPage {
    FormPage {
        title: title.to_string(),
        entity: ENTITY,
        action,
        fields: vec![
            FieldView::select("student_id", "Student", &form.student_id, &choices.students, errors),
            FieldView::select("course_id", "Course", &form.course_id, &choices.courses, errors),
            FieldView::text("grade", "Grade", &form.grade, errors),
        ],
    }
}

fn import_page(errors: Vec<String>) -> ImportPage {
    ImportPage { title: "Import Enrollments".to_string(), entity: ENTITY, columns: Enrollment::HEADER, errors }
}

pub async fn list(State(state): State<AppState>) -> AppResult<Html<String>> {
    let mut conn = state.db.acquire().await?;
    let enrollments = store::enrollments::list(&mut conn).await?;
    let page = ListPage {
        title: "Enrollments",
        entity: ENTITY,
        columns: &["ID", "Student ID", "Course ID", "Grade"],
        rows: enrollments
            .into_iter()
            .map(|e| ListRow {
                key: e.id.to_string(),
                cells: vec![e.id.to_string(), e.student_id, e.course_id.to_string(), e.grade.unwrap_or_default()],
            })
            .collect(),
    };
    state.views.render("list", &page)
}

pub async fn add_form(State(state): State<AppState>) -> AppResult<Html<String>> {
    let mut conn = state.db.acquire().await?;
    let choices = Choices::load(&mut conn).await?;
    let page = form_page("Add Enrollment", format!("{}/add", LIST_URL), &EnrollmentForm::default(), &choices, &[]);
    state.views.render("form", &page)
}

pub async fn add(State(state): State<AppState>, Form(form): Form<EnrollmentForm>) -> AppResult<Response> {
    let mut tx = state.db.begin().await?;
    let choices = Choices::load(&mut tx).await?;
    let new = match form.validate(&choices.students, &choices.courses) {
        Ok(new) => new,
        Err(errors) => {
            debug!("Rejected enrollment form: {:?}", errors);
            let page = form_page("Add Enrollment", format!("{}/add", LIST_URL), &form, &choices, &errors);
            return Ok(state.views.render("form", &page)?.into_response());
        }
    };
    let enrollment = store::enrollments::create(&mut tx, &new).await?;
    tx.commit().await?;

    state.metrics.inc_created();
    info!(
        "Created enrollment {} ({} in course {})",
        enrollment.id, enrollment.student_id, enrollment.course_id
    );
    Ok(Redirect::to(LIST_URL).into_response())
}

pub async fn edit_form(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Html<String>> {
    let mut conn = state.db.acquire().await?;
    let enrollment = store::enrollments::find(&mut conn, id).await?;
    let choices = Choices::load(&mut conn).await?;
    let page = form_page(
        "Edit Enrollment",
        format!("{}/edit/{}", LIST_URL, id),
        &EnrollmentForm::from_record(&enrollment),
        &choices,
        &[],
    );
    state.views.render("form", &page)
}

pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<EnrollmentForm>,
) -> AppResult<Response> {
    let mut tx = state.db.begin().await?;
    store::enrollments::find(&mut tx, id).await?;
    let choices = Choices::load(&mut tx).await?;
    let new = match form.validate(&choices.students, &choices.courses) {
        Ok(new) => new,
        Err(errors) => {
            debug!("Rejected enrollment edit for {}: {:?}", id, errors);
            let page = form_page("Edit Enrollment", format!("{}/edit/{}", LIST_URL, id), &form, &choices, &errors);
            return Ok(state.views.render("form", &page)?.into_response());
        }
    };
    store::enrollments::update(&mut tx, id, &new).await?;
    tx.commit().await?;

    state.metrics.inc_updated();
    info!("Updated enrollment {}", id);
    Ok(Redirect::to(LIST_URL).into_response())
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Redirect> {
    let mut tx = state.db.begin().await?;
    store::enrollments::delete(&mut tx, id).await?;
    tx.commit().await?;

    state.metrics.inc_deleted();
    info!("Deleted enrollment {}", id);
    Ok(Redirect::to(LIST_URL))
}

pub async fn export(State(state): State<AppState>) -> AppResult<Response> {
    let mut conn = state.db.acquire().await?;
    let enrollments = store::enrollments::list(&mut conn).await?;
    Ok(super::export_response(&state, &enrollments))
}

pub async fn import_form(State(state): State<AppState>) -> AppResult<Html<String>> {
    state.views.render("import", &import_page(Vec::new()))
}

pub async fn import(State(state): State<AppState>, mut multipart: Multipart) -> AppResult<Response> {
    let Some(enrollments) = super::read_import::<Enrollment>(&mut multipart).await? else {
        return Ok(state.views.render("import", &import_page(vec![REQUIRED.to_string()]))?.into_response());
    };

    let mut tx = state.db.begin().await?;
    for enrollment in &enrollments {
        store::enrollments::insert(&mut tx, enrollment).await?;
    }
    tx.commit().await?;

    state.metrics.add_imported(enrollments.len() as u64);
    info!("Imported {} enrollments", enrollments.len());
    Ok(Redirect::to(LIST_URL).into_response())
}
