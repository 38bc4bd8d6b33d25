use axum::{
    extract::{Multipart, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use tracing::{debug, info};

use crate::{
    error::AppResult,
    forms::{FieldError, StudentForm, REQUIRED},
    state::AppState,
    store,
    transfer::CsvRecord,
    types::Student,
    views::{FieldView, FormPage, ImportPage, ListPage, ListRow},
};

const ENTITY: &str = "students";
const LIST_URL: &str = "/university/students";

fn form_page(title: &str, action: String, form: &StudentForm, errors: &[FieldError]) -> FormPage {
    FormPage {
        title: title.to_string(),
        entity: ENTITY,
        action,
        fields: vec![
            FieldView::text("name", "Name", &form.name, errors),
            FieldView::text("email", "Email", &form.email, errors),
            FieldView::text("major", "Major", &form.major, errors),
        ],
    }
}

fn import_page(errors: Vec<String>) -> ImportPage {
    ImportPage { title: "Import Students".to_string(), entity: ENTITY, columns: Student::HEADER, errors }
}

pub async fn list(State(state): State<AppState>) -> AppResult<Html<String>> {
    let mut conn = state.db.acquire().await?;
    let students = store::students::list(&mut conn).await?;
    let page = ListPage {
        title: "Students",
        entity: ENTITY,
        columns: &["ID", "Name", "Email", "Major"],
        rows: students
            .into_iter()
            .map(|s| ListRow { key: s.id.clone(), cells: vec![s.id, s.name, s.email, s.major] })
            .collect(),
    };
    state.views.render("list", &page)
}

pub async fn add_form(State(state): State<AppState>) -> AppResult<Html<String>> {
    let page = form_page("Add Student", format!("{}/add", LIST_URL), &StudentForm::default(), &[]);
    state.views.render("form", &page)
}

pub async fn add(State(state): State<AppState>, Form(form): Form<StudentForm>) -> AppResult<Response> {
    let new = match form.validate() {
        Ok(new) => new,
        Err(errors) => {
            debug!("Rejected student form: {:?}", errors);
            let page = form_page("Add Student", format!("{}/add", LIST_URL), &form, &errors);
            return Ok(state.views.render("form", &page)?.into_response());
        }
    };

    let mut tx = state.db.begin().await?;
    let student = store::students::create(&mut tx, &new).await?;
    tx.commit().await?;

    state.metrics.inc_created();
    info!("Created student {} ({})", student.id, student.email);
    Ok(Redirect::to(LIST_URL).into_response())
}

pub async fn edit_form(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Html<String>> {
    let mut conn = state.db.acquire().await?;
    let student = store::students::find(&mut conn, &id).await?;
    let page = form_page("Edit Student", format!("{}/edit/{}", LIST_URL, id), &StudentForm::from_record(&student), &[]);
    state.views.render("form", &page)
}

pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<StudentForm>,
) -> AppResult<Response> {
    let mut tx = state.db.begin().await?;
    store::students::find(&mut tx, &id).await?;
    let new = match form.validate() {
        Ok(new) => new,
        Err(errors) => {
            debug!("Rejected student edit for {}: {:?}", id, errors);
            let page = form_page("Edit Student", format!("{}/edit/{}", LIST_URL, id), &form, &errors);
            return Ok(state.views.render("form", &page)?.into_response());
        }
    };
    store::students::update(&mut tx, &id, &new).await?;
    tx.commit().await?;

    state.metrics.inc_updated();
    info!("Updated student {}", id);
    Ok(Redirect::to(LIST_URL).into_response())
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Redirect> {
    let mut tx = state.db.begin().await?;
    store::students::delete(&mut tx, &id, state.config.records.delete_policy).await?;
    tx.commit().await?;

    state.metrics.inc_deleted();
    info!("Deleted student {}", id);
    Ok(Redirect::to(LIST_URL))
}

pub async fn export(State(state): State<AppState>) -> AppResult<Response> {
    let mut conn = state.db.acquire().await?;
    let students = store::students::list(&mut conn).await?;
    Ok(super::export_response(&state, &students))
}

pub async fn import_form(State(state): State<AppState>) -> AppResult<Html<String>> {
    state.views.render("import", &import_page(Vec::new()))
}

pub async fn import(State(state): State<AppState>, mut multipart: Multipart) -> AppResult<Response> {
    let Some(students) = super::read_import::<Student>(&mut multipart).await? else {
        return Ok(state.views.render("import", &import_page(vec![REQUIRED.to_string()]))?.into_response());
    };

    let mut tx = state.db.begin().await?;
    for student in &students {
        store::students::insert(&mut tx, student).await?;
    }
    tx.commit().await?;

    state.metrics.add_imported(students.len() as u64);
    info!("Imported {} students", students.len());
    Ok(Redirect::to(LIST_URL).into_response())
}
