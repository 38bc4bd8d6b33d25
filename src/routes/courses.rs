use axum::{
    extract::{Multipart, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use tracing::{debug, info};

use crate::{
    error::AppResult,
    forms::{CourseForm, FieldError, REQUIRED},
    state::AppState,
    store,
    transfer::CsvRecord,
    types::{Choice, Course},
    views::{FieldView, FormPage, ImportPage, ListPage, ListRow},
};

const ENTITY: &str = "courses";
const LIST_URL: &str = "/university/courses";

fn form_page(
    title: &str,
    action: String,
    form: &CourseForm,
    professors: &[Choice],
    errors: &[FieldError],
) -> FormPage {
    FormPage {
        title: title.to_string(),
        entity: ENTITY,
        action,
        fields: vec![
            FieldView::text("name", "Name", &form.name, errors),
            FieldView::text("code", "Code", &form.code, errors),
            FieldView::number("credits", "Credits", &form.credits, errors),
            FieldView::select("professor_id", "Professor", &form.professor_id, professors, errors),
        ],
    }
}

fn import_page(errors: Vec<String>) -> ImportPage {
    ImportPage { title: "Import Courses".to_string(), entity: ENTITY, columns: Course::HEADER, errors }
}

pub async fn list(State(state): State<AppState>) -> AppResult<Html<String>> {
    let mut conn = state.db.acquire().await?;
    let courses = store::courses::list(&mut conn).await?;
    let page = ListPage {
        title: "Courses",
        entity: ENTITY,
        columns: &["ID", "Name", "Code", "Credits", "Professor ID"],
        rows: courses
            .into_iter()
            .map(|c| ListRow {
                key: c.id.to_string(),
                cells: vec![c.id.to_string(), c.name, c.code, c.credits.to_string(), c.professor_id],
            })
            .collect(),
    };
    state.views.render("list", &page)
}

pub async fn add_form(State(state): State<AppState>) -> AppResult<Html<String>> {
    let mut conn = state.db.acquire().await?;
    let professors = super::professor_choices(&mut conn).await?;
    let page = form_page("Add Course", format!("{}/add", LIST_URL), &CourseForm::default(), &professors, &[]);
    state.views.render("form", &page)
}

pub async fn add(State(state): State<AppState>, Form(form): Form<CourseForm>) -> AppResult<Response> {
    let mut tx = state.db.begin().await?;
    let professors = super::professor_choices(&mut tx).await?;
    let new = match form.validate(&professors) {
        Ok(new) => new,
        Err(errors) => {
            debug!("Rejected course form: {:?}", errors);
            let page = form_page("Add Course", format!("{}/add", LIST_URL), &form, &professors, &errors);
            return Ok(state.views.render("form", &page)?.into_response());
        }
    };
    let course = store::courses::create(&mut tx, &new).await?;
    tx.commit().await?;

    state.metrics.inc_created();
    info!("Created course {} ({})", course.id, course.code);
    Ok(Redirect::to(LIST_URL).into_response())
}

pub async fn edit_form(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Html<String>> {
    let mut conn = state.db.acquire().await?;
    let course = store::courses::find(&mut conn, id).await?;
    let professors = super::professor_choices(&mut conn).await?;
    let page = form_page(
        "Edit Course",
        format!("{}/edit/{}", LIST_URL, id),
        &CourseForm::from_record(&course),
        &professors,
        &[],
    );
    state.views.render("form", &page)
}

pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<CourseForm>,
) -> AppResult<Response> {
    let mut tx = state.db.begin().await?;
    store::courses::find(&mut tx, id).await?;
    let professors = super::professor_choices(&mut tx).await?;
    let new = match form.validate(&professors) {
        Ok(new) => new,
        Err(errors) => {
            debug!("Rejected course edit for {}: {:?}", id, errors);
            let page = form_page("Edit Course", format!("{}/edit/{}", LIST_URL, id), &form, &professors, &errors);
            return Ok(state.views.render("form", &page)?.into_response());
        }
    };
    store::courses::update(&mut tx, id, &new).await?;
    tx.commit().await?;

    state.metrics.inc_updated();
    info!("Updated course {}", id);
    Ok(Redirect::to(LIST_URL).into_response())
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Redirect> {
    let mut tx = state.db.begin().await?;
    store::courses::delete(&mut tx, id, state.config.records.delete_policy).await?;
    tx.commit().await?;

    state.metrics.inc_deleted();
    info!("Deleted course {}", id);
    Ok(Redirect::to(LIST_URL))
}

pub async fn export(State(state): State<AppState>) -> AppResult<Response> {
    let mut conn = state.db.acquire().await?;
    let courses = store::courses::list(&mut conn).await?;
    Ok(super::export_response(&state, &courses))
}

pub async fn import_form(State(state): State<AppState>) -> AppResult<Html<String>> {
    state.views.render("import", &import_page(Vec::new()))
}

pub async fn import(State(state): State<AppState>, mut multipart: Multipart) -> AppResult<Response> {
    let Some(courses) = super::read_import::<Course>(&mut multipart).await? else {
        return Ok(state.views.render("import", &import_page(vec![REQUIRED.to_string()]))?.into_response());
    };

    let mut tx = state.db.begin().await?;
    for course in &courses {
        store::courses::insert(&mut tx, course).await?;
    }
    tx.commit().await?;

    state.metrics.add_imported(courses.len() as u64);
    info!("Imported {} courses", courses.len());
    Ok(Redirect::to(LIST_URL).into_response())
}
