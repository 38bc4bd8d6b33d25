use axum::{
    extract::{Multipart, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use tracing::{debug, info};

use crate::{
    error::AppResult,
    forms::{FieldError, ProfessorForm, REQUIRED},
    state::AppState,
    store,
    transfer::CsvRecord,
    types::Professor,
    views::{FieldView, FormPage, ImportPage, ListPage, ListRow},
};

const ENTITY: &str = "professors";
const LIST_URL: &str = "/university/professors";

fn form_page(title: &str, action: String, form: &ProfessorForm, errors: &[FieldError]) -> FormPage {
    FormPage {
        title: title.to_string(),
        entity: ENTITY,
        action,
        fields: vec![
            FieldView::text("name", "Name", &form.name, errors),
            FieldView::text("email", "Email", &form.email, errors),
            FieldView::text("department", "Department", &form.department, errors),
        ],
    }
}

fn import_page(errors: Vec<String>) -> ImportPage {
    ImportPage { title: "Import Professors".to_string(), entity: ENTITY, columns: Professor::HEADER, errors }
}

pub async fn list(State(state): State<AppState>) -> AppResult<Html<String>> {
    let mut conn = state.db.acquire().await?;
    let professors = store::professors::list(&mut conn).await?;
    let page = ListPage {
        title: "Professors",
        entity: ENTITY,
        columns: &["ID", "Name", "Email", "Department"],
        rows: professors
            .into_iter()
            .map(|p| ListRow { key: p.id.clone(), cells: vec![p.id, p.name, p.email, p.department] })
            .collect(),
    };
    state.views.render("list", &page)
}

pub async fn add_form(State(state): State<AppState>) -> AppResult<Html<String>> {
    let page = form_page("Add Professor", format!("{}/add", LIST_URL), &ProfessorForm::default(), &[]);
    state.views.render("form", &page)
}

pub async fn add(State(state): State<AppState>, Form(form): Form<ProfessorForm>) -> AppResult<Response> {
    let new = match form.validate() {
        Ok(new) => new,
        Err(errors) => {
            debug!("Rejected professor form: {:?}", errors);
            let page = form_page("Add Professor", format!("{}/add", LIST_URL), &form, &errors);
            return Ok(state.views.render("form", &page)?.into_response());
        }
    };

    let mut tx = state.db.begin().await?;
    let professor = store::professors::create(&mut tx, &new).await?;
    tx.commit().await?;

    state.metrics.inc_created();
    info!("Created professor {} ({})", professor.id, professor.email);
    Ok(Redirect::to(LIST_URL).into_response())
}

pub async fn edit_form(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Html<String>> {
    let mut conn = state.db.acquire().await?;
    let professor = store::professors::find(&mut conn, &id).await?;
    let page = form_page("Edit Professor", format!("{}/edit/{}", LIST_URL, id), &ProfessorForm::from_record(&professor), &[]);
    state.views.render("form", &page)
}

pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<ProfessorForm>,
) -> AppResult<Response> {
    let mut tx = state.db.begin().await?;
    store::professors::find(&mut tx, &id).await?;
    let new = match form.validate() {
        Ok(new) => new,
        Err(errors) => {
            debug!("Rejected professor edit for {}: {:?}", id, errors);
            let page = form_page("Edit Professor", format!("{}/edit/{}", LIST_URL, id), &form, &errors);
            return Ok(state.views.render("form", &page)?.into_response());
        }
    };
    store::professors::update(&mut tx, &id, &new).await?;
    tx.commit().await?;

    state.metrics.inc_updated();
    info!("Updated professor {}", id);
    Ok(Redirect::to(LIST_URL).into_response())
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Redirect> {
    let mut tx = state.db.begin().await?;
    store::professors::delete(&mut tx, &id, state.config.records.delete_policy).await?;
    tx.commit().await?;

    state.metrics.inc_deleted();
    info!("Deleted professor {}", id);
    Ok(Redirect::to(LIST_URL))
}

pub async fn export(State(state): State<AppState>) -> AppResult<Response> {
    let mut conn = state.db.acquire().await?;
    let professors = store::professors::list(&mut conn).await?;
    Ok(super::export_response(&state, &professors))
}

pub async fn import_form(State(state): State<AppState>) -> AppResult<Html<String>> {
    state.views.render("import", &import_page(Vec::new()))
}

pub async fn import(State(state): State<AppState>, mut multipart: Multipart) -> AppResult<Response> {
    let Some(professors) = super::read_import::<Professor>(&mut multipart).await? else {
        return Ok(state.views.render("import", &import_page(vec![REQUIRED.to_string()]))?.into_response());
    };

    let mut tx = state.db.begin().await?;
    for professor in &professors {
        store::professors::insert(&mut tx, professor).await?;
    }
    tx.commit().await?;

    state.metrics.add_imported(professors.len() as u64);
    info!("Imported {} professors", professors.len());
    Ok(Redirect::to(LIST_URL).into_response())
}
