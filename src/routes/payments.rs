use axum::{
    extract::{Multipart, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use sqlx::SqliteConnection;
use tracing::{debug, info};

use crate::{
    error::AppResult,
    forms::{FieldError, PaymentForm, REQUIRED},
    state::AppState,
    store,
    transfer::{format_amount, CsvRecord},
    types::{format_payment_date, Choice, TuitionPayment},
    views::{FieldView, FormPage, ImportPage, ListPage, ListRow},
};

const ENTITY: &str = "payments";
const LIST_URL: &str = "/university/payments";

struct Choices {
    students: Vec<Choice>,
    courses: Vec<Choice>,
    statuses: Vec<Choice>,
}

impl Choices {
    async fn load(conn: &mut SqliteConnection) -> AppResult<Self> {
        Ok(Self {
            students: super::student_choices(conn).await?,
            courses: super::course_choices(conn, true).await?,
            statuses: PaymentForm::status_choices(),
        })
    }
}

fn form_page(title: &str, action: String, form: &PaymentForm, choices: &Choices, errors: &[FieldError]) -> FormPage {
    FormPage {
        title: title.to_string(),
        entity: ENTITY,
        action,
        fields: vec![
            FieldView::select("student_id", "Student", &form.student_id, &choices.students, errors),
            FieldView::select("course_id", "Course", &form.course_id, &choices.courses, errors),
            FieldView::text("amount_paid", "Amount Paid", &form.amount_paid, errors),
            FieldView::select("status", "Status", &form.status, &choices.statuses, errors),
        ],
    }
}

fn import_page(errors: Vec<String>) -> ImportPage {
    ImportPage { title: "Import Payments".to_string(), entity: ENTITY, columns: TuitionPayment::HEADER, errors }
}

pub async fn list(State(state): State<AppState>) -> AppResult<Html<String>> {
    let mut conn = state.db.acquire().await?;
    let payments = store::payments::list(&mut conn).await?;
    let page = ListPage {
        title: "Tuition Payments",
        entity: ENTITY,
        columns: &["ID", "Student ID", "Course ID", "Amount Paid", "Payment Date", "Status"],
        rows: payments
            .into_iter()
            .map(|p| ListRow {
                key: p.id.to_string(),
                cells: vec![
                    p.id.to_string(),
                    p.student_id,
                    p.course_id.to_string(),
                    format_amount(p.amount_paid),
                    format_payment_date(&p.payment_date),
                    p.status.label().to_string(),
                ],
            })
            .collect(),
    };
    state.views.render("list", &page)
}

pub async fn add_form(State(state): State<AppState>) -> AppResult<Html<String>> {
    let mut conn = state.db.acquire().await?;
    let choices = Choices::load(&mut conn).await?;
    let page = form_page("Add Payment", format!("{}/add", LIST_URL), &PaymentForm::default(), &choices, &[]);
    state.views.render("form", &page)
}

pub async fn add(State(state): State<AppState>, Form(form): Form<PaymentForm>) -> AppResult<Response> {
    let mut tx = state.db.begin().await?;
    let choices = Choices::load(&mut tx).await?;
    let new = match form.validate(&choices.students, &choices.courses) {
        Ok(new) => new,
        Err(errors) => {
            debug!("Rejected payment form: {:?}", errors);
            let page = form_page("Add Payment", format!("{}/add", LIST_URL), &form, &choices, &errors);
            return Ok(state.views.render("form", &page)?.into_response());
        }
    };
    let paid_at = chrono::Local::now().naive_local();
    let payment = store::payments::create(&mut tx, &new, paid_at).await?;
    tx.commit().await?;

    state.metrics.inc_created();
    info!(
        "Recorded payment {} of {} by {} ({})",
        payment.id,
        format_amount(payment.amount_paid),
        payment.student_id,
        payment.status
    );
    Ok(Redirect::to(LIST_URL).into_response())
}

pub async fn edit_form(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Html<String>> {
    let mut conn = state.db.acquire().await?;
    let payment = store::payments::find(&mut conn, id).await?;
    let choices = Choices::load(&mut conn).await?;
    let page = form_page(
        "Edit Payment",
        format!("{}/edit/{}", LIST_URL, id),
        &PaymentForm::from_record(&payment),
        &choices,
        &[],
    );
    state.views.render("form", &page)
}

pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<PaymentForm>,
) -> AppResult<Response> {
    let mut tx = state.db.begin().await?;
    store::payments::find(&mut tx, id).await?;
    let choices = Choices::load(&mut tx).await?;
    let new = match form.validate(&choices.students, &choices.courses) {
        Ok(new) => new,
        Err(errors) => {
            debug!("Rejected payment edit for {}: {:?}", id, errors);
            let page = form_page("Edit Payment", format!("{}/edit/{}", LIST_URL, id), &form, &choices, &errors);
            return Ok(state.views.render("form", &page)?.into_response());
        }
    };
    store::payments::update(&mut tx, id, &new).await?;
    tx.commit().await?;

    state.metrics.inc_updated();
    info!("Updated payment {}", id);
    Ok(Redirect::to(LIST_URL).into_response())
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Redirect> {
    let mut tx = state.db.begin().await?;
    store::payments::delete(&mut tx, id).await?;
    tx.commit().await?;

    state.metrics.inc_deleted();
    info!("Deleted payment {}", id);
    Ok(Redirect::to(LIST_URL))
}

pub async fn export(State(state): State<AppState>) -> AppResult<Response> {
    let mut conn = state.db.acquire().await?;
    let payments = store::payments::list(&mut conn).await?;
    Ok(super::export_response(&state, &payments))
}

pub async fn import_form(State(state): State<AppState>) -> AppResult<Html<String>> {
    state.views.render("import", &import_page(Vec::new()))
}

pub async fn import(State(state): State<AppState>, mut multipart: Multipart) -> AppResult<Response> {
    let Some(payments) = super::read_import::<TuitionPayment>(&mut multipart).await? else {
        return Ok(state.views.render("import", &import_page(vec![REQUIRED.to_string()]))?.into_response());
    };

    let mut tx = state.db.begin().await?;
    for payment in &payments {
        store::payments::insert(&mut tx, payment).await?;
    }
    tx.commit().await?;

    state.metrics.add_imported(payments.len() as u64);
    info!("Imported {} payments", payments.len());
    Ok(Redirect::to(LIST_URL).into_response())
}
