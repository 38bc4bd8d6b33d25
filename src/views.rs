//! Server-rendered HTML pages.
//!
//! Templates are compiled into the binary and registered once at startup; handlers
//! build one of the page models below and hand it to [`Views::render`].

use axum::response::Html;
use handlebars::Handlebars;
use serde::Serialize;

use crate::error::AppResult;
use crate::forms::FieldError;
use crate::types::Choice;

const TEMPLATES: &[(&str, &str)] = &[
    ("header", include_str!("../templates/header.hbs")),
    ("footer", include_str!("../templates/footer.hbs")),
    ("index", include_str!("../templates/index.hbs")),
    ("list", include_str!("../templates/list.hbs")),
    ("form", include_str!("../templates/form.hbs")),
    ("import", include_str!("../templates/import.hbs")),
    ("gallery", include_str!("../templates/gallery.hbs")),
];

pub struct Views {
    handlebars: Handlebars<'static>,
}

impl Views {
    pub fn new() -> anyhow::Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        for (name, source) in TEMPLATES {
            handlebars.register_template_string(name, *source)?;
        }
        tracing::debug!("Registered {} view templates", TEMPLATES.len());
        Ok(Self { handlebars })
    }

    pub fn render<T: Serialize>(&self, name: &str, page: &T) -> AppResult<Html<String>> {
        Ok(Html(self.handlebars.render(name, page)?))
    }
}

#[derive(Debug, Serialize)]
pub struct IndexPage {
    pub title: &'static str,
    pub sections: Vec<NavLink>,
}

#[derive(Debug, Serialize)]
pub struct NavLink {
    pub href: String,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ListPage {
    pub title: &'static str,
    /// URL segment of the entity, e.g. `students`.
    pub entity: &'static str,
    pub columns: &'static [&'static str],
    pub rows: Vec<ListRow>,
}

#[derive(Debug, Serialize)]
pub struct ListRow {
    pub key: String,
    pub cells: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct FormPage {
    pub title: String,
    pub entity: &'static str,
    pub action: String,
    pub fields: Vec<FieldView>,
}

#[derive(Debug, Serialize)]
pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub is_select: bool,
    pub input_type: &'static str,
    pub value: String,
    pub options: Vec<OptionView>,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct OptionView {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

fn errors_for(field: &str, errors: &[FieldError]) -> Vec<String> {
    errors.iter().filter(|e| e.field == field).map(|e| e.message.clone()).collect()
}

impl FieldView {
    pub fn text(name: &'static str, label: &'static str, value: &str, errors: &[FieldError]) -> Self {
        Self {
            name,
            label,
            is_select: false,
            input_type: "text",
            value: value.to_string(),
            options: Vec::new(),
            errors: errors_for(name, errors),
        }
    }

    pub fn number(name: &'static str, label: &'static str, value: &str, errors: &[FieldError]) -> Self {
        Self { input_type: "number", ..Self::text(name, label, value, errors) }
    }

    pub fn select(
        name: &'static str,
        label: &'static str,
        value: &str,
        choices: &[Choice],
        errors: &[FieldError],
    ) -> Self {
        let options = choices
            .iter()
            .map(|c| OptionView { value: c.value.clone(), label: c.label.clone(), selected: c.value == value })
            .collect();
        Self { is_select: true, options, ..Self::text(name, label, value, errors) }
    }
}

#[derive(Debug, Serialize)]
pub struct ImportPage {
    pub title: String,
    pub entity: &'static str,
    pub columns: &'static [&'static str],
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct GalleryPage {
    pub title: &'static str,
    pub sections: Vec<GallerySection>,
}

#[derive(Debug, Serialize)]
pub struct GallerySection {
    pub category: &'static str,
    pub title: &'static str,
    pub files: Vec<GalleryFile>,
}

#[derive(Debug, Serialize)]
pub struct GalleryFile {
    pub name: String,
    /// Percent-encoded file name for use in URLs.
    pub href_name: String,
}
