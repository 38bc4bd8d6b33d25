use axum::{extract::State, response::Html};

use crate::{
    error::AppResult,
    state::AppState,
    views::{IndexPage, NavLink},
};

const SECTIONS: [(&str, &str); 6] = [
    ("students", "Students"),
    ("professors", "Professors"),
    ("courses", "Courses"),
    ("enrollments", "Enrollments"),
    ("payments", "Tuition Payments"),
    ("gallery", "Gallery"),
];

pub async fn index(State(state): State<AppState>) -> AppResult<Html<String>> {
    let page = IndexPage {
        title: "University Records",
        sections: SECTIONS
            .iter()
            .map(|&(path, label)| NavLink { href: format!("/university/{}", path), label })
            .collect(),
    };
    state.views.render("index", &page)
}
