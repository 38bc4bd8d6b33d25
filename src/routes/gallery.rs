use axum::{
    extract::{Multipart, Path, State},
    http::{header, HeaderValue},
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::{debug, info};

use crate::{
    error::AppResult,
    gallery::{self, CATEGORIES},
    state::AppState,
    views::{GalleryFile, GalleryPage, GallerySection},
};

const GALLERY_URL: &str = "/university/gallery";

pub async fn index(State(state): State<AppState>) -> AppResult<Html<String>> {
    let root = state.uploads_root();
    let mut sections = Vec::with_capacity(CATEGORIES.len());
    for (category, title) in CATEGORIES {
        let files = gallery::list_files(&root, category)
            .await?
            .into_iter()
            .map(|name| GalleryFile { href_name: gallery::encode_segment(&name), name })
            .collect();
        sections.push(GallerySection { category, title, files });
    }
    state.views.render("gallery", &GalleryPage { title: "Gallery", sections })
}

pub async fn upload(
    State(state): State<AppState>,
    Path(category): Path<String>,
    mut multipart: Multipart,
) -> AppResult<Redirect> {
    let Some((filename, bytes)) = super::file_field(&mut multipart).await? else {
        debug!("Gallery upload to {} without a file field", category);
        return Ok(Redirect::to(GALLERY_URL));
    };
    if filename.is_empty() {
        debug!("Gallery upload to {} with an empty file name", category);
        return Ok(Redirect::to(GALLERY_URL));
    }

    let path = gallery::save(&state.uploads_root(), &category, &filename, &bytes).await?;
    state.metrics.inc_uploads();
    info!("Uploaded {} ({} bytes)", path.display(), bytes.len());
    Ok(Redirect::to(GALLERY_URL))
}

pub async fn download(
    State(state): State<AppState>,
    Path((category, filename)): Path<(String, String)>,
) -> AppResult<Response> {
    let bytes = gallery::read(&state.uploads_root(), &category, &filename).await?;
    let mut response = bytes.into_response();
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/octet-stream"));
    let disposition = format!("attachment; filename=\"{}\"", filename.replace('"', ""));
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        response.headers_mut().insert(header::CONTENT_DISPOSITION, value);
    }
    Ok(response)
}
