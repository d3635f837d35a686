//! Request handlers
//!
//! Each request resolves the whole note graph from the store. Store access
//! is blocking, so it runs on the blocking thread pool.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use maud::Markup;
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use manesei_core::render::{note_href, Viewer};
use manesei_core::resolver::parse_file;
use manesei_core::{
    load_documents, render_history, render_revision, render_viewer, DocFile, DocumentForm,
    DocumentMap, NoteStore, CURRENT_GENERATION,
};

use crate::app::AppState;
use crate::error::AppError;
use crate::templates;

const EDITOR_TITLE: &str = "Manesei (edit)";

#[derive(Debug, Deserialize)]
pub struct EditQuery {
    /// Historic generation to prefill the editor with
    v: Option<u64>,
}

pub async fn index() -> Redirect {
    Redirect::temporary("/n/")
}

pub async fn view_root(State(state): State<AppState>) -> Result<Response, AppError> {
    view(state, String::new()).await
}

pub async fn view_note(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    let slug = slug.strip_prefix('/').map(str::to_string).unwrap_or(slug);
    view(state, slug).await
}

async fn view(state: AppState, slug: String) -> Result<Response, AppError> {
    let viewer = with_store(&state, move |store| {
        let documents = load(store)?;
        Ok(render_viewer(&documents, &slug))
    })
    .await?;

    Ok(viewer_response(viewer))
}

pub async fn view_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let slug = with_store(&state, move |store| {
        let documents = load(store)?;
        documents
            .find_by_id(&id)
            .map(|doc| doc.slug.clone())
            .ok_or_else(AppError::not_found)
    })
    .await?;

    redirect(StatusCode::FOUND, &note_href(&slug))
}

pub async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<EditQuery>,
) -> Result<Response, AppError> {
    let form = with_store(&state, move |store| {
        let documents = load(store)?;
        let Some(current) = documents.find_by_id(&id) else {
            return Ok(None);
        };

        match query.v.filter(|generation| *generation != CURRENT_GENERATION) {
            Some(generation) => {
                let body = store.read_to_string(&id, generation).map_err(|e| {
                    AppError::store(format!("Failed to open file {} (revision {})", id, generation), e)
                })?;
                let doc = parse_file(&DocFile::new(id.as_str(), body));
                Ok(Some(DocumentForm::from_document(&doc)))
            }
            None => Ok(Some(DocumentForm::from_document(current))),
        }
    })
    .await?;

    match form {
        Some(form) => Ok(editor_response(&form)),
        None => Ok(Redirect::temporary("/new/").into_response()),
    }
}

pub async fn new_form_root() -> Response {
    editor_response(&DocumentForm::new_child(""))
}

pub async fn new_form(Path(host): Path<String>) -> Response {
    let host = host.strip_prefix('/').unwrap_or(&host);
    editor_response(&DocumentForm::new_child(host))
}

/// Store the posted form and redirect to the saved note
pub async fn save(
    State(state): State<AppState>,
    Form(form): Form<DocumentForm>,
) -> Result<Response, AppError> {
    let file = form.to_file()?;
    let slug = form.slug.clone();

    with_store(&state, move |store| {
        let existing = !form.id.is_empty()
            && match store.stat(&form.id, false) {
                Ok(_) => true,
                Err(e) => !(e.is_illegal_path() || e.is_not_found()),
            };
        let id = if existing {
            form.id
        } else {
            let id = Uuid::new_v4().to_string();
            debug!("Minted id {} for new note {:?}", id, form.slug);
            id
        };

        store
            .write(&id, file.as_bytes())
            .map_err(|e| AppError::store(format!("Failed to write file {}", id), e))?;
        info!("Saved note {:?} as {}", form.slug, id);
        Ok(())
    })
    .await?;

    redirect(StatusCode::SEE_OTHER, &note_href(&slug))
}

pub async fn history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let viewer = with_store(&state, move |store| {
        let documents = load(store)?;
        let generations = store
            .history(&id)
            .map_err(|e| AppError::store(format!("Failed to read history of {}", id), e))?;
        if generations.is_empty() && documents.find_by_id(&id).is_none() {
            return Err(AppError::not_found());
        }
        Ok(render_history(&documents, &id, &generations))
    })
    .await?;

    Ok(page_response(StatusCode::OK, &viewer.page_title(), viewer.content))
}

pub async fn revision(
    State(state): State<AppState>,
    Path((id, generation)): Path<(String, u64)>,
) -> Result<Response, AppError> {
    let viewer = with_store(&state, move |store| {
        let documents = load(store)?;
        let raw = store.read_to_string(&id, generation).map_err(|e| {
            if e.is_not_found() {
                AppError::not_found()
            } else {
                AppError::store(format!("Failed to open file {}", id), e)
            }
        })?;
        Ok(render_revision(&documents, &id, generation, &raw))
    })
    .await?;

    Ok(page_response(StatusCode::OK, &viewer.page_title(), viewer.content))
}

/// Run `f` against the store on the blocking pool
async fn with_store<T, F>(state: &AppState, f: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce(&dyn NoteStore) -> Result<T, AppError> + Send + 'static,
{
    let store = Arc::clone(&state.store);
    tokio::task::spawn_blocking(move || f(store.as_ref()))
        .await
        .map_err(|e| AppError::internal("Unknown error", e))?
}

fn load(store: &dyn NoteStore) -> Result<DocumentMap, AppError> {
    load_documents(store).map_err(|e| AppError::store("Failed to load notes", e))
}

fn viewer_response(viewer: Viewer) -> Response {
    let status = if viewer.exists {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };
    page_response(status, &viewer.page_title(), viewer.content)
}

fn editor_response(form: &DocumentForm) -> Response {
    page_response(StatusCode::OK, EDITOR_TITLE, templates::editor(form))
}

fn page_response(status: StatusCode, title: &str, body: Markup) -> Response {
    (status, Html(templates::page(title, body).into_string())).into_response()
}

/// Empty response pointing the client at `location`
fn redirect(status: StatusCode, location: &str) -> Result<Response, AppError> {
    Response::builder()
        .status(status)
        .header(header::LOCATION, location)
        .body(Body::empty())
        .map_err(|source| AppError::Render {
            description: "Failed to build redirect".to_string(),
            source,
        })
}
