use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use bookshelf_http::{error::AppError, response::Success};
use serde::Serialize;

use super::models::{Book, BookPayload, BookSummary};
use super::store::{BookError, BookStore};

/// HTTP routes for the books module, bound to one store.
pub fn router(store: Arc<BookStore>) -> Router {
    Router::new()
        .route("/books", post(create_book).get(list_books))
        .route(
            "/books/{book_id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(store)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatedBook {
    book_id: String,
}

#[derive(Serialize)]
struct BookList {
    books: Vec<BookSummary>,
}

#[derive(Serialize)]
struct BookDetail {
    book: Book,
}

/// Which endpoint a store failure came from; each words its failures differently.
#[derive(Debug, Clone, Copy)]
enum Action {
    Create,
    Get,
    Update,
    Delete,
}

impl Action {
    fn fail(self, err: BookError) -> AppError {
        match (self, err) {
            (Action::Create, BookError::MissingName) => AppError::validation(
                "missing_name",
                "Gagal menambahkan buku. Mohon isi nama buku",
            ),
            (Action::Create, BookError::ReadPageExceedsPageCount { .. }) => AppError::validation(
                "read_page_exceeds_page_count",
                "Gagal menambahkan buku. readPage tidak boleh lebih besar dari pageCount",
            ),
            (Action::Update, BookError::MissingName) => AppError::validation(
                "missing_name",
                "Gagal memperbarui buku. Mohon isi nama buku",
            ),
            (Action::Update, BookError::ReadPageExceedsPageCount { .. }) => AppError::validation(
                "read_page_exceeds_page_count",
                "Gagal memperbarui buku. readPage tidak boleh lebih besar dari pageCount",
            ),
            (Action::Get, BookError::NotFound) => AppError::not_found("Buku tidak ditemukan"),
            (Action::Update, BookError::NotFound) => {
                AppError::not_found("Gagal memperbarui buku. Id tidak ditemukan")
            }
            (Action::Delete, BookError::NotFound) => {
                AppError::not_found("Buku gagal dihapus. Id tidak ditemukan")
            }
            (action, err) => AppError::Internal(
                anyhow::Error::new(err).context(format!("unexpected failure during {:?}", action)),
            ),
        }
    }
}

fn invalid_payload(rejection: JsonRejection) -> AppError {
    AppError::validation(
        "invalid_payload",
        format!("Invalid request payload: {}", rejection.body_text()),
    )
}

async fn create_book(
    State(store): State<Arc<BookStore>>,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<Success<CreatedBook>, AppError> {
    let Json(payload) = payload.map_err(invalid_payload)?;
    let book_id = store.create(payload).map_err(|e| Action::Create.fail(e))?;

    Ok(Success::created()
        .message("Buku berhasil ditambahkan")
        .data(CreatedBook { book_id }))
}

async fn list_books(State(store): State<Arc<BookStore>>) -> Success<BookList> {
    Success::ok().data(BookList {
        books: store.list_summary(),
    })
}

async fn get_book(
    State(store): State<Arc<BookStore>>,
    Path(book_id): Path<String>,
) -> Result<Success<BookDetail>, AppError> {
    let book = store.get_by_id(&book_id).map_err(|e| Action::Get.fail(e))?;
    Ok(Success::ok().data(BookDetail { book }))
}

async fn update_book(
    State(store): State<Arc<BookStore>>,
    Path(book_id): Path<String>,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<Success, AppError> {
    let Json(payload) = payload.map_err(invalid_payload)?;
    store
        .update_by_id(&book_id, payload)
        .map_err(|e| Action::Update.fail(e))?;

    Ok(Success::ok().message("Buku berhasil diperbarui"))
}

async fn delete_book(
    State(store): State<Arc<BookStore>>,
    Path(book_id): Path<String>,
) -> Result<Success, AppError> {
    store
        .delete_by_id(&book_id)
        .map_err(|e| Action::Delete.fail(e))?;

    Ok(Success::ok().message("Buku berhasil dihapus"))
}
