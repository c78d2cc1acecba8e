//! HTTP adapter for the book tracker.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{get, post},
    Json, Router,
};

use tracker_http::error::AppError;
use tracker_http::response::Envelope;

use super::models::{BookPayload, BookResponse, GenreResponse, ListQuery, ValidationError};
use super::service::{BookTracker, BookTrackerError};

pub type SharedTracker = Arc<dyn BookTracker>;

const SAVE_FAILED: &str = "failed to save book.Refer to logs for more details";
const LIST_FAILED: &str = "failed to get books.Refer to logs for more details";
const OPERATION_FAILED: &str = "operation failed.Refer to logs for more details";

/// Routes of the books module, relative to the API prefix.
pub fn router(tracker: SharedTracker) -> Router {
    Router::new()
        .route("/book", post(add_book).get(list_books).put(update_book))
        .route("/book/{id}", get(get_book))
        .route("/genre", get(group_books_by_genre))
        .with_state(tracker)
}

async fn add_book(
    State(tracker): State<SharedTracker>,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<Json<Envelope>, AppError> {
    let book = validate(payload)?;

    tracker
        .add_book(book)
        .await
        .map_err(|e| AppError::internal(SAVE_FAILED, e))?;

    Ok(Json(Envelope::ok("book creation successful")))
}

async fn update_book(
    State(tracker): State<SharedTracker>,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<Json<Envelope>, AppError> {
    let book = validate(payload)?;

    tracker.update_book(book).await.map_err(classify)?;

    Ok(Json(Envelope::ok("book updated successfully")))
}

async fn get_book(
    State(tracker): State<SharedTracker>,
    Path(id): Path<String>,
) -> Result<Json<BookResponse>, AppError> {
    let book = tracker.get_book(&id).await.map_err(classify)?;

    Ok(Json(BookResponse::single("book retrieval successful", book)))
}

async fn list_books(
    State(tracker): State<SharedTracker>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<BookResponse>, AppError> {
    let Query(query) = query.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    let sort_key = query.validated().map_err(invalid)?;

    let books = tracker
        .list_books(&sort_key)
        .await
        .map_err(|e| AppError::internal(LIST_FAILED, e))?;

    Ok(Json(BookResponse::list("books retrieval successful", books)))
}

async fn group_books_by_genre(
    State(tracker): State<SharedTracker>,
) -> Result<Json<GenreResponse>, AppError> {
    let genres = tracker
        .group_books_by_genre()
        .await
        .map_err(|e| AppError::internal(LIST_FAILED, e))?;

    Ok(Json(GenreResponse::new("books retrieval successful", genres)))
}

fn validate(
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<tracker_kernel::Book, AppError> {
    let Json(payload) =
        payload.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    payload.into_book().map_err(invalid)
}

fn invalid(error: ValidationError) -> AppError {
    AppError::bad_request(error.to_string())
}

/// 404 for a missing book, a generic 500 for anything else.
fn classify(error: BookTrackerError) -> AppError {
    if error.is_not_found() {
        AppError::not_found(error.to_string())
    } else {
        AppError::internal(OPERATION_FAILED, error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::service::BookTrackerService;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use tracker_db::{Fault, MemoryBookStore};
    use tracker_kernel::Book;

    fn stored(isbn: &str, title: &str, genre: &str) -> Book {
        Book {
            isbn: isbn.to_string(),
            title: title.to_string(),
            author: "Test Author".to_string(),
            genre: genre.to_string(),
            ..Book::default()
        }
    }

    fn app(store: MemoryBookStore) -> Router {
        let tracker = BookTrackerService::new(Arc::new(store), tracing::Span::none());
        router(Arc::new(tracker))
    }

    fn book_json() -> Value {
        json!({
            "isbn": "TEST-ISBN-1",
            "title": "Test Book",
            "author": "Test Author",
            "genre": "Fiction",
            "status": "UNREAD"
        })
    }

    async fn send(
        app: Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn add_book_succeeds() {
        let (status, body) = send(
            app(MemoryBookStore::new()),
            Method::POST,
            "/book",
            Some(book_json()),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], 200);
        assert_eq!(body["status"], "OK");
        assert_eq!(body["message"], "book creation successful");
    }

    #[tokio::test]
    async fn add_book_missing_field_is_bad_request() {
        let mut payload = book_json();
        payload["author"] = json!("");

        let (status, body) =
            send(app(MemoryBookStore::new()), Method::POST, "/book", Some(payload)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "missing required field 'author'");
    }

    #[tokio::test]
    async fn add_book_accepts_negative_bookmark() {
        let mut payload = book_json();
        payload["bookmark"] = json!(-1);

        let (status, _) =
            send(app(MemoryBookStore::new()), Method::POST, "/book", Some(payload)).await;

        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn add_book_malformed_json_is_bad_request() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/book")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"isbn\": "))
            .unwrap();

        let response = app(MemoryBookStore::new()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn add_book_storage_failure_is_hidden() {
        let (status, body) = send(
            app(MemoryBookStore::new().with_fault(Fault::Upsert)),
            Method::POST,
            "/book",
            Some(book_json()),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], SAVE_FAILED);
    }

    #[tokio::test]
    async fn update_book_invalid_status_is_bad_request() {
        let mut payload = book_json();
        payload["status"] = json!("bla");

        let (status, body) = send(
            app(MemoryBookStore::with_books([stored("TEST-ISBN-1", "Test Book", "Fiction")])),
            Method::PUT,
            "/book",
            Some(payload),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["message"],
            "Invalid status key. Expected one of UNREAD, IN PROGRESS, FINISHED"
        );
    }

    #[tokio::test]
    async fn update_missing_book_is_not_found() {
        let (status, body) = send(
            app(MemoryBookStore::new()),
            Method::PUT,
            "/book",
            Some(book_json()),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], "Not Found");
        assert_eq!(body["message"], "book with id TEST-ISBN-1 not found");
    }

    #[tokio::test]
    async fn update_storage_failure_is_hidden() {
        let (status, body) = send(
            app(MemoryBookStore::with_books([stored("TEST-ISBN-1", "Test Book", "Fiction")])
                .with_fault(Fault::Upsert)),
            Method::PUT,
            "/book",
            Some(book_json()),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], OPERATION_FAILED);
    }

    #[tokio::test]
    async fn update_book_succeeds() {
        let (status, body) = send(
            app(MemoryBookStore::with_books([stored("TEST-ISBN-1", "Test Book", "Fiction")])),
            Method::PUT,
            "/book",
            Some(book_json()),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "book updated successfully");
    }

    #[tokio::test]
    async fn get_book_returns_the_record() {
        let (status, body) = send(
            app(MemoryBookStore::with_books([stored("X1", "Zed", "Fi")])),
            Method::GET,
            "/book/X1",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "book retrieval successful");
        assert_eq!(body["book"]["isbn"], "X1");
        assert_eq!(body["book"]["title"], "Zed");
    }

    #[tokio::test]
    async fn get_missing_book_is_not_found() {
        let (status, body) =
            send(app(MemoryBookStore::new()), Method::GET, "/book/X9", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 404);
        assert_eq!(body["message"], "book with id X9 not found");
    }

    #[tokio::test]
    async fn get_book_storage_failure_is_hidden() {
        let (status, body) = send(
            app(MemoryBookStore::new().with_fault(Fault::Get)),
            Method::GET,
            "/book/X1",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], OPERATION_FAILED);
    }

    #[tokio::test]
    async fn list_books_rejects_unknown_sort_key() {
        let (status, body) =
            send(app(MemoryBookStore::new()), Method::GET, "/book?sort=bla", None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["message"],
            "Invalid sort key. Expected: title, status or genre"
        );
    }

    #[tokio::test]
    async fn list_books_malformed_query_gets_envelope() {
        let (status, body) = send(
            app(MemoryBookStore::new()),
            Method::GET,
            "/book?sort=title&sort=genre",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 400);
        assert_eq!(body["status"], "Bad Request");
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn list_books_sorted_by_title() {
        let store =
            MemoryBookStore::with_books([stored("X1", "Zed", "Fi"), stored("X2", "Ann", "Fi")]);

        let (status, body) = send(app(store), Method::GET, "/book?sort=title", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);
        assert_eq!(body["books"][0]["isbn"], "X2");
        assert_eq!(body["books"][1]["isbn"], "X1");
    }

    #[tokio::test]
    async fn list_books_without_sort_key() {
        let store =
            MemoryBookStore::with_books([stored("X1", "Zed", "Fi"), stored("X2", "Ann", "Fi")]);

        let (status, body) = send(app(store), Method::GET, "/book", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["books"][0]["isbn"], "X1");
    }

    #[tokio::test]
    async fn list_books_storage_failure_is_hidden() {
        let (status, body) = send(
            app(MemoryBookStore::new().with_fault(Fault::GetAll)),
            Method::GET,
            "/book",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], LIST_FAILED);
    }

    #[tokio::test]
    async fn genres_are_grouped() {
        let store = MemoryBookStore::with_books([
            stored("F1", "One", "Fi"),
            stored("B1", "Two", "Bio"),
            stored("F2", "Three", "Fi"),
        ]);

        let (status, body) = send(app(store), Method::GET, "/genre", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "books retrieval successful");
        assert_eq!(body["genres"][0]["genre"], "Bio");
        assert_eq!(body["genres"][0]["count"], 1);
        assert_eq!(body["genres"][1]["genre"], "Fi");
        assert_eq!(body["genres"][1]["count"], 2);
        assert_eq!(body["genres"][1]["books"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn genre_storage_failure_is_hidden() {
        let (status, body) = send(
            app(MemoryBookStore::new().with_fault(Fault::GetAll)),
            Method::GET,
            "/genre",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], LIST_FAILED);
    }
}
