//! Book API handlers

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::audit::AuditAction;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::book;
use crate::utils::validation::{
    validate_count, validate_isbn, validate_optional_text, validate_required_text, MAX_NAME_LEN,
    MAX_URL_LEN,
};
use crate::utils::{AppError, AppResult};
use shared::models::{BookCreate, BookUpdate, BookWithDetails};

/// GET /api/books - list the catalog
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<BookWithDetails>>> {
    let books = book::find_all(&state.pool).await?;
    Ok(Json(books))
}

/// GET /api/books/:id - single book with authors and category
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<BookWithDetails>> {
    let book = book::find_with_details(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Book {}", id)))?;
    Ok(Json(book))
}

/// POST /api/books - add a book to the catalog
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<BookCreate>,
) -> AppResult<Json<BookWithDetails>> {
    validate_required_text(&payload.title, "title", MAX_NAME_LEN)?;
    validate_isbn(&payload.isbn)?;
    validate_optional_text(&payload.cover_image, "cover_image", MAX_URL_LEN)?;
    for name in &payload.author_names {
        validate_required_text(name, "author name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.category_name, "category name", MAX_NAME_LEN)?;
    if let Some(total) = payload.total_copies {
        validate_count(total, "total_copies")?;
    }
    if let Some(available) = payload.available_copies {
        validate_count(available, "available_copies")?;
    }

    let book = book::create(&state.pool, payload).await?;

    state
        .audit_service
        .log(
            AuditAction::BookCreated,
            "book",
            book.id.to_string(),
            Some(current_user.id),
            Some(current_user.display_name.clone()),
            serde_json::json!({"title": &book.title, "isbn": &book.isbn}),
        )
        .await;

    Ok(Json(book))
}

/// PUT /api/books/:id - update a book
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<BookUpdate>,
) -> AppResult<Json<BookWithDetails>> {
    if let Some(ref title) = payload.title {
        validate_required_text(title, "title", MAX_NAME_LEN)?;
    }
    if let Some(ref isbn) = payload.isbn {
        validate_isbn(isbn)?;
    }
    validate_optional_text(&payload.cover_image, "cover_image", MAX_URL_LEN)?;
    if let Some(ref names) = payload.author_names {
        for name in names {
            validate_required_text(name, "author name", MAX_NAME_LEN)?;
        }
    }
    if let Some(total) = payload.total_copies {
        validate_count(total, "total_copies")?;
    }
    if let Some(available) = payload.available_copies {
        validate_count(available, "available_copies")?;
    }

    let book = book::update(&state.pool, id, payload).await?;

    state
        .audit_service
        .log(
            AuditAction::BookUpdated,
            "book",
            id.to_string(),
            Some(current_user.id),
            Some(current_user.display_name.clone()),
            serde_json::json!({"title": &book.title, "isbn": &book.isbn}),
        )
        .await;

    Ok(Json(book))
}

/// DELETE /api/books/:id - remove a book
///
/// Blocked while any borrow is still outstanding; removing a book does
/// not reverse historical ledger effects.
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let title_for_audit = book::find_by_id(&state.pool, id)
        .await
        .ok()
        .flatten()
        .map(|b| b.title)
        .unwrap_or_default();

    let result = book::delete(&state.pool, id).await?;

    if result {
        state
            .audit_service
            .log(
                AuditAction::BookDeleted,
                "book",
                id.to_string(),
                Some(current_user.id),
                Some(current_user.display_name.clone()),
                serde_json::json!({"title": title_for_audit}),
            )
            .await;
    }

    Ok(Json(result))
}
