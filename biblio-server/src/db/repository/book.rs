//! Book Repository
//!
//! Owns the inventory counters. `check_out` / `check_in` are the only
//! places `available_copies` moves, and both are guarded updates meant to
//! run inside a circulation transaction.

use super::{author, category, RepoError, RepoResult};
use shared::models::{Book, BookCreate, BookStatus, BookUpdate, BookWithDetails};
use shared::ErrorCode;
use sqlx::{SqliteConnection, SqlitePool};

const BOOK_SELECT: &str = "SELECT id, title, isbn, category_id, publication_year, total_copies, available_copies, cover_image, status, added_date, last_updated FROM book";

const BOOK_DETAILS_SELECT: &str = "SELECT b.id, b.title, b.isbn, b.category_id, c.name AS category_name, b.publication_year, b.total_copies, b.available_copies, b.cover_image, b.status, b.added_date, b.last_updated FROM book b LEFT JOIN category c ON b.category_id = c.id";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<BookWithDetails>> {
    let sql = format!("{} ORDER BY b.added_date DESC", BOOK_DETAILS_SELECT);
    let mut books = sqlx::query_as::<_, BookWithDetails>(&sql)
        .fetch_all(pool)
        .await?;
    attach_authors(pool, &mut books).await?;
    Ok(books)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Book>> {
    let sql = format!("{} WHERE id = ?", BOOK_SELECT);
    let book = sqlx::query_as::<_, Book>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(book)
}

pub async fn find_by_isbn(pool: &SqlitePool, isbn: &str) -> RepoResult<Option<Book>> {
    let sql = format!("{} WHERE isbn = ? LIMIT 1", BOOK_SELECT);
    let book = sqlx::query_as::<_, Book>(&sql)
        .bind(isbn)
        .fetch_optional(pool)
        .await?;
    Ok(book)
}

pub async fn find_with_details(pool: &SqlitePool, id: i64) -> RepoResult<Option<BookWithDetails>> {
    let sql = format!("{} WHERE b.id = ?", BOOK_DETAILS_SELECT);
    let book = sqlx::query_as::<_, BookWithDetails>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    match book {
        Some(mut book) => {
            book.authors = author::find_by_book(pool, book.id).await?;
            Ok(Some(book))
        }
        None => Ok(None),
    }
}

/// Latest additions (dashboard)
pub async fn latest(pool: &SqlitePool, limit: i64) -> RepoResult<Vec<BookWithDetails>> {
    let sql = format!("{} ORDER BY b.added_date DESC LIMIT ?", BOOK_DETAILS_SELECT);
    let mut books = sqlx::query_as::<_, BookWithDetails>(&sql)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    attach_authors(pool, &mut books).await?;
    Ok(books)
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book")
        .fetch_one(pool)
        .await?;
    Ok(n)
}

pub async fn create(pool: &SqlitePool, data: BookCreate) -> RepoResult<BookWithDetails> {
    let total = data.total_copies.unwrap_or(1);
    let available = data.available_copies.unwrap_or(total);
    if total < 0 || available < 0 || available > total {
        return Err(RepoError::Validation(format!(
            "available_copies must satisfy 0 <= {available} <= total_copies ({total})"
        )));
    }

    if find_by_isbn(pool, &data.isbn).await?.is_some() {
        return Err(RepoError::Business(
            ErrorCode::DuplicateIsbn,
            format!("ISBN {} is already registered", data.isbn),
        ));
    }

    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();

    let mut tx = pool.begin().await?;

    let category_id = match &data.category_name {
        Some(name) if !name.trim().is_empty() => {
            Some(category::resolve_or_create(&mut tx, name).await?.id)
        }
        _ => None,
    };

    sqlx::query(
        "INSERT INTO book (id, title, isbn, category_id, publication_year, total_copies, available_copies, cover_image, status, added_date, last_updated) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(&data.title)
    .bind(&data.isbn)
    .bind(category_id)
    .bind(data.publication_year)
    .bind(total)
    .bind(available)
    .bind(&data.cover_image)
    .bind(BookStatus::Available)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    replace_authors(&mut tx, id, &data.author_names).await?;

    tx.commit().await?;

    find_with_details(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create book".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: BookUpdate) -> RepoResult<BookWithDetails> {
    let mut tx = pool.begin().await?;

    let sql = format!("{} WHERE id = ?", BOOK_SELECT);
    let existing = sqlx::query_as::<_, Book>(&sql)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Book {id} not found")))?;

    // Copies currently out on loan, derived from the counter pair
    let copies_out = existing.total_copies - existing.available_copies;
    let total = data.total_copies.unwrap_or(existing.total_copies);
    if total < copies_out {
        return Err(RepoError::Validation(format!(
            "total_copies ({total}) cannot drop below the {copies_out} copies currently on loan"
        )));
    }
    let available = match data.available_copies {
        Some(a) => a,
        None => total - copies_out,
    };
    if available < 0 || available > total {
        return Err(RepoError::Validation(format!(
            "available_copies must satisfy 0 <= {available} <= total_copies ({total})"
        )));
    }

    let category_id = match &data.category_name {
        Some(name) if !name.trim().is_empty() => {
            Some(category::resolve_or_create(&mut tx, name).await?.id)
        }
        Some(_) => None,
        None => existing.category_id,
    };

    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE book SET title = ?, isbn = ?, category_id = ?, publication_year = ?, total_copies = ?, available_copies = ?, cover_image = ?, status = ?, last_updated = ? WHERE id = ?",
    )
    .bind(data.title.as_deref().unwrap_or(&existing.title))
    .bind(data.isbn.as_deref().unwrap_or(&existing.isbn))
    .bind(category_id)
    .bind(data.publication_year.or(existing.publication_year))
    .bind(total)
    .bind(available)
    .bind(data.cover_image.as_deref().or(existing.cover_image.as_deref()))
    .bind(data.status.unwrap_or(existing.status))
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if let Some(ref names) = data.author_names {
        replace_authors(&mut tx, id, names).await?;
    }

    tx.commit().await?;

    find_with_details(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Book {id} not found")))
}

/// Delete a book. Blocked while any borrow record is still outstanding;
/// historical (returned) borrow rows are removed by the FK cascade.
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let outstanding: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM borrow WHERE book_id = ? AND status IN ('active', 'overdue')",
    )
    .bind(id)
    .fetch_one(pool)
    .await?;
    if outstanding > 0 {
        return Err(RepoError::Business(
            ErrorCode::BookHasActiveBorrows,
            format!("Book {id} has {outstanding} outstanding borrow record(s)"),
        ));
    }

    let rows = sqlx::query("DELETE FROM book WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

// ── Circulation counter operations (transaction-scoped) ─────────────

/// Take one copy out of circulation.
///
/// Guarded update: the precondition lives in the WHERE clause so the
/// check and the decrement are one statement under the write lock.
pub async fn check_out(conn: &mut SqliteConnection, id: i64) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE book SET available_copies = available_copies - 1, status = CASE WHEN available_copies - 1 = 0 THEN 'borrowed' ELSE status END, last_updated = ? WHERE id = ? AND available_copies >= 1 AND status != 'lost'",
    )
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if rows.rows_affected() == 0 {
        let sql = format!("{} WHERE id = ?", BOOK_SELECT);
        let book = sqlx::query_as::<_, Book>(&sql)
            .bind(id)
            .fetch_optional(conn)
            .await?;
        return Err(match book {
            None => RepoError::NotFound(format!("Book {id} not found")),
            Some(b) if b.status == BookStatus::Lost => RepoError::Business(
                ErrorCode::BookLost,
                format!("Book {id} is marked lost and cannot circulate"),
            ),
            Some(_) => RepoError::Business(
                ErrorCode::InsufficientCopies,
                format!("Book {id} has no available copies"),
            ),
        });
    }
    Ok(())
}

/// Put one copy back into circulation.
///
/// Fails with `OverReturn` if the increment would exceed `total_copies`
/// (guards against double-return). A book flagged lost keeps that status
/// until corrected manually.
pub async fn check_in(conn: &mut SqliteConnection, id: i64) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE book SET available_copies = available_copies + 1, status = CASE WHEN available_copies = 0 AND status != 'lost' THEN 'available' ELSE status END, last_updated = ? WHERE id = ? AND available_copies < total_copies",
    )
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if rows.rows_affected() == 0 {
        let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book WHERE id = ?")
            .bind(id)
            .fetch_one(conn)
            .await?;
        return Err(if exists == 0 {
            RepoError::NotFound(format!("Book {id} not found"))
        } else {
            RepoError::Business(
                ErrorCode::OverReturn,
                format!("Book {id} already has all copies checked in"),
            )
        });
    }
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Replace the author set of a book from free-text names, preserving the
/// supplied order.
async fn replace_authors(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    book_id: i64,
    names: &[String],
) -> RepoResult<()> {
    sqlx::query("DELETE FROM book_author WHERE book_id = ?")
        .bind(book_id)
        .execute(&mut **tx)
        .await?;

    let mut position = 0i32;
    for name in names {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let author = author::resolve_or_create(&mut **tx, name).await?;
        // INSERT OR IGNORE: the same author may appear twice in the input
        sqlx::query(
            "INSERT OR IGNORE INTO book_author (book_id, author_id, position) VALUES (?, ?, ?)",
        )
        .bind(book_id)
        .bind(author.id)
        .bind(position)
        .execute(&mut **tx)
        .await?;
        position += 1;
    }
    Ok(())
}

/// Bulk-load authors for a page of books (one junction query, grouped in
/// application code).
async fn attach_authors(pool: &SqlitePool, books: &mut [BookWithDetails]) -> RepoResult<()> {
    if books.is_empty() {
        return Ok(());
    }
    let rows: Vec<(i64, i64, String, Option<String>)> = sqlx::query_as(
        "SELECT ba.book_id, a.id, a.name, a.biography FROM book_author ba JOIN author a ON ba.author_id = a.id ORDER BY ba.book_id, ba.position",
    )
    .fetch_all(pool)
    .await?;

    for book in books.iter_mut() {
        book.authors = rows
            .iter()
            .filter(|(book_id, _, _, _)| *book_id == book.id)
            .map(|(_, id, name, biography)| shared::models::Author {
                id: *id,
                name: name.clone(),
                biography: biography.clone(),
            })
            .collect();
    }
    Ok(())
}
