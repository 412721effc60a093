//! Author Repository

use super::RepoResult;
use shared::models::Author;
use sqlx::{SqliteConnection, SqlitePool};

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Author>> {
    let authors =
        sqlx::query_as::<_, Author>("SELECT id, name, biography FROM author ORDER BY name")
            .fetch_all(pool)
            .await?;
    Ok(authors)
}

/// Look up an author by exact name, inserting it when absent.
///
/// Keyed on the string exactly as supplied; names differing only in
/// whitespace or diacritics create distinct authors (known limitation).
pub async fn resolve_or_create(conn: &mut SqliteConnection, name: &str) -> RepoResult<Author> {
    let existing =
        sqlx::query_as::<_, Author>("SELECT id, name, biography FROM author WHERE name = ?")
            .bind(name)
            .fetch_optional(&mut *conn)
            .await?;
    if let Some(author) = existing {
        return Ok(author);
    }

    let author = sqlx::query_as::<_, Author>(
        "INSERT INTO author (name) VALUES (?) RETURNING id, name, biography",
    )
    .bind(name)
    .fetch_one(conn)
    .await?;
    Ok(author)
}

/// Authors of a book, in stored order.
pub async fn find_by_book(pool: &SqlitePool, book_id: i64) -> RepoResult<Vec<Author>> {
    let authors = sqlx::query_as::<_, Author>(
        "SELECT a.id, a.name, a.biography FROM book_author ba JOIN author a ON ba.author_id = a.id WHERE ba.book_id = ? ORDER BY ba.position",
    )
    .bind(book_id)
    .fetch_all(pool)
    .await?;
    Ok(authors)
}
