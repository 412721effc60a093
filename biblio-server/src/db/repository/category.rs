//! Category Repository

use super::RepoResult;
use shared::models::Category;
use sqlx::{SqliteConnection, SqlitePool};

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Category>> {
    let categories = sqlx::query_as::<_, Category>("SELECT id, name FROM category ORDER BY name")
        .fetch_all(pool)
        .await?;
    Ok(categories)
}

/// Look up a category by exact name, inserting it when absent.
pub async fn resolve_or_create(conn: &mut SqliteConnection, name: &str) -> RepoResult<Category> {
    let existing = sqlx::query_as::<_, Category>("SELECT id, name FROM category WHERE name = ?")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;
    if let Some(category) = existing {
        return Ok(category);
    }

    let category =
        sqlx::query_as::<_, Category>("INSERT INTO category (name) VALUES (?) RETURNING id, name")
            .bind(name)
            .fetch_one(conn)
            .await?;
    Ok(category)
}
