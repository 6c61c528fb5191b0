//! Posts domain - published tweet history

use chrono::{DateTime, Utc};
use sqlx::{Executor, Postgres};

use crate::models::PostRecord;

pub const CREATE_POSTS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS posts (
        id BIGSERIAL PRIMARY KEY,
        text TEXT NOT NULL,
        tweet_id TEXT NOT NULL,
        include_picture BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

pub async fn ensure_schema<'e, E>(executor: E) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(CREATE_POSTS_TABLE).execute(executor).await?;
    Ok(())
}

/// Most recent posts, newest first
pub async fn list_recent_posts<'e, E>(executor: E, limit: i64) -> Result<Vec<PostRecord>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as::<_, PostRecord>(
        r#"
        SELECT id, text, tweet_id, include_picture, created_at
        FROM posts
        ORDER BY created_at DESC, id DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(executor)
    .await
}

pub async fn insert_post<'e, E>(
    executor: E,
    text: &str,
    tweet_id: &str,
    include_picture: bool,
) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO posts (text, tweet_id, include_picture, created_at)
        VALUES ($1, $2, $3, NOW())
        RETURNING id
        "#,
    )
    .bind(text)
    .bind(tweet_id)
    .bind(include_picture)
    .fetch_one(executor)
    .await?;
    Ok(id)
}

pub async fn count_posts_since<'e, E>(executor: E, since: DateTime<Utc>) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts WHERE created_at >= $1")
        .bind(since)
        .fetch_one(executor)
        .await?;
    Ok(count)
}
