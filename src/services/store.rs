//! Post history persistence

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::constants::EMPTY_HISTORY;
use crate::domain::posts;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// The persistence collaborator
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Recent post texts as a bulleted list, newest first
    async fn get_recent_posts_formatted(&self, limit: i64) -> Result<String, StoreError>;

    async fn save_post(
        &self,
        text: &str,
        external_id: &str,
        include_picture: bool,
    ) -> Result<(), StoreError>;
}

/// Render post texts as `- text` lines, or the empty-history marker
pub fn format_recent_posts<'a>(texts: impl IntoIterator<Item = &'a str>) -> String {
    let lines: Vec<String> = texts.into_iter().map(|t| format!("- {}", t)).collect();
    if lines.is_empty() {
        EMPTY_HISTORY.to_string()
    } else {
        lines.join("\n")
    }
}

#[derive(Clone)]
pub struct PgPostStore {
    db: PgPool,
}

impl PgPostStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        posts::ensure_schema(&self.db).await?;
        Ok(())
    }

    pub async fn count_posts_since(&self, since: DateTime<Utc>) -> Result<i64, StoreError> {
        Ok(posts::count_posts_since(&self.db, since).await?)
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn get_recent_posts_formatted(&self, limit: i64) -> Result<String, StoreError> {
        let records = posts::list_recent_posts(&self.db, limit).await?;
        Ok(format_recent_posts(records.iter().map(|r| r.text.as_str())))
    }

    async fn save_post(
        &self,
        text: &str,
        external_id: &str,
        include_picture: bool,
    ) -> Result<(), StoreError> {
        let id = posts::insert_post(&self.db, text, external_id, include_picture).await?;
        tracing::debug!(post_id = id, tweet_id = external_id, "post saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_recent_posts() {
        assert_eq!(
            format_recent_posts(["newest", "older"]),
            "- newest\n- older"
        );
    }

    #[test]
    fn test_format_empty_history() {
        assert_eq!(format_recent_posts(Vec::<&str>::new()), "none");
    }
}
