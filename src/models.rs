//! Shared data models used across modules

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A published tweet as stored in the database
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct PostRecord {
    pub id: i64,
    pub text: String,
    pub tweet_id: String,
    pub include_picture: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One role-tagged entry of a generation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// A single step of an agent plan. `tool` is optional: a step without one is skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanStep {
    pub tool: Option<String>,
    pub params: serde_json::Map<String, serde_json::Value>,
}

/// Ordered tool invocations proposed by the generator before the final text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    pub reasoning: String,
    pub steps: Vec<PlanStep>,
}
