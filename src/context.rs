//! Builds the generation request from persona rules and post history.

use crate::constants::EMPTY_HISTORY;
use crate::error::LogErr;
use crate::models::ChatMessage;
use crate::persona;
use crate::services::store::PostStore;

/// Fetch recent posts, degrading to the empty-history marker on failure
pub async fn fetch_history(store: &dyn PostStore, limit: i64) -> String {
    let history = store
        .get_recent_posts_formatted(limit)
        .await
        .log_or("history fetch failed, continuing without it", String::new());

    if history.trim().is_empty() {
        EMPTY_HISTORY.to_string()
    } else {
        history
    }
}

fn history_message(previous_posts: &str, closing: &str) -> String {
    format!(
        r#"
Recent tweets (do not repeat wording or structure):
{}

{}

{}
"#,
        previous_posts,
        persona::sample_tweets_block(),
        closing
    )
}

/// Messages for the single-shot flow
pub fn simple_messages(previous_posts: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(persona::SYSTEM_PROMPT),
        ChatMessage::user(history_message(
            previous_posts,
            "Write one new tweet.\nOutput ONLY the tweet text.",
        )),
    ]
}

/// Messages that open the plan / act / compose flow
pub fn agent_messages(previous_posts: &str, tools_description: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(persona::agent_system_prompt(tools_description)),
        ChatMessage::user(history_message(
            previous_posts,
            "Plan the next tweet. Decide which tools, if any, to call first.",
        )),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChatRole;
    use crate::services::store::StoreError;
    use async_trait::async_trait;

    struct FixedStore(Result<String, String>);

    #[async_trait]
    impl PostStore for FixedStore {
        async fn get_recent_posts_formatted(&self, _limit: i64) -> Result<String, StoreError> {
            self.0.clone().map_err(StoreError::Unavailable)
        }

        async fn save_post(&self, _: &str, _: &str, _: bool) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_history_passthrough() {
        let store = FixedStore(Ok("- a\n- b".into()));
        assert_eq!(fetch_history(&store, 40).await, "- a\n- b");
    }

    #[tokio::test]
    async fn test_history_failure_degrades() {
        let store = FixedStore(Err("connection refused".into()));
        assert_eq!(fetch_history(&store, 40).await, "none");

        let store = FixedStore(Ok("  ".into()));
        assert_eq!(fetch_history(&store, 40).await, "none");
    }

    #[test]
    fn test_simple_messages_layout() {
        let messages = simple_messages("- old tweet");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, ChatRole::System);
        assert!(messages[0].content.contains("No hashtags"));
        assert_eq!(messages[1].role, ChatRole::User);
        assert!(messages[1].content.contains("- old tweet"));
        assert!(messages[1].content.contains("DON'T REPEAT THESE"));
        assert!(messages[1].content.contains("Output ONLY the tweet text."));
    }

    #[test]
    fn test_agent_messages_include_tools() {
        let messages = agent_messages("none", "- generate_image: draw");
        assert!(messages[0].content.contains("- generate_image: draw"));
        assert!(messages[0].content.contains("never more than 250"));
    }
}
