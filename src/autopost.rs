//! Autopost orchestration: quota gate, context, generation, tools, publish, record.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::constants::{
    AGENTIC_HISTORY_LIMIT, DEFAULT_MEDIA_TYPE, MAX_CHARS, SIMPLE_HISTORY_LIMIT,
};
use crate::context;
use crate::error::LogErr;
use crate::fallback::{self, AGENT_FALLBACK_TWEETS, FALLBACK_TWEETS};
use crate::models::{ChatMessage, Plan, PlanStep};
use crate::normalize::{clamp, normalize_post_text};
use crate::persona;
use crate::report::RunResult;
use crate::services::llm::{Generator, LlmOutput, ResponseType};
use crate::services::quota::QuotaGate;
use crate::services::store::{PostStore, StoreError};
use crate::services::tools::ToolRegistry;
use crate::services::twitter::{SocialPlatform, TwitterError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutopostMode {
    /// One generation call, clamp, post
    Simple,
    /// Plan, run tools, compose
    #[default]
    Agentic,
}

impl fmt::Display for AutopostMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AutopostMode::Simple => f.write_str("simple"),
            AutopostMode::Agentic => f.write_str("agentic"),
        }
    }
}

impl FromStr for AutopostMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(AutopostMode::Simple),
            "agentic" | "agent" => Ok(AutopostMode::Agentic),
            other => Err(format!("unknown autopost mode '{}'", other)),
        }
    }
}

/// Failures that end a run after generation
#[derive(Debug, thiserror::Error)]
pub enum AutopostError {
    #[error("twitter post failed: {0}")]
    Publish(#[from] TwitterError),
    #[error("Twitter post returned invalid response")]
    MissingTweetId,
    #[error("tweet {tweet_id} published but not recorded: {source}")]
    Unrecorded {
        tweet_id: String,
        #[source]
        source: StoreError,
    },
}

impl AutopostError {
    pub fn kind(&self) -> &'static str {
        match self {
            AutopostError::Publish(_) => "publish_failed",
            AutopostError::MissingTweetId => "missing_tweet_id",
            AutopostError::Unrecorded { .. } => "published_unrecorded",
        }
    }

    /// Id of the live tweet, if the failure happened after posting
    pub fn tweet_id(&self) -> Option<&str> {
        match self {
            AutopostError::Unrecorded { tweet_id, .. } => Some(tweet_id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostReceipt {
    pub tweet_id: String,
    pub includes_media: bool,
}

/// Tweet ready to publish, plus what the agent did to get there
#[derive(Debug, Default)]
struct Draft {
    text: String,
    media: Option<Bytes>,
    tools_used: Vec<String>,
    reasoning: Option<String>,
}

pub struct AutopostService {
    store: Arc<dyn PostStore>,
    llm: Arc<dyn Generator>,
    twitter: Arc<dyn SocialPlatform>,
    quota: Option<Arc<dyn QuotaGate>>,
    tools: ToolRegistry,
    mode: AutopostMode,
}

impl AutopostService {
    pub fn new(
        store: Arc<dyn PostStore>,
        llm: Arc<dyn Generator>,
        twitter: Arc<dyn SocialPlatform>,
    ) -> Self {
        Self {
            store,
            llm,
            twitter,
            quota: None,
            tools: ToolRegistry::new(),
            mode: AutopostMode::default(),
        }
    }

    pub fn with_quota(mut self, quota: Arc<dyn QuotaGate>) -> Self {
        self.quota = Some(quota);
        self
    }

    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_mode(mut self, mode: AutopostMode) -> Self {
        self.mode = mode;
        self
    }

    /// Run the whole workflow once. Failures are reported in the result.
    pub async fn run(&self) -> RunResult {
        let started = Instant::now();
        info!(mode = %self.mode, "autopost starting");

        if let Some(quota) = &self.quota {
            let decision = quota.can_post();
            if !decision.allowed {
                warn!(reason = %decision.reason, "posting blocked");
                let mut result = RunResult::failed(
                    "posting_blocked",
                    format!("posting_blocked: {}", decision.reason),
                    started,
                );
                result.tier = Some(quota.tier());
                result.usage_percent = Some(quota.get_usage_percent());
                return result;
            }
        }

        let draft = match self.mode {
            AutopostMode::Simple => self.draft_simple().await,
            AutopostMode::Agentic => self.draft_agentic().await,
        };

        let mut result = match self.publish(&draft.text, draft.media.as_ref()).await {
            Ok(receipt) => {
                self.count_post();
                let mut result = RunResult::posted(receipt.tweet_id, draft.text, started);
                if self.mode == AutopostMode::Agentic {
                    result.has_image = Some(receipt.includes_media);
                }
                result
            }
            Err(e) => {
                error!(error = %e, kind = e.kind(), "autopost failed");
                if e.tweet_id().is_some() {
                    self.count_post();
                }
                let mut result = RunResult::failed(e.kind(), e.to_string(), started);
                result.tweet_id = e.tweet_id().map(str::to_string);
                result.text = Some(draft.text);
                result
            }
        };

        if self.mode == AutopostMode::Agentic {
            result.tools_used = Some(draft.tools_used);
            result.reasoning = draft.reasoning;
        }

        info!(
            success = result.success,
            tweet_id = result.tweet_id.as_deref(),
            duration_seconds = result.duration_seconds,
            "autopost finished"
        );
        result
    }

    fn count_post(&self) {
        if let Some(quota) = &self.quota {
            quota.record_post();
        }
    }

    async fn draft_simple(&self) -> Draft {
        let history = context::fetch_history(self.store.as_ref(), SIMPLE_HISTORY_LIMIT).await;
        let messages = context::simple_messages(&history);

        let raw = self
            .llm
            .chat(&messages, None)
            .await
            .log_none("generation failed");

        let text = normalize_post_text(raw.as_ref()).unwrap_or_else(|| {
            warn!("LLM returned nothing usable, using fallback tweet");
            fallback::pick(FALLBACK_TWEETS).to_string()
        });

        Draft {
            text: clamp(&text, MAX_CHARS),
            ..Default::default()
        }
    }

    async fn draft_agentic(&self) -> Draft {
        let history = context::fetch_history(self.store.as_ref(), AGENTIC_HISTORY_LIMIT).await;
        let mut messages =
            context::agent_messages(&history, &self.tools.get_tools_description());

        let plan = match self
            .llm
            .chat(&messages, Some(ResponseType::Plan))
            .await
            .log_none("plan request failed, continuing with an empty plan")
        {
            Some(output) => {
                messages.push(ChatMessage::assistant(output.to_transcript()));
                parse_plan(&output)
            }
            None => Plan::default(),
        };
        info!(steps = plan.steps.len(), "plan received");

        let mut draft = Draft::default();
        for (index, step) in plan.steps.iter().enumerate() {
            self.execute_step(index, step, &mut messages, &mut draft).await;

            if let Some(reaction) = self
                .llm
                .chat(&messages, Some(ResponseType::Reaction))
                .await
                .log_none("reaction request failed")
            {
                messages.push(ChatMessage::assistant(reaction_text(&reaction)));
            }
        }

        messages.push(ChatMessage::user(persona::FINAL_INSTRUCTION));
        let output = self
            .llm
            .chat(&messages, Some(ResponseType::PostText))
            .await
            .log_none("post text request failed");

        let text = output.as_ref().and_then(extract_post_text).unwrap_or_else(|| {
            warn!("agent produced no tweet text, using fallback tweet");
            fallback::pick(AGENT_FALLBACK_TWEETS).to_string()
        });

        draft.text = clamp(&text, MAX_CHARS);
        draft.reasoning = Some(plan.reasoning).filter(|r| !r.is_empty());
        draft
    }

    /// Run one plan step. Unknown or missing tools are skipped; a failing tool
    /// is reported to the model and does not stop the plan.
    async fn execute_step(
        &self,
        index: usize,
        step: &PlanStep,
        messages: &mut Vec<ChatMessage>,
        draft: &mut Draft,
    ) {
        let Some(name) = step.tool.as_deref() else {
            debug!(step = index, "plan step names no tool, skipping");
            return;
        };
        let Some(tool) = self.tools.get(name) else {
            debug!(step = index, tool = name, "unknown tool, skipping");
            return;
        };

        info!(step = index, tool = name, "invoking tool");
        match tool.invoke(&step.params).await {
            Ok(output) => {
                messages.push(ChatMessage::user(format!(
                    "Tool `{}` result: {}",
                    name, output.summary
                )));
                if let Some(media) = output.media {
                    draft.media = Some(media);
                }
                draft.tools_used.push(name.to_string());
            }
            Err(e) => {
                warn!(step = index, tool = name, error = %e, "tool failed");
                messages.push(ChatMessage::user(format!("Tool `{}` failed: {}", name, e)));
            }
        }
    }

    /// Upload optional media, post, and record the tweet
    async fn publish(
        &self,
        text: &str,
        media: Option<&Bytes>,
    ) -> Result<PostReceipt, AutopostError> {
        let mut media_ids = Vec::new();
        if let Some(data) = media {
            let media_type = media_type_for(data);
            if let Some(media_id) = self
                .twitter
                .upload_media(data, media_type)
                .await
                .log_none("media upload failed, posting text only")
            {
                media_ids.push(media_id);
            }
        }

        let response = self.twitter.post_tweet(text, &media_ids).await?;
        let tweet_id = response
            .id
            .filter(|id| !id.trim().is_empty())
            .ok_or(AutopostError::MissingTweetId)?;

        let includes_media = !media_ids.is_empty();
        self.store
            .save_post(text, &tweet_id, includes_media)
            .await
            .map_err(|source| AutopostError::Unrecorded {
                tweet_id: tweet_id.clone(),
                source,
            })?;

        info!(tweet_id = %tweet_id, includes_media, "tweet published and recorded");
        Ok(PostReceipt {
            tweet_id,
            includes_media,
        })
    }
}

fn parse_plan(output: &LlmOutput) -> Plan {
    match output {
        LlmOutput::PlainText(text) => Plan {
            reasoning: text.trim().to_string(),
            steps: Vec::new(),
        },
        LlmOutput::StructuredFields(map) => Plan {
            reasoning: output.field("reasoning").unwrap_or_default().trim().to_string(),
            steps: map
                .get("steps")
                .and_then(Value::as_array)
                .map(|steps| steps.iter().map(parse_step).collect())
                .unwrap_or_default(),
        },
    }
}

fn parse_step(value: &Value) -> PlanStep {
    PlanStep {
        tool: value.get("tool").and_then(Value::as_str).map(str::to_string),
        params: value
            .get("params")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default(),
    }
}

fn reaction_text(output: &LlmOutput) -> String {
    output
        .field("reasoning")
        .map(str::to_string)
        .unwrap_or_else(|| output.to_transcript())
}

fn extract_post_text(output: &LlmOutput) -> Option<String> {
    output
        .field("text")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .or_else(|| normalize_post_text(Some(output)))
}

fn media_type_for(data: &[u8]) -> &'static str {
    image::guess_format(data)
        .map(|format| format.to_mime_type())
        .unwrap_or(DEFAULT_MEDIA_TYPE)
}
