//! X API v2 client: tweet creation and media upload

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::constants::{MAX_STATUS_POLLS, MEDIA_CHUNK_SIZE, TWITTER_API_BASE};

/// Largest image X accepts through the one-shot upload endpoint (5 MB)
const SIMPLE_UPLOAD_LIMIT: usize = 5 * 1024 * 1024;

/// The social platform collaborator
#[async_trait]
pub trait SocialPlatform: Send + Sync {
    /// Create a tweet. The response id may be missing on malformed replies.
    async fn post_tweet(
        &self,
        text: &str,
        media_ids: &[String],
    ) -> Result<TweetResponse, TwitterError>;

    /// Upload media and return its media id
    async fn upload_media(&self, data: &[u8], media_type: &str) -> Result<String, TwitterError>;
}

/// X API v2 client authenticated with an OAuth 2.0 user access token
#[derive(Clone)]
pub struct TwitterClient {
    access_token: String,
    api_base: String,
    http: Client,
}

impl TwitterClient {
    pub fn new(access_token: &str) -> Self {
        Self::with_api_base(access_token, TWITTER_API_BASE)
    }

    pub fn with_api_base(access_token: &str, api_base: &str) -> Self {
        Self {
            access_token: access_token.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    /// One-shot multipart upload for images
    async fn upload_media_simple(
        &self,
        data: &[u8],
        media_type: &str,
    ) -> Result<String, TwitterError> {
        let media_category = if media_type == "image/gif" {
            "tweet_gif"
        } else {
            "tweet_image"
        };

        let part = reqwest::multipart::Part::bytes(data.to_vec())
            .mime_str(media_type)
            .map_err(|e| TwitterError::Api(format!("Invalid mime type: {}", e)))?;

        let form = reqwest::multipart::Form::new()
            .text("media_category", media_category.to_string())
            .text("media_type", media_type.to_string())
            .part("media", part);

        let resp = self
            .http
            .post(format!("{}/media/upload", self.api_base))
            .header("Authorization", self.bearer())
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(TwitterError::Api(format!("Status {}: {}", status, text)));
        }

        let wrapper = parse_media_response(&text, "upload")?;
        Ok(wrapper.data.id)
    }

    /// Chunked upload via INIT / APPEND / FINALIZE
    async fn upload_media_chunked(
        &self,
        data: &[u8],
        media_type: &str,
    ) -> Result<String, TwitterError> {
        let media_category = if media_type.starts_with("video/") {
            "tweet_video"
        } else if media_type == "image/gif" {
            "tweet_gif"
        } else {
            "tweet_image"
        };

        tracing::debug!(media_type, total_bytes = data.len(), media_category, "media INIT");

        let init_body = serde_json::json!({
            "media_type": media_type,
            "total_bytes": data.len(),
            "media_category": media_category
        });

        let resp = self
            .http
            .post(format!("{}/media/upload/initialize", self.api_base))
            .header("Authorization", self.bearer())
            .json(&init_body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(TwitterError::Api(format!("INIT failed - Status {}: {}", status, text)));
        }

        let media_id = parse_media_response(&text, "INIT")?.data.id;

        let total_segments = data.chunks(MEDIA_CHUNK_SIZE).len();
        for (segment_index, chunk) in data.chunks(MEDIA_CHUNK_SIZE).enumerate() {
            tracing::debug!(
                media_id = %media_id,
                segment = segment_index + 1,
                total_segments,
                bytes = chunk.len(),
                "media APPEND"
            );

            let part = reqwest::multipart::Part::bytes(chunk.to_vec())
                .mime_str(media_type)
                .map_err(|e| TwitterError::Api(format!("Invalid mime type: {}", e)))?;

            let append_form = reqwest::multipart::Form::new()
                .text("segment_index", segment_index.to_string())
                .part("media", part);

            let resp = self
                .http
                .post(format!("{}/media/upload/{}/append", self.api_base, media_id))
                .header("Authorization", self.bearer())
                .multipart(append_form)
                .send()
                .await?;

            let status = resp.status();
            if !status.is_success() {
                let text = resp.text().await?;
                return Err(TwitterError::Api(format!(
                    "APPEND failed at segment {} - Status {}: {}",
                    segment_index, status, text
                )));
            }
        }

        let resp = self
            .http
            .post(format!("{}/media/upload/{}/finalize", self.api_base, media_id))
            .header("Authorization", self.bearer())
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(TwitterError::Api(format!(
                "FINALIZE failed - Status {}: {}",
                status, text
            )));
        }

        let finalize_response = parse_media_response(&text, "FINALIZE")?;
        if let Some(ref processing_info) = finalize_response.data.processing_info {
            if processing_info.state != "succeeded" {
                self.wait_for_processing(&media_id, MAX_STATUS_POLLS).await?;
            }
        }

        Ok(media_id)
    }

    /// Poll the STATUS endpoint until processing completes or `max_polls` checks run out
    async fn wait_for_processing(
        &self,
        media_id: &str,
        max_polls: u32,
    ) -> Result<(), TwitterError> {
        let url = format!(
            "{}/media/upload?command=STATUS&media_id={}",
            self.api_base, media_id
        );

        for poll in 1..=max_polls {
            let resp = self
                .http
                .get(&url)
                .header("Authorization", self.bearer())
                .send()
                .await?;

            let status = resp.status();
            let text = resp.text().await?;

            if !status.is_success() {
                return Err(TwitterError::Api(format!(
                    "STATUS check failed - Status {}: {}",
                    status, text
                )));
            }

            let status_response = parse_media_response(&text, "STATUS")?;
            let Some(processing_info) = status_response.data.processing_info else {
                return Ok(());
            };

            match processing_info.state.as_str() {
                "succeeded" => return Ok(()),
                "failed" => return Err(TwitterError::Api("Media processing failed".to_string())),
                state if poll < max_polls => {
                    let wait_secs = processing_info.check_after_secs.unwrap_or(5).max(1);
                    tracing::debug!(media_id, state, poll, wait_secs, "media still processing");
                    tokio::time::sleep(std::time::Duration::from_secs(wait_secs)).await;
                }
                _ => {}
            }
        }

        tracing::warn!(media_id, max_polls, "media processing did not finish");
        Err(TwitterError::Api("media processing timed out".to_string()))
    }
}

#[async_trait]
impl SocialPlatform for TwitterClient {
    async fn post_tweet(
        &self,
        text: &str,
        media_ids: &[String],
    ) -> Result<TweetResponse, TwitterError> {
        let body = tweet_body(text, media_ids)?;

        let resp = self
            .http
            .post(format!("{}/tweets", self.api_base))
            .header("Authorization", self.bearer())
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await?;
            return Err(TwitterError::Api(format!("Status {}: {}", status, text)));
        }

        let wrapper: TweetResponseWrapper = resp.json().await?;
        let tweet = wrapper.data.unwrap_or_default();
        tracing::info!(tweet_id = tweet.id.as_deref(), "tweet posted");
        Ok(tweet)
    }

    async fn upload_media(&self, data: &[u8], media_type: &str) -> Result<String, TwitterError> {
        if media_type.starts_with("video/") || data.len() > SIMPLE_UPLOAD_LIMIT {
            return self.upload_media_chunked(data, media_type).await;
        }
        self.upload_media_simple(data, media_type).await
    }
}

/// Build the create-tweet body, refusing tweets with neither text nor media
fn tweet_body(text: &str, media_ids: &[String]) -> Result<serde_json::Value, TwitterError> {
    let text = text.trim();
    if text.is_empty() && media_ids.is_empty() {
        return Err(TwitterError::EmptyTweet);
    }

    let mut body = serde_json::Map::new();
    if !text.is_empty() {
        body.insert("text".into(), text.into());
    }
    if !media_ids.is_empty() {
        body.insert("media".into(), serde_json::json!({ "media_ids": media_ids }));
    }
    Ok(serde_json::Value::Object(body))
}

fn parse_media_response(text: &str, stage: &str) -> Result<MediaUploadResponse, TwitterError> {
    serde_json::from_str(text).map_err(|e| {
        TwitterError::Api(format!(
            "Failed to parse {} response: {} - body: {}",
            stage, e, text
        ))
    })
}

#[derive(Debug, Deserialize)]
struct MediaUploadResponse {
    data: MediaUploadData,
}

#[derive(Debug, Deserialize)]
struct MediaUploadData {
    id: String,
    processing_info: Option<MediaProcessingInfo>,
}

#[derive(Debug, Deserialize)]
struct MediaProcessingInfo {
    state: String,
    check_after_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TweetResponseWrapper {
    data: Option<TweetResponse>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TweetResponse {
    pub id: Option<String>,
    pub text: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum TwitterError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Twitter API error: {0}")]
    Api(String),
    #[error("Cannot post empty tweet: must provide text or media")]
    EmptyTweet,
}
