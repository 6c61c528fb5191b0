//! `generate_image` tool backed by an OpenAI-compatible images API

use async_trait::async_trait;
use base64::Engine;
use bytes::Bytes;
use reqwest::Client;
use serde::Deserialize;

use crate::constants::IMAGE_TOOL_NAME;
use crate::services::tools::{Tool, ToolError, ToolOutput, ToolParams};

const DEFAULT_SIZE: &str = "1024x1024";

/// `generate_image` tool backed by an OpenAI-compatible images API
#[derive(Clone)]
pub struct ImageGenerator {
    api_key: String,
    base_url: String,
    model: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    b64_json: Option<String>,
}

impl ImageGenerator {
    pub fn new(api_key: &str, base_url: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            http: Client::new(),
        }
    }
}

fn prompt_param(params: &ToolParams) -> Result<&str, ToolError> {
    params
        .get("prompt")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ToolError::InvalidParams("'prompt' must be a non-empty string".into()))
}

fn decode_image(response: ImagesResponse) -> Result<Vec<u8>, ToolError> {
    let b64 = response
        .data
        .into_iter()
        .find_map(|d| d.b64_json)
        .ok_or_else(|| ToolError::Api("response contained no image".into()))?;

    base64::engine::general_purpose::STANDARD
        .decode(b64.as_bytes())
        .map_err(|e| ToolError::Decode(e.to_string()))
}

#[async_trait]
impl Tool for ImageGenerator {
    fn name(&self) -> &str {
        IMAGE_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Generate an image to attach to the tweet. params: {\"prompt\": string, \"size\": optional string like \"1024x1024\"}"
    }

    async fn invoke(&self, params: &ToolParams) -> Result<ToolOutput, ToolError> {
        let prompt = prompt_param(params)?;
        let size = params
            .get("size")
            .and_then(|v| v.as_str())
            .unwrap_or(DEFAULT_SIZE);

        let body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "n": 1,
            "size": size,
            "response_format": "b64_json"
        });

        let resp = self
            .http
            .post(format!("{}/images/generations", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await?;
            return Err(ToolError::Api(format!("Status {}: {}", status, text)));
        }

        let data = decode_image(resp.json().await?)?;
        tracing::info!(bytes = data.len(), "image generated");

        Ok(ToolOutput {
            summary: format!("image generated for prompt '{}' ({} bytes)", prompt, data.len()),
            media: Some(Bytes::from(data)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prompt_param_required() {
        let params = json!({ "prompt": "  a red candle  " });
        assert_eq!(prompt_param(params.as_object().unwrap()).unwrap(), "a red candle");

        let params = json!({ "prompt": "   " });
        assert!(matches!(
            prompt_param(params.as_object().unwrap()),
            Err(ToolError::InvalidParams(_))
        ));
        assert!(prompt_param(&ToolParams::new()).is_err());
    }

    #[test]
    fn test_decode_image() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(b"png-bytes");
        let response: ImagesResponse =
            serde_json::from_value(json!({ "data": [{ "b64_json": encoded }] })).unwrap();
        assert_eq!(decode_image(response).unwrap(), b"png-bytes");

        let empty: ImagesResponse = serde_json::from_value(json!({ "data": [] })).unwrap();
        assert!(matches!(decode_image(empty), Err(ToolError::Api(_))));

        let bad: ImagesResponse =
            serde_json::from_value(json!({ "data": [{ "b64_json": "%%%" }] })).unwrap();
        assert!(matches!(decode_image(bad), Err(ToolError::Decode(_))));
    }
}
