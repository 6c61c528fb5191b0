//! Run outcome reporting

use std::time::Instant;

use serde::Serialize;

/// Outcome of one autopost run. Always returned, never an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tweet_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub duration_seconds: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools_used: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_image: Option<bool>,
}

/// Seconds since `started`, rounded to one decimal
pub fn elapsed_seconds(started: Instant) -> f64 {
    round_tenths(started.elapsed().as_secs_f64())
}

fn round_tenths(secs: f64) -> f64 {
    (secs * 10.0).round() / 10.0
}

impl RunResult {
    pub fn posted(tweet_id: String, text: String, started: Instant) -> Self {
        Self {
            success: true,
            tweet_id: Some(tweet_id),
            text: Some(text),
            duration_seconds: elapsed_seconds(started),
            ..Default::default()
        }
    }

    pub fn failed(kind: &'static str, error: String, started: Instant) -> Self {
        Self {
            success: false,
            error: Some(error),
            error_kind: Some(kind),
            duration_seconds: elapsed_seconds(started),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_tenths() {
        assert_eq!(round_tenths(1.04), 1.0);
        assert_eq!(round_tenths(1.06), 1.1);
        assert_eq!(round_tenths(0.0), 0.0);
    }

    #[test]
    fn test_serialized_shape() {
        let result = RunResult::posted("123".into(), "gm".into(), Instant::now());
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["tweet_id"], "123");
        assert_eq!(value["text"], "gm");
        assert!(value.get("error").is_none());
        assert!(value["duration_seconds"].is_number());

        let failed = RunResult::failed("publish_failed", "boom".into(), Instant::now());
        let value = serde_json::to_value(&failed).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error_kind"], "publish_failed");
        assert!(value.get("tweet_id").is_none());
    }
}
