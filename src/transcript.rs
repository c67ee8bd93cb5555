use log::debug;
use serde::Deserialize;

use crate::error::AnalyzeError;
use crate::{Segment, Transcript, VideoMetadata, VideoReference};

#[derive(Debug, Deserialize)]
struct SupadataResponse {
    success: Option<bool>,
    data: Option<SupadataData>,
    // Flat shape: `content` is the text, or a list of segments when text=false
    content: Option<SupadataContent>,
    message: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SupadataData {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    segments: Vec<Segment>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SupadataContent {
    Text(String),
    Segments(Vec<Segment>),
}

/// Fetch the transcript for a video from the Supadata transcript API
pub async fn fetch_transcript(
    client: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    video: &VideoReference,
    metadata: VideoMetadata,
) -> Result<Transcript, AnalyzeError> {
    let url = format!("{base_url}/youtube/transcript");
    debug!("Fetching transcript: {url} videoId={}", video.video_id);

    let resp = client
        .get(&url)
        .header("x-api-key", api_key)
        .query(&[("videoId", video.video_id.as_str()), ("text", "true")])
        .send()
        .await
        .map_err(|e| AnalyzeError::TranscriptFetch(e.to_string()))?;

    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| AnalyzeError::TranscriptFetch(e.to_string()))?;

    if !status.is_success() {
        let message = upstream_message(&body).unwrap_or(body);
        return Err(AnalyzeError::TranscriptFetch(format!(
            "transcript service returned {status}: {}",
            message.trim()
        )));
    }

    let parsed: SupadataResponse = serde_json::from_str(&body)
        .map_err(|e| AnalyzeError::TranscriptFetch(format!("unexpected transcript response: {e}")))?;
    let (content, segments) = parse_response(parsed)?;

    Ok(Transcript {
        content,
        segments,
        metadata,
        error: None,
    })
}

fn parse_response(resp: SupadataResponse) -> Result<(String, Vec<Segment>), AnalyzeError> {
    if resp.success == Some(false) {
        let message = resp
            .message
            .or(resp.error)
            .unwrap_or_else(|| "transcript service reported failure".to_string());
        return Err(AnalyzeError::TranscriptFetch(message));
    }

    let (text, segments) = match (resp.data, resp.content) {
        (Some(data), _) => (data.text, data.segments),
        (None, Some(SupadataContent::Text(text))) => (Some(text), Vec::new()),
        (None, Some(SupadataContent::Segments(segments))) => (None, segments),
        (None, None) => (None, Vec::new()),
    };

    let content = text
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| join_segments(&segments));

    if content.trim().is_empty() {
        return Err(AnalyzeError::TranscriptFetch("transcript is empty".to_string()));
    }

    Ok((content, segments))
}

fn join_segments(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| s.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn upstream_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error", "details"]
        .iter()
        .find_map(|key| json.get(key).and_then(|v| v.as_str()))
        .map(|s| s.to_string())
}
