use log::{debug, warn};
use serde::Deserialize;

use crate::error::AnalyzeError;
use crate::{VideoMetadata, VideoReference};

#[derive(Debug, Default, Deserialize)]
struct OEmbedResponse {
    title: Option<String>,
    author_name: Option<String>,
    length_seconds: Option<serde_json::Value>,
    thumbnail_url: Option<String>,
    description: Option<String>,
}

/// Look up title/author/thumbnail via oEmbed. Failures are absorbed: the caller gets `None`
pub async fn fetch_metadata(client: &reqwest::Client, oembed_url: &str, video: &VideoReference) -> Option<VideoMetadata> {
    match try_fetch(client, oembed_url, video).await {
        Ok(meta) => Some(meta),
        Err(e) => {
            warn!("Metadata lookup for {} failed, using defaults: {e}", video.video_id);
            None
        }
    }
}

async fn try_fetch(client: &reqwest::Client, oembed_url: &str, video: &VideoReference) -> Result<VideoMetadata, AnalyzeError> {
    let watch_url = video.watch_url();
    debug!("Fetching oEmbed metadata: {oembed_url} url={watch_url}");

    let resp = client
        .get(oembed_url)
        .query(&[("url", watch_url.as_str()), ("format", "json")])
        .send()
        .await
        .map_err(|e| AnalyzeError::MetadataFetch(e.to_string()))?;

    if !resp.status().is_success() {
        return Err(AnalyzeError::MetadataFetch(format!("oEmbed returned {}", resp.status())));
    }

    let body: OEmbedResponse = resp
        .json()
        .await
        .map_err(|e| AnalyzeError::MetadataFetch(e.to_string()))?;

    Ok(into_metadata(body, &video.video_id))
}

fn into_metadata(body: OEmbedResponse, video_id: &str) -> VideoMetadata {
    let defaults = VideoMetadata::placeholder(video_id);
    VideoMetadata {
        title: non_empty(body.title).unwrap_or(defaults.title),
        author: non_empty(body.author_name).unwrap_or(defaults.author),
        duration: body.length_seconds.as_ref().and_then(parse_seconds).unwrap_or(defaults.duration),
        thumbnail_url: non_empty(body.thumbnail_url).unwrap_or(defaults.thumbnail_url),
        description: body.description.unwrap_or(defaults.description),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

// Providers send the length as a number or a numeric string
fn parse_seconds(value: &serde_json::Value) -> Option<u64> {
    match value {
        serde_json::Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f.max(0.0) as u64)),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
