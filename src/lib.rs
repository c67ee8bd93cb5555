pub mod analysis;
pub mod config;
pub mod error;
pub mod metadata;
pub mod output;
pub mod pipeline;
pub mod server;
pub mod summarize;
pub mod transcript;

#[cfg(test)]
mod testing;

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::AnalyzeError;

/// Matches watch, short-link, embed, `v/` and channel-user (`u/x/`) URL shapes.
static VIDEO_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.*(youtu\.be/|v/|u/\w/|embed/|watch\?v=|&v=)([^#&?]*).*").expect("valid video URL regex")
});

/// A single timed transcript segment
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Segment {
    #[serde(default)]
    pub text: String,
    #[serde(default, alias = "offset")]
    pub start: f64,
    #[serde(default)]
    pub duration: f64,
}

/// Video details from the oEmbed lookup, or placeholders when it failed
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    pub title: String,
    pub author: String,
    /// Length in seconds; 0 when unknown
    pub duration: u64,
    pub thumbnail_url: String,
    pub description: String,
}

impl VideoMetadata {
    pub fn placeholder(video_id: &str) -> Self {
        Self {
            title: format!("YouTube Video {video_id}"),
            author: "Unknown".to_string(),
            duration: 0,
            thumbnail_url: default_thumbnail_url(video_id),
            description: String::new(),
        }
    }
}

pub fn default_thumbnail_url(video_id: &str) -> String {
    format!("https://img.youtube.com/vi/{video_id}/maxresdefault.jpg")
}

/// Error attached to a placeholder transcript
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ErrorDescriptor {
    pub message: String,
    pub code: String,
}

/// Transcript text and segments for a video
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Transcript {
    pub content: String,
    pub segments: Vec<Segment>,
    pub metadata: VideoMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDescriptor>,
}

pub const TRANSCRIPT_UNAVAILABLE: &str = "Transcript not available";

impl Transcript {
    /// Placeholder transcript for a failed retrieval
    pub fn unavailable(metadata: VideoMetadata, error: ErrorDescriptor) -> Self {
        Self {
            content: TRANSCRIPT_UNAVAILABLE.to_string(),
            segments: Vec::new(),
            metadata,
            error: Some(error),
        }
    }
}

/// A validated video ID together with the URL it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoReference {
    pub video_id: String,
    pub url: String,
}

impl VideoReference {
    pub fn parse(url: &str) -> Result<Self, AnalyzeError> {
        let video_id = extract_video_id(url).ok_or_else(|| AnalyzeError::InvalidUrl(url.trim().to_string()))?;
        Ok(Self {
            video_id,
            url: url.trim().to_string(),
        })
    }

    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }
}

/// Extract the 11-character video ID from a YouTube URL
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    let caps = VIDEO_URL_RE.captures(input)?;
    let id = caps.get(2)?.as_str();
    (id.chars().count() == 11).then(|| id.to_string())
}
