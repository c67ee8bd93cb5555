//! Request orchestration: resolve the video, fetch metadata and transcript,
//! summarize, then reduce the per-stage results into one response tier.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::StatusCode;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::{self, Analysis};
use crate::config::{OPENAI_KEY_VAR, SUPADATA_KEY_VAR, Settings};
use crate::error::AnalyzeError;
use crate::{ErrorDescriptor, Transcript, VideoMetadata, VideoReference, metadata, summarize, transcript};

/// Per-request state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Started,
    IdExtracted,
    MetadataAttempted,
    TranscriptAttempted,
    SummarizationAttempted,
    SkippedOnTranscriptFailure,
    ResponseSent,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Started => "started",
            Stage::IdExtracted => "id-extracted",
            Stage::MetadataAttempted => "metadata-attempted",
            Stage::TranscriptAttempted => "transcript-attempted",
            Stage::SummarizationAttempted => "summarization-attempted",
            Stage::SkippedOnTranscriptFailure => "skipped-on-transcript-failure",
            Stage::ResponseSent => "response-sent",
        };
        write!(f, "{name}")
    }
}

/// Receives pipeline progress; injected into the analyzer
pub trait Observer: Send + Sync {
    fn on_stage(&self, request_id: &str, stage: Stage);
    fn on_failure(&self, request_id: &str, stage: Stage, error: &AnalyzeError);
}

/// Default observer writing through the `log` facade
#[derive(Debug, Default)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn on_stage(&self, request_id: &str, stage: Stage) {
        match stage {
            Stage::Started | Stage::ResponseSent => info!("[{request_id}] {stage}"),
            _ => debug!("[{request_id}] {stage}"),
        }
    }

    fn on_failure(&self, request_id: &str, stage: Stage, error: &AnalyzeError) {
        warn!("[{request_id}] {stage} failed ({}): {error}", error.code());
    }
}

enum TranscriptStage {
    Fetched(Transcript),
    Failed(Transcript, AnalyzeError),
}

enum SummaryStage {
    Generated(String),
    Failed(AnalyzeError),
    Skipped,
}

/// The response tier chosen for a request that got past validation
#[derive(Debug)]
pub enum Outcome {
    Complete {
        transcript: Transcript,
        analysis: Analysis,
    },
    Partial {
        transcript: Transcript,
        analysis: Analysis,
        error: AnalyzeError,
    },
    Failed {
        transcript: Transcript,
        analysis: Analysis,
        error: AnalyzeError,
    },
}

fn reduce(title: &str, transcript: TranscriptStage, summary: SummaryStage) -> Outcome {
    match (transcript, summary) {
        (TranscriptStage::Fetched(transcript), SummaryStage::Generated(text)) => Outcome::Complete {
            analysis: analysis::build_analysis(title, &text),
            transcript,
        },
        (TranscriptStage::Fetched(transcript), SummaryStage::Failed(error)) => Outcome::Partial {
            transcript,
            analysis: analysis::fallback_analysis(title),
            error,
        },
        // Summarization only runs after a fetched transcript
        (TranscriptStage::Fetched(transcript), SummaryStage::Skipped) => Outcome::Partial {
            transcript,
            analysis: analysis::fallback_analysis(title),
            error: AnalyzeError::Summarization("summarization was skipped".to_string()),
        },
        (TranscriptStage::Failed(transcript, error), _) => Outcome::Failed {
            transcript,
            analysis: analysis::fallback_analysis(title),
            error,
        },
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AnalysisPayload {
    pub transcript: Transcript,
    pub analysis: Analysis,
}

/// JSON body returned for every analysis request
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub troubleshooting: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Milliseconds spent handling the request
    pub processing_time: u64,
    pub request_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<AnalysisPayload>,
    /// HTTP status to send; degraded tiers still carry a payload and use 200
    #[serde(skip)]
    pub status: StatusCode,
}

impl AnalysisResponse {
    pub fn from_outcome(outcome: Outcome, request_id: &str, elapsed: Duration) -> Self {
        let (success, partial, error, data) = match outcome {
            Outcome::Complete { transcript, analysis } => (true, None, None, AnalysisPayload { transcript, analysis }),
            Outcome::Partial {
                transcript,
                analysis,
                error,
            } => (true, Some(true), Some(error), AnalysisPayload { transcript, analysis }),
            Outcome::Failed {
                transcript,
                analysis,
                error,
            } => (false, None, Some(error), AnalysisPayload { transcript, analysis }),
        };

        Self {
            success,
            partial,
            code: error.as_ref().map(|e| e.code().to_string()),
            troubleshooting: error.as_ref().map(|e| e.troubleshooting().to_string()),
            error: error.map(|e| e.to_string()),
            details: None,
            processing_time: elapsed.as_millis() as u64,
            request_id: request_id.to_string(),
            data: Some(data),
            status: StatusCode::OK,
        }
    }

    /// Response for a request rejected before or outside the fallback ladder
    pub fn from_error(error: &AnalyzeError, request_id: &str, elapsed: Duration) -> Self {
        let (message, details) = match error {
            AnalyzeError::Unhandled(report) => (
                "Internal server error".to_string(),
                cfg!(debug_assertions).then(|| format!("{report:?}")),
            ),
            other => (other.to_string(), None),
        };

        Self {
            success: false,
            partial: None,
            error: Some(message),
            code: Some(error.code().to_string()),
            troubleshooting: Some(error.troubleshooting().to_string()),
            details,
            processing_time: elapsed.as_millis() as u64,
            request_id: request_id.to_string(),
            data: None,
            status: error.status(),
        }
    }
}

/// Runs the analysis pipeline with explicit settings and observer
pub struct Analyzer {
    settings: Settings,
    client: reqwest::Client,
    observer: Arc<dyn Observer>,
}

impl Analyzer {
    pub fn new(settings: Settings, client: reqwest::Client, observer: Arc<dyn Observer>) -> Self {
        Self {
            settings,
            client,
            observer,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run one request end to end. A panic inside the pipeline becomes an `Unhandled` response
    pub async fn run(self: Arc<Self>, url: String) -> AnalysisResponse {
        let request_id = Uuid::new_v4().to_string();
        let started = Instant::now();

        let analyzer = Arc::clone(&self);
        let id = request_id.clone();
        let result = tokio::spawn(async move { analyzer.analyze(&id, &url).await })
            .await
            .unwrap_or_else(|e| Err(AnalyzeError::Unhandled(eyre::eyre!("analysis task failed: {e}"))));

        let response = match result {
            Ok(outcome) => AnalysisResponse::from_outcome(outcome, &request_id, started.elapsed()),
            Err(error) => {
                self.observer.on_failure(&request_id, Stage::ResponseSent, &error);
                AnalysisResponse::from_error(&error, &request_id, started.elapsed())
            }
        };
        self.observer.on_stage(&request_id, Stage::ResponseSent);
        response
    }

    /// The linear pipeline. `Err` only for requests rejected up front
    pub async fn analyze(&self, request_id: &str, url: &str) -> Result<Outcome, AnalyzeError> {
        self.observer.on_stage(request_id, Stage::Started);

        let (supadata_key, openai_key) = self.require_keys()?;

        let video = VideoReference::parse(url)?;
        self.observer.on_stage(request_id, Stage::IdExtracted);

        let metadata = metadata::fetch_metadata(&self.client, &self.settings.oembed_url, &video)
            .await
            .unwrap_or_else(|| VideoMetadata::placeholder(&video.video_id));
        self.observer.on_stage(request_id, Stage::MetadataAttempted);
        let title = metadata.title.clone();

        let transcript_stage = match transcript::fetch_transcript(
            &self.client,
            &self.settings.supadata_url,
            supadata_key,
            &video,
            metadata.clone(),
        )
        .await
        {
            Ok(t) => TranscriptStage::Fetched(t),
            Err(e) => {
                self.observer.on_failure(request_id, Stage::TranscriptAttempted, &e);
                let descriptor = ErrorDescriptor {
                    message: e.to_string(),
                    code: e.code().to_string(),
                };
                TranscriptStage::Failed(Transcript::unavailable(metadata, descriptor), e)
            }
        };
        self.observer.on_stage(request_id, Stage::TranscriptAttempted);

        let summary_stage = match &transcript_stage {
            TranscriptStage::Fetched(t) => {
                let result = summarize::summarize(
                    &self.client,
                    &self.settings.openai_url,
                    openai_key,
                    &self.settings.model,
                    &title,
                    &t.content,
                    self.settings.max_transcript_chars,
                )
                .await;
                self.observer.on_stage(request_id, Stage::SummarizationAttempted);
                match result {
                    Ok(text) => SummaryStage::Generated(text),
                    Err(e) => {
                        self.observer.on_failure(request_id, Stage::SummarizationAttempted, &e);
                        SummaryStage::Failed(e)
                    }
                }
            }
            TranscriptStage::Failed(..) => {
                self.observer.on_stage(request_id, Stage::SkippedOnTranscriptFailure);
                SummaryStage::Skipped
            }
        };

        Ok(reduce(&title, transcript_stage, summary_stage))
    }

    fn require_keys(&self) -> Result<(&str, &str), AnalyzeError> {
        let supadata = self
            .settings
            .keys
            .supadata
            .as_deref()
            .ok_or(AnalyzeError::MissingConfiguration {
                provider: "Supadata",
                env_var: SUPADATA_KEY_VAR,
            })?;
        let openai = self
            .settings
            .keys
            .openai
            .as_deref()
            .ok_or(AnalyzeError::MissingConfiguration {
                provider: "OpenAI",
                env_var: OPENAI_KEY_VAR,
            })?;
        Ok((supadata, openai))
    }
}
