use log::debug;

use crate::error::AnalyzeError;

pub const SYSTEM_PROMPT: &str = "You are an expert content analyst who summarizes YouTube video transcripts. \
Start with a concise summary of the video. Then add a section titled \"Key Takeaways:\" with up to five bullet points, \
followed by a section titled \"Main Topics:\" listing up to five topics as bullet points. \
Keep every bullet to a single line.";

const TRUNCATION_MARKER: &str = "...";

/// Cut `text` to at most `max_chars` characters, appending an ellipsis when anything was dropped
pub fn truncate_transcript(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}{TRUNCATION_MARKER}", &text[..idx]),
        None => text.to_string(),
    }
}

/// Summarize transcript text with an OpenAI-compatible chat-completion API
pub async fn summarize(
    client: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    model: &str,
    title: &str,
    transcript_text: &str,
    max_chars: usize,
) -> Result<String, AnalyzeError> {
    let transcript_text = truncate_transcript(transcript_text, max_chars);
    debug!(
        "Summarizing via {base_url} with model {model} ({} chars)",
        transcript_text.chars().count()
    );

    let user_message = format!("Analyze this transcript from the video \"{title}\":\n\n{transcript_text}");

    let body = serde_json::json!({
        "model": model,
        "messages": [
            {
                "role": "system",
                "content": SYSTEM_PROMPT
            },
            {
                "role": "user",
                "content": user_message
            }
        ],
        "temperature": 0.7,
        "max_tokens": 1500
    });

    let resp = client
        .post(format!("{base_url}/chat/completions"))
        .bearer_auth(api_key)
        .header("Content-Type", "application/json")
        .json(&body)
        .send()
        .await
        .map_err(|e| AnalyzeError::Summarization(e.to_string()))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(AnalyzeError::Summarization(format!("LLM API returned {status}: {}", body.trim())));
    }

    let json: serde_json::Value = resp
        .json()
        .await
        .map_err(|e| AnalyzeError::Summarization(e.to_string()))?;
    extract_completion_text(&json)
}

fn extract_completion_text(json: &serde_json::Value) -> Result<String, AnalyzeError> {
    if let Some(text) = json
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|t| t.as_str())
        .filter(|t| !t.trim().is_empty())
    {
        return Ok(text.to_string());
    }
    Err(AnalyzeError::Summarization("unexpected chat completion response format".to_string()))
}
