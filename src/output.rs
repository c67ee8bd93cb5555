use crate::pipeline::AnalysisResponse;

/// Render a response for the terminal
pub fn render_text(response: &AnalysisResponse) -> String {
    let mut out = String::new();

    if let Some(ref error) = response.error {
        let label = if response.partial == Some(true) { "Warning" } else { "Error" };
        out.push_str(&format!("{label}: {error}\n"));
        if let Some(ref hint) = response.troubleshooting {
            out.push_str(&format!("Hint: {hint}\n"));
        }
    }

    let Some(ref data) = response.data else {
        return out.trim_end().to_string();
    };

    let meta = &data.transcript.metadata;
    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str(&format!("# {}\nby {}", meta.title, meta.author));
    if meta.duration > 0 {
        out.push_str(&format!(" ({})", format_duration(meta.duration)));
    }
    out.push_str("\n\n## Summary\n");
    out.push_str(&data.analysis.summary);

    out.push_str("\n\n## Key Takeaways\n");
    for takeaway in &data.analysis.key_takeaways {
        out.push_str(&format!("- {takeaway}\n"));
    }

    out.push_str("\n## Topics\n");
    for topic in &data.analysis.topics {
        out.push_str(&format!("- {}: {}\n", topic.title, topic.description));
    }

    out.push_str(&format!("\n({} ms, request {})", response.processing_time, response.request_id));
    out
}

pub fn render_json(response: &AnalysisResponse) -> String {
    serde_json::to_string_pretty(response).unwrap_or_default()
}

fn format_duration(secs: u64) -> String {
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}
