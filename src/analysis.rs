//! Turns free-form LLM output into structured analysis fields.
//!
//! The scanners are line heuristics: a trigger phrase anywhere in a line opens
//! collection, and every later bullet or numbered line is taken until the cap.
//! A trigger phrase inside unrelated prose also opens collection.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub const MAX_ITEMS: usize = 5;
pub const SUMMARY_CHARS: usize = 500;

pub const TAKEAWAY_TRIGGERS: &[&str] = &["key takeaway", "main point"];
pub const TOPIC_TRIGGERS: &[&str] = &["topic", "theme", "subject"];

pub const PLACEHOLDER_TAKEAWAY: &str = "Watch the video for key insights";
pub const PLACEHOLDER_TOPIC: &str = "General Content";

static LIST_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*•+]|\d+[.)])\s+").expect("valid list marker regex"));

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Topic {
    pub title: String,
    pub description: String,
}

impl Topic {
    fn from_line(title: String) -> Self {
        let description = format!("Discussion about {title}");
        Self { title, description }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FrameworkComponent {
    pub heading: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Framework {
    pub title: String,
    pub components: Vec<FrameworkComponent>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub title: String,
    pub framework: Framework,
    pub summary: String,
    pub key_takeaways: Vec<String>,
    pub topics: Vec<Topic>,
}

/// Collect up to `MAX_ITEMS` list lines that follow the first line containing a trigger
fn scan_section(text: &str, triggers: &[&str]) -> Vec<String> {
    let mut items = Vec::new();
    let mut collecting = false;

    for line in text.lines() {
        let lower = line.to_lowercase();
        if triggers.iter().any(|t| lower.contains(t)) {
            collecting = true;
            continue;
        }
        if !collecting {
            continue;
        }
        if let Some(m) = LIST_MARKER_RE.find(line) {
            let item = line[m.end()..].trim();
            if !item.is_empty() {
                items.push(item.to_string());
                if items.len() == MAX_ITEMS {
                    break;
                }
            }
        }
    }

    items
}

pub fn extract_key_takeaways(text: &str) -> Vec<String> {
    let items = scan_section(text, TAKEAWAY_TRIGGERS);
    if items.is_empty() {
        vec![PLACEHOLDER_TAKEAWAY.to_string()]
    } else {
        items
    }
}

pub fn extract_topics(text: &str) -> Vec<Topic> {
    let items = scan_section(text, TOPIC_TRIGGERS);
    if items.is_empty() {
        vec![Topic::from_line(PLACEHOLDER_TOPIC.to_string())]
    } else {
        items.into_iter().map(Topic::from_line).collect()
    }
}

// Leading whitespace is not counted against the budget
fn summary_prefix(text: &str) -> String {
    text.trim_start().chars().take(SUMMARY_CHARS).collect()
}

/// Structured analysis built from generated text
pub fn build_analysis(title: &str, generated: &str) -> Analysis {
    let topics = extract_topics(generated);
    let components = topics
        .iter()
        .map(|t| FrameworkComponent {
            heading: t.title.clone(),
            description: t.description.clone(),
        })
        .collect();

    Analysis {
        title: title.to_string(),
        framework: Framework {
            title: format!("{title} - Framework"),
            components,
        },
        summary: summary_prefix(generated),
        key_takeaways: extract_key_takeaways(generated),
        topics,
    }
}

/// Static analysis used when no generated text is available
pub fn fallback_analysis(title: &str) -> Analysis {
    Analysis {
        title: title.to_string(),
        framework: Framework {
            title: format!("{title} - Overview"),
            components: vec![FrameworkComponent {
                heading: "Video Overview".to_string(),
                description: format!("Content from \"{title}\". AI analysis is currently unavailable."),
            }],
        },
        summary: format!("AI analysis is currently unavailable for \"{title}\". Please try again later."),
        key_takeaways: vec![PLACEHOLDER_TAKEAWAY.to_string()],
        topics: vec![Topic::from_line(PLACEHOLDER_TOPIC.to_string())],
    }
}
