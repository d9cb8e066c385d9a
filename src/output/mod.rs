use serde::Serialize;

use crate::runner::Discovered;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

#[derive(Clone, Debug, Serialize)]
pub struct OutputRecord {
    pub url: String,
    pub status: u16,
    pub method: String,
}

pub fn build_records(discovered: &[Discovered]) -> Vec<OutputRecord> {
    discovered
        .iter()
        .map(|d| OutputRecord {
            url: d.url.clone(),
            status: d.status,
            method: d.method.as_str().to_string(),
        })
        .collect()
}

/// One URL per line, already sorted by the aggregator snapshot.
pub fn render_text(records: &[OutputRecord]) -> Vec<u8> {
    let mut out = String::new();
    for r in records {
        out.push_str(&r.url);
        out.push('\n');
    }
    out.into_bytes()
}

pub fn render_json(records: &[OutputRecord]) -> Vec<u8> {
    serde_json::to_vec_pretty(records).unwrap_or_else(|_| b"[]\n".to_vec())
}
