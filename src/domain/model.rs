use serde::{Deserialize, Serialize};

pub const DELETED: &str = "[deleted]";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub title: Option<String>,
    pub author: String,
    pub selftext: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub author: String,
    pub body: String,
    pub score: i64,
    pub depth: usize,
    pub replies: Vec<Comment>,
}

/// Raw thread payload as returned by the `.json` endpoint, plus the id taken from the input URL.
#[derive(Debug, Clone)]
pub struct ThreadListing {
    pub post_id: String,
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct ExportDocument {
    pub filename: String,
    pub markdown: String,
    pub top_level_count: usize,
    pub total_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub path: String,
    pub top_level_count: usize,
    pub total_count: usize,
    pub overwritten: bool,
}
