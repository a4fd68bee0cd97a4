use crate::domain::model::{Comment, Post, DELETED};
use crate::utils::error::{ExporterError, Result};
use serde_json::Value;

const KIND_COMMENT: &str = "t1";

/// Splits the two-element thread payload into the post and its comment listing.
pub fn split_thread(payload: &Value) -> Result<(Post, &Value)> {
    let parts = match payload.as_array() {
        Some(parts) if parts.len() >= 2 => parts,
        _ => {
            return Err(ExporterError::InvalidDataError {
                message: "expected an array with the post and its comments".to_string(),
            })
        }
    };

    let post_data = parts[0]
        .pointer("/data/children/0/data")
        .ok_or_else(|| ExporterError::InvalidDataError {
            message: "post listing has no children".to_string(),
        })?;

    Ok((parse_post(post_data), &parts[1]))
}

pub fn parse_post(data: &Value) -> Post {
    Post {
        title: data.get("title").and_then(Value::as_str).map(str::to_string),
        author: string_or(data, "author", DELETED),
        selftext: string_or(data, "selftext", ""),
    }
}

/// Walks a comment listing, skipping collapsed `more` stubs and anything that is not a comment.
pub fn process_comments(listing: &Value, depth: usize) -> Vec<Comment> {
    let children = match listing.pointer("/data/children").and_then(Value::as_array) {
        Some(children) => children,
        None => return Vec::new(),
    };

    let mut processed = Vec::new();
    for child in children {
        let kind = child.get("kind").and_then(Value::as_str).unwrap_or_default();
        // `more` stubs stand in for collapsed threads
        if kind != KIND_COMMENT {
            continue;
        }

        let data = match child.get("data") {
            Some(data) => data,
            None => continue,
        };

        // 沒有回覆時 Reddit 會回傳空字串
        let replies = match data.get("replies") {
            Some(replies @ Value::Object(_)) => process_comments(replies, depth + 1),
            _ => Vec::new(),
        };

        processed.push(Comment {
            author: string_or(data, "author", DELETED),
            body: string_or(data, "body", DELETED),
            score: data.get("score").and_then(Value::as_i64).unwrap_or(0),
            depth,
            replies,
        });
    }

    processed
}

pub fn count_all_comments(comments: &[Comment]) -> usize {
    comments.len()
        + comments
            .iter()
            .map(|c| count_all_comments(&c.replies))
            .sum::<usize>()
}

fn string_or(data: &Value, key: &str, default: &str) -> String {
    data.get(key)
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}
