use crate::domain::model::{Comment, Post};
use regex::Regex;
use std::sync::OnceLock;

const UNTITLED_POST: &str = "Untitled Post";
const UNTITLED_SLUG: &str = "untitled";

pub fn generate_markdown(post: &Post, comments: &[Comment]) -> String {
    let mut markdown = format!(
        "# {}\n\n",
        post.title.as_deref().unwrap_or(UNTITLED_POST)
    );
    markdown.push_str(&format!("**Posted by u/{}**\n\n", post.author));

    if !post.selftext.is_empty() {
        markdown.push_str(&format!("{}\n\n", post.selftext));
    }

    markdown.push_str("---\n\n");

    if comments.is_empty() {
        markdown.push_str("## Comments\n\nNo comments found.\n\n");
    } else {
        markdown.push_str(&format!(
            "## Comments ({} top-level comments)\n\n",
            comments.len()
        ));
        for comment in comments {
            format_comment(comment, 0, &mut markdown);
        }
    }

    markdown
}

/// Renders one comment and its replies as nested block quotes, one `>` per level.
pub fn format_comment(comment: &Comment, depth: usize, out: &mut String) {
    let quote_prefix = format!("{} ", ">".repeat(depth + 1));

    out.push_str(&format!(
        "{}**u/{}** · {} points\n>\n",
        quote_prefix, comment.author, comment.score
    ));

    let body_lines: Vec<String> = comment
        .body
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(|line| format!("{}{}", quote_prefix, line))
        .collect();
    if !body_lines.is_empty() {
        out.push_str(&body_lines.join("\n"));
        out.push_str("\n>\n");
    }

    for reply in &comment.replies {
        format_comment(reply, depth + 1, out);
    }

    if depth == 0 {
        out.push('\n');
    }
}

fn strip_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^\w\s-]").expect("strip pattern is a valid regex"))
}

fn dash_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[\s-]+").expect("dash pattern is a valid regex"))
}

pub fn slugify(title: &str) -> String {
    let stripped = strip_pattern().replace_all(title, "");
    let lowered = stripped.trim().to_lowercase();
    dash_pattern().replace_all(&lowered, "-").into_owned()
}

pub fn export_filename(post_id: &str, post: &Post) -> String {
    let slug = slugify(post.title.as_deref().unwrap_or(UNTITLED_SLUG));
    format!("{}-{}.md", post_id, slug)
}
