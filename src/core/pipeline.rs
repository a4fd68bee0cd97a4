use crate::core::comments::{count_all_comments, process_comments, split_thread};
use crate::core::markdown::{export_filename, generate_markdown};
use crate::core::reddit::{extract_post_id, normalize_thread_url, RedditClient, UNKNOWN_POST_ID};
use crate::core::{
    ConfigProvider, ExportDocument, ExportSummary, Pipeline, Storage, ThreadListing,
};
use crate::utils::error::Result;

/// Fetches one thread, renders it to Markdown and writes it through `Storage`.
pub struct ThreadPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: RedditClient,
}

impl<S: Storage, C: ConfigProvider> ThreadPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let client = RedditClient::new(config.user_agent(), config.timeout_seconds())?;
        Ok(Self {
            storage,
            config,
            client,
        })
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ThreadPipeline<S, C> {
    async fn extract(&self) -> Result<ThreadListing> {
        let input = self.config.thread_url();

        let post_id = match extract_post_id(input) {
            Some(id) => id,
            None => {
                tracing::warn!("No post id in {}", input);
                println!("Warning: Could not extract post ID from URL, using generic filename");
                UNKNOWN_POST_ID.to_string()
            }
        };

        let url = normalize_thread_url(input, self.config.api_base())?;
        let payload = self.client.fetch_thread(&url).await?;

        Ok(ThreadListing { post_id, payload })
    }

    async fn transform(&self, listing: ThreadListing) -> Result<ExportDocument> {
        let (post, comments_listing) = split_thread(&listing.payload)?;
        let comments = process_comments(comments_listing, 0);

        let top_level_count = comments.len();
        let total_count = count_all_comments(&comments);
        tracing::debug!(
            "Processed {} top-level and {} total comments",
            top_level_count,
            total_count
        );

        Ok(ExportDocument {
            filename: export_filename(&listing.post_id, &post),
            markdown: generate_markdown(&post, &comments),
            top_level_count,
            total_count,
        })
    }

    async fn load(&self, document: ExportDocument) -> Result<ExportSummary> {
        let path = self.storage.display_path(&document.filename);

        let overwritten = self.storage.exists(&document.filename).await?;
        if overwritten {
            println!("File already exists: {}", path);
            println!("Overwriting existing file...");
        }

        self.storage
            .write_file(&document.filename, document.markdown.as_bytes())
            .await?;
        tracing::debug!("Wrote {} bytes to {}", document.markdown.len(), path);

        Ok(ExportSummary {
            path,
            top_level_count: document.top_level_count,
            total_count: document.total_count,
            overwritten,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ExporterError;
    use httpmock::prelude::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn exists(&self, path: &str) -> Result<bool> {
            Ok(self.files.lock().await.contains_key(path))
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }

        fn display_path(&self, path: &str) -> String {
            format!("mock/{}", path)
        }
    }

    struct MockConfig {
        thread_url: String,
        api_base: Option<String>,
    }

    impl MockConfig {
        fn new(thread_url: &str, api_base: Option<String>) -> Self {
            Self {
                thread_url: thread_url.to_string(),
                api_base,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn thread_url(&self) -> &str {
            &self.thread_url
        }

        fn output_dir(&self) -> &str {
            "mock"
        }

        fn user_agent(&self) -> &str {
            "test-agent"
        }

        fn timeout_seconds(&self) -> u64 {
            5
        }

        fn api_base(&self) -> Option<&str> {
            self.api_base.as_deref()
        }
    }

    fn thread_payload() -> serde_json::Value {
        serde_json::json!([
            {"kind": "Listing", "data": {"children": [
                {"kind": "t3", "data": {"title": "Ask Me Anything!", "author": "op", "selftext": ""}}
            ]}},
            {"kind": "Listing", "data": {"children": [
                {"kind": "t1", "data": {"author": "alice", "body": "hi", "score": 2, "replies": ""}},
                {"kind": "more", "data": {"count": 1}}
            ]}}
        ])
    }

    #[tokio::test]
    async fn test_full_pipeline_against_mock_server() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/r/rust/comments/abc123/ama/.json")
                .header("user-agent", "test-agent");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(thread_payload());
        });

        let storage = MockStorage::new();
        let config = MockConfig::new(
            "https://www.reddit.com/r/rust/comments/abc123/ama/",
            Some(server.base_url()),
        );
        let pipeline = ThreadPipeline::new(storage.clone(), config).unwrap();

        let listing = pipeline.extract().await.unwrap();
        assert_eq!(listing.post_id, "abc123");

        let document = pipeline.transform(listing).await.unwrap();
        assert_eq!(document.filename, "abc123-ask-me-anything.md");
        assert_eq!(document.top_level_count, 1);
        assert_eq!(document.total_count, 1);

        let summary = pipeline.load(document).await.unwrap();
        api_mock.assert();
        assert_eq!(summary.path, "mock/abc123-ask-me-anything.md");
        assert!(!summary.overwritten);

        let written = storage.get_file("abc123-ask-me-anything.md").await.unwrap();
        let markdown = String::from_utf8(written).unwrap();
        assert!(markdown.starts_with("# Ask Me Anything!\n\n"));
        assert!(markdown.contains("> **u/alice** · 2 points"));
    }

    #[tokio::test]
    async fn test_load_reports_overwrite() {
        let storage = MockStorage::new();
        storage.write_file("x-title.md", b"old").await.unwrap();
        let pipeline =
            ThreadPipeline::new(storage.clone(), MockConfig::new("reddit.com", None)).unwrap();

        let summary = pipeline
            .load(ExportDocument {
                filename: "x-title.md".to_string(),
                markdown: "new".to_string(),
                top_level_count: 0,
                total_count: 0,
            })
            .await
            .unwrap();

        assert!(summary.overwritten);
        assert_eq!(storage.get_file("x-title.md").await.unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_extract_without_post_id_uses_unknown() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/r/rust.json");
            then.status(200).json_body(serde_json::json!([]));
        });

        let config = MockConfig::new("reddit.com/r/rust", Some(server.base_url()));
        let pipeline = ThreadPipeline::new(MockStorage::new(), config).unwrap();

        let listing = pipeline.extract().await.unwrap();
        assert_eq!(listing.post_id, UNKNOWN_POST_ID);

        let err = pipeline.transform(listing).await.unwrap_err();
        assert!(matches!(err, ExporterError::InvalidDataError { .. }));
    }
}
